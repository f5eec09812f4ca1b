//! Error types shared by every provider and the coordinating client

use thiserror::Error;

/// A failed call against a cloud provider API.
///
/// `code` carries the provider's machine-readable error code (for AWS the
/// `Code` field of the error response). Managers inspect it to tell a
/// recoverable condition such as "still in use" apart from a fatal failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub code: Option<String>,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// An error without a provider code, always treated as fatal
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Whether the provider reported exactly this error code
    pub fn is(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

/// Errors raised while sweeping cluster resources
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{context}: {source}")]
    Provider {
        context: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to run manager {manager}: {source}")]
    Manager {
        manager: String,
        #[source]
        source: Box<CloudError>,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("unknown resource kind: {0}")]
    UnknownResourceKind(String),

    #[error("malformed resource identifier: {0}")]
    MalformedArn(String),
}

impl CloudError {
    /// Whether the error was raised before any provider call was made
    pub fn is_precondition(&self) -> bool {
        match self {
            CloudError::InvalidConfig(_)
            | CloudError::MissingCredentials(_)
            | CloudError::UnknownResourceKind(_) => true,
            CloudError::Manager { source, .. } => source.is_precondition(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Attaches operation context to a raw provider result
pub trait ApiResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ApiResultExt<T> for std::result::Result<T, ApiError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|source| CloudError::Provider {
            context: context.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_message() {
        let result: std::result::Result<(), ApiError> =
            Err(ApiError::message("some tagging error"));
        let err = result.context("failed to filter security groups").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to filter security groups: some tagging error"
        );
    }

    #[test]
    fn test_manager_error_wraps_name() {
        let err = CloudError::Manager {
            manager: "AWS S3 Manager".to_string(),
            source: Box::new(CloudError::Provider {
                context: "failed to delete bucket".to_string(),
                source: ApiError::new("AccessDenied", "denied"),
            }),
        };
        assert_eq!(
            err.to_string(),
            "failed to run manager AWS S3 Manager: failed to delete bucket: denied"
        );
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_api_error_code_match() {
        let err = ApiError::new("CacheSubnetGroupInUse", "still in use");
        assert!(err.is("CacheSubnetGroupInUse"));
        assert!(!err.is("DependencyViolation"));
        assert!(!ApiError::message("x").is(""));
    }

    #[test]
    fn test_precondition_classification() {
        let precondition = [
            CloudError::InvalidConfig("bad output".to_string()),
            CloudError::MissingCredentials("AWS_ACCESS_KEY_ID".to_string()),
            CloudError::UnknownResourceKind("route-table".to_string()),
        ];
        assert!(precondition.iter().all(CloudError::is_precondition));

        let runtime = [
            CloudError::MalformedArn("arn:".to_string()),
            CloudError::Provider {
                context: "failed to delete bucket".to_string(),
                source: ApiError::message("denied"),
            },
        ];
        assert!(!runtime.iter().any(CloudError::is_precondition));
    }
}
