//! Capability traits backed by the `aws-sdk-*` clients

mod ec2;
mod elasticache;
mod rds;
mod s3;
mod tagging;

pub use ec2::SdkEc2;
pub use elasticache::SdkElastiCache;
pub use rds::SdkRds;
pub use s3::SdkS3;
pub use tagging::SdkTagging;

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use tagsweep_cloud::ApiError;

/// Keep the service error code so managers can match on it
pub(crate) fn api_error<E>(err: E) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let code = err.code().map(str::to_string);
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };
    ApiError { code, message }
}
