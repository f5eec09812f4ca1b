use tagsweep_cloud::CloudError;
use tagsweep_cloud_aws::AwsCredentials;

pub const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Read static credentials from the environment
pub fn from_env() -> Result<AwsCredentials, CloudError> {
    from_lookup(|name| std::env::var(name).ok())
}

fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<AwsCredentials, CloudError> {
    let required = |name: &str| {
        lookup(name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| CloudError::MissingCredentials(format!("{} must be set", name)))
    };

    Ok(AwsCredentials {
        access_key_id: required(ACCESS_KEY_ID)?,
        secret_access_key: required(SECRET_ACCESS_KEY)?,
        session_token: lookup(SESSION_TOKEN).filter(|value| !value.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_session_token_is_optional() {
        let credentials =
            from_lookup(lookup(&[(ACCESS_KEY_ID, "AKIA"), (SECRET_ACCESS_KEY, "secret")])).unwrap();
        assert_eq!(credentials.access_key_id, "AKIA");
        assert_eq!(credentials.session_token, None);
    }

    #[test]
    fn test_missing_secret() {
        let err =
            from_lookup(lookup(&[(ACCESS_KEY_ID, "AKIA"), (SECRET_ACCESS_KEY, "")])).unwrap_err();
        assert!(err.is_precondition());
        assert!(err.to_string().contains(SECRET_ACCESS_KEY));
    }
}
