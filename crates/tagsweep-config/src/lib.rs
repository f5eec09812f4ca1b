pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tagsweep_cloud::{DEFAULT_CLUSTER_TAG_KEY, ResourceKind, SkippedPolicy};

/// Environment variable pointing at a settings file
pub const CONFIG_PATH_ENV: &str = "TAGSWEEP_CONFIG_PATH";

/// Settings file name looked up in the current directory
pub const LOCAL_SETTINGS_FILE: &str = "tagsweep.yaml";

/// Defaults for `tagsweep cleanup`, overridden by command line flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub region: String,
    pub output: String,
    pub poll_interval_secs: u64,
    pub poll_timeout_secs: u64,
    pub skipped: SkippedPolicy,
    pub cluster_tag_key: String,
    /// Kinds to sweep; empty means all
    pub resource_kinds: Vec<ResourceKind>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: "eu-west-1".to_string(),
            output: "table".to_string(),
            poll_interval_secs: 10,
            poll_timeout_secs: 30 * 60,
            skipped: SkippedPolicy::Wait,
            cluster_tag_key: DEFAULT_CLUSTER_TAG_KEY.to_string(),
            resource_kinds: Vec::new(),
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.cluster_tag_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "cluster_tag_key",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// tagsweep's directory under the user config dir, if the platform has one
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tagsweep"))
}

/// Locate the settings file.
///
/// Lookup order:
/// 1. `TAGSWEEP_CONFIG_PATH` (must exist when set)
/// 2. `./tagsweep.yaml`
/// 3. `<config dir>/tagsweep/config.yaml`
pub fn find_settings_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::SettingsFileNotFound(path));
    }

    let local = std::env::current_dir()?.join(LOCAL_SETTINGS_FILE);
    if local.exists() {
        return Ok(Some(local));
    }

    if let Some(config_dir) = get_config_dir() {
        let global = config_dir.join("config.yaml");
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// Load settings from the first file found, or the built-in defaults
pub fn load_settings() -> Result<Settings> {
    match find_settings_file()? {
        Some(path) => Settings::from_path(&path),
        None => Ok(Settings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_get_config_dir() {
        if let Some(dir) = get_config_dir() {
            assert!(dir.ends_with("tagsweep"));
        }
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tagsweep.yaml");
        fs::write(&path, "region: us-east-1\nskipped: ignore\n").unwrap();

        let settings = Settings::from_path(&path).unwrap();
        assert_eq!(settings.region, "us-east-1");
        assert_eq!(settings.skipped, SkippedPolicy::Ignore);
        assert_eq!(settings.output, "table");
        assert_eq!(settings.poll_interval_secs, 10);
        assert_eq!(settings.cluster_tag_key, DEFAULT_CLUSTER_TAG_KEY);
    }

    #[test]
    fn test_resource_kinds_parse() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tagsweep.yaml");
        fs::write(&path, "resource_kinds:\n  - s3\n  - rds-instance\n").unwrap();

        let settings = Settings::from_path(&path).unwrap();
        assert_eq!(
            settings.resource_kinds,
            vec![ResourceKind::S3, ResourceKind::RdsInstance]
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tagsweep.yaml");
        fs::write(&path, "regoin: us-east-1\n").unwrap();

        assert!(matches!(
            Settings::from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tagsweep.yaml");
        fs::write(&path, "poll_interval_secs: 0\n").unwrap();

        assert!(matches!(
            Settings::from_path(&path),
            Err(ConfigError::Invalid {
                field: "poll_interval_secs",
                ..
            })
        ));
    }

    #[test]
    #[serial]
    fn test_find_settings_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join(LOCAL_SETTINGS_FILE), "output: table\n").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = find_settings_file().unwrap();
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with(LOCAL_SETTINGS_FILE));
    }

    #[test]
    #[serial]
    fn test_env_var_takes_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        let custom = temp_dir.path().join("custom.yaml");
        fs::write(&custom, "region: ap-southeast-2\n").unwrap();
        fs::write(temp_dir.path().join(LOCAL_SETTINGS_FILE), "region: us-east-1\n").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &custom);
        }

        let settings = load_settings().unwrap();

        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }
        std::env::set_current_dir(original_dir).unwrap();

        assert_eq!(settings.region, "ap-southeast-2");
    }

    #[test]
    #[serial]
    fn test_missing_env_path_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.yaml");
        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &missing);
        }

        let result = find_settings_file();

        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }
        assert!(matches!(result, Err(ConfigError::SettingsFileNotFound(_))));
    }
}
