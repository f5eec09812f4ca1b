use std::collections::BTreeMap;
use tagsweep_cloud::CloudError;

/// Parse repeated `KEY=VALUE` flags
pub fn parse_tags(raw: &[String]) -> Result<BTreeMap<String, String>, CloudError> {
    let mut tags = BTreeMap::new();
    for entry in raw {
        let (key, value) = entry
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| {
                CloudError::InvalidConfig(format!("tag '{}' must look like KEY=VALUE", entry))
            })?;
        tags.insert(key.to_string(), value.to_string());
    }
    Ok(tags)
}
