use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// One watched product as written in `config/tracked.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackedEntry {
    /// Chat that receives notifications for this product.
    pub owner_id: i64,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrackedFile {
    #[serde(default)]
    pub products: Vec<TrackedEntry>,
}

/// Load the seed list of watched products from a YAML file.
///
/// URLs are only checked for being non-empty and unique per owner here;
/// marketplace-shape validation belongs to the scraper.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_tracked(path: &Path) -> Result<TrackedFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let tracked_file: TrackedFile =
        serde_yaml::from_str(&content).map_err(ConfigError::FileParse)?;

    validate_tracked(&tracked_file)?;

    Ok(tracked_file)
}

fn validate_tracked(tracked_file: &TrackedFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in &tracked_file.products {
        let url = entry.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Validation(format!(
                "tracked product for owner {} has an empty url",
                entry.owner_id
            )));
        }
        if !seen.insert((entry.owner_id, url.to_string())) {
            return Err(ConfigError::Validation(format!(
                "owner {} tracks '{url}' twice",
                entry.owner_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<TrackedFile, ConfigError> {
        let file: TrackedFile = serde_yaml::from_str(yaml).map_err(ConfigError::FileParse)?;
        validate_tracked(&file)?;
        Ok(file)
    }

    #[test]
    fn parses_entries_with_optional_name() {
        let yaml = r"
products:
  - owner_id: 42
    url: https://www.amazon.es/dp/B0CHX1W1XY
    name: Kettle
  - owner_id: 7
    url: https://www.amazon.es/dp/B08N5WRWNW
";
        let file = parse(yaml).unwrap();
        assert_eq!(file.products.len(), 2);
        assert_eq!(file.products[0].name.as_deref(), Some("Kettle"));
        assert!(file.products[1].name.is_none());
    }

    #[test]
    fn same_url_for_different_owners_is_allowed() {
        let yaml = r"
products:
  - owner_id: 1
    url: https://www.amazon.es/dp/B0CHX1W1XY
  - owner_id: 2
    url: https://www.amazon.es/dp/B0CHX1W1XY
";
        assert!(parse(yaml).is_ok());
    }

    #[test]
    fn duplicate_for_same_owner_is_rejected() {
        let yaml = r"
products:
  - owner_id: 1
    url: https://www.amazon.es/dp/B0CHX1W1XY
  - owner_id: 1
    url: https://www.amazon.es/dp/B0CHX1W1XY
";
        assert!(matches!(parse(yaml), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn empty_url_is_rejected() {
        let yaml = "products:\n  - owner_id: 1\n    url: '  '\n";
        assert!(matches!(parse(yaml), Err(ConfigError::Validation(_))));
    }
}
