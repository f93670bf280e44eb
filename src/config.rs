use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::substitution::SubstitutionRule;

pub const CATALOG_ENV_VAR: &str = "DIET_ENGINE_CATALOG";
pub const PROFILES_ENV_VAR: &str = "DIET_ENGINE_PROFILES";
pub const LOG_ENV_VAR: &str = "DIET_ENGINE_LOG";
pub const DECIMALS_ENV_VAR: &str = "DIET_ENGINE_DECIMALS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog_path: Option<PathBuf>,
    pub profiles_path: Option<PathBuf>,
    /// Decimals kept when totals are printed.
    pub display_decimals: u32,
    pub log_level: String,
    pub substitution_rules: Vec<SubstitutionRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            profiles_path: None,
            display_decimals: 1,
            log_level: "info".into(),
            substitution_rules: Vec::new(),
        }
    }
}

impl Config {
    /// Defaults, then the optional JSON file, then environment (and `.env`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Overrides fields from the environment. A value that does not parse is
    /// an error rather than being skipped.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(catalog) = lookup(CATALOG_ENV_VAR) {
            self.catalog_path = Some(PathBuf::from(catalog));
        }
        if let Some(profiles) = lookup(PROFILES_ENV_VAR) {
            self.profiles_path = Some(PathBuf::from(profiles));
        }
        if let Some(level) = lookup(LOG_ENV_VAR) {
            self.log_level = level;
        }
        if let Some(decimals) = lookup(DECIMALS_ENV_VAR) {
            self.display_decimals = decimals
                .trim()
                .parse::<u32>()
                .with_context(|| format!("{}={:?} is not a whole number", DECIMALS_ENV_VAR, decimals))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_file_fills_defaults() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(
            file,
            r#"{{"catalog_path": "foods.csv", "substitution_rules": [{{"from_food_id": "1", "to_food_id": "2"}}]}}"#
        )?;
        file.flush()?;

        let config = Config::from_file(file.path())?;
        assert_eq!(config.catalog_path, Some(PathBuf::from("foods.csv")));
        assert_eq!(config.display_decimals, 1);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.substitution_rules.len(), 1);
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let env: HashMap<&str, &str> = [
            (CATALOG_ENV_VAR, "/data/foods.json"),
            (LOG_ENV_VAR, "debug"),
            (DECIMALS_ENV_VAR, "2"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()))?;
        assert_eq!(config.catalog_path, Some(PathBuf::from("/data/foods.json")));
        assert_eq!(config.profiles_path, None);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.display_decimals, 2);
        Ok(())
    }

    #[test]
    fn test_bad_decimals_are_an_error() {
        let mut config = Config::default();
        let err = config
            .apply_env(|key| (key == DECIMALS_ENV_VAR).then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(DECIMALS_ENV_VAR));
        assert_eq!(config.display_decimals, 1);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let err = Config::from_file(Path::new("no_such_config.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
