//! Configuration file support for deadwood.
//!
//! Loads an optional `.deadwood/config.toml` from the project root. Missing or malformed files
//! fall back to defaults with a warning diagnostic rather than a hard failure -- the loader
//! itself never errors.

use serde::Deserialize;
use std::path::Path;

/// Root configuration structure, covering the Input record fields of §6.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DeadwoodConfig {
    /// Extra glob patterns appended to the default discovery exclusion list.
    pub exclude: Vec<String>,
    /// Parse worker count; `None` defaults to `min(available_parallelism, 8)`.
    pub workers: Option<usize>,
    /// Glob patterns whose matches are marked as dynamic entry points.
    pub dynamic_patterns: Vec<String>,
    /// Decorator/annotation names extending the built-in DI catalogue.
    pub di_decorators: Vec<String>,
    /// Regex patterns recognising DI-container access (`Container.get(X)` and friends).
    pub di_container_patterns: Vec<String>,
    /// `package.json` field names probed recursively for dynamically-loaded entry paths.
    pub dynamic_package_fields: Vec<String>,
    /// Regex patterns marking a file as generated (and therefore excluded).
    pub generated_patterns: Vec<String>,
    pub exclude_generated: bool,
    pub use_unified_entry_detector: bool,
    #[serde(default)]
    pub cost_model: CostModelConfig,
}

/// Assumptions behind the dead-file bandwidth/CO2 cost estimate (§4.7).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CostModelConfig {
    pub monthly_page_views: f64,
    pub usd_per_gb: f64,
    pub co2_kg_per_gb: f64,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        CostModelConfig { monthly_page_views: 0.0, usd_per_gb: 0.09, co2_kg_per_gb: 0.5 }
    }
}

impl DeadwoodConfig {
    /// Load config from `.deadwood/config.toml` in the given root directory.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(".deadwood").join("config.toml");
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path. Returns default config if the file doesn't exist or
    /// fails to parse, logging a `[deadwood][warn]` diagnostic in the latter cases.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("[deadwood][warn] failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[deadwood][warn] failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_empty() {
        let config = DeadwoodConfig::default();
        assert!(config.exclude.is_empty());
        assert!(config.workers.is_none());
        assert!(!config.exclude_generated);
    }

    #[test]
    fn load_missing_file_returns_default() {
        let temp = TempDir::new().expect("temp dir");
        let config = DeadwoodConfig::load(temp.path());
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn load_valid_config() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join(".deadwood");
        std::fs::create_dir_all(&dir).expect("create .deadwood");

        let config_path = dir.join("config.toml");
        let mut file = std::fs::File::create(&config_path).expect("create config");
        writeln!(
            file,
            r#"
exclude = ["fixtures/**"]
workers = 4
di_decorators = ["CustomInjectable"]
exclude_generated = true

[cost_model]
monthly_page_views = 10000.0
usd_per_gb = 0.12
co2_kg_per_gb = 0.4
"#
        )
        .expect("write config");

        let config = DeadwoodConfig::load(temp.path());
        assert_eq!(config.workers, Some(4));
        assert!(config.exclude.contains(&"fixtures/**".to_string()));
        assert!(config.di_decorators.contains(&"CustomInjectable".to_string()));
        assert!(config.exclude_generated);
        assert_eq!(config.cost_model.usd_per_gb, 0.12);
    }

    #[test]
    fn load_malformed_config_falls_back_to_default() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join(".deadwood");
        std::fs::create_dir_all(&dir).expect("create .deadwood");
        std::fs::write(dir.join("config.toml"), "not valid toml [[[").expect("write");

        let config = DeadwoodConfig::load(temp.path());
        assert!(config.exclude.is_empty());
    }
}
