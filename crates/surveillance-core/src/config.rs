//! Engine configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `SURVEILLANCE_*` environment variables.

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::location::{LocationHierarchy, LocationResult};

pub use ::config::ConfigError;

/// Environment variable prefix, e.g. `SURVEILLANCE_GEO_FEED_LIMIT=200`.
pub const ENV_PREFIX: &str = "SURVEILLANCE";

/// Tunable windows and limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trend window on scoped dashboards
    pub scoped_trend_months: u32,
    /// Trend window on the national overview
    pub national_trend_months: u32,
    /// "Recent diseases" window
    pub recent_days: u32,
    pub recent_activity_limit: usize,
    pub top_diseases_limit: usize,
    pub geo_feed_limit: usize,
    pub search_limit: usize,
    /// Default page size for paged animal listings
    pub page_size: usize,
    /// JSON file replacing the built-in location hierarchy
    pub hierarchy_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoped_trend_months: 6,
            national_trend_months: 12,
            recent_days: 30,
            recent_activity_limit: 5,
            top_diseases_limit: 5,
            geo_feed_limit: 500,
            search_limit: 100,
            page_size: 20,
            hierarchy_path: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration, reading `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        let config: EngineConfig = settings.try_deserialize()?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// The configured hierarchy, or the built-in one.
    pub fn hierarchy(&self) -> LocationResult<LocationHierarchy> {
        match &self.hierarchy_path {
            Some(path) => LocationHierarchy::from_json_file(path),
            None => Ok(LocationHierarchy::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.scoped_trend_months, 6);
        assert_eq!(config.national_trend_months, 12);
        assert_eq!(config.geo_feed_limit, 500);
        assert!(config.hierarchy().is_ok());
    }

    #[test]
    fn test_file_overrides_some_fields() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "geo_feed_limit = 50").unwrap();
        writeln!(file, "recent_days = 7").unwrap();

        let config = EngineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.geo_feed_limit, 50);
        assert_eq!(config.recent_days, 7);
        assert_eq!(config.search_limit, 100);
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = EngineConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_hierarchy_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Testland", "districts": [{{"name": "D1", "sectors": ["S1"]}}]}}]"#
        )
        .unwrap();
        let config = EngineConfig {
            hierarchy_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let hierarchy = config.hierarchy().unwrap();
        assert_eq!(hierarchy.provinces().len(), 1);
        assert_eq!(hierarchy.sectors("Testland", "D1").unwrap(), &["S1".to_string()]);
    }
}
