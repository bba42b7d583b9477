//! Engine configuration: where records live, which guidance table to use and
//! how loud to log.
use std::env;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::GuideTableError;
use crate::guide::GuideTable;
use crate::store::DEFAULT_TREE;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub db_path: PathBuf,
    pub tree: String,
    /// Replaces the built-in guidance table when set.
    pub guide_table: Option<PathBuf>,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("settlement-progress.db"),
            tree: DEFAULT_TREE.to_string(),
            guide_table: None,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `SETTLEMENT_DB_PATH`, `SETTLEMENT_TREE`,
    /// `SETTLEMENT_GUIDE_TABLE` and `SETTLEMENT_LOG`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = env::var("SETTLEMENT_DB_PATH") {
            config.db_path = path.into();
        }
        if let Ok(tree) = env::var("SETTLEMENT_TREE") {
            config.tree = tree;
        }
        if let Ok(path) = env::var("SETTLEMENT_GUIDE_TABLE") {
            config.guide_table = Some(path.into());
        }
        if let Ok(level) = env::var("SETTLEMENT_LOG") {
            config.log_level = level;
        }
        config
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn open_db(&self) -> sled::Result<sled::Db> {
        sled::open(&self.db_path)
    }

    pub fn load_guide_table(&self) -> Result<GuideTable, GuideTableError> {
        match &self.guide_table {
            Some(path) => GuideTable::from_path(path),
            None => GuideTable::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "tree": "flows_eod" }"#).unwrap();
        assert_eq!(config.tree, "flows_eod");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.guide_table, None);
    }

    #[test]
    fn builtin_table_when_unset() {
        let table = EngineConfig::default().load_guide_table().unwrap();
        assert!(!table.is_empty());
    }

    #[test]
    fn missing_table_file_is_io_error() {
        let config = EngineConfig {
            guide_table: Some("/nonexistent/guides.json".into()),
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.load_guide_table(),
            Err(GuideTableError::Io(_))
        ));
    }
}
