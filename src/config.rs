//! File locations and parsing options, with defaults matching the bundled `data/` directory.
//!
//! A TOML file may override any subset of fields:
//!
//! ```toml
//! data_path = "data/welcome_survey_simple_v2.csv"
//! delimiter = ";"
//! label_cache = "data/labels.msgpack"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SegmentError};

pub const DEFAULT_DATA_PATH: &str = "data/welcome_survey_simple_v2.csv";
pub const DEFAULT_CATALOG_PATH: &str = "data/welcome_survey_cluster_names_and_descriptions_v2.json";
pub const DEFAULT_MODEL_PATH: &str = "data/welcome_survey_clustering_pipeline_v2.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Reference population (delimited text with a header row).
    pub data_path: PathBuf,
    /// Segment names and descriptions (JSON).
    pub catalog_path: PathBuf,
    /// Trained centroid model (`.json` or MessagePack).
    pub model_path: PathBuf,
    /// Field delimiter of `data_path`; must be a single ASCII character.
    pub delimiter: char,
    /// Where to persist population labels between runs. Disabled when unset.
    pub label_cache: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            delimiter: ';',
            label_cache: None,
        }
    }
}

impl Config {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| SegmentError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| SegmentError::Config(e.to_string()))?;
        config.delimiter_byte()?;
        Ok(config)
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(SegmentError::Config(format!(
                "delimiter '{}' is not a single ASCII character",
                self.delimiter
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn partial_override() {
        let config = Config::from_toml_str(
            r#"
            data_path = "other.csv"
            delimiter = ","
            label_cache = "labels.msgpack"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("other.csv"));
        assert_eq!(config.delimiter_byte().unwrap(), b',');
        assert_eq!(config.label_cache, Some(PathBuf::from("labels.msgpack")));
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Config::from_toml_str("delimiter = \"ś\""),
            Err(SegmentError::Config(_))
        ));
        assert!(Config::from_toml_str("model = \"typo.json\"").is_err());
    }
}
