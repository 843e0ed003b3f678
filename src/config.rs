use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::schema::FINAL_STAGE;

/// What to do with a zero `height_meters` when computing BMI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ZeroHeightPolicy {
    /// BMI becomes null and the row keeps going
    #[default]
    Null,
    /// Abort the run
    Reject,
}

/// How tied BMI values are ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RankMethod {
    /// 1 + rows with a strictly greater value (1, 2, 2, 4)
    #[default]
    Competition,
    /// Ties share a rank, no gaps (1, 2, 2, 3)
    Dense,
    /// Distinct ranks, ties broken by ascending id (1, 2, 3, 4)
    Ordinal,
}

pub const DEFAULT_OUTPUT_TABLE: &str = "pokemon_processed";

/// Pipeline settings. Every field has a default, so a config file may set
/// any subset of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub generation: i64,
    pub target: String,
    pub output_table: String,
    pub zero_height: ZeroHeightPolicy,
    pub rank_method: RankMethod,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generation: 1,
            target: FINAL_STAGE.to_string(),
            output_table: DEFAULT_OUTPUT_TABLE.to_string(),
            zero_height: ZeroHeightPolicy::default(),
            rank_method: RankMethod::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse pipeline config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config: {:?}", path))
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
