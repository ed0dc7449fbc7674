//! Configuration I/O (YAML/Env loading)
//!
//! Defines YAML schema types. Loading logic lives in model_graph_config.rs.

use super::stage_configs::{ParallelConfig, ResolutionConfig};
use serde::{Deserialize, Serialize};

/// Environment variable prefix; sections and fields are separated by `__`
pub const ENV_PREFIX: &str = "DATAMIGRATOR__";

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    /// Base preset
    pub preset: String,

    /// Fine-grained overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<ParallelConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolutionConfig>,
}
