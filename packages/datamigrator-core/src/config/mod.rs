//! Configuration System
//!
//! Three levels, each optional:
//! - Level 1: Preset - one-liner
//! - Level 2: Section override via closures
//! - Level 3: YAML file and `DATAMIGRATOR__*` environment variables
//!
//! # Examples
//!
//! ```rust,ignore
//! use datamigrator_core::config::{ModelGraphConfig, Preset};
//!
//! // Level 1
//! let config = ModelGraphConfig::preset(Preset::Fast);
//!
//! // Level 2
//! let config = ModelGraphConfig::preset(Preset::Balanced)
//!     .parallel(|c| c.num_workers(4));
//!
//! // Level 3
//! let config = ModelGraphConfig::from_yaml("migration.yaml")?.with_env_overrides()?;
//! ```

pub mod error;
pub mod io;
pub mod model_graph_config;
pub mod preset;
pub mod stage_configs;

// Re-exports
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides, ENV_PREFIX};
pub use model_graph_config::ModelGraphConfig;
pub use preset::Preset;
pub use stage_configs::{ParallelConfig, ResolutionConfig};
