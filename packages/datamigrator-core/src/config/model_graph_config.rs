//! Model graph build configuration
//!
//! Preset first, then YAML overrides, then environment overrides. Every
//! entry point ends in `validate()`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, ConfigOverrides, ENV_PREFIX};
use super::preset::Preset;
use super::stage_configs::{ParallelConfig, ResolutionConfig};

const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Complete configuration of one model graph build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelGraphConfig {
    preset: Preset,
    pub parallel: ParallelConfig,
    pub resolution: ResolutionConfig,
}

impl ModelGraphConfig {
    /// Start from a preset
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            parallel: ParallelConfig::from_preset(preset),
            resolution: ResolutionConfig::from_preset(preset),
        }
    }

    pub fn get_preset(&self) -> Preset {
        self.preset
    }

    /// Override parallelism settings
    pub fn parallel<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ParallelConfig) -> ParallelConfig,
    {
        self.parallel = f(self.parallel);
        self
    }

    /// Override edge resolution settings
    pub fn resolution<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ResolutionConfig) -> ResolutionConfig,
    {
        self.resolution = f(self.resolution);
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.parallel.validate()
    }

    /// Load from YAML file (v1 schema)
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse YAML text (v1 schema)
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        if !SUPPORTED_VERSIONS.contains(&export.version) {
            return Err(ConfigError::UnsupportedVersion {
                found: export.version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let mut config = Self::preset(Preset::from_str(&export.preset)?);

        if let Some(overrides) = export.overrides {
            if let Some(parallel) = overrides.parallel {
                config.parallel = parallel;
            }
            if let Some(resolution) = overrides.resolution {
                config.resolution = resolution;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML (v1 schema)
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: 1,
            preset: self.preset.to_string(),
            overrides: Some(ConfigOverrides {
                parallel: Some(self.parallel.clone()),
                resolution: Some(self.resolution.clone()),
            }),
        };

        Ok(serde_yaml::to_string(&export)?)
    }

    /// Apply `DATAMIGRATOR__*` overrides from the process environment
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides_from(std::env::vars())
    }

    /// Apply `DATAMIGRATOR__SECTION__FIELD=value` pairs
    ///
    /// Variables without the prefix are ignored; unknown keys under the
    /// prefix are logged and ignored.
    pub fn with_overrides_from<I, K, V>(mut self, vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            let Some(path) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            match path {
                "PARALLEL__NUM_WORKERS" => {
                    self.parallel.num_workers = parse_usize(key, value)?;
                }
                "PARALLEL__ENABLE_RAYON" => {
                    self.parallel.enable_rayon = parse_bool(key, value)?;
                }
                "PARALLEL__STACK_SIZE_MB" => {
                    self.parallel.stack_size_mb = parse_usize(key, value)?;
                }
                "RESOLUTION__LOG_SKIPPED_REFERENCES" => {
                    self.resolution.log_skipped_references = parse_bool(key, value)?;
                }
                _ => warn!("ignoring unknown configuration variable {}", key),
            }
        }

        self.validate()?;
        Ok(self)
    }
}

impl Default for ModelGraphConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

fn parse_usize(var: &str, value: &str) -> ConfigResult<usize> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
        expected: "a non-negative integer",
    })
}

fn parse_bool(var: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var: var.to_string(),
            value: value.to_string(),
            expected: "a boolean (true/false/1/0)",
        }),
    }
}
