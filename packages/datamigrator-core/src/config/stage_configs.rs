//! Per-phase configuration sections

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;

// ============================================================================
// Parallelism
// ============================================================================

/// Worker pool used by vertex materialization and edge resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Number of workers (0=auto, 1..=256)
    pub num_workers: usize,

    /// Run phases on a Rayon pool; `false` forces a single worker
    pub enable_rayon: bool,

    /// Thread stack size in MB (1..=64)
    pub stack_size_mb: usize,
}

impl ParallelConfig {
    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.num_workers > 256 {
            return Err(ConfigError::range_with_hint(
                "num_workers",
                self.num_workers,
                0,
                256,
                "Number of workers must be reasonable (0=auto)",
            ));
        }

        if self.stack_size_mb < 1 || self.stack_size_mb > 64 {
            return Err(ConfigError::range_with_hint(
                "stack_size_mb",
                self.stack_size_mb,
                1,
                64,
                "Stack size must be reasonable",
            ));
        }

        Ok(())
    }

    /// Get preset configuration
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast | Preset::Balanced | Preset::Custom => Self {
                num_workers: 0, // Auto
                enable_rayon: true,
                stack_size_mb: 8,
            },
            Preset::Thorough => Self {
                num_workers: 1,
                enable_rayon: false,
                stack_size_mb: 16,
            },
        }
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn enable_rayon(mut self, enabled: bool) -> Self {
        self.enable_rayon = enabled;
        self
    }

    pub fn stack_size_mb(mut self, mb: usize) -> Self {
        self.stack_size_mb = mb;
        self
    }

    /// Worker count after resolving `0` and the rayon switch
    pub fn effective_workers(&self) -> usize {
        if !self.enable_rayon {
            1
        } else if self.num_workers == 0 {
            num_cpus::get()
        } else {
            self.num_workers
        }
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

// ============================================================================
// Edge Resolution
// ============================================================================

/// Edge resolution behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Emit a debug event for every skipped reference (counters are always kept)
    pub log_skipped_references: bool,
}

impl ResolutionConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                log_skipped_references: false,
            },
            Preset::Balanced | Preset::Thorough | Preset::Custom => Self {
                log_skipped_references: true,
            },
        }
    }

    pub fn log_skipped_references(mut self, enabled: bool) -> Self {
        self.log_skipped_references = enabled;
        self
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}
