//! Run configuration.
//!
//! Loaded from TOML so solver selection, time limits and seeds can change
//! without recompiling:
//!
//! ```
//! use siteopt::config::RunConfig;
//! use siteopt::domain::{BackendKind, SolverKind};
//!
//! let config = RunConfig::from_toml_str(r#"
//!     solvers = ["dp", "mip-per-operation"]
//!     distances_coef = 0.5
//!
//!     [mip]
//!     backend = "microlp"
//!     time_limit_secs = 30
//!     parallel = true
//!
//!     [random]
//!     seed = 42
//! "#).unwrap();
//!
//! assert_eq!(config.solvers, vec![SolverKind::Dp, SolverKind::PerOperationMip]);
//! assert_eq!(config.mip.backend, BackendKind::Microlp);
//! assert_eq!(config.random.seed, Some(42));
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{BackendKind, SolverKind};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which solvers to run and how.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Solvers to run, in order.
    pub solvers: Vec<SolverKind>,

    /// Overrides the dataset's distances coefficient.
    pub distances_coef: Option<f64>,

    pub mip: MipConfig,

    pub random: RandomConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            solvers: vec![SolverKind::Dp],
            distances_coef: None,
            mip: MipConfig::default(),
            random: RandomConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_solvers(mut self, solvers: Vec<SolverKind>) -> Self {
        self.solvers = solvers;
        self
    }

    pub fn with_distances_coef(mut self, coef: f64) -> Self {
        self.distances_coef = Some(coef);
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.mip.backend = backend;
        self
    }

    pub fn with_time_limit_secs(mut self, seconds: f64) -> Self {
        self.mip.time_limit_secs = Some(seconds);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.mip.parallel = parallel;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solvers.is_empty() {
            return Err(ConfigError::Invalid("no solvers selected".into()));
        }
        if let Some(coef) = self.distances_coef {
            if !(coef.is_finite() && coef >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "distances_coef must be finite and non-negative, got {}",
                    coef
                )));
            }
        }
        if let Some(seconds) = self.mip.time_limit_secs {
            if !(seconds.is_finite() && seconds > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "mip.time_limit_secs must be positive, got {}",
                    seconds
                )));
            }
        }
        Ok(())
    }
}

/// Integer-programming settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MipConfig {
    pub backend: BackendKind,

    /// Wall-clock budget per model; unbounded when absent.
    pub time_limit_secs: Option<f64>,

    /// Solve per-operation models on the rayon thread pool.
    pub parallel: bool,
}

impl MipConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs_f64)
    }
}

/// Random baseline settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RandomConfig {
    /// Random seed for reproducible results.
    pub seed: Option<u64>,
}
