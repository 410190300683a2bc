//! Configuration for the diff engine.
//!
//! Loaded with precedence: environment variables > config file > defaults.
//!
//! # Example config file (bucketdiff.toml)
//! ```toml
//! bucket_count = 16
//! parallelism = 4
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Partition fan-out and worker-pool sizing for one engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Number of comparison buckets records are partitioned into.
    pub bucket_count: u32,
    /// Worker threads driving bucket comparison. Zero behaves as one.
    pub parallelism: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            bucket_count: 1,
            parallelism: 1,
        }
    }
}

impl DiffConfig {
    pub fn new(bucket_count: u32, parallelism: usize) -> Self {
        Self {
            bucket_count,
            parallelism,
        }
    }

    /// Load configuration with precedence: Env > File > Defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(DiffConfig::default()));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("BUCKETDIFF_"));

        let config: DiffConfig = figment.extract().map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no run can start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_count == 0 {
            return Err(ConfigError::new("bucket_count must be at least 1"));
        }
        Ok(())
    }

    /// Effective worker-pool size; sub-one parallelism runs sequentially.
    pub fn worker_count(&self) -> usize {
        self.parallelism.max(1)
    }
}

/// Configuration loading or validation error.
#[derive(Debug, Clone)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "config error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_single_bucket_sequential() {
        let config = DiffConfig::default();
        assert_eq!(config.bucket_count, 1);
        assert_eq!(config.parallelism, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_bucket_count_is_rejected() {
        let config = DiffConfig::new(0, 4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_parallelism_clamps_to_one_worker() {
        let config = DiffConfig::new(8, 0);
        assert!(config.validate().is_ok());
        assert_eq!(config.worker_count(), 1);
    }

    #[test]
    fn load_reads_toml_file_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bucket_count = 16\nparallelism = 4").unwrap();

        let config = DiffConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.bucket_count, 16);
        assert_eq!(config.parallelism, 4);
    }

    #[test]
    fn load_without_file_yields_defaults() {
        let config = DiffConfig::load(None).unwrap();
        assert_eq!(config, DiffConfig::default());
    }
}
