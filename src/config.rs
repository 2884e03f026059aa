use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::detection::parser::DEFAULT_CONFIDENCE_THRESHOLD;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value `{value}`: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Startup configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub classifier: ClassifierConfig,
    pub upload_dir: PathBuf,
    /// `None` disables the retention sweep.
    pub retention: Option<RetentionConfig>,
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub interpreter: String,
    pub script: String,
    pub labels_path: PathBuf,
    pub timeout: Option<Duration>,
    pub max_concurrency: usize,
    pub confidence_threshold: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct RetentionConfig {
    pub max_age: chrono::Duration,
    pub interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string());

        let timeout_secs: u64 = parse_or(&lookup, "CLASSIFIER_TIMEOUT_SECS", 120)?;
        let max_concurrency: usize = parse_or(&lookup, "CLASSIFIER_MAX_CONCURRENCY", 4)?;
        if max_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "CLASSIFIER_MAX_CONCURRENCY",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let confidence_threshold: f64 =
            parse_or(&lookup, "CONFIDENCE_THRESHOLD", DEFAULT_CONFIDENCE_THRESHOLD)?;
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(ConfigError::Invalid {
                name: "CONFIDENCE_THRESHOLD",
                value: confidence_threshold.to_string(),
                reason: "must be between 0 and 1".to_string(),
            });
        }

        let classifier = ClassifierConfig {
            interpreter: lookup("CLASSIFIER_INTERPRETER").unwrap_or_else(|| "python3".to_string()),
            script: lookup("CLASSIFIER_SCRIPT").unwrap_or_else(|| "scripts/infer.py".to_string()),
            labels_path: lookup("CLASSIFIER_LABELS")
                .unwrap_or_else(|| "scripts/labels.txt".to_string())
                .into(),
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            max_concurrency,
            confidence_threshold,
        };

        let retention_days: i64 = parse_or(&lookup, "RETENTION_DAYS", 30)?;
        let retention_interval: u64 = parse_or(&lookup, "RETENTION_INTERVAL_SECS", 86_400)?;
        let retention = (retention_days > 0).then(|| RetentionConfig {
            max_age: chrono::Duration::days(retention_days),
            interval: Duration::from_secs(retention_interval.max(1)),
        });

        Ok(Self {
            database_url,
            bind_addr,
            classifier,
            upload_dir: lookup("UPLOAD_DIR")
                .unwrap_or_else(|| "uploads".to_string())
                .into(),
            retention,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
