use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::mode::ModeOptions;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("--force and --replace flags cannot be used together")]
    ForceWithReplace,
    #[error("delay must be a non-negative number of seconds, got {0}")]
    InvalidDelay(f64),
}

/// What to do when a document with the same external ID already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Leave the existing document alone and skip the item.
    #[default]
    Skip,
    /// Upload anyway, creating a duplicate.
    Force,
    /// Delete every matching document, then upload.
    Replace,
}

impl ConflictPolicy {
    pub fn from_flags(force: bool, replace: bool) -> Result<Self, ConfigError> {
        match (force, replace) {
            (true, true) => Err(ConfigError::ForceWithReplace),
            (true, false) => Ok(ConflictPolicy::Force),
            (false, true) => Ok(ConflictPolicy::Replace),
            (false, false) => Ok(ConflictPolicy::Skip),
        }
    }
}

/// Immutable per-invocation import settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportConfig {
    /// Perform lookups but no creates or deletes.
    pub dry_run: bool,
    /// Pause after every processed item.
    pub delay: Duration,
    /// `None` means the default partition.
    pub partition: Option<String>,
    pub mode: ModeOptions,
    pub conflict: ConflictPolicy,
}

impl ImportConfig {
    pub fn delay_from_secs(secs: f64) -> Result<Duration, ConfigError> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(ConfigError::InvalidDelay(secs));
        }
        Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidDelay(secs))
    }

    pub fn trace_loaded(&self) {
        info!(
            dry_run = self.dry_run,
            delay_secs = self.delay.as_secs_f64(),
            partition = self.partition.as_deref().unwrap_or("<default>"),
            conflict = ?self.conflict,
            "Loaded import configuration"
        );
        debug!(?self, "Import configuration (full debug)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_and_replace_are_exclusive() {
        let err = ConflictPolicy::from_flags(true, true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "--force and --replace flags cannot be used together"
        );
        assert_eq!(ConflictPolicy::from_flags(true, false), Ok(ConflictPolicy::Force));
        assert_eq!(ConflictPolicy::from_flags(false, true), Ok(ConflictPolicy::Replace));
        assert_eq!(ConflictPolicy::from_flags(false, false), Ok(ConflictPolicy::Skip));
    }

    #[test]
    fn delay_must_be_non_negative() {
        assert_eq!(
            ImportConfig::delay_from_secs(1.5),
            Ok(Duration::from_millis(1500))
        );
        assert_eq!(ImportConfig::delay_from_secs(0.0), Ok(Duration::ZERO));
        assert!(ImportConfig::delay_from_secs(-1.0).is_err());
        assert!(ImportConfig::delay_from_secs(f64::NAN).is_err());
        assert_eq!(
            ImportConfig::delay_from_secs(1e20),
            Err(ConfigError::InvalidDelay(1e20))
        );
    }
}
