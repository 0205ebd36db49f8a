//! `load_config` module: reads the optional YAML defaults file passed with `--config`.
//!
//! The file only carries import defaults; secrets stay in the environment. Every key is
//! optional. Unknown keys are rejected.
//!
//! ```yaml
//! partition: team-docs
//! delay: 0.5
//! mode: hi_res
//! static_mode: hi_res
//! audio: true
//! video: audio_only
//! ```
//!
//! # Errors
//! All errors use `anyhow::Error` and are surfaced at the CLI boundary. Messages say
//! whether the file could not be read or could not be parsed.
use anyhow::Result;
use ragie_import_core::mode::{ProcessingMode, VideoMode};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Import defaults from the YAML file. Command-line flags take precedence.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileDefaults {
    #[serde(default)]
    pub partition: Option<String>,
    /// Seconds to pause after each processed item.
    #[serde(default)]
    pub delay: Option<f64>,
    #[serde(default)]
    pub mode: Option<ProcessingMode>,
    #[serde(default)]
    pub static_mode: Option<String>,
    #[serde(default)]
    pub audio: Option<bool>,
    #[serde(default)]
    pub video: Option<VideoMode>,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileDefaults> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using built-in defaults");
        return Ok(FileDefaults::default());
    }

    match serde_yaml::from_str::<FileDefaults>(&config_content) {
        Ok(defaults) => {
            info!(config_path = ?path_ref, ?defaults, "Parsed config YAML successfully");
            Ok(defaults)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
