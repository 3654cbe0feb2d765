//! Subcommands and the setup they share.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use indicatif::ProgressStyle;
use tracing::{debug, info, warn};

use probex_core::ocr::PureOcrEngine;
use probex_core::ProbexConfig;

/// `<config dir>/probex/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("probex")
        .join("config.json")
}

/// Config from `-c` when given, else the default file when it exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ProbexConfig> {
    if let Some(path) = config_path {
        return Ok(ProbexConfig::from_file(Path::new(path))?);
    }
    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(ProbexConfig::from_file(&path)?)
    } else {
        Ok(ProbexConfig::default())
    }
}

/// OCR engine from the model directory; `None` leaves acquisition on the text layer.
pub fn load_ocr(config: &ProbexConfig, model_dir: Option<&Path>) -> Option<PureOcrEngine> {
    let dir = model_dir.unwrap_or(&config.models.model_dir);
    if !config.models.available_in(dir) {
        info!("OCR models not found in {}, using text layer only", dir.display());
        return None;
    }
    match PureOcrEngine::from_dir(dir, &config.models, config.ocr.clone()) {
        Ok(engine) => Some(engine),
        Err(e) => {
            warn!("Failed to load OCR models: {}", e);
            None
        }
    }
}

pub fn bar_style(template: &str) -> anyhow::Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template(template)?
        .progress_chars("=>-"))
}
