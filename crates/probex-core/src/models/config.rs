//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the probex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbexConfig {
    /// Text acquisition (text layer vs. OCR) configuration.
    pub acquisition: AcquisitionConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// How page text is acquired.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Minimum normalized text-layer length (chars) to skip whole-document OCR.
    pub min_text_length: usize,

    /// DPI for rasterizing pages before OCR.
    pub ocr_dpi: u32,

    /// Pages with fewer normalized chars than this are OCR'd individually.
    pub blank_page_threshold: usize,

    /// Never switch the whole document to OCR, even when the text layer is short.
    pub prefer_text_layer: bool,

    /// Write each page's final text under `debug_root`.
    pub debug: bool,

    /// Root directory for debug page dumps.
    pub debug_root: PathBuf,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            min_text_length: 200,
            ocr_dpi: 300,
            blank_page_threshold: 10,
            prefer_text_layer: false,
            debug: false,
            debug_root: PathBuf::from("debug"),
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Keep `[UNK]` tokens emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,

    /// Convert pages to grayscale and stretch contrast before recognition.
    pub preprocess: bool,

    /// Maximum image dimension (longer side) handed to the recognizer.
    pub max_image_size: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            keep_unk: false,
            preprocess: true,
            max_image_size: 4096,
        }
    }
}

/// Field extraction behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Split PDFs that bundle several petitions into separate cases.
    pub split_cases: bool,

    /// Let title markers on the first two pages override classification.
    pub use_form_hint: bool,

    /// Blank names that do not occur in the document text.
    pub name_guard: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            split_cases: true,
            use_form_hint: true,
            name_guard: true,
        }
    }
}

/// Model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl ModelConfig {
    /// True when detection, recognition and dictionary files all exist in `dir`.
    pub fn available_in(&self, dir: &std::path::Path) -> bool {
        [&self.detection_model, &self.recognition_model, &self.dictionary]
            .iter()
            .all(|name| dir.join(name).exists())
    }
}

impl ProbexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ProbexConfig::default();
        assert_eq!(config.acquisition.min_text_length, 200);
        assert_eq!(config.acquisition.ocr_dpi, 300);
        assert_eq!(config.acquisition.debug_root, PathBuf::from("debug"));
        assert!(config.extraction.split_cases);
        assert_eq!(config.models.model_dir, PathBuf::from("models"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ProbexConfig =
            serde_json::from_str(r#"{"acquisition": {"min_text_length": 500}}"#).unwrap();
        assert_eq!(config.acquisition.min_text_length, 500);
        assert_eq!(config.acquisition.ocr_dpi, 300);
        assert!(!config.ocr.keep_unk);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ProbexConfig::default();
        config.acquisition.prefer_text_layer = true;
        config.save(&path).unwrap();

        let loaded = ProbexConfig::from_file(&path).unwrap();
        assert!(loaded.acquisition.prefer_text_layer);
        assert_eq!(loaded.models.recognition_model, "latin_rec.onnx");
    }
}
