//! Data models and configuration.

pub mod config;
pub mod record;

pub use config::{AcquisitionConfig, ExtractionConfig, ModelConfig, OcrConfig, ProbexConfig};
pub use record::{ExtractedRecord, ExtractionMethod, Field, FormType, RecordFields};
