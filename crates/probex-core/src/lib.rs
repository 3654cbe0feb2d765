//! Core library for probate petition field extraction.
//!
//! This crate provides:
//! - PDF processing (per-page text layer and page images)
//! - Page text acquisition with OCR fallback
//! - Form-type classification by weighted marker scoring
//! - Per-layout anchor parsers and a generic fallback
//! - Immutable extracted records with review warnings

pub mod acquisition;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod petition;

pub use acquisition::{AcquiredText, PageTextProvider};
pub use error::{ProbexError, Result};
pub use models::{ExtractedRecord, ExtractionMethod, Field, FormType, ProbexConfig, RecordFields};
pub use ocr::{OcrBackend, OcrResult, TextBox};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pdf::{PdfExtractor, PdfProcessor};
pub use petition::{classify, Detection, ExtractionResult, PetitionExtractor, ReviewStatus};
