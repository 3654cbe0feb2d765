//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

use super::{preprocess_page, OcrBackend, OcrResult, TextBox};

/// Boxes whose tops are this close (in pixels at 300 dpi) share a line.
const ROW_TOLERANCE_PX: f32 = 14.0;

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in `models`, found in `model_dir`.
    pub fn from_dir(model_dir: &Path, models: &ModelConfig, config: OcrConfig) -> Result<Self, OcrError> {
        let det_path = model_dir.join(&models.detection_model);
        let rec_path = model_dir.join(&models.recognition_model);
        let dict_path = model_dir.join(&models.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!("missing {}", path.display())));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { engine, config })
    }

    fn prepare(&self, image: &DynamicImage) -> Result<DynamicImage, OcrError> {
        let mut prepared = if self.config.preprocess {
            preprocess_page(image)?
        } else {
            image.clone()
        };

        let (width, height) = prepared.dimensions();
        let longest = width.max(height);
        if longest > self.config.max_image_size {
            debug!(
                "Downscaling {}x{} to fit {}px",
                width, height, self.config.max_image_size
            );
            prepared = prepared.resize(
                self.config.max_image_size,
                self.config.max_image_size,
                image::imageops::FilterType::Triangle,
            );
        }
        Ok(prepared)
    }
}

impl OcrBackend for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let prepared = self.prepare(image)?;
        let (width, height) = prepared.dimensions();

        debug!("Running OCR on {}x{} page image", width, height);

        let results = self
            .engine
            .run_from_image(&prepared)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| {
                let text = if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                TextBox {
                    rect: polygon_to_rect(&r.bounding_box),
                    text,
                    confidence: r.confidence,
                }
            })
            .collect();

        let mut result = OcrResult::from_boxes(boxes, (width, height), ROW_TOLERANCE_PX);
        result.processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "OCR complete: {} text boxes in {}ms",
            result.boxes.len(),
            result.processing_time_ms
        );

        Ok(result)
    }
}

/// Axis-aligned rectangle around a `Polygon<f64>`.
fn polygon_to_rect(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32, f32, f32) {
    polygon.exterior().coords().fold(
        (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        |(min_x, min_y, max_x, max_y), c| {
            (
                min_x.min(c.x as f32),
                min_y.min(c.y as f32),
                max_x.max(c.x as f32),
                max_y.max(c.y as f32),
            )
        },
    )
}
