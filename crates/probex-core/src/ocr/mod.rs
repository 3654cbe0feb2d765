//! OCR backends: "given an image, return its text".

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::{DynamicImage, GenericImageView, GrayImage};
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Trait for OCR implementations used by page text acquisition.
pub trait OcrBackend {
    /// Recognize the text on a page image, lines in reading order.
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError>;
}

/// A recognized text line with its axis-aligned box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding rectangle (min_x, min_y, max_x, max_y).
    pub rect: (f32, f32, f32, f32),

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Full text, one line per visual row.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Build a result from unordered boxes, sorting them into reading order.
    ///
    /// Boxes whose tops fall within `row_tolerance` pixels share a row and are
    /// joined with a space, so label and value printed side by side stay on one line.
    pub fn from_boxes(mut boxes: Vec<TextBox>, image_size: (u32, u32), row_tolerance: f32) -> Self {
        boxes.sort_by(|a, b| {
            a.rect
                .1
                .partial_cmp(&b.rect.1)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut rows: Vec<Vec<&TextBox>> = Vec::new();
        for b in &boxes {
            match rows.last_mut() {
                Some(row) if (b.rect.1 - row[0].rect.1).abs() <= row_tolerance => row.push(b),
                _ => rows.push(vec![b]),
            }
        }

        let text = rows
            .iter_mut()
            .map(|row| {
                row.sort_by(|a, b| {
                    a.rect
                        .0
                        .partial_cmp(&b.rect.0)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                row.iter()
                    .map(|b| b.text.trim())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut ordered: Vec<TextBox> = Vec::with_capacity(boxes.len());
        for row in rows {
            ordered.extend(row.into_iter().cloned());
        }

        Self {
            boxes: ordered,
            text,
            processing_time_ms: 0,
            image_size,
        }
    }
}

/// Grayscale and stretch contrast to the full 0..=255 range.
pub fn preprocess_page(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(OcrError::InvalidImage(format!("empty image {}x{}", width, height)));
    }

    let mut gray: GrayImage = image.to_luma8();
    let (lo, hi) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));

    if hi > lo {
        let span = f32::from(hi - lo);
        for p in gray.pixels_mut() {
            p.0[0] = ((f32::from(p.0[0] - lo) / span) * 255.0).round() as u8;
        }
    }

    Ok(DynamicImage::ImageLuma8(gray))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use pretty_assertions::assert_eq;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            rect: (x, y, x + 50.0, y + 12.0),
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_reading_order_joins_rows() {
        let boxes = vec![
            text_box(200.0, 102.0, "JOHN SMITH"),
            text_box(10.0, 40.0, "ESTATE OF"),
            text_box(10.0, 100.0, "Name:"),
        ];
        let result = OcrResult::from_boxes(boxes, (800, 1000), 10.0);
        assert_eq!(result.text, "ESTATE OF\nName: JOHN SMITH");
        assert_eq!(result.boxes[0].text, "ESTATE OF");
    }

    #[test]
    fn test_preprocess_stretches_contrast() {
        let gray = GrayImage::from_fn(2, 1, |x, _| if x == 0 { Luma([100]) } else { Luma([150]) });
        let out = preprocess_page(&DynamicImage::ImageLuma8(gray)).unwrap().to_luma8();
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn test_preprocess_rejects_empty_image() {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(preprocess_page(&empty).is_err());
    }
}
