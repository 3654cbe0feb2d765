//! Page text acquisition: text layer first, OCR when the layer is too thin.

use std::fs;
use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{OcrError, PdfError, Result};
use crate::models::{AcquisitionConfig, ExtractionMethod};
use crate::ocr::OcrBackend;
use crate::pdf::PdfProcessor;
use crate::petition::rules::{join_pages, normalized_len, PAGE_BREAK};

/// Per-page text of one document and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredText {
    pub pages: Vec<String>,
    pub method: ExtractionMethod,
}

impl AcquiredText {
    /// Pages joined with page-break lines.
    pub fn text(&self) -> String {
        join_pages(&self.pages)
    }
}

/// Produces the best available text for every page of a document.
pub struct PageTextProvider<'a> {
    config: AcquisitionConfig,
    ocr: Option<&'a dyn OcrBackend>,
}

impl<'a> PageTextProvider<'a> {
    pub fn new(config: AcquisitionConfig) -> Self {
        Self { config, ocr: None }
    }

    /// Attach an OCR backend. Without one, OCR attempts fail per page.
    pub fn with_ocr(mut self, ocr: &'a dyn OcrBackend) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Write each page's final text under the debug root.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Acquire the text of every page of a loaded PDF.
    ///
    /// Only a document-level PDF error is returned; failures on a single page
    /// leave that page with whatever text it had.
    pub fn get_document_text(&self, pdf: &dyn PdfProcessor, doc_name: &str) -> Result<AcquiredText> {
        let page_count = pdf.page_count();
        if page_count == 0 {
            return Err(PdfError::NoPages.into());
        }

        let (mut pages, aligned) = self.text_layer(pdf, page_count);
        let total = normalized_len(&join_pages(&pages));
        debug!("{}: text layer has {} chars over {} pages", doc_name, total, page_count);

        let method = if total >= self.config.min_text_length || self.config.prefer_text_layer {
            let mut method = ExtractionMethod::Text;
            if aligned {
                for (idx, page) in pages.iter_mut().enumerate() {
                    if normalized_len(page) >= self.config.blank_page_threshold {
                        continue;
                    }
                    if let Some(text) = self.ocr_page(pdf, idx as u32 + 1) {
                        *page = text;
                        method = ExtractionMethod::Mixed;
                    }
                }
            }
            method
        } else {
            info!(
                "{}: text layer too short ({} < {}), running OCR",
                doc_name, total, self.config.min_text_length
            );
            pages.resize(page_count as usize, String::new());
            // A page OCR cannot read keeps its (short) text layer.
            for (idx, page) in pages.iter_mut().enumerate() {
                if let Some(text) = self.ocr_page(pdf, idx as u32 + 1) {
                    *page = text;
                }
            }
            ExtractionMethod::Ocr
        };

        if self.config.debug {
            self.dump_pages(doc_name, &pages);
        }

        info!("{}: acquired {} pages via {}", doc_name, pages.len(), method);
        Ok(AcquiredText { pages, method })
    }

    /// OCR a standalone page image.
    pub fn image_text(&self, image: &DynamicImage, doc_name: &str) -> Result<AcquiredText> {
        let ocr = self.ocr.ok_or(OcrError::Unavailable)?;
        let result = ocr.recognize(image)?;
        let pages = vec![result.text];
        if self.config.debug {
            self.dump_pages(doc_name, &pages);
        }
        Ok(AcquiredText {
            pages,
            method: ExtractionMethod::Ocr,
        })
    }

    /// Per-page text layer; falls back to whole-document extraction when no
    /// page yields text. The flag is false when the fallback could not be
    /// split back into pages.
    fn text_layer(&self, pdf: &dyn PdfProcessor, page_count: u32) -> (Vec<String>, bool) {
        let pages: Vec<String> = (1..=page_count)
            .map(|page| {
                pdf.extract_page_text(page).unwrap_or_else(|e| {
                    warn!("Text layer of page {} unreadable: {}", page, e);
                    String::new()
                })
            })
            .collect();

        if pages.iter().any(|p| normalized_len(p) > 0) {
            return (pages, true);
        }

        match pdf.extract_text() {
            Ok(text) if normalized_len(&text) > 0 => {
                let split: Vec<String> = text.split(PAGE_BREAK).map(str::to_string).collect();
                if split.len() == page_count as usize {
                    (split, true)
                } else {
                    debug!(
                        "Whole-document text has {} parts for {} pages",
                        split.len(),
                        page_count
                    );
                    (vec![text], false)
                }
            }
            Ok(_) => (pages, true),
            Err(e) => {
                warn!("Whole-document text extraction failed: {}", e);
                (pages, true)
            }
        }
    }

    fn ocr_page(&self, pdf: &dyn PdfProcessor, page: u32) -> Option<String> {
        let Some(ocr) = self.ocr else {
            debug!("No OCR backend; page {} keeps its text layer", page);
            return None;
        };

        let image = match pdf.render_page(page, self.config.ocr_dpi) {
            Ok(image) => image,
            Err(e) => {
                warn!("Could not render page {}: {}", page, e);
                return None;
            }
        };

        match ocr.recognize(&image) {
            Ok(result) => Some(result.text),
            Err(e) => {
                warn!("OCR failed on page {}: {}", page, e);
                None
            }
        }
    }

    fn dump_pages(&self, doc_name: &str, pages: &[String]) {
        let stem = Path::new(doc_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(doc_name);
        let dir = self.config.debug_root.join(stem);
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("Cannot create debug directory {}: {}", dir.display(), e);
            return;
        }
        for (idx, page) in pages.iter().enumerate() {
            let path = dir.join(format!("page_{}.txt", idx + 1));
            if let Err(e) = fs::write(&path, page) {
                warn!("Cannot write {}: {}", path.display(), e);
            }
        }
        debug!("Wrote {} debug pages to {}", pages.len(), dir.display());
    }
}
