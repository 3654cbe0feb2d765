//! Per-document pipeline: case splitting, classification, dispatch and guards.

use std::ops::Range;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::acquisition::AcquiredText;
use crate::models::{
    ExtractedRecord, ExtractionConfig, ExtractionMethod, Field, FormType, RecordFields,
};

use super::rules::address::looks_like_address;
use super::rules::contact::{normalize_email, normalize_phone};
use super::rules::names::name_in_text;
use super::rules::relationship::is_known_relationship;
use super::{classify, form_hint, parser_for, split_cases, PetitionText};

/// Warning code for a name that does not occur in the case text.
pub const NAME_NOT_IN_PDF: &str = "NAME_NOT_IN_PDF";
/// Warning code for a title hint that disagrees with marker scoring.
pub const FORM_TYPE_CONFLICT: &str = "FORM_TYPE_CONFLICT";
/// Warning code for administration petitions lacking required fields.
pub const REQUIRED_MISSING: &str = "REQUIRED_MISSING";

/// Fields an administration petition must yield to pass review.
const ADMIN_REQUIRED: [Field; 4] = [
    Field::DeceasedName,
    Field::PetitionerName,
    Field::Relationship,
    Field::PropertyValue,
];

/// Whether a record can be used as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Ok,
    NeedsReview,
}

/// Result of extracting one case.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted record.
    pub record: ExtractedRecord,
    /// 1-based case number within the document.
    pub case_id: usize,
    /// 1-based page numbers the case spans.
    pub pages_used: Vec<usize>,
    /// Guard and classification warnings.
    pub warnings: Vec<String>,
    pub status: ReviewStatus,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Blank a field and record `<code>:<column>` as a warning.
    pub fn flag_field(&mut self, field: Field, code: &str) {
        self.record = self.record.with_field_cleared(field);
        self.warnings.push(format!("{}:{}", code, field.column_name()));
    }
}

/// Turns acquired page text into one [`ExtractionResult`] per case.
pub struct PetitionExtractor {
    split_cases: bool,
    use_form_hint: bool,
    name_guard: bool,
    forced_form: Option<FormType>,
}

impl PetitionExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            split_cases: config.split_cases,
            use_form_hint: config.use_form_hint,
            name_guard: config.name_guard,
            forced_form: None,
        }
    }

    /// Split bundled petitions into separate cases.
    pub fn with_split_cases(mut self, split: bool) -> Self {
        self.split_cases = split;
        self
    }

    /// Let title markers on the leading pages override classification.
    pub fn with_form_hint(mut self, enabled: bool) -> Self {
        self.use_form_hint = enabled;
        self
    }

    /// Blank names that do not occur in the case text.
    pub fn with_name_guard(mut self, enabled: bool) -> Self {
        self.name_guard = enabled;
        self
    }

    /// Skip classification and parse every case as `form_type`.
    pub fn with_forced_form(mut self, form_type: Option<FormType>) -> Self {
        self.forced_form = form_type;
        self
    }

    /// Extract every case in the acquired document.
    pub fn extract(&self, acquired: &AcquiredText) -> Vec<ExtractionResult> {
        let cases = if self.split_cases {
            split_cases(&acquired.pages)
        } else {
            vec![0..acquired.pages.len()]
        };
        if cases.len() > 1 {
            info!("Document bundles {} cases", cases.len());
        }

        cases
            .into_iter()
            .enumerate()
            .map(|(idx, range)| self.extract_case(idx + 1, &acquired.pages, range, acquired.method))
            .collect()
    }

    /// Extract a single case from plain text.
    pub fn extract_text(&self, text: &str, method: ExtractionMethod) -> ExtractionResult {
        let pages = [text.to_string()];
        self.extract_case(1, &pages, 0..1, method)
    }

    fn extract_case(
        &self,
        case_id: usize,
        pages: &[String],
        range: Range<usize>,
        method: ExtractionMethod,
    ) -> ExtractionResult {
        let start = Instant::now();
        let doc = PetitionText::from_pages(&pages[range.clone()]);
        let mut warnings = Vec::new();
        let mut status = ReviewStatus::Ok;

        let mut detection = classify(doc.text());
        if let Some(forced) = self.forced_form {
            debug!("Layout forced to {} (classified {})", forced, detection.form_type);
            detection.form_type = forced;
        } else if self.use_form_hint {
            if let Some(hint) = form_hint(&doc.leading_pages(2)) {
                if hint != detection.form_type {
                    debug!("Title hint {} overrides classified {}", hint, detection.form_type);
                    warnings.push(FORM_TYPE_CONFLICT.to_string());
                }
                detection = detection.with_hint(hint);
            }
        }

        let parser = parser_for(detection.form_type);
        let mut fields = parser.parse(&doc);
        normalize_fields(&mut fields);

        if self.name_guard {
            for field in [Field::DeceasedName, Field::PetitionerName] {
                let value = fields.get(field);
                if !value.is_empty() && !name_in_text(value, doc.text()) {
                    warn!("{} {:?} not found in case text", field, value);
                    fields.clear(field);
                    warnings.push(format!("{}:{}", NAME_NOT_IN_PDF, field.column_name()));
                    status = ReviewStatus::NeedsReview;
                }
            }
        }

        if detection.form_type == FormType::FormAdmin {
            let missing: Vec<&str> = ADMIN_REQUIRED
                .iter()
                .filter(|f| fields.is_empty(**f))
                .map(|f| f.column_name())
                .collect();
            if !missing.is_empty() {
                warnings.push(format!("{}:{}", REQUIRED_MISSING, missing.join(",")));
                status = ReviewStatus::NeedsReview;
            }
        }

        let record = ExtractedRecord::new(
            fields,
            detection.form_type,
            detection.confidence_score,
            detection.matched_markers,
            method,
        );
        info!(
            "Case {} ({} pages): {} via {}, {} missing fields",
            case_id,
            range.len(),
            record.form_type(),
            method,
            record.missing_fields().len()
        );

        ExtractionResult {
            record,
            case_id,
            pages_used: range.map(|p| p + 1).collect(),
            warnings,
            status,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl Default for PetitionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop values that fail their field's shape checks and re-normalize contacts.
fn normalize_fields(fields: &mut RecordFields) {
    for field in [Field::PropertyAddress, Field::PetitionerAddress] {
        if !fields.is_empty(field) && !looks_like_address(fields.get(field)) {
            debug!("Dropping {} {:?}", field, fields.get(field));
            fields.clear(field);
        }
    }
    if !fields.is_empty(Field::Relationship) && !is_known_relationship(fields.get(Field::Relationship)) {
        fields.clear(Field::Relationship);
    }
    let phone = normalize_phone(fields.get(Field::Phone));
    fields.set(Field::Phone, phone);
    let email = normalize_email(fields.get(Field::Email));
    fields.set(Field::Email, email);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIMPLE_PETITION: &str = "SURROGATE'S COURT OF THE STATE OF NEW YORK\n\
        PROBATE PROCEEDING\n\
        ESTATE OF JOHN SMITH\n\
        Petitioner Information\n\
        Name: Mary Smith\n\
        Domicile or Principal Office: 16 Ada Drive\n\
        City, Village or Town: Staten Island\n\
        State: New York Zip Code: 10314\n\
        Relationship: Wife\n\
        Improved real property in New York State $200,000";

    fn acquired(pages: &[&str]) -> AcquiredText {
        AcquiredText {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            method: ExtractionMethod::Text,
        }
    }

    #[test]
    fn test_probate_petition() {
        let results = PetitionExtractor::new().extract(&acquired(&[SIMPLE_PETITION]));
        assert_eq!(results.len(), 1);

        let result = &results[0];
        let record = &result.record;
        assert_eq!(record.form_type(), FormType::FormA);
        assert_eq!(record.get(Field::DeceasedName), "JOHN SMITH");
        assert_eq!(record.get(Field::PropertyValue), "200000");
        for field in [Field::Attorney, Field::Phone, Field::Email] {
            assert_eq!(record.get(field), "");
            assert!(record.missing_fields().contains(&field));
        }
        assert_eq!(result.case_id, 1);
        assert_eq!(result.pages_used, vec![1]);
        assert_eq!(result.status, ReviewStatus::Ok);
    }

    #[test]
    fn test_unknown_layout_uses_generic_parser() {
        let text = "In the matter of the will of Harold Finch.\n\
                    Attorney: Nathan Ingram";
        let result = PetitionExtractor::new().extract_text(text, ExtractionMethod::Ocr);
        let record = &result.record;

        assert_eq!(record.form_type(), FormType::Unknown);
        assert!(record.matched_markers().is_empty());
        assert_eq!(record.get(Field::DeceasedName), "Harold Finch");
        assert_eq!(record.get(Field::Attorney), "Nathan Ingram");
        assert_eq!(record.extraction_method(), ExtractionMethod::Ocr);
    }

    #[test]
    fn test_bundled_cases() {
        let results = PetitionExtractor::new().extract(&acquired(&[
            SIMPLE_PETITION,
            "ADMINISTRATION PROCEEDING, ESTATE OF ROBERT JONES\nPETITION FOR LETTERS OF ADMINISTRATION",
        ]));
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].case_id, 2);
        assert_eq!(results[1].pages_used, vec![2]);
        assert_eq!(results[1].record.form_type(), FormType::FormAdmin);
        assert_eq!(results[1].record.get(Field::DeceasedName), "ROBERT JONES");
        assert_eq!(results[1].status, ReviewStatus::NeedsReview);
        assert_eq!(
            results[1].warnings,
            vec!["REQUIRED_MISSING:Petitioner Name,Relationship,Property Value".to_string()]
        );

        let joined = PetitionExtractor::new()
            .with_split_cases(false)
            .extract(&acquired(&[SIMPLE_PETITION, "second page"]));
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].pages_used, vec![1, 2]);
    }

    #[test]
    fn test_form_hint_overrides_classification() {
        // Scores higher for the Kings County layout, but the title names a P-1.
        let text = "PROBATE PETITION\nKings County\nLetters testamentary\nCitations\nForm P-1";
        let result = PetitionExtractor::new().extract_text(text, ExtractionMethod::Text);
        assert_eq!(result.record.form_type(), FormType::FormA);
        assert_eq!(result.record.confidence_score(), 1.0);
        assert!(result.record.matched_markers().contains(&"form_hint".to_string()));
        assert_eq!(result.warnings, vec![FORM_TYPE_CONFLICT.to_string()]);

        let result = PetitionExtractor::new()
            .with_form_hint(false)
            .extract_text(text, ExtractionMethod::Text);
        assert_eq!(result.record.form_type(), FormType::FormB);
    }

    #[test]
    fn test_forced_form() {
        let result = PetitionExtractor::new()
            .with_forced_form(Some(FormType::FormAdmin))
            .extract_text(SIMPLE_PETITION, ExtractionMethod::Text);
        assert_eq!(result.record.form_type(), FormType::FormAdmin);
        assert!(result.warnings.iter().all(|w| w.starts_with(REQUIRED_MISSING)));
    }

    #[test]
    fn test_normalize_fields_drops_malformed_values() {
        let mut fields = RecordFields::new();
        fields.set(Field::PropertyAddress, "see attached");
        fields.set(Field::Relationship, "Friend");
        fields.set(Field::Phone, "(718) 555 0100");
        fields.set(Field::Email, "JDoe@GMAIL.COM");
        normalize_fields(&mut fields);

        assert_eq!(&fields[Field::PropertyAddress], "");
        assert_eq!(&fields[Field::Relationship], "");
        assert_eq!(&fields[Field::Phone], "718-555-0100");
        assert_eq!(&fields[Field::Email], "jdoe@gmail.com");
    }

    #[test]
    fn test_flag_field() {
        let mut result = PetitionExtractor::new().extract_text(SIMPLE_PETITION, ExtractionMethod::Text);
        result.flag_field(Field::DeceasedName, "BLEED_GUARD_TRIP");
        assert_eq!(result.record.get(Field::DeceasedName), "");
        assert!(result.record.missing_fields().contains(&Field::DeceasedName));
        assert_eq!(result.warnings, vec!["BLEED_GUARD_TRIP:Deceased Name".to_string()]);
    }

    #[test]
    fn test_subtotals_past_decimal_range_leave_value_empty() {
        let text = "ESTATE OF JOHN SMITH\n\
                    Improved real property in New York State $79228162514264337593543950335\n\
                    Personal property $79228162514264337593543950335";
        let result = PetitionExtractor::new()
            .with_forced_form(Some(FormType::FormA))
            .extract_text(text, ExtractionMethod::Text);
        assert_eq!(result.record.get(Field::DeceasedName), "JOHN SMITH");
        assert_eq!(result.record.get(Field::PropertyValue), "");
    }
}
