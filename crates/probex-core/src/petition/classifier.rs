//! Form-type classification by weighted marker scoring.

use tracing::{debug, trace};

use crate::models::FormType;

/// Marker phrases per known layout, `(lower-case phrase, weight)`.
///
/// Table order is the tie-break priority.
pub static MARKERS: &[(FormType, &[(&str, u32)])] = &[
    (
        FormType::FormA,
        &[
            ("improved real property in new york state", 3),
            ("distributee of decedent", 2),
            ("petitioner are as follows", 2),
            ("petition for probate", 4),
            ("probate proceeding", 3),
            ("form p-1", 3),
            ("letters testamentary", 2),
            ("last will and testament", 2),
            ("surrogate's court", 1),
            ("file no.", 1),
            ("county of richmond", 1),
            ("staten island", 1),
            ("domicile", 1),
        ],
    ),
    (
        FormType::FormAdmin,
        &[
            ("petition for letters of administration", 4),
            ("petition for letters of", 3),
            ("administration proceeding", 3),
            ("form a-1", 3),
            ("a1 (03/18)", 3),
            ("petitioner information", 2),
            ("decedent information", 2),
            ("surrogate's court of the state of new york", 1),
        ],
    ),
    (
        FormType::FormB,
        &[
            ("probate petition", 3),
            ("letters testamentary", 2),
            ("citations", 1),
            ("kings county", 2),
            ("queens county", 2),
            ("surrogate court of", 1),
            ("telephone number", 1),
        ],
    ),
    (
        FormType::FormC,
        &[
            ("affidavit of heirship", 3),
            ("family tree", 2),
            ("renunciation", 2),
            ("waiver of process", 2),
            ("distributee", 2),
            ("relationship to decedent", 1),
        ],
    ),
    (
        FormType::FormD,
        &[
            ("voluntary administration", 3),
            ("small estate", 3),
            ("public administrator", 2),
            ("surrogate's court richmond county", 3),
            ("docket number", 1),
        ],
    ),
];

/// Phrases that settle the layout on their own, checked against the first pages.
static HINTS: &[(FormType, &[&str])] = &[
    (
        FormType::FormA,
        &["form p-1", "petition for probate", "probate proceeding"],
    ),
    (
        FormType::FormAdmin,
        &[
            "form a-1",
            "petition for letters of administration",
            "administration proceeding",
        ],
    ),
];

const ADMIN_TITLE: &str = "petition for letters of";
const ADMIN_CONFIRMATIONS: [&str; 3] = ["administration proceeding", "form a-1", "a1 (03/18)"];

/// Marker name recorded when a hint overrides scoring.
pub const FORM_HINT_MARKER: &str = "form_hint";

/// Outcome of classifying one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub form_type: FormType,
    /// Sum of matched marker weights.
    pub score: u32,
    /// Score divided by the layout's total marker weight.
    pub confidence_score: f32,
    pub matched_markers: Vec<String>,
}

impl Detection {
    fn unknown() -> Self {
        Self {
            form_type: FormType::Unknown,
            score: 0,
            confidence_score: 0.0,
            matched_markers: Vec::new(),
        }
    }

    /// Replace the detected layout with a hinted one.
    pub fn with_hint(mut self, hint: FormType) -> Self {
        self.form_type = hint;
        self.confidence_score = 1.0;
        if !self.matched_markers.iter().any(|m| m == FORM_HINT_MARKER) {
            self.matched_markers.push(FORM_HINT_MARKER.to_string());
        }
        self
    }
}

/// Classify document text against the marker tables.
///
/// Deterministic: identical text always yields the same detection.
pub fn classify(text: &str) -> Detection {
    let lower = text.to_lowercase();

    if lower.contains(ADMIN_TITLE) && ADMIN_CONFIRMATIONS.iter().any(|m| lower.contains(m)) {
        let mut matched = vec![ADMIN_TITLE.to_string()];
        matched.extend(
            ADMIN_CONFIRMATIONS
                .iter()
                .filter(|m| lower.contains(*m))
                .map(|m| m.to_string()),
        );
        debug!("Decisive administration title found");
        return Detection {
            form_type: FormType::FormAdmin,
            score: score_form(&lower, FormType::FormAdmin).0,
            confidence_score: 1.0,
            matched_markers: matched,
        };
    }

    let mut best = Detection::unknown();
    for (form_type, markers) in MARKERS {
        let (score, matched) = score_markers(&lower, markers);
        trace!("{} scored {} ({:?})", form_type, score, matched);
        // Strictly greater, so earlier layouts win ties.
        if score > best.score {
            let total: u32 = markers.iter().map(|(_, w)| w).sum();
            best = Detection {
                form_type: *form_type,
                score,
                confidence_score: score as f32 / total.max(1) as f32,
                matched_markers: matched,
            };
        }
    }

    debug!(
        "Classified as {} (score {}, confidence {:.3})",
        best.form_type, best.score, best.confidence_score
    );
    best
}

/// Layout named outright on the leading pages, if any.
pub fn form_hint(leading_text: &str) -> Option<FormType> {
    let lower = leading_text.to_lowercase();
    HINTS
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|p| lower.contains(p)))
        .map(|(form_type, _)| *form_type)
}

fn score_form(lower: &str, form_type: FormType) -> (u32, Vec<String>) {
    MARKERS
        .iter()
        .find(|(f, _)| *f == form_type)
        .map(|(_, markers)| score_markers(lower, markers))
        .unwrap_or_default()
}

fn score_markers(lower: &str, markers: &[(&str, u32)]) -> (u32, Vec<String>) {
    let mut score = 0;
    let mut matched = Vec::new();
    for (marker, weight) in markers {
        if lower.contains(marker) {
            score += weight;
            matched.push(marker.to_string());
        }
    }
    (score, matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROBATE_SAMPLE: &str = "SURROGATE'S COURT OF THE STATE OF NEW YORK\n\
        ESTATE OF JOHN SMITH\n\
        Petitioner Information\n\
        Name: Mary Smith\n\
        Domicile or Principal Office: 16 Ada Drive\n\
        City, Village or Town: Staten Island\n\
        Improved real property in New York State $200,000";

    #[test]
    fn test_probate_sample_is_form_a() {
        let detection = classify(PROBATE_SAMPLE);
        assert_eq!(detection.form_type, FormType::FormA);
        assert_eq!(detection.score, 6);
        assert!(detection
            .matched_markers
            .contains(&"improved real property in new york state".to_string()));
        assert!(detection.confidence_score > 0.0 && detection.confidence_score < 1.0);
    }

    #[test]
    fn test_no_markers_is_unknown() {
        let detection = classify("Grocery list: milk, eggs, bread");
        assert_eq!(detection.form_type, FormType::Unknown);
        assert_eq!(detection.confidence_score, 0.0);
        assert!(detection.matched_markers.is_empty());
    }

    #[test]
    fn test_classification_is_deterministic() {
        let first = classify(PROBATE_SAMPLE);
        for _ in 0..5 {
            assert_eq!(classify(PROBATE_SAMPLE), first);
        }
    }

    #[test]
    fn test_decisive_admin_title() {
        let text = "PETITION FOR LETTERS OF ADMINISTRATION\nAdministration Proceeding, Estate of Jane Doe";
        let detection = classify(text);
        assert_eq!(detection.form_type, FormType::FormAdmin);
        assert_eq!(detection.confidence_score, 1.0);
        assert_eq!(
            detection.matched_markers,
            vec!["petition for letters of".to_string(), "administration proceeding".to_string()]
        );
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        // "letters testamentary" scores 2 for both FORM_A and FORM_B.
        let detection = classify("letters testamentary");
        assert_eq!(detection.form_type, FormType::FormA);
    }

    #[test]
    fn test_form_hint() {
        assert_eq!(form_hint("FORM P-1 (Petition for Probate)"), Some(FormType::FormA));
        assert_eq!(form_hint("Form A-1 page 1"), Some(FormType::FormAdmin));
        assert_eq!(form_hint("Affidavit of heirship"), None);

        let hinted = classify(PROBATE_SAMPLE).with_hint(FormType::FormAdmin);
        assert_eq!(hinted.form_type, FormType::FormAdmin);
        assert_eq!(hinted.confidence_score, 1.0);
        assert!(hinted.matched_markers.contains(&FORM_HINT_MARKER.to_string()));
    }
}
