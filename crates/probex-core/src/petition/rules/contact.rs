//! Phone and email extraction.

use lazy_static::lazy_static;
use regex::Regex;

use super::patterns::{EMAIL, PHONE};
use super::{ExtractionMatch, FieldExtractor};

lazy_static! {
    static ref PHONE_LABEL: Regex = Regex::new(r"(?i)\b(?:telephone|tel|phone)\b").unwrap();
    static ref EMAIL_LABEL: Regex = Regex::new(r"(?i)\be-?mail\b").unwrap();
}

/// Domains commonly mangled by OCR, with their corrections.
const EMAIL_DOMAIN_FIXES: &[(&str, &str)] = &[
    ("gma.il", "gmail.com"),
    ("gmai1.com", "gmail.com"),
    ("gmali.com", "gmail.com"),
    ("gmail.co", "gmail.com"),
    ("outlok.com", "outlook.com"),
    ("hotmai.com", "hotmail.com"),
    ("yahoo.co", "yahoo.com"),
];

/// US phone number extractor producing `NNN-NNN-NNNN`.
pub struct PhoneExtractor;

impl FieldExtractor for PhoneExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        // Labeled numbers first, so a fax or docket line does not win.
        let labeled = text
            .lines()
            .filter(|l| PHONE_LABEL.is_match(l) && !l.to_ascii_lowercase().contains("fax"))
            .find_map(|l| self.extract_all(l).into_iter().next());
        labeled.or_else(|| self.extract_all(text).into_iter().next())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        PHONE
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let area = caps.get(1).or_else(|| caps.get(2))?.as_str();
                let value = format!("{}-{}-{}", area, &caps[3], &caps[4]);
                Some(ExtractionMatch::new(value, whole.as_str()))
            })
            .collect()
    }
}

/// Email extractor with lower-casing and OCR domain repair.
pub struct EmailExtractor;

impl FieldExtractor for EmailExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let labeled = text
            .lines()
            .filter(|l| EMAIL_LABEL.is_match(l))
            .find_map(|l| self.extract_all(l).into_iter().next());
        labeled.or_else(|| self.extract_all(text).into_iter().next())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        EMAIL
            .find_iter(text)
            .map(|m| ExtractionMatch::new(normalize_email(m.as_str()), m.as_str()))
            .collect()
    }
}

/// Normalize a phone number to `NNN-NNN-NNNN`; empty when none is present.
pub fn normalize_phone(raw: &str) -> String {
    PhoneExtractor
        .extract_all(raw)
        .into_iter()
        .next()
        .map(|m| m.value)
        .unwrap_or_default()
}

/// Lower-case an email and repair known OCR domain errors.
pub fn normalize_email(raw: &str) -> String {
    let email = raw.trim().trim_end_matches('.').to_ascii_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return email;
    };
    match EMAIL_DOMAIN_FIXES.iter().find(|(bad, _)| *bad == domain) {
        Some((_, good)) => format!("{}@{}", local, good),
        None => email,
    }
}

/// First phone number in the text, labeled lines preferred.
pub fn find_phone(text: &str) -> String {
    PhoneExtractor.extract(text).map(|m| m.value).unwrap_or_default()
}

/// First email address in the text, labeled lines preferred.
pub fn find_email(text: &str) -> String {
    EmailExtractor.extract(text).map(|m| m.value).unwrap_or_default()
}
