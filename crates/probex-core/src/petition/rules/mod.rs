//! Rule-based field normalizers for probate petitions.

pub mod address;
pub mod amounts;
pub mod contact;
pub mod names;
pub mod patterns;
pub mod relationship;
pub mod text;

pub use address::{address_from_block, find_addresses, looks_like_address, normalize_address, pick_best_address};
pub use amounts::{amount_near_label, format_amount, parse_currency, sum_amounts, AmountExtractor};
pub use contact::{find_email, find_phone, normalize_email, normalize_phone, EmailExtractor, PhoneExtractor};
pub use names::{accept_name, clean_person_name, name_in_text, plausible_name, strip_aka};
pub use relationship::{is_known_relationship, normalize_relationship, relationship_after_label};
pub use text::{join_pages, normalize_text, normalized_len, PAGE_BREAK};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched value and the text it was read from.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    pub value: T,
    /// Matched source text.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            source: source.into(),
        }
    }
}
