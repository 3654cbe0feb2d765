//! Layout-agnostic fallback parser.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::models::{Field, FormType, RecordFields};
use crate::petition::rules::address::{find_addresses, pick_best_address};
use crate::petition::rules::amounts::format_amount;
use crate::petition::rules::contact::{find_email, find_phone};
use crate::petition::rules::names::accept_name;
use crate::petition::rules::relationship::normalize_relationship;
use crate::petition::rules::text::split_lines;
use crate::petition::rules::{AmountExtractor, FieldExtractor};
use crate::petition::{FieldParser, PetitionText};

use super::{address_near_keywords, floor_char_boundary, summed_property_value};

lazy_static! {
    static ref WILL_OF: Regex = Regex::new(r"(?i)will\s+of\s+([A-Z][A-Za-z .'\-]+)").unwrap();

    static ref INLINE_NAME: Regex = Regex::new(r"(?i)name[:\s]+([A-Z][A-Za-z .'\-]+)").unwrap();

    static ref DECEDENT_INLINE: Regex = Regex::new(
        r"(?i)(?:decedent|deceased)[:\s]+([A-Z][A-Za-z .'\-]+)"
    ).unwrap();

    static ref ESTATE_INLINE: Regex = Regex::new(r"(?i)estate\s+of\s+([A-Z][A-Za-z .'\-]+)").unwrap();

    static ref PETITIONER_PATTERNS: Vec<Regex> = [
        r"(?i)petitioner(?:'s)?(?:\s+name)?s?[:,\s]+([A-Z][A-Za-z .'\-]+)",
        r"(?i)signature\s+of\s+petitioner[^A-Za-z]{0,20}([A-Z][A-Za-z .'\-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    static ref ATTORNEY_PATTERNS: Vec<Regex> = [
        r"(?i)print\s+name\s+of\s+attorney[^A-Za-z]{0,30}([A-Z][A-Za-z .'\-]{2,})",
        r"(?i)attorney(?:\s+for\s+[^:\n]+)?:?[ \t]*([A-Z][A-Za-z .'\-]{2,})",
        r"(?i)name\s+of\s+attorney:?\s*([A-Z][A-Za-z .'\-]{2,})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    // Instruction prose that follows "attorney" on blank forms.
    static ref INSTRUCTION_WORDS: Regex = Regex::new(r"(?i)\b(?:comply|with|must|check)\b").unwrap();

    static ref RELATIONSHIP_CONTEXT: Regex = Regex::new(
        r"(?i)relationship[^\n]{0,40}?\b(domestic\s+partner|spouse|husband|wife|granddaughter|grandson|grandchild|daughter|son|brother|sister|mother|father|parent|niece|nephew|cousin|child)\b"
    ).unwrap();

    static ref DECEDENT_ADDRESS_CHUNK: Regex = Regex::new(
        r"(?i)(?:domicile\s+address|domicile|place\s+of\s+death|residence)[:\s]+([^\n]{0,150})"
    ).unwrap();

    static ref IMPROVED_WORD: Regex = Regex::new(r"(?i)\bimproved\b").unwrap();
}

const DECEDENT_CONTEXT: [&str; 3] = ["decedent", "deceased", "estate of"];

/// Fallback for documents matching no known layout.
///
/// Looks for generic labels anywhere in the text and keeps the first
/// plausible value per field. Never fails; a lower fill rate is expected.
pub struct GenericParser;

impl FieldParser for GenericParser {
    fn form_type(&self) -> FormType {
        FormType::Unknown
    }

    fn parse(&self, doc: &PetitionText) -> RecordFields {
        let text = doc.text();
        let mut fields = RecordFields::new();

        fields.set(Field::PropertyAddress, deceased_address(text));
        fields.set(Field::DeceasedName, deceased_name(text));
        fields.set(Field::PetitionerName, petitioner_name(text));
        fields.set(Field::PetitionerAddress, petitioner_address(text));
        fields.set(Field::Relationship, relationship(text));
        fields.set(Field::PropertyValue, property_value(text));
        fields.set(Field::Attorney, attorney(text));
        fields.set(Field::Phone, find_phone(text));
        fields.set(Field::Email, find_email(text));

        fields
    }
}

/// Slice of `text` around a byte offset, clamped to char boundaries.
fn context(text: &str, at: usize, before: usize, after: usize) -> String {
    let from = floor_char_boundary(text, at.saturating_sub(before));
    let to = floor_char_boundary(text, at + after);
    text[from..to].to_lowercase()
}

pub(crate) fn deceased_name(text: &str) -> String {
    if let Some(name) = WILL_OF.captures(text).and_then(|caps| accept_name(&caps[1])) {
        return name;
    }

    for caps in INLINE_NAME.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let near = context(text, whole.start(), 80, 40);
        if DECEDENT_CONTEXT.iter().any(|kw| near.contains(kw)) {
            if let Some(name) = accept_name(&caps[1]) {
                return name;
            }
        }
    }

    [&*DECEDENT_INLINE, &*ESTATE_INLINE]
        .into_iter()
        .flat_map(|re| re.captures_iter(text))
        .find_map(|caps| accept_name(&caps[1]))
        .unwrap_or_default()
}

pub(crate) fn petitioner_name(text: &str) -> String {
    for caps in INLINE_NAME.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if context(text, whole.start(), 80, 60).contains("petitioner") {
            if let Some(name) = accept_name(&caps[1]) {
                return name;
            }
        }
    }

    PETITIONER_PATTERNS
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .find_map(|caps| accept_name(&caps[1]))
        .unwrap_or_default()
}

pub(crate) fn deceased_address(text: &str) -> String {
    let mut candidates: Vec<String> = DECEDENT_ADDRESS_CHUNK
        .captures_iter(text)
        .flat_map(|caps| find_addresses(&caps[1]))
        .collect();

    let near = address_near_keywords(
        text,
        &["domicile", "decedent", "deceased", "resided", "residence", "place of death"],
    );
    if !near.is_empty() {
        candidates.push(near);
    }
    candidates.extend(find_addresses(text));
    pick_best_address(&candidates)
}

pub(crate) fn petitioner_address(text: &str) -> String {
    let near = address_near_keywords(text, &["petitioner", "mailing address", "petitioner address"]);
    if !near.is_empty() && !near.to_lowercase().contains("hospital") {
        return near;
    }
    pick_best_address(&find_addresses(text))
}

/// Relationship stated near a "relationship" label, else the first term anywhere.
pub(crate) fn relationship(text: &str) -> String {
    RELATIONSHIP_CONTEXT
        .captures(text)
        .map(|caps| normalize_relationship(&caps[1]))
        .unwrap_or_else(|| normalize_relationship(text))
}

/// Labeled subtotals, else the first amount within 200 characters of "improved".
pub(crate) fn property_value(text: &str) -> String {
    let summed = summed_property_value(&split_lines(text));
    if !summed.is_empty() {
        return summed;
    }
    let extractor = AmountExtractor::new();
    IMPROVED_WORD
        .find_iter(text)
        .find_map(|m| {
            let to = floor_char_boundary(text, m.end() + 200);
            extractor.extract(&text[m.end()..to])
        })
        .map(|m| {
            trace!("Amount {} near \"improved\" from {:?}", m.value, m.source);
            format_amount(m.value)
        })
        .unwrap_or_default()
}

pub(crate) fn attorney(text: &str) -> String {
    ATTORNEY_PATTERNS
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .filter(|caps| !INSTRUCTION_WORDS.is_match(&caps[1]))
        .find_map(|caps| accept_name(&caps[1]))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unlabeled_letter() {
        let text = "In the matter of the will of Harold Finch, late of this county.\n\
                    The petitioner, Grace Hendricks, niece of the decedent, resides at\n\
                    310 Park Place\n\
                    Brooklyn, NY 11238\n\
                    Improved property of about $640,000\n\
                    Attorney: Nathan Ingram, Esq.\n\
                    Phone 212 555 0147";
        let doc = PetitionText::from_text(text);
        let fields = GenericParser.parse(&doc);

        assert_eq!(&fields[Field::DeceasedName], "Harold Finch");
        assert_eq!(&fields[Field::PetitionerName], "Grace Hendricks");
        assert_eq!(&fields[Field::PetitionerAddress], "310 Park Place, Brooklyn, NY 11238");
        assert_eq!(&fields[Field::Relationship], "Niece");
        assert_eq!(&fields[Field::PropertyValue], "640000");
        assert_eq!(&fields[Field::Attorney], "Nathan Ingram");
        assert_eq!(&fields[Field::Phone], "212-555-0147");
        assert_eq!(&fields[Field::Email], "");
    }

    #[test]
    fn test_relationship_prefers_labeled_term() {
        assert_eq!(relationship("the son of a neighbor\nRelationship to decedent: Brother"), "Brother");
        assert_eq!(relationship("nothing relevant"), "");
    }

    #[test]
    fn test_attorney_skips_instructions() {
        assert_eq!(attorney("Attorney must comply with rule 207.16"), "");
        assert_eq!(attorney("Name of Attorney: Carol Baskin"), "Carol Baskin");
    }

    #[test]
    fn test_empty_document() {
        let fields = GenericParser.parse(&PetitionText::from_text(""));
        assert_eq!(fields, RecordFields::new());
    }
}
