//! Probate petition (P-1 family) parser.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::{Field, FormType, RecordFields};
use crate::petition::rules::address::{address_from_block, find_addresses, pick_best_address};
use crate::petition::rules::contact::{find_email, find_phone};
use crate::petition::rules::patterns::{DECEDENT_BLOCK, ESTATE_OF, LETTERS_TO, PETITIONER_BLOCK, RELATIONSHIP_LABEL};
use crate::petition::rules::relationship::relationship_after_label;
use crate::petition::rules::text::{block_after, window_after_labels};
use crate::petition::{FieldParser, PetitionText};

use super::{attorney_from_signature, caption_name, first_plausible, labeled_name, summed_property_value};

const BLOCK_LINES: usize = 12;

lazy_static! {
    // Labels that can only introduce the decedent's own address.
    static ref DECEDENT_ADDRESS_LABELS: Vec<Regex> = [
        r"(?i)domicile\s+of\s+(?:the\s+)?decedent",
        r"(?i)decedent'?s\s+domicile",
        r"(?i)address\s+of\s+(?:the\s+)?decedent",
        r"(?i)domicile\s+at\s+death",
        r"(?i)property\s+address",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();
}

/// Parser for the P-1 probate petition.
///
/// Names and addresses come from the numbered petitioner/decedent blocks,
/// attorney and contact details from the signature region.
pub struct FormAParser;

impl FormAParser {
    fn deceased_name(&self, body: &[&str], decedent_block: Option<&[&str]>) -> String {
        decedent_block
            .and_then(labeled_name)
            .or_else(|| caption_name(body, &ESTATE_OF))
            .unwrap_or_default()
    }

    fn petitioner_name(&self, body: &[&str], petitioner_block: Option<&[&str]>) -> String {
        if let Some(block) = petitioner_block {
            if let Some(name) = labeled_name(block).or_else(|| first_plausible(block.iter().copied())) {
                return name;
            }
        }
        caption_name(body, &LETTERS_TO).unwrap_or_default()
    }

    fn property_address(&self, body: &[&str], decedent_block: Option<&[&str]>) -> String {
        if let Some(block) = decedent_block {
            let address = address_from_block(block);
            if !address.is_empty() {
                return address;
            }
        }
        let labels: Vec<&Regex> = DECEDENT_ADDRESS_LABELS.iter().collect();
        let candidates: Vec<String> = window_after_labels(body, &labels, 4, true)
            .iter()
            .flat_map(|w| find_addresses(w))
            .collect();
        pick_best_address(&candidates)
    }
}

impl FieldParser for FormAParser {
    fn form_type(&self) -> FormType {
        FormType::FormA
    }

    fn parse(&self, doc: &PetitionText) -> RecordFields {
        let mut fields = RecordFields::new();
        let body = doc.body_lines();
        let signature = doc.signature_lines();

        let petitioner_block = block_after(&body, &PETITIONER_BLOCK, BLOCK_LINES);
        let decedent_block = block_after(&body, &DECEDENT_BLOCK, BLOCK_LINES);
        debug!(
            "FORM_A blocks: petitioner={} decedent={}",
            petitioner_block.is_some(),
            decedent_block.is_some()
        );

        fields.set(Field::DeceasedName, self.deceased_name(&body, decedent_block.as_deref()));
        fields.set(Field::PetitionerName, self.petitioner_name(&body, petitioner_block.as_deref()));

        if let Some(block) = petitioner_block.as_deref() {
            fields.set(Field::PetitionerAddress, address_from_block(block));
            // Only the petitioner block states the petitioner's relationship.
            fields.set(Field::Relationship, relationship_after_label(block, &RELATIONSHIP_LABEL));
        }

        fields.set(Field::PropertyAddress, self.property_address(&body, decedent_block.as_deref()));
        fields.set(Field::PropertyValue, summed_property_value(&body));

        let signature_text = signature.join("\n");
        fields.set(Field::Attorney, attorney_from_signature(&signature));
        fields.set(Field::Phone, find_phone(&signature_text));
        fields.set(Field::Email, find_email(&signature_text));

        fields
    }
}
