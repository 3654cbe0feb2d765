//! Petition for letters of administration (A-1) parser.

use tracing::debug;

use crate::models::{Field, FormType, RecordFields};
use crate::petition::rules::address::{address_from_block, looks_like_address, normalize_address};
use crate::petition::rules::contact::{find_email, find_phone};
use crate::petition::rules::patterns::{
    ADMIN_ESTATE_OF, DECEDENT_BLOCK, ESTATE_OF, MY_DOMICILE, PETITIONER_BLOCK, RELATIONSHIP_LABEL,
};
use crate::petition::rules::relationship::relationship_after_label;
use crate::petition::rules::text::{block_after, split_lines};
use crate::petition::{FieldParser, PetitionText};

use super::{attorney_from_signature, caption_name, first_plausible, labeled_name, summed_property_value};

const BLOCK_LINES: usize = 12;

/// Parser for the A-1 administration petition.
pub struct FormAdminParser;

impl FormAdminParser {
    fn deceased_name(&self, doc: &PetitionText, body: &[&str], decedent_block: Option<&[&str]>) -> String {
        let first_page = doc.pages().first().map(String::as_str).unwrap_or("");
        caption_name(&split_lines(first_page), &ADMIN_ESTATE_OF)
            .or_else(|| decedent_block.and_then(labeled_name))
            .or_else(|| caption_name(body, &ESTATE_OF))
            .unwrap_or_default()
    }

    fn petitioner_name(&self, petitioner_block: Option<&[&str]>) -> String {
        let Some(block) = petitioner_block else {
            return String::new();
        };
        labeled_name(block)
            .or_else(|| {
                first_plausible(
                    block
                        .iter()
                        .copied()
                        .filter(|l| !l.to_lowercase().contains("citizenship")),
                )
            })
            .unwrap_or_default()
    }

    /// "My domicile is ..." statements win over the block's domicile lines.
    fn petitioner_address(&self, body: &[&str], petitioner_block: Option<&[&str]>) -> String {
        let stated = body
            .iter()
            .filter_map(|l| MY_DOMICILE.captures(l))
            .map(|caps| normalize_address(&caps[1]))
            .find(|a| looks_like_address(a));
        if let Some(address) = stated {
            return address;
        }
        petitioner_block.map(address_from_block).unwrap_or_default()
    }
}

impl FieldParser for FormAdminParser {
    fn form_type(&self) -> FormType {
        FormType::FormAdmin
    }

    fn parse(&self, doc: &PetitionText) -> RecordFields {
        let mut fields = RecordFields::new();
        let body = doc.body_lines();
        let signature = doc.signature_lines();

        let petitioner_block = block_after(&body, &PETITIONER_BLOCK, BLOCK_LINES);
        let decedent_block = block_after(&body, &DECEDENT_BLOCK, BLOCK_LINES);

        fields.set(
            Field::DeceasedName,
            self.deceased_name(doc, &body, decedent_block.as_deref()),
        );
        fields.set(Field::PetitionerName, self.petitioner_name(petitioner_block.as_deref()));

        let relationship = petitioner_block
            .as_deref()
            .map(|block| relationship_after_label(block, &RELATIONSHIP_LABEL))
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| relationship_after_label(&body, &RELATIONSHIP_LABEL));
        fields.set(Field::Relationship, relationship);

        if let Some(block) = decedent_block.as_deref() {
            fields.set(Field::PropertyAddress, address_from_block(block));
        }
        fields.set(
            Field::PetitionerAddress,
            self.petitioner_address(&body, petitioner_block.as_deref()),
        );
        fields.set(Field::PropertyValue, summed_property_value(&body));

        let attorney = attorney_from_signature(&signature);
        if attorney.is_empty() {
            debug!("No attorney in signature region; skipping contact details");
        } else {
            let signature_text = signature.join("\n");
            fields.set(Field::Phone, find_phone(&signature_text));
            fields.set(Field::Email, find_email(&signature_text));
            fields.set(Field::Attorney, attorney);
        }

        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_pages() -> Vec<&'static str> {
        vec![
            "SURROGATE'S COURT OF THE STATE OF NEW YORK\n\
             ADMINISTRATION PROCEEDING, ESTATE OF ROBERT JONES\n\
             PETITION FOR LETTERS OF ADMINISTRATION\n\
             1. Petitioner Information\n\
             Name: Linda Jones\n\
             Citizenship: USA\n\
             Domicile: 221 Oak Avenue\n\
             City, Village or Town: Brooklyn\n\
             State: New York Zip Code: 11201\n\
             Interest of petitioner: Distributee of decedent, relationship: Wife\n\
             2. Decedent Information\n\
             Name: Robert Jones\n\
             Domicile: 9 Elm Street\n\
             City, Village or Town: Staten Island\n\
             State: NY Zip Code: 10312",
            "3. Estimated value of property\n\
             Improved real property in New York State $410,000\n\
             Personal property $12,500\n\
             My domicile is 221 Oak Avenue, Brooklyn, NY 11201\n\
             Signature of Attorney\n\
             Print Name of Attorney: DIANA PRINCE, ESQ.\n\
             Tel. No.: 347-555-0123\n\
             dprince@gma.il",
        ]
    }

    #[test]
    fn test_admin_petition() {
        let doc = PetitionText::from_pages(&sample_pages());
        let fields = FormAdminParser.parse(&doc);

        assert_eq!(&fields[Field::DeceasedName], "ROBERT JONES");
        assert_eq!(&fields[Field::PetitionerName], "Linda Jones");
        assert_eq!(&fields[Field::Relationship], "Spouse");
        assert_eq!(&fields[Field::PropertyAddress], "9 Elm Street, Staten Island, NY 10312");
        assert_eq!(&fields[Field::PetitionerAddress], "221 Oak Avenue, Brooklyn, NY 11201");
        assert_eq!(&fields[Field::PropertyValue], "422500");
        assert_eq!(&fields[Field::Attorney], "DIANA PRINCE");
        assert_eq!(&fields[Field::Phone], "347-555-0123");
        assert_eq!(&fields[Field::Email], "dprince@gmail.com");
    }

    #[test]
    fn test_domicile_statement_in_signature_region_is_ignored() {
        let pages = [
            sample_pages()[0],
            "Signature of Attorney\n\
             Print Name of Attorney: Diana Prince\n\
             My domicile is 500 Court Street, Brooklyn, NY 11201",
        ];
        let fields = FormAdminParser.parse(&PetitionText::from_pages(&pages));
        assert_eq!(&fields[Field::PetitionerAddress], "221 Oak Avenue, Brooklyn, NY 11201");
        assert_eq!(&fields[Field::Attorney], "Diana Prince");
    }

    #[test]
    fn test_contact_requires_attorney() {
        let doc = PetitionText::from_pages(&[
            "ADMINISTRATION PROCEEDING, ESTATE OF ROBERT JONES",
            "Signature of Petitioner\nTel: 347-555-0123\nlinda@example.com",
        ]);
        let fields = FormAdminParser.parse(&doc);
        assert_eq!(&fields[Field::Attorney], "");
        assert_eq!(&fields[Field::Phone], "");
        assert_eq!(&fields[Field::Email], "");
    }
}
