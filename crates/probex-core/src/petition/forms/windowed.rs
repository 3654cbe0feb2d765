//! Label-window parser shared by the FORM_B, FORM_C and FORM_D layouts.
//!
//! Each layout only differs in its label table: the lines following a label
//! are taken as a window and the first plausible candidate wins.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Field, FormType, RecordFields};
use crate::petition::rules::address::{find_addresses, pick_best_address};
use crate::petition::rules::contact::{find_email, find_phone};
use crate::petition::rules::patterns::NAME_LABEL;
use crate::petition::rules::relationship::normalize_relationship;
use crate::petition::rules::text::{first_line, value_after, window_after_labels};
use crate::petition::{FieldParser, PetitionText};

use super::{address_near_keywords, amount_in_windows, first_plausible, generic};

/// Label patterns and keywords for one layout.
pub struct LabelTable {
    deceased: &'static [&'static str],
    petitioner: &'static [&'static str],
    decedent_address: &'static [&'static str],
    decedent_keywords: &'static [&'static str],
    petitioner_address: &'static [&'static str],
    petitioner_keywords: &'static [&'static str],
    relationship: &'static [&'static str],
    value: &'static [&'static str],
    attorney: &'static [&'static str],
}

impl LabelTable {
    fn labels(&self) -> impl Iterator<Item = &'static str> {
        [
            self.deceased,
            self.petitioner,
            self.decedent_address,
            self.petitioner_address,
            self.relationship,
            self.value,
            self.attorney,
        ]
        .into_iter()
        .flatten()
        .copied()
    }
}

/// Labels of every windowed layout; captures in any layout stop at these.
pub(crate) fn table_labels() -> impl Iterator<Item = &'static str> {
    [&FORM_B_TABLE, &FORM_C_TABLE, &FORM_D_TABLE]
        .into_iter()
        .flat_map(LabelTable::labels)
}

static FORM_B_TABLE: LabelTable = LabelTable {
    deceased: &["decedent information", "decedent", "deceased", "estate of"],
    petitioner: &["petitioner", "applicant", "person filing"],
    decedent_address: &["domicile", "address of decedent", "residence", "domicile at death", "decedent address"],
    decedent_keywords: &["domicile", "residence", "decedent address"],
    petitioner_address: &["mailing address", "petitioner address", "address of petitioner", "present address"],
    petitioner_keywords: &["petitioner", "mailing address", "present address"],
    relationship: &["relationship to decedent", "relationship"],
    value: &["value of property", "gross value", "improved real property"],
    attorney: &["attorney", "counsel", "firm name"],
};

static FORM_C_TABLE: LabelTable = LabelTable {
    deceased: &["name of decedent", "decedent", "deceased", "estate of"],
    petitioner: &["name of affiant", "affiant", "deponent", "petitioner"],
    decedent_address: &["last address of decedent", "domicile", "resided at", "residence"],
    decedent_keywords: &["domicile", "resided", "residence"],
    petitioner_address: &["address of affiant", "mailing address", "residing at"],
    petitioner_keywords: &["affiant", "deponent", "mailing address"],
    relationship: &["relationship to decedent", "relationship"],
    value: &["value of estate", "gross value", "improved real property"],
    attorney: &["attorney", "counsel", "firm name"],
};

static FORM_D_TABLE: LabelTable = LabelTable {
    deceased: &["decedent", "deceased", "small estate of", "voluntary administration of"],
    petitioner: &["voluntary administrator", "petitioner", "informant", "applicant"],
    decedent_address: &["domicile", "resided at", "address of decedent", "decedent address", "property location"],
    decedent_keywords: &["domicile", "resided", "property location", "decedent"],
    petitioner_address: &["mailing address", "address of voluntary administrator", "residence address", "petitioner address"],
    petitioner_keywords: &["voluntary administrator", "petitioner address", "mailing address"],
    relationship: &["relationship to decedent", "relationship"],
    value: &["improved real property", "value of property", "gross value"],
    attorney: &["attorney", "counsel", "law firm"],
};

pub(super) static FORM_B: WindowedParser = WindowedParser::new(FormType::FormB, &FORM_B_TABLE);
pub(super) static FORM_C: WindowedParser = WindowedParser::new(FormType::FormC, &FORM_C_TABLE);
pub(super) static FORM_D: WindowedParser = WindowedParser::new(FormType::FormD, &FORM_D_TABLE);

struct CompiledTable {
    deceased: Vec<Regex>,
    petitioner: Vec<Regex>,
    decedent_address: Vec<Regex>,
    petitioner_address: Vec<Regex>,
    relationship: Vec<Regex>,
    value: Vec<Regex>,
    attorney: Vec<Regex>,
}

impl CompiledTable {
    fn compile(table: &LabelTable) -> Self {
        let compile = |patterns: &[&str]| -> Vec<Regex> {
            patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
                .collect()
        };
        Self {
            deceased: compile(table.deceased),
            petitioner: compile(table.petitioner),
            decedent_address: compile(table.decedent_address),
            petitioner_address: compile(table.petitioner_address),
            relationship: compile(table.relationship),
            value: compile(table.value),
            attorney: compile(table.attorney),
        }
    }
}

lazy_static! {
    static ref COMPILED: HashMap<FormType, CompiledTable> = [
        (FormType::FormB, &FORM_B_TABLE),
        (FormType::FormC, &FORM_C_TABLE),
        (FormType::FormD, &FORM_D_TABLE),
    ]
    .into_iter()
    .map(|(form_type, table)| (form_type, CompiledTable::compile(table)))
    .collect();
}

/// Windowed parser driven by a static label table.
pub struct WindowedParser {
    form_type: FormType,
    table: &'static LabelTable,
}

impl WindowedParser {
    pub const fn new(form_type: FormType, table: &'static LabelTable) -> Self {
        Self { form_type, table }
    }

    fn compiled(&self) -> &'static CompiledTable {
        // Every static parser has an entry.
        &COMPILED[&self.form_type]
    }
}

fn refs(patterns: &[Regex]) -> Vec<&Regex> {
    patterns.iter().collect()
}

/// First line of each window with a leading `Name:` label removed.
fn name_candidates(windows: &[String]) -> Vec<&str> {
    windows
        .iter()
        .map(|w| {
            let line = first_line(w);
            NAME_LABEL
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map_or(line, |m| m.as_str())
        })
        .collect()
}

/// Window lines with any leading label text cut off.
fn labeled_lines<'a>(windows: &'a [String], labels: &'a [Regex]) -> impl Iterator<Item = &'a str> {
    windows.iter().flat_map(|w| w.lines()).map(move |line| {
        labels
            .iter()
            .find_map(|label| value_after(line, label))
            .unwrap_or(line)
    })
}

fn address_from_windows(lines: &[&str], labels: &[Regex], text: &str, keywords: &[&str]) -> String {
    let mut candidates: Vec<String> = window_after_labels(lines, &refs(labels), 4, false)
        .iter()
        .flat_map(|w| find_addresses(w))
        .collect();
    let near = address_near_keywords(text, keywords);
    if !near.is_empty() {
        candidates.push(near);
    }
    pick_best_address(&candidates)
}

impl FieldParser for WindowedParser {
    fn form_type(&self) -> FormType {
        self.form_type
    }

    fn parse(&self, doc: &PetitionText) -> RecordFields {
        let compiled = self.compiled();
        let body_text = doc.body();
        let body = doc.body_lines();
        let signature_text = doc.signature();
        let signature = doc.signature_lines();
        let mut fields = RecordFields::new();

        let windows = window_after_labels(&body, &refs(&compiled.deceased), 3, false);
        let deceased = first_plausible(name_candidates(&windows))
            .unwrap_or_else(|| generic::deceased_name(body_text));
        fields.set(Field::DeceasedName, deceased);

        let windows = window_after_labels(&body, &refs(&compiled.petitioner), 3, false);
        let petitioner = first_plausible(name_candidates(&windows))
            .unwrap_or_else(|| generic::petitioner_name(body_text));
        fields.set(Field::PetitionerName, petitioner);

        fields.set(
            Field::PropertyAddress,
            address_from_windows(&body, &compiled.decedent_address, body_text, self.table.decedent_keywords),
        );
        fields.set(
            Field::PetitionerAddress,
            address_from_windows(&body, &compiled.petitioner_address, body_text, self.table.petitioner_keywords),
        );

        let relationship = window_after_labels(&body, &refs(&compiled.relationship), 2, true)
            .iter()
            .map(|w| normalize_relationship(w))
            .find(|r| !r.is_empty())
            .unwrap_or_else(|| generic::relationship(body_text));
        fields.set(Field::Relationship, relationship);

        let value = amount_in_windows(&window_after_labels(&body, &refs(&compiled.value), 3, false));
        let value = if value.is_empty() { generic::property_value(body_text) } else { value };
        fields.set(Field::PropertyValue, value);

        let windows = window_after_labels(&signature, &refs(&compiled.attorney), 2, true);
        let attorney = first_plausible(labeled_lines(&windows, &compiled.attorney))
            .unwrap_or_else(|| generic::attorney(signature_text));
        fields.set(Field::Attorney, attorney);

        fields.set(Field::Phone, find_phone(signature_text));
        fields.set(Field::Email, find_email(signature_text));

        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kings_county_petition() {
        let text = "SURROGATE'S COURT OF THE STATE OF NEW YORK, KINGS COUNTY\n\
                    PROBATE PETITION\n\
                    Deceased\n\
                    Eleanor Rigby\n\
                    Domicile\n\
                    12 Penny Lane\n\
                    Brooklyn, NY 11215\n\
                    Petitioner\n\
                    Name: Paul McCartney\n\
                    Mailing Address\n\
                    7 Abbey Road\n\
                    Queens, NY 11375\n\
                    Relationship to decedent: nephew\n\
                    Gross value\n\
                    $185,000\n\
                    Attorney\n\
                    George Martin\n\
                    Telephone Number (718) 555-0111\n\
                    gmartin@example.com";
        let doc = PetitionText::from_text(text);
        let fields = FORM_B.parse(&doc);

        assert_eq!(&fields[Field::DeceasedName], "Eleanor Rigby");
        assert_eq!(&fields[Field::PetitionerName], "Paul McCartney");
        assert_eq!(&fields[Field::PropertyAddress], "12 Penny Lane, Brooklyn, NY 11215");
        assert_eq!(&fields[Field::PetitionerAddress], "7 Abbey Road, Queens, NY 11375");
        assert_eq!(&fields[Field::Relationship], "Nephew");
        assert_eq!(&fields[Field::PropertyValue], "185000");
        assert_eq!(&fields[Field::Attorney], "George Martin");
        assert_eq!(&fields[Field::Phone], "718-555-0111");
        assert_eq!(&fields[Field::Email], "gmartin@example.com");
    }

    #[test]
    fn test_every_windowed_layout_is_compiled() {
        for parser in [&FORM_B, &FORM_C, &FORM_D] {
            assert!(COMPILED.contains_key(&parser.form_type()));
        }
    }

    #[test]
    fn test_affidavit_labels() {
        let text = "AFFIDAVIT OF HEIRSHIP\n\
                    Name of Decedent\n\
                    Anna Karenina\n\
                    Name of Affiant\n\
                    Alexei Vronsky\n\
                    Relationship to decedent\n\
                    Son";
        let fields = FORM_C.parse(&PetitionText::from_text(text));
        assert_eq!(&fields[Field::DeceasedName], "Anna Karenina");
        assert_eq!(&fields[Field::PetitionerName], "Alexei Vronsky");
        assert_eq!(&fields[Field::Relationship], "Son");
        assert_eq!(&fields[Field::PropertyValue], "");
    }

    #[test]
    fn test_contact_fields_come_from_signature_block() {
        let text = "SURROGATE'S COURT OF THE STATE OF NEW YORK, KINGS COUNTY\n\
                    Deceased\n\
                    Eleanor Rigby\n\
                    Petitioner\n\
                    Name: Paul McCartney\n\
                    Telephone: (212) 555-0001\n\
                    paul@home.com\n\
                    Relationship to decedent: nephew\n\
                    Signature of Attorney\n\
                    George Martin\n\
                    Telephone: (718) 555-0111\n\
                    gmartin@law.com";
        let fields = FORM_B.parse(&PetitionText::from_text(text));

        assert_eq!(&fields[Field::DeceasedName], "Eleanor Rigby");
        assert_eq!(&fields[Field::PetitionerName], "Paul McCartney");
        assert_eq!(&fields[Field::Attorney], "George Martin");
        assert_eq!(&fields[Field::Phone], "718-555-0111");
        assert_eq!(&fields[Field::Email], "gmartin@law.com");
    }

    #[test]
    fn test_first_labeled_value_wins() {
        let text = "Deceased\n\
                    Eleanor Rigby\n\
                    Petitioner\n\
                    Name: Paul McCartney\n\
                    Deceased\n\
                    Martha Jones\n\
                    Petitioner\n\
                    Name: Ringo Starr";
        let fields = FORM_B.parse(&PetitionText::from_text(text));
        assert_eq!(&fields[Field::DeceasedName], "Eleanor Rigby");
        assert_eq!(&fields[Field::PetitionerName], "Paul McCartney");
    }

    #[test]
    fn test_voluntary_administration_labels() {
        let text = "SMALL ESTATE AFFIDAVIT\n\
                    Decedent\n\
                    Harold Lauder\n\
                    Domicile\n\
                    44 Elm Street\n\
                    Staten Island, NY 10314\n\
                    Voluntary Administrator\n\
                    Frannie Goldsmith\n\
                    Mailing Address\n\
                    9 Pine Road\n\
                    Queens, NY 11375\n\
                    Relationship to decedent: sister\n\
                    Gross value\n\
                    $40,000";
        let fields = FORM_D.parse(&PetitionText::from_text(text));

        assert_eq!(&fields[Field::DeceasedName], "Harold Lauder");
        assert_eq!(&fields[Field::PetitionerName], "Frannie Goldsmith");
        assert_eq!(&fields[Field::PropertyAddress], "44 Elm Street, Staten Island, NY 10314");
        assert_eq!(&fields[Field::PetitionerAddress], "9 Pine Road, Queens, NY 11375");
        assert_eq!(&fields[Field::Relationship], "Sister");
        assert_eq!(&fields[Field::PropertyValue], "40000");
    }
}
