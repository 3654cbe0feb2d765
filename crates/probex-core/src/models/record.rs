//! Extracted petition record and its closed enumerations.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

use crate::error::ExtractionError;

/// One of the nine target fields, in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "Deceased Property Address")]
    PropertyAddress,
    #[serde(rename = "Deceased Name")]
    DeceasedName,
    #[serde(rename = "Petitioner Name")]
    PetitionerName,
    #[serde(rename = "Petitioner Address")]
    PetitionerAddress,
    #[serde(rename = "Relationship")]
    Relationship,
    #[serde(rename = "Property Value")]
    PropertyValue,
    #[serde(rename = "Attorney")]
    Attorney,
    #[serde(rename = "Phone Number")]
    Phone,
    #[serde(rename = "Email Address")]
    Email,
}

impl Field {
    /// All fields in fixed output order.
    pub const ALL: [Field; 9] = [
        Field::PropertyAddress,
        Field::DeceasedName,
        Field::PetitionerName,
        Field::PetitionerAddress,
        Field::Relationship,
        Field::PropertyValue,
        Field::Attorney,
        Field::Phone,
        Field::Email,
    ];

    /// Column header used in CSV output and JSON records.
    pub fn column_name(self) -> &'static str {
        match self {
            Field::PropertyAddress => "Deceased Property Address",
            Field::DeceasedName => "Deceased Name",
            Field::PetitionerName => "Petitioner Name",
            Field::PetitionerAddress => "Petitioner Address",
            Field::Relationship => "Relationship",
            Field::PropertyValue => "Property Value",
            Field::Attorney => "Attorney",
            Field::Phone => "Phone Number",
            Field::Email => "Email Address",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// The nine field values of a record. Unresolved fields hold an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields([String; 9]);

impl RecordFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        &self.0[field.index()]
    }

    /// Set a field, trimming surrounding whitespace.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        self.0[field.index()] = value.trim().to_string();
    }

    pub fn clear(&mut self, field: Field) {
        self.0[field.index()].clear();
    }

    pub fn is_empty(&self, field: Field) -> bool {
        self.0[field.index()].is_empty()
    }

    /// Iterate `(field, value)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL.iter().map(move |&f| (f, self.get(f)))
    }

    /// Fields whose value is the empty string, in output order.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|&f| self.is_empty(f)).collect()
    }

    /// Values in column order, for tabular writers.
    pub fn as_row(&self) -> [&str; 9] {
        Field::ALL.map(|f| self.get(f))
    }
}

impl Index<Field> for RecordFields {
    type Output = str;

    fn index(&self, field: Field) -> &str {
        self.get(field)
    }
}

impl Serialize for RecordFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Field::ALL.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.column_name(), value)?;
        }
        map.end()
    }
}

/// Known petition layouts.
///
/// Declaration order is the classification tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormType {
    /// Probate petition (P-1 family).
    FormA,
    /// Petition for letters of administration (A-1).
    FormAdmin,
    /// Kings/Queens style probate petition.
    FormB,
    /// Affidavit of heirship / renunciation packets.
    FormC,
    /// Voluntary administration / small estate.
    FormD,
    /// No known layout matched.
    Unknown,
}

impl FormType {
    /// Known variants in priority order, excluding `Unknown`.
    pub const KNOWN: [FormType; 5] = [
        FormType::FormA,
        FormType::FormAdmin,
        FormType::FormB,
        FormType::FormC,
        FormType::FormD,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FormType::FormA => "FORM_A",
            FormType::FormAdmin => "FORM_ADMIN",
            FormType::FormB => "FORM_B",
            FormType::FormC => "FORM_C",
            FormType::FormD => "FORM_D",
            FormType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormType {
    type Err = ExtractionError;

    /// Accepts `FORM_A`, `form-a`, `a`, `admin` and similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        let short = upper.strip_prefix("FORM_").unwrap_or(&upper);
        match short {
            "A" => Ok(FormType::FormA),
            "ADMIN" => Ok(FormType::FormAdmin),
            "B" => Ok(FormType::FormB),
            "C" => Ok(FormType::FormC),
            "D" => Ok(FormType::FormD),
            "UNKNOWN" | "GENERIC" => Ok(FormType::Unknown),
            _ => Err(ExtractionError::Parse {
                field: "form_type".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// How the document text was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionMethod {
    /// Embedded text layer only.
    Text,
    /// Every page rasterized and OCR'd.
    Ocr,
    /// Text layer with individual blank pages OCR'd.
    Mixed,
}

impl ExtractionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMethod::Text => "TEXT",
            ExtractionMethod::Ocr => "OCR",
            ExtractionMethod::Mixed => "MIXED",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extraction output for one document (or one case inside a bundled document).
///
/// Built once and immutable afterwards. `missing_fields` is derived from the
/// field values at construction, so it always equals the set of empty fields.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractedRecord {
    fields: RecordFields,
    form_type: FormType,
    confidence_score: f32,
    matched_markers: Vec<String>,
    extraction_method: ExtractionMethod,
    missing_fields: Vec<Field>,
}

impl ExtractedRecord {
    pub fn new(
        fields: RecordFields,
        form_type: FormType,
        confidence_score: f32,
        matched_markers: Vec<String>,
        extraction_method: ExtractionMethod,
    ) -> Self {
        let missing_fields = fields.missing();
        Self {
            fields,
            form_type,
            confidence_score,
            matched_markers,
            extraction_method,
            missing_fields,
        }
    }

    pub fn fields(&self) -> &RecordFields {
        &self.fields
    }

    pub fn get(&self, field: Field) -> &str {
        self.fields.get(field)
    }

    pub fn form_type(&self) -> FormType {
        self.form_type
    }

    pub fn confidence_score(&self) -> f32 {
        self.confidence_score
    }

    pub fn matched_markers(&self) -> &[String] {
        &self.matched_markers
    }

    pub fn extraction_method(&self) -> ExtractionMethod {
        self.extraction_method
    }

    pub fn missing_fields(&self) -> &[Field] {
        &self.missing_fields
    }

    /// Copy of this record with one field blanked.
    pub fn with_field_cleared(&self, field: Field) -> Self {
        let mut fields = self.fields.clone();
        fields.clear(field);
        Self::new(
            fields,
            self.form_type,
            self.confidence_score,
            self.matched_markers.clone(),
            self.extraction_method,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_fields_match_empty_values() {
        let mut fields = RecordFields::new();
        fields.set(Field::DeceasedName, "JOHN SMITH");
        fields.set(Field::PropertyValue, "200000");
        fields.set(Field::Email, "   ");

        let record = ExtractedRecord::new(
            fields,
            FormType::FormA,
            0.5,
            vec!["improved real property in new york state".to_string()],
            ExtractionMethod::Text,
        );

        let expected: Vec<Field> = Field::ALL
            .into_iter()
            .filter(|f| record.get(*f).is_empty())
            .collect();
        assert_eq!(record.missing_fields(), expected.as_slice());
        assert!(record.missing_fields().contains(&Field::Email));
        assert!(!record.missing_fields().contains(&Field::DeceasedName));
    }

    #[test]
    fn test_record_serializes_all_columns_in_order() {
        let mut fields = RecordFields::new();
        fields.set(Field::Attorney, "Jane Roe");
        let json = serde_json::to_string(&fields).unwrap();

        assert_eq!(
            json,
            "{\"Deceased Property Address\":\"\",\"Deceased Name\":\"\",\"Petitioner Name\":\"\",\
             \"Petitioner Address\":\"\",\"Relationship\":\"\",\"Property Value\":\"\",\
             \"Attorney\":\"Jane Roe\",\"Phone Number\":\"\",\"Email Address\":\"\"}"
        );
    }

    #[test]
    fn test_form_type_names() {
        assert_eq!(FormType::FormAdmin.to_string(), "FORM_ADMIN");
        assert_eq!(serde_json::to_string(&FormType::FormA).unwrap(), "\"FORM_A\"");
        assert_eq!("form-admin".parse::<FormType>().unwrap(), FormType::FormAdmin);
        assert_eq!("b".parse::<FormType>().unwrap(), FormType::FormB);
        assert!("form-z".parse::<FormType>().is_err());
    }

    #[test]
    fn test_field_serializes_as_column_name() {
        let json = serde_json::to_string(&vec![Field::Phone, Field::PropertyAddress]).unwrap();
        assert_eq!(json, "[\"Phone Number\",\"Deceased Property Address\"]");
    }
}
