//! Person-name cleaning: alias stripping and plausibility checks.

use super::patterns::{AKA, BRACKETED, ESQ, MULTI_WS, NON_NAME_CHARS};
use super::text::truncate_at_label;

/// Words that mark a capture as form boilerplate rather than a person.
const LABEL_NOISE: &[&str] = &[
    "petitioner", "petitioners", "decedent", "deceased", "estate", "name", "names",
    "address", "domicile", "attorney", "signature", "surrogate", "surrogates", "court",
    "county", "state", "city", "street", "zip", "telephone", "email", "relationship",
    "distributee", "interest", "citizenship", "print", "firm", "file", "number",
    "proceeding", "petition", "letters", "administration", "probate", "will", "form",
    "section", "schedule", "value", "property", "none", "other", "specify", "applicable",
    "affiant", "deponent", "applicant", "informant", "counsel", "administrator",
];

/// Remove alias suffixes and bracketed text.
///
/// `Jane Doe (a/k/a Jane A. Doe)` becomes `Jane Doe`.
pub fn strip_aka(raw: &str) -> String {
    let cut = match AKA.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    };
    let without_brackets = BRACKETED.replace_all(cut, " ");
    let collapsed = MULTI_WS.replace_all(&without_brackets, " ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '-' | '(' | '[' | ')' | ']'))
        .to_string()
}

/// Clean a captured person name, preserving its case.
///
/// Strips aliases, trailing labels, `Esq.` and stray characters.
pub fn clean_person_name(raw: &str) -> String {
    let name = strip_aka(raw);
    let name = truncate_at_label(&name);
    let name = ESQ.replace_all(name, "");
    let name = NON_NAME_CHARS.replace_all(&name, " ");
    let name = MULTI_WS.replace_all(&name, " ");
    name.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '-' | '\'' | '.'))
        .to_string()
}

/// True when the text is made of form-label words.
pub fn is_label_noise(text: &str) -> bool {
    let words: Vec<String> = text
        .split(|c: char| !c.is_ascii_alphabetic() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(|w| w.trim_end_matches("'s").to_ascii_lowercase())
        .collect();
    words.iter().any(|w| LABEL_NOISE.contains(&w.as_str()))
}

/// Two to six alphabetic tokens, no digits, no label words.
pub fn plausible_name(name: &str) -> bool {
    if name.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    let tokens: Vec<&str> = name.split_whitespace().collect();
    if !(2..=6).contains(&tokens.len()) {
        return false;
    }
    let letters = name.chars().filter(|c| c.is_ascii_alphabetic()).count();
    letters >= 4 && !is_label_noise(name)
}

/// Clean a candidate and accept it only when it is a plausible name.
pub fn accept_name(raw: &str) -> Option<String> {
    let cleaned = clean_person_name(raw);
    plausible_name(&cleaned).then_some(cleaned)
}

/// Case- and whitespace-insensitive containment, used to verify a name occurs in a document.
pub fn name_in_text(name: &str, text: &str) -> bool {
    let squash = |s: &str| {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase()
    };
    let needle = squash(name);
    !needle.is_empty() && squash(text).contains(&needle)
}
