//! Relationship-to-decedent normalization.

use regex::Regex;

use super::patterns::RELATIONSHIP_TERM;

/// Canonical relationship for the first known term in the text; empty if none.
///
/// Husband and wife are reported as `Spouse`; other terms are title-cased.
pub fn normalize_relationship(text: &str) -> String {
    RELATIONSHIP_TERM
        .captures(text)
        .map(|caps| canonical(&caps[1]))
        .unwrap_or_default()
}

/// Relationship stated right after a label in `line`, or on the next line.
pub fn relationship_after_label(lines: &[&str], label: &Regex) -> String {
    for (idx, line) in lines.iter().enumerate() {
        let Some(m) = label.find(line) else {
            continue;
        };
        let found = normalize_relationship(&line[m.end()..]);
        if !found.is_empty() {
            return found;
        }
        if let Some(next) = lines.get(idx + 1) {
            let found = normalize_relationship(next);
            if !found.is_empty() {
                return found;
            }
        }
    }
    String::new()
}

/// True when the value is one of the canonical relationships.
pub fn is_known_relationship(value: &str) -> bool {
    !value.is_empty() && normalize_relationship(value) == value
}

fn canonical(term: &str) -> String {
    let lower = term.to_ascii_lowercase();
    let lower = lower.split_whitespace().collect::<Vec<_>>().join(" ");
    match lower.as_str() {
        "husband" | "wife" | "spouse" => "Spouse".to_string(),
        "domestic partner" => "Domestic Partner".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::petition::rules::patterns::RELATIONSHIP_LABEL;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_relationship() {
        assert_eq!(normalize_relationship("Wife"), "Spouse");
        assert_eq!(normalize_relationship("surviving HUSBAND"), "Spouse");
        assert_eq!(normalize_relationship("the daughter of decedent"), "Daughter");
        assert_eq!(normalize_relationship("Johnson, person"), "");
    }

    #[test]
    fn test_relationship_after_label() {
        let lines = vec![
            "Interest(s) of Petitioner(s):",
            "Distributee of decedent (state relationship) Son",
        ];
        assert_eq!(relationship_after_label(&lines, &RELATIONSHIP_LABEL), "Son");

        let lines = vec!["Relationship to Decedent:", "Niece"];
        assert_eq!(relationship_after_label(&lines, &RELATIONSHIP_LABEL), "Niece");
    }

    #[test]
    fn test_is_known_relationship() {
        assert!(is_known_relationship("Spouse"));
        assert!(is_known_relationship("Grandson"));
        assert!(!is_known_relationship("Friend"));
        assert!(!is_known_relationship("wife"));
    }
}
