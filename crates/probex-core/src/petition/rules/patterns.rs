//! Common regex patterns for probate petition extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// States seen on New York petitions, full name and postal code.
pub const STATES: &[(&str, &str)] = &[
    ("new york", "NY"),
    ("new jersey", "NJ"),
    ("connecticut", "CT"),
    ("pennsylvania", "PA"),
    ("florida", "FL"),
    ("california", "CA"),
    ("texas", "TX"),
    ("georgia", "GA"),
    ("illinois", "IL"),
    ("massachusetts", "MA"),
    ("north carolina", "NC"),
    ("south carolina", "SC"),
    ("virginia", "VA"),
    ("maryland", "MD"),
    ("arizona", "AZ"),
];

/// Labels shared by the numbered petition forms.
const COMMON_LABELS: &str = r"name\s*:|domicile\b|citizenship\b|mailing\s+address\b|city,?\s+village\b|state\s*:|zip\s+code\b|telephone\b|tel\.?\s*(?:no\.?)?\s*:|phone\b|e-?mail\b|relationship\b|distributee\b|interest\(?s?\)?\s+of\b|print\s+name\b|signature\s+of\b|attorney\s+for\b|firm\s+name\b|date\s+of\s+death\b|place\s+of\s+death\b|letters\b|temporary\b|file\s+no\b|citations?\b|petition(?:er)?\b|deceased\b|executor\b|beneficiary\b|improved\s+real\b|unimproved\s+real\b|personal\s+property\b|also\s+known\s+as\b";

lazy_static! {
    // Whitespace
    pub static ref INLINE_WS: Regex = Regex::new(r"[ \t\u{00a0}]+").unwrap();

    pub static ref MULTI_WS: Regex = Regex::new(r"\s+").unwrap();

    // Labels of every layout. A capture that runs into one of these is cut there.
    pub static ref UNIVERSAL_LABEL: Regex = Regex::new(&format!(
        r"(?i)\b(?:{}|{})",
        COMMON_LABELS,
        layout_label_alternation()
    )).unwrap();

    // Start of the attorney/signature region
    pub static ref SIGNATURE_BLOCK: Regex = Regex::new(
        r"(?i)signature\s+of\s+attorney|print\s+name\s+of\s+attorney|attorney\s+for\s+petitioner|name\s+of\s+attorney|attorney\s+information"
    ).unwrap();

    // Names
    pub static ref AKA: Regex = Regex::new(
        r"(?i)\b(?:a\s*/\s*k\s*/\s*a|f\s*/\s*k\s*/\s*a|aka|alka|alkia|also\s+known\s+as|formerly\s+known\s+as)\b"
    ).unwrap();

    pub static ref BRACKETED: Regex = Regex::new(r"\([^)]*\)|\[[^\]]*\]").unwrap();

    pub static ref NON_NAME_CHARS: Regex = Regex::new(r"[^A-Za-z .,'\-]").unwrap();

    pub static ref ESQ: Regex = Regex::new(r"(?i),?\s*\besq\b\.?").unwrap();

    pub static ref ESTATE_OF: Regex = Regex::new(
        r"(?i)\b(?:estate|will)\s+of\b[\s:_]*(.*)$"
    ).unwrap();

    pub static ref ADMIN_ESTATE_OF: Regex = Regex::new(
        r"(?is)administration\s+proceeding[^\n]{0,60}?estate\s+of[\s:_]*([^\n]*)"
    ).unwrap();

    pub static ref NAME_LABEL: Regex = Regex::new(
        r"(?i)^(?:\([a-z]\)\s*)?(?:full\s+)?name\s*(?:of\s+[a-z]+\s*)?[:\-]\s*(.*)$"
    ).unwrap();

    pub static ref LETTERS_TO: Regex = Regex::new(
        r"(?i)letters\s+(?:testamentary|of\s+administration)\s+(?:issue\s+)?to[:\s]+([A-Z][A-Za-z .,'\-]+)"
    ).unwrap();

    // Blocks
    pub static ref PETITIONER_BLOCK: Regex = Regex::new(
        r"(?i)petitioner\s+information|petitioners?\s+(?:is|are)\s+as\s+follows"
    ).unwrap();

    pub static ref DECEDENT_BLOCK: Regex = Regex::new(
        r"(?i)decedent\s+information|decedent\s+(?:is|are)\s+as\s+follows"
    ).unwrap();

    pub static ref BLOCK_END: Regex = Regex::new(
        r"(?i)^(?:\(?\d{1,2}[.)]\s|decedent\s+information|petitioner\s+information|signature\b|print\s+name\b|interested\s+parties|\x0c)"
    ).unwrap();

    // Addresses
    pub static ref DOMICILE_LABEL: Regex = Regex::new(
        r"(?i)^(?:\([a-z]\)\s*)?(?:domicile(?:\s+or\s+principal\s+office)?(?:\s+address)?|mailing\s+address|residence(?:\s+address)?|address)\s*(?:\([^)]*\))?\s*[:\-]?\s*(?:street(?:\s+and\s+number)?\s*:?)?\s*(.*)$"
    ).unwrap();

    pub static ref MY_DOMICILE: Regex = Regex::new(
        r"(?i)my\s+domicile\s+is[:\s]*(.*)$"
    ).unwrap();

    pub static ref CITY_LABEL: Regex = Regex::new(
        r"(?i)^(?:\([a-z]\)\s*)?city(?:,?\s*(?:village|town)(?:\s+or\s+town)?)?\s*[:\-]?\s*(.*)$"
    ).unwrap();

    pub static ref STATE_ZIP: Regex = Regex::new(
        r"(?i)\bstate\s*:?\s*([A-Za-z][A-Za-z .]*?)\s*,?\s*zip(?:\s*code)?\s*:?\s*(\d{5}(?:-\d{4})?)"
    ).unwrap();

    pub static ref STATE_LABEL: Regex = Regex::new(
        r"(?i)^(?:\([a-z]\)\s*)?state\s*[:\-]?\s*([A-Za-z][A-Za-z .]*)$"
    ).unwrap();

    pub static ref STATE_WORD: Regex = Regex::new(r"(?i)\bstate\b").unwrap();

    pub static ref ZIP_LABEL: Regex = Regex::new(
        r"(?i)\bzip(?:\s*code)?\s*[:\-]?\s*(\d{5}(?:-\d{4})?)"
    ).unwrap();

    pub static ref STATE_NAME: Regex = Regex::new(&format!(
        r"(?i)^(.*?)[\s,]*\b({})\.?(?:\s*,?\s*(\d{{5}}(?:-\d{{4}})?))?$",
        state_alternation()
    )).unwrap();

    pub static ref CITY_STATE_ZIP: Regex = Regex::new(&format!(
        r"(?i)^([A-Za-z][A-Za-z .'\-]*?),?\s+({})\.?,?\s+(\d{{5}}(?:-\d{{4}})?)$",
        state_alternation()
    )).unwrap();

    pub static ref STREET_LINE: Regex = Regex::new(
        r"(?i)^\d{1,6}[A-Za-z]?(?:-\d{1,4})?\s+(?:[A-Za-z0-9.'\-]+\s+){0,5}?(?:street|st|avenue|ave|road|rd|drive|dr|lane|ln|boulevard|blvd|court|ct|place|pl|way|parkway|pkwy|terrace|ter|loop|circle|cir|highway|hwy|turnpike|tpke|plaza|square|sq)\b\.?"
    ).unwrap();

    pub static ref ZIP: Regex = Regex::new(r"\b\d{5}(?:-\d{4})?\b").unwrap();

    pub static ref STATEN_ISLAND_REPEAT: Regex = Regex::new(
        r"(?i)\b(?:ss\s+)?staten\s+island(?:[\s,]+(?:ss\s+)?staten\s+island)*\b"
    ).unwrap();

    pub static ref ADDRESS_BANNED: Regex = Regex::new(
        r"(?i)\b(?:beneficiary|executor|executrix|trustee|distributee|residuary|estate\s+of|petitioner|relationship|citizenship|telephone|e-?mail)\b"
    ).unwrap();

    // Amounts
    pub static ref DOLLAR_AMOUNT: Regex = Regex::new(
        r"\$\s*((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{1,2})?)"
    ).unwrap();

    pub static ref GROUPED_AMOUNT: Regex = Regex::new(
        r"\b(\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?)\b"
    ).unwrap();

    pub static ref AMOUNT_ONLY_LINE: Regex = Regex::new(
        r"^\$?\s*(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{1,2})?$"
    ).unwrap();

    pub static ref IMPROVED_LABEL: Regex = Regex::new(r"(?i)\bimproved\s+real\s+property").unwrap();

    pub static ref UNIMPROVED_LABEL: Regex = Regex::new(r"(?i)\bunimproved\s+real\s+property").unwrap();

    pub static ref PERSONAL_LABEL: Regex = Regex::new(r"(?i)\bpersonal\s+property").unwrap();

    pub static ref ESTATE_TOTAL_LABEL: Regex = Regex::new(
        r"(?i)\b(?:estimated\s+)?(?:gross\s+(?:value|estate)|total\s+(?:value|estate|gross)|value\s+of\s+(?:the\s+)?(?:estate|property))\b"
    ).unwrap();

    // Contact
    pub static ref PHONE: Regex = Regex::new(
        r"(?:\(\s*(\d{3})\s*\)|\b(\d{3}))[\s.\-]?(\d{3})[\s.\-]?(\d{4})\b"
    ).unwrap();

    pub static ref EMAIL: Regex = Regex::new(
        r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}"
    ).unwrap();

    // Relationship
    pub static ref RELATIONSHIP_TERM: Regex = Regex::new(
        r"(?i)\b(domestic\s+partner|spouse|husband|wife|granddaughter|grandson|grandchild|daughter|son|brother|sister|mother|father|parent|niece|nephew|cousin|child)\b"
    ).unwrap();

    pub static ref RELATIONSHIP_LABEL: Regex = Regex::new(
        r"(?i)relationship\)?(?:\s+to\s+(?:the\s+)?decedent)?\s*[:\-]?|distributee\s+of\s+(?:the\s+)?decedent"
    ).unwrap();

    // Attorney
    pub static ref ATTORNEY_LABEL: Regex = Regex::new(
        r"(?i)print\s+name\s+of\s+attorney|name\s+of\s+attorney|attorney\s+name|attorney\s+for\s+petitioner\(?s?\)?"
    ).unwrap();
}

fn state_alternation() -> String {
    let mut names: Vec<String> = STATES
        .iter()
        .flat_map(|(name, code)| [name.replace(' ', r"\s+"), (*code).to_string()])
        .collect();
    // Longest alternatives first.
    names.sort_by(|a, b| b.len().cmp(&a.len()));
    names.join("|")
}

/// Alternation of the windowed layouts' label tables, longest first.
fn layout_label_alternation() -> String {
    let mut labels: Vec<String> = crate::petition::forms::table_labels()
        .map(|label| format!(r"{}\b", regex::escape(label).replace(' ', r"\s+")))
        .collect();
    labels.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    labels.dedup();
    labels.join("|")
}

/// Postal code for a state name or code, if known.
pub fn state_code(raw: &str) -> Option<&'static str> {
    let cleaned = MULTI_WS.replace_all(raw.trim().trim_end_matches('.'), " ").to_lowercase();
    STATES
        .iter()
        .find(|(name, code)| *name == cleaned || code.eq_ignore_ascii_case(&cleaned))
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_code() {
        assert_eq!(state_code("New  Jersey"), Some("NJ"));
        assert_eq!(state_code("ny"), Some("NY"));
        assert_eq!(state_code("Ontario"), None);
    }

    #[test]
    fn test_universal_label_stops_inside_word() {
        assert!(UNIVERSAL_LABEL.find("Staten Island").is_none());
        assert!(UNIVERSAL_LABEL.find("Mary Smith Relationship: Wife").is_some());
    }

    #[test]
    fn test_universal_label_covers_every_layout() {
        for label in crate::petition::forms::table_labels() {
            let found = UNIVERSAL_LABEL.find(label).map(|m| m.start());
            assert_eq!(found, Some(0), "{label}");
        }
        assert!(UNIVERSAL_LABEL.is_match("Mary Jones, Deponent"));
        assert!(UNIVERSAL_LABEL.find("Counselor Troi").is_none());
    }

    #[test]
    fn test_improved_does_not_match_unimproved() {
        assert!(!IMPROVED_LABEL.is_match("Unimproved real property $10,000"));
        assert!(IMPROVED_LABEL.is_match("Improved real property in New York State"));
    }
}
