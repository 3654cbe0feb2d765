//! Whitespace normalization, line splitting and label windows.

use regex::Regex;

use super::patterns::{BLOCK_END, INLINE_WS, UNIVERSAL_LABEL};

/// Page-boundary marker placed on its own line between pages.
pub const PAGE_BREAK: char = '\u{000C}';

/// Normalize line endings and whitespace.
///
/// Runs of spaces/tabs become one space, lines are trimmed, and runs of blank
/// lines collapse to a single blank line. Idempotent.
pub fn normalize_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut out: Vec<String> = Vec::new();
    for line in unified.split('\n') {
        let line = INLINE_WS.replace_all(line, " ");
        let line = line.trim_matches(' ');
        if line.is_empty() && out.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        out.push(line.to_string());
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Character count of the normalized text, the measure used for OCR decisions.
pub fn normalized_len(raw: &str) -> usize {
    normalize_text(raw).chars().count()
}

/// Join per-page texts with a page-break line between them.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let marker = format!("\n{}\n", PAGE_BREAK);
    pages
        .iter()
        .map(|p| p.as_ref().trim_matches('\n'))
        .collect::<Vec<_>>()
        .join(&marker)
}

/// Trimmed lines, blank lines kept (they terminate captures).
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).collect()
}

/// Cut `value` at the first known label that does not start it.
pub fn truncate_at_label(value: &str) -> &str {
    let cut = UNIVERSAL_LABEL
        .find_iter(value)
        .find(|m| m.start() > 0)
        .map(|m| m.start())
        .unwrap_or(value.len());
    value[..cut].trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | ';' | '-' | '(' | '_'))
}

/// Text after the first match of `label` in `line`, stripped of separators.
pub fn value_after<'a>(line: &'a str, label: &Regex) -> Option<&'a str> {
    let m = label.find(line)?;
    Some(trim_separators(&line[m.end()..]))
}

/// Strip form-filler separators (colons, underscores, dashes) around a value.
pub fn trim_separators(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '_' | '-' | '.' | ','))
}

/// Joined snippets of up to `max_lines` non-blank lines after each line matching a label.
pub fn window_after_labels(
    lines: &[&str],
    labels: &[&Regex],
    max_lines: usize,
    include_current: bool,
) -> Vec<String> {
    let mut windows = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        for label in labels {
            if !label.is_match(line) {
                continue;
            }
            let start = if include_current { idx } else { idx + 1 };
            let end = (start + max_lines).min(lines.len());
            let snippet = lines[start.min(end)..end]
                .iter()
                .filter(|l| !l.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("\n");
            if !snippet.is_empty() {
                windows.push(snippet);
            }
        }
    }
    windows
}

/// First line of a snippet.
pub fn first_line(snippet: &str) -> &str {
    snippet.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}

/// Value for a labeled line: the rest of the line, or the next non-blank line
/// when the label stands alone. Captures stop at the next known label.
pub fn capture_after_label(lines: &[&str], label: &Regex) -> Option<String> {
    for (idx, line) in lines.iter().enumerate() {
        let Some(rest) = value_after(line, label) else {
            continue;
        };
        let rest = truncate_at_label(rest);
        if !rest.is_empty() {
            return Some(rest.to_string());
        }
        let next = lines.get(idx + 1).copied().unwrap_or("");
        if next.is_empty() || starts_with_label(next) {
            continue;
        }
        let next = truncate_at_label(next);
        if !next.is_empty() {
            return Some(next.to_string());
        }
    }
    None
}

/// True when the line opens with a known label.
pub fn starts_with_label(line: &str) -> bool {
    UNIVERSAL_LABEL.find(line).is_some_and(|m| m.start() == 0)
}

/// Lines of the block opened by the first line matching `start`.
///
/// The block ends at the next numbered section, block header, signature line or
/// page break, or after `max_lines` lines.
pub fn block_after<'a>(lines: &[&'a str], start: &Regex, max_lines: usize) -> Option<Vec<&'a str>> {
    let idx = lines.iter().position(|l| start.is_match(l))?;
    let block = lines[idx + 1..]
        .iter()
        .take(max_lines)
        .take_while(|l| !BLOCK_END.is_match(l))
        .copied()
        .collect();
    Some(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;
    use pretty_assertions::assert_eq;

    lazy_static! {
        static ref ESTATE: Regex = Regex::new(r"(?i)estate\s+of").unwrap();
    }

    #[test]
    fn test_normalize_text() {
        let raw = "  ESTATE  OF\t JOHN SMITH \r\n\r\n\r\n\nName:   Mary\n\n";
        assert_eq!(normalize_text(raw), "ESTATE OF JOHN SMITH\n\nName: Mary");
    }

    #[test]
    fn test_normalize_text_is_idempotent() {
        let raw = "A  b\n\n\n  c\t\td \n\u{000C}\n e ";
        let once = normalize_text(raw);
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn test_join_pages_keeps_page_break_line() {
        let joined = join_pages(&["page one\n", "page two"]);
        assert_eq!(joined, "page one\n\u{000C}\npage two");
        assert_eq!(normalize_text(&joined), joined);
    }

    #[test]
    fn test_truncate_at_label() {
        assert_eq!(truncate_at_label("Mary Smith Relationship: Wife"), "Mary Smith");
        assert_eq!(truncate_at_label("JOHN SMITH, Deceased"), "JOHN SMITH");
        assert_eq!(truncate_at_label("Relationship: Wife"), "Relationship: Wife");
    }

    #[test]
    fn test_truncate_at_other_layouts_labels() {
        assert_eq!(truncate_at_label("JOHN SMITH Affiant Mary Jones"), "JOHN SMITH");
        assert_eq!(truncate_at_label("Ann Lee, Voluntary Administrator"), "Ann Lee");
        assert_eq!(truncate_at_label("George Martin Law Firm"), "George Martin");
        assert_eq!(truncate_at_label("Ruth Bader Counsel"), "Ruth Bader");
    }

    #[test]
    fn test_capture_after_label_uses_next_line() {
        let lines = vec!["ESTATE OF", "JOHN SMITH", "", "File No. 2024-100"];
        assert_eq!(capture_after_label(&lines, &ESTATE).as_deref(), Some("JOHN SMITH"));

        let inline = vec!["ESTATE OF: JANE DOE a/k/a JANE A. DOE, Deceased"];
        assert_eq!(
            capture_after_label(&inline, &ESTATE).as_deref(),
            Some("JANE DOE a/k/a JANE A. DOE")
        );
    }

    #[test]
    fn test_capture_after_label_stops_at_blank() {
        let lines = vec!["ESTATE OF", "", "JOHN SMITH"];
        assert_eq!(capture_after_label(&lines, &ESTATE), None);
    }

    #[test]
    fn test_block_after_stops_at_next_section() {
        let lines = vec![
            "1. The petitioners are as follows:",
            "Name: Mary Smith",
            "Domicile: 16 Ada Drive",
            "2. The decedent is as follows:",
            "Name: John Smith",
        ];
        let start = Regex::new(r"(?i)petitioners\s+are\s+as\s+follows").unwrap();
        let block = block_after(&lines, &start, 20).unwrap();
        assert_eq!(block, vec!["Name: Mary Smith", "Domicile: 16 Ada Drive"]);
    }

    #[test]
    fn test_window_after_labels() {
        let lines = vec!["Relationship", "", "Son", "Other"];
        let windows = window_after_labels(&lines, &[&*ESTATE, &Regex::new("(?i)relationship").unwrap()], 2, false);
        assert_eq!(windows, vec!["Son".to_string()]);
    }
}
