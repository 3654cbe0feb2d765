//! Splitting bundled PDFs into individual petitions.

use std::ops::Range;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TitleKind {
    Administration,
    Probate,
}

const ADMIN_TITLES: [&str; 3] = [
    "administration proceeding",
    "form a-1",
    "petition for letters of administration",
];
const PROBATE_TITLES: [&str; 2] = ["probate proceeding", "form p-1"];

fn title_kind(page: &str) -> Option<TitleKind> {
    let lower = page.to_lowercase();
    if ADMIN_TITLES.iter().any(|t| lower.contains(t)) {
        Some(TitleKind::Administration)
    } else if PROBATE_TITLES.iter().any(|t| lower.contains(t)) {
        Some(TitleKind::Probate)
    } else {
        None
    }
}

/// Page ranges of the petitions bundled in one document.
///
/// A new case starts at a page whose title kind differs from the previous
/// titled page. Pages before the first title belong to the first case. A
/// document with no pages yields a single empty range.
pub fn split_cases<S: AsRef<str>>(pages: &[S]) -> Vec<Range<usize>> {
    let mut starts = vec![0];
    let mut last: Option<TitleKind> = None;

    for (idx, page) in pages.iter().enumerate() {
        let Some(kind) = title_kind(page.as_ref()) else {
            continue;
        };
        if last.is_some_and(|prev| prev != kind) && idx > 0 {
            starts.push(idx);
        }
        last = Some(kind);
    }

    let mut ranges: Vec<Range<usize>> = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| start..starts.get(i + 1).copied().unwrap_or(pages.len()))
        .filter(|r| !r.is_empty())
        .collect();

    if ranges.is_empty() {
        ranges.push(0..pages.len());
    }
    if ranges.len() > 1 {
        debug!("Split {} pages into {} cases", pages.len(), ranges.len());
    }
    ranges
}
