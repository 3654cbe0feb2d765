//! Per-layout field parsers and the helpers they share.

mod form_a;
mod form_admin;
mod generic;
mod windowed;

pub use form_a::FormAParser;
pub use form_admin::FormAdminParser;
pub use generic::GenericParser;
pub use windowed::WindowedParser;
pub(crate) use windowed::table_labels;

use regex::Regex;
use tracing::trace;

use crate::models::FormType;

use super::rules::address::find_addresses;
use super::rules::amounts::{amount_near_label, format_amount, sum_amounts, AmountExtractor};
use super::rules::names::accept_name;
use super::rules::patterns::{
    ATTORNEY_LABEL, ESQ, ESTATE_TOTAL_LABEL, IMPROVED_LABEL, NAME_LABEL, PERSONAL_LABEL,
    UNIMPROVED_LABEL,
};
use super::rules::text::{starts_with_label, trim_separators};
use super::rules::FieldExtractor;
use super::FieldParser;

static FORM_A: FormAParser = FormAParser;
static FORM_ADMIN: FormAdminParser = FormAdminParser;
static GENERIC: GenericParser = GenericParser;

/// Parser for a layout; `Unknown` gets the generic fallback.
pub fn parser_for(form_type: FormType) -> &'static dyn FieldParser {
    match form_type {
        FormType::FormA => &FORM_A,
        FormType::FormAdmin => &FORM_ADMIN,
        FormType::FormB => &windowed::FORM_B,
        FormType::FormC => &windowed::FORM_C,
        FormType::FormD => &windowed::FORM_D,
        FormType::Unknown => &GENERIC,
    }
}

/// Name captured by a caption regex (group 1), or on the next line when the
/// caption line holds nothing after the label.
pub(crate) fn caption_name(lines: &[&str], caption: &Regex) -> Option<String> {
    for (idx, line) in lines.iter().enumerate() {
        let Some(caps) = caption.captures(line) else {
            continue;
        };
        let inline = caps.get(1).map_or("", |m| m.as_str());
        let candidate = if trim_separators(inline).is_empty() {
            match lines.get(idx + 1) {
                Some(next) if !next.is_empty() && !starts_with_label(next) => *next,
                _ => continue,
            }
        } else {
            inline
        };
        if let Some(name) = accept_name(candidate) {
            trace!("Caption name {:?}", name);
            return Some(name);
        }
    }
    None
}

/// Value of the `Name:` line in a block, or the line after a bare `Name:` label.
pub(crate) fn labeled_name(block: &[&str]) -> Option<String> {
    for (idx, line) in block.iter().enumerate() {
        let Some(caps) = NAME_LABEL.captures(line) else {
            continue;
        };
        let inline = trim_separators(&caps[1]);
        if let Some(name) = accept_name(inline) {
            return Some(name);
        }
        if inline.is_empty() {
            if let Some(name) = block.get(idx + 1).and_then(|next| accept_name(next)) {
                return Some(name);
            }
        }
    }
    None
}

/// First candidate that cleans into a plausible person name.
pub(crate) fn first_plausible<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter(|c| !c.is_empty() && !starts_with_label(c))
        .find_map(accept_name)
}

/// Attorney name from the signature region.
///
/// Takes the value after an attorney label, then the line after it, then the
/// line before it (signature lines often sit above the label). Falls back to a
/// line carrying `Esq.`.
pub(crate) fn attorney_from_signature(lines: &[&str]) -> String {
    for (idx, line) in lines.iter().enumerate() {
        let Some(m) = ATTORNEY_LABEL.find(line) else {
            continue;
        };
        let mut candidates = vec![trim_separators(&line[m.end()..])];
        candidates.extend(lines.get(idx + 1).copied());
        if idx > 0 {
            candidates.push(lines[idx - 1]);
        }
        if let Some(name) = first_plausible(candidates) {
            return name;
        }
    }

    lines
        .iter()
        .filter(|l| ESQ.is_match(l))
        .find_map(|l| accept_name(l))
        .unwrap_or_default()
}

/// Sum of the improved, unimproved and personal property subtotals, or the
/// estate total line when no subtotal is stated. Empty when nothing is found.
pub(crate) fn summed_property_value(lines: &[&str]) -> String {
    let subtotals = [&*IMPROVED_LABEL, &*UNIMPROVED_LABEL, &*PERSONAL_LABEL]
        .into_iter()
        .filter_map(|label| first_amount_after(lines, label));

    if let Some(total) = sum_amounts(subtotals) {
        return format_amount(total);
    }
    first_amount_after(lines, &ESTATE_TOTAL_LABEL)
        .map(format_amount)
        .unwrap_or_default()
}

fn first_amount_after(lines: &[&str], label: &Regex) -> Option<rust_decimal::Decimal> {
    lines.iter().enumerate().find_map(|(idx, line)| {
        let m = label.find(line)?;
        amount_near_label(lines, idx, m.end())
    })
}

/// First amount in any window.
pub(crate) fn amount_in_windows(windows: &[String]) -> String {
    let extractor = AmountExtractor::new();
    windows
        .iter()
        .find_map(|w| extractor.extract(w))
        .map(|m| {
            trace!("Window amount {} from {:?}", m.value, m.source);
            format_amount(m.value)
        })
        .unwrap_or_default()
}

/// First address found within a window around the first keyword hit.
pub(crate) fn address_near_keywords(text: &str, keywords: &[&str]) -> String {
    let lower = text.to_lowercase();
    for keyword in keywords {
        let Some(start) = lower.find(keyword) else {
            continue;
        };
        // Lower-casing keeps ASCII offsets; clamp to char boundaries for the rest.
        let from = floor_char_boundary(text, start.saturating_sub(150));
        let to = floor_char_boundary(text, (start + 300).min(text.len()));
        let addresses = find_addresses(&text[from..to]);
        if let Some(found) = addresses
            .iter()
            .find(|a| !a.to_lowercase().contains("hospital"))
            .or(addresses.first())
        {
            return found.clone();
        }
    }
    String::new()
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
