//! Currency parsing for estate values (`$`, comma-grouped).

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{AMOUNT_ONLY_LINE, DOLLAR_AMOUNT, GROUPED_AMOUNT};
use super::{ExtractionMatch, FieldExtractor};

/// Currency amount extractor.
///
/// Prefers `$`-prefixed amounts; falls back to comma-grouped numbers so that
/// zip codes and section numbers are never read as values.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let found = |pattern: &Regex| -> Vec<Self::Output> {
            pattern
                .captures_iter(text)
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    let amount = parse_currency(&caps[1])?;
                    Some(ExtractionMatch::new(amount, whole.as_str()))
                })
                .collect()
        };

        let dollars = found(&DOLLAR_AMOUNT);
        if dollars.is_empty() {
            found(&GROUPED_AMOUNT)
        } else {
            dollars
        }
    }
}

/// Parse a US-formatted amount such as `$1,234,567.00`.
///
/// Scale is preserved, so cents survive formatting.
pub fn parse_currency(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() || cleaned.matches('.').count() > 1 {
        return None;
    }

    Decimal::from_str(cleaned.trim_end_matches('.')).ok()
}

/// Amount on a labeled line, or on the following line when it holds only an amount.
pub fn amount_near_label(lines: &[&str], idx: usize, label_end: usize) -> Option<Decimal> {
    let extractor = AmountExtractor::new();
    let line = lines.get(idx)?;
    if let Some(found) = extractor.extract(&line[label_end.min(line.len())..]) {
        return Some(found.value);
    }
    let next = lines.get(idx + 1)?;
    if AMOUNT_ONLY_LINE.is_match(next) {
        return parse_currency(next);
    }
    None
}

/// Sum of amounts; `None` when there are none or the total overflows.
pub fn sum_amounts<I: IntoIterator<Item = Decimal>>(amounts: I) -> Option<Decimal> {
    let mut amounts = amounts.into_iter();
    let first = amounts.next()?;
    amounts.try_fold(first, |total, amount| total.checked_add(amount))
}

/// Plain decimal string without grouping or currency sign.
pub fn format_amount(amount: Decimal) -> String {
    amount.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_currency() {
        assert_eq!(
            parse_currency("$1,234,567.00"),
            Some(Decimal::from_str("1234567.00").unwrap())
        );
        assert_eq!(format_amount(parse_currency("$1,234,567.00").unwrap()), "1234567.00");
        assert_eq!(parse_currency("$200,000"), Some(Decimal::from(200_000)));
        assert_eq!(parse_currency("no digits"), None);
        assert_eq!(parse_currency("1.2.3"), None);
    }

    #[test]
    fn test_sum_improved_and_personal() {
        let total = sum_amounts([
            parse_currency("$100,000").unwrap(),
            parse_currency("$50,000").unwrap(),
        ])
        .unwrap();
        assert_eq!(format_amount(total), "150000");
        assert_eq!(sum_amounts(Vec::new()), None);
    }

    #[test]
    fn test_sum_overflow_is_none() {
        let huge = parse_currency("$79,228,162,514,264,337,593,543,950,335").unwrap();
        assert_eq!(huge, Decimal::MAX);
        assert_eq!(sum_amounts([huge, huge]), None);
        assert_eq!(sum_amounts([huge]), Some(Decimal::MAX));
    }

    #[test]
    fn test_extractor_prefers_dollar_amounts() {
        let extractor = AmountExtractor::new();
        let found = extractor
            .extract("Staten Island, NY 10314 value $75,500.50")
            .unwrap();
        assert_eq!(found.value, Decimal::from_str("75500.50").unwrap());
        assert_eq!(found.source, "$75,500.50");

        let grouped = extractor.extract("Personal property 12,000").unwrap();
        assert_eq!(grouped.value, Decimal::from(12_000));

        assert!(extractor.extract("Zip Code 10314").is_none());
    }

    #[test]
    fn test_amount_on_following_line() {
        let lines = vec!["Improved real property in New York State", "$200,000", "Other"];
        assert_eq!(amount_near_label(&lines, 0, 40), Some(Decimal::from(200_000)));
        let lines = vec!["Improved real property", "see schedule A"];
        assert_eq!(amount_near_label(&lines, 0, 22), None);
    }
}
