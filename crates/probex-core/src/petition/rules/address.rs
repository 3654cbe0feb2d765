//! Address assembly and normalization.

use super::patterns::{
    state_code, ADDRESS_BANNED, CITY_LABEL, CITY_STATE_ZIP, DOMICILE_LABEL, MULTI_WS,
    STATEN_ISLAND_REPEAT, STATE_LABEL, STATE_NAME, STATE_WORD, STATE_ZIP, STREET_LINE, ZIP, ZIP_LABEL,
};
use super::text::trim_separators;

/// Collapse a (possibly multi-line) address into `street, city, ST zip`.
///
/// Drops parts contaminated by role text (beneficiary, executor, ...),
/// collapses repeated "Staten Island" boilerplate, maps state names to postal
/// codes and removes adjacent duplicates. Idempotent.
pub fn normalize_address(raw: &str) -> String {
    let joined = raw.replace(['\n', ';'], ", ");
    let joined = STATEN_ISLAND_REPEAT.replace_all(&joined, "Staten Island");
    let joined = MULTI_WS.replace_all(&joined, " ");

    let mut parts: Vec<String> = joined
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter(|p| !ADDRESS_BANNED.is_match(p))
        .map(title_case_place)
        .collect();

    if let Some(last) = parts.pop() {
        parts.extend(split_state_part(&last));
    }

    parts.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    parts.join(", ")
}

/// Split a trailing `City State Zip` part into `City` and `ST Zip`.
fn split_state_part(part: &str) -> Vec<String> {
    let Some(caps) = STATE_NAME.captures(part) else {
        return vec![part.to_string()];
    };
    let prefix = caps.get(1).map_or("", |m| m.as_str()).trim_matches(|c: char| c.is_whitespace() || c == ',');
    let zip = caps.get(3).map(|m| m.as_str());

    // "Main Ct" is a street, not Connecticut.
    if zip.is_none() && !prefix.is_empty() {
        return vec![part.to_string()];
    }

    let Some(code) = state_code(&caps[2]) else {
        return vec![part.to_string()];
    };

    let tail = match zip {
        Some(zip) => format!("{} {}", code, zip),
        None => code.to_string(),
    };

    if prefix.is_empty() {
        vec![tail]
    } else {
        vec![title_case_place(prefix), tail]
    }
}

/// Title-case an all-caps place name ("STATEN ISLAND" -> "Staten Island").
/// Mixed-case text and text with digits is left alone.
fn title_case_place(part: &str) -> String {
    let has_lower = part.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = part.chars().any(|c| c.is_ascii_digit());
    if has_lower || has_digit || part.len() <= 2 {
        return part.to_string();
    }
    part.split(' ')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when the text has digits and a few letters.
pub fn looks_like_address(text: &str) -> bool {
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    let letters = text.chars().filter(|c| c.is_ascii_alphabetic()).count();
    has_digit && letters >= 4 && text.len() >= 8
}

/// Assemble an address from the lines of a labeled block
/// (street / city / state / zip on separate labeled lines).
pub fn address_from_block(lines: &[&str]) -> String {
    let mut street: Option<String> = None;
    let mut city: Option<String> = None;
    let mut state: Option<String> = None;
    let mut zip: Option<String> = None;

    for line in lines.iter().copied().filter(|l| !l.is_empty()) {
        if street.is_none() {
            if let Some(caps) = DOMICILE_LABEL.captures(line) {
                let value = trim_separators(&caps[1]);
                if value.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                    street = Some(value.to_string());
                }
                continue;
            }
            if STREET_LINE.is_match(line) {
                street = Some(line.to_string());
                continue;
            }
        }

        if let Some(caps) = CITY_STATE_ZIP.captures(line) {
            city.get_or_insert_with(|| caps[1].trim().to_string());
            state.get_or_insert_with(|| caps[2].to_string());
            zip.get_or_insert_with(|| caps[3].to_string());
            continue;
        }

        if city.is_none() {
            if let Some(caps) = CITY_LABEL.captures(line) {
                let value = &caps[1];
                let value = match STATE_WORD.find(value) {
                    Some(m) => &value[..m.start()],
                    None => value,
                };
                let value = trim_separators(value);
                if !value.is_empty() {
                    city = Some(value.to_string());
                }
            }
        }

        if let Some(caps) = STATE_ZIP.captures(line) {
            state.get_or_insert_with(|| caps[1].trim().to_string());
            zip.get_or_insert_with(|| caps[2].to_string());
            continue;
        }
        if let Some(caps) = STATE_LABEL.captures(line) {
            state.get_or_insert_with(|| caps[1].trim().to_string());
        }
        if let Some(caps) = ZIP_LABEL.captures(line) {
            zip.get_or_insert_with(|| caps[1].to_string());
        }
    }

    let Some(street) = street else {
        return String::new();
    };

    let mut parts = vec![street];
    parts.extend(city);
    let tail = [state, zip].into_iter().flatten().collect::<Vec<_>>().join(" ");
    if !tail.is_empty() {
        parts.push(tail);
    }
    normalize_address(&parts.join(", "))
}

/// Candidate addresses in free text: a street line, extended by the following
/// line when that line is `City, ST zip`.
pub fn find_addresses(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut found = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some(m) = STREET_LINE.find(line) else {
            continue;
        };
        let mut candidate = line.to_string();
        if !ZIP.is_match(&line[m.end()..]) {
            if let Some(next) = lines.get(idx + 1) {
                if CITY_STATE_ZIP.is_match(next) {
                    candidate = format!("{}, {}", line, next);
                }
            }
        }
        let normalized = normalize_address(&candidate);
        if looks_like_address(&normalized) && !found.contains(&normalized) {
            found.push(normalized);
        }
    }
    found
}

/// Prefer candidates with a zip code, then the longest.
pub fn pick_best_address(candidates: &[String]) -> String {
    candidates
        .iter()
        .enumerate()
        .max_by_key(|(idx, addr)| (ZIP.is_match(addr), addr.split(',').count(), std::cmp::Reverse(*idx)))
        .map(|(_, addr)| addr.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_address_multiline() {
        let raw = "16 Ada Drive\nSTATEN ISLAND\nNew York 10314";
        assert_eq!(normalize_address(raw), "16 Ada Drive, Staten Island, NY 10314");
    }

    #[test]
    fn test_beneficiary_text_removed() {
        let raw = "1311 Ventura Drive, beneficiary of residuary estate of Walter Scott, Lakewood, New Jersey 08701";
        assert_eq!(normalize_address(raw), "1311 Ventura Drive, Lakewood, NJ 08701");
    }

    #[test]
    fn test_staten_island_boilerplate_collapsed() {
        let raw = "45 Bay Street, SS Staten Island Staten Island, NY 10301";
        assert_eq!(normalize_address(raw), "45 Bay Street, Staten Island, NY 10301");
    }

    #[test]
    fn test_normalize_address_is_idempotent() {
        for raw in [
            "16 Ada Drive\nSTATEN ISLAND\nNew York 10314",
            "1311 Ventura Drive, Lakewood, New Jersey 08701",
            "9 Main Ct",
            "200 Park Avenue, New York, NY 10166",
        ] {
            let once = normalize_address(raw);
            assert_eq!(normalize_address(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_street_suffix_not_taken_as_state() {
        assert_eq!(normalize_address("9 Main Ct"), "9 Main Ct");
    }

    #[test]
    fn test_address_from_block() {
        let lines = vec![
            "Name: Mary Smith",
            "Domicile or Principal Office: 16 Ada Drive",
            "City, Village or Town: Staten Island",
            "State: New York Zip Code: 10314",
            "Relationship: Wife",
        ];
        assert_eq!(address_from_block(&lines), "16 Ada Drive, Staten Island, NY 10314");
    }

    #[test]
    fn test_address_from_block_street_on_next_line() {
        let lines = vec![
            "Domicile or Principal Office:",
            "221 Oak Avenue",
            "Brooklyn, NY 11201",
        ];
        assert_eq!(address_from_block(&lines), "221 Oak Avenue, Brooklyn, NY 11201");
    }

    #[test]
    fn test_address_from_block_requires_street() {
        let lines = vec!["City, Village or Town: Staten Island", "State: New York"];
        assert_eq!(address_from_block(&lines), "");
    }

    #[test]
    fn test_find_addresses_joins_city_line() {
        let text = "The decedent resided at\n77 Hylan Boulevard\nStaten Island, NY 10305\nsince 1990";
        assert_eq!(find_addresses(text), vec!["77 Hylan Boulevard, Staten Island, NY 10305".to_string()]);
    }

    #[test]
    fn test_pick_best_address_prefers_zip() {
        let candidates = vec!["12 Elm Street".to_string(), "4 Oak Lane, Queens, NY 11375".to_string()];
        assert_eq!(pick_best_address(&candidates), "4 Oak Lane, Queens, NY 11375");
        assert_eq!(pick_best_address(&[]), "");
    }
}
