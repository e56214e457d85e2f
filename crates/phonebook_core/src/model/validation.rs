//! Field normalization and validation rules for contact records.
//!
//! # Responsibility
//! - Normalize raw user input (trim, title case, phone prefix).
//! - Decide whether a name, phone or birth date may enter the store.
//!
//! # Invariants
//! - Validators are pure: no I/O, no logging, no global state.
//! - Phone normalization only rewrites a leading `+7` prefix.
//! - Empty birth date is valid and means "unknown".

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Persisted birth date format (`dd.mm.yyyy`).
pub const BIRTH_DATE_FORMAT: &str = "%d.%m.%Y";

const PHONE_LENGTH: usize = 11;
const RUSSIAN_COUNTRY_PREFIX: &str = "+7";
const TRUNK_PREFIX: &str = "8";

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid phone regex"));
static BIRTH_DATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,2}\.[0-9]{1,2}\.[0-9]{4}$").expect("valid date regex"));

/// Title-cases `value` word by word.
///
/// A cased character that starts the string or follows an uncased character
/// (space, digit, punctuation) is upper-cased; every other cased character is
/// lower-cased. `"o'neil"` becomes `"O'Neil"`, `"2pac"` becomes `"2Pac"`.
/// Characters whose upper case is several letters keep only the first one
/// upper-cased, so `"ßa"` becomes `"Ssa"`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_cased = false;
    for ch in value.chars() {
        if previous_is_cased {
            out.extend(ch.to_lowercase());
        } else {
            let mut upper = ch.to_uppercase();
            out.extend(upper.next());
            out.extend(upper.flat_map(char::to_lowercase));
        }
        previous_is_cased = is_cased(ch);
    }
    out
}

/// Returns whether `value` is already in title case.
///
/// Requires at least one cased character. Upper-case characters may only
/// follow uncased ones and lower-case characters may only follow cased ones.
pub fn is_title_case(value: &str) -> bool {
    let mut seen_cased = false;
    let mut previous_is_cased = false;
    for ch in value.chars() {
        if ch.is_uppercase() {
            if previous_is_cased {
                return false;
            }
            previous_is_cased = true;
            seen_cased = true;
        } else if ch.is_lowercase() {
            if !previous_is_cased {
                return false;
            }
            previous_is_cased = true;
            seen_cased = true;
        } else {
            previous_is_cased = false;
        }
    }
    seen_cased
}

/// Trims and title-cases identifier or name input.
pub fn normalize_name(raw: &str) -> String {
    title_case(raw.trim())
}

/// Composes the store key from already-normalized name parts.
pub fn compose_identifier(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

/// Returns whether `name` may be used as a first name, last name or full
/// identifier.
///
/// The name must be in title case and, with spaces removed, consist only of
/// alphanumeric characters.
pub fn validate_name(name: &str) -> bool {
    let mut compact = name.chars().filter(|ch| *ch != ' ').peekable();
    if compact.peek().is_none() {
        return false;
    }
    is_title_case(name) && compact.all(char::is_alphanumeric)
}

/// Normalizes and validates a phone number.
///
/// A leading `+7` is replaced with `8`. Returns `(is_valid, normalized)`;
/// the normalized value is returned even when invalid so callers can report
/// what was checked.
pub fn validate_phone(raw: &str) -> (bool, String) {
    let normalized = match raw.strip_prefix(RUSSIAN_COUNTRY_PREFIX) {
        Some(rest) => format!("{TRUNK_PREFIX}{rest}"),
        None => raw.to_string(),
    };
    let valid = normalized.len() == PHONE_LENGTH && PHONE_RE.is_match(&normalized);
    (valid, normalized)
}

/// Returns whether `raw` is an acceptable birth date.
///
/// Empty input is valid. Anything else must be `dd.mm.yyyy` and name a real
/// calendar day.
pub fn validate_date(raw: &str) -> bool {
    raw.is_empty() || parse_birth_date(raw).is_some()
}

/// Parses a non-empty `dd.mm.yyyy` birth date.
///
/// Returns `None` for empty input, malformed shape or impossible dates.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    if !BIRTH_DATE_SHAPE_RE.is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, BIRTH_DATE_FORMAT).ok()
}

fn is_cased(ch: char) -> bool {
    ch.is_uppercase() || ch.is_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{is_title_case, title_case};

    #[test]
    fn title_case_restarts_words_after_uncased_characters() {
        assert_eq!(title_case("ivan petrov"), "Ivan Petrov");
        assert_eq!(title_case("mcDONALD"), "Mcdonald");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case("2pac"), "2Pac");
    }

    #[test]
    fn title_case_upper_cases_only_the_first_letter_of_expansions() {
        assert_eq!(title_case("ßa"), "Ssa");
        assert_eq!(title_case("straße"), "Straße");
        assert!(is_title_case(&title_case("ßa")));
    }

    #[test]
    fn title_case_handles_cyrillic() {
        assert_eq!(title_case("иван иванов"), "Иван Иванов");
    }

    #[test]
    fn is_title_case_requires_a_cased_character() {
        assert!(!is_title_case(""));
        assert!(!is_title_case("123"));
        assert!(is_title_case("Anna Maria"));
        assert!(!is_title_case("Anna maria"));
        assert!(!is_title_case("ANna"));
    }
}
