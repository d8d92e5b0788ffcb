//! Company onboarding helpers
//!
//! Slugs and Brazilian phone numbers as entered on the onboarding form.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Optional country code 55, two-digit area code, 8 or 9 digit subscriber
static PHONE_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(55)?[1-9]{2}[0-9]{4,5}[0-9]{4}$").unwrap());

static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{5})(\d{4})$").unwrap());

/// URL slug: lowercase ASCII, accents dropped, words joined by `-`
pub fn generate_slug(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    folded
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Accepts landline and mobile numbers, with or without the `55` prefix
/// and any punctuation.
pub fn validate_phone_number(phone: &str) -> bool {
    PHONE_DIGITS_RE.is_match(&digits(phone))
}

/// Format an 11-digit mobile number as `(11) 98765-4321`.
///
/// Anything else is returned unchanged.
pub fn mask_phone_number(phone: &str) -> String {
    let cleaned = digits(phone);
    match MOBILE_RE.captures(&cleaned) {
        Some(caps) => format!("({}) {}-{}", &caps[1], &caps[2], &caps[3]),
        None => phone.to_string(),
    }
}
