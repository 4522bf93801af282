use crate::recommendation::normalize::normalize_label;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

const STOP_WORDS: &[&str] = &[
    // banking
    "CARTE", "VIR", "VIRT", "PRLV", "INST", "VERS", "ANN", "ECH", "PRET",
    // articles and prepositions
    "DE", "DU", "LA", "LE", "LES", "UN", "UNE", "DES", "AU", "AUX", "ET", "EN", "POUR", "PAR",
    "SUR",
    // business
    "PAYM", "PAYMENT", "PAYMENTS", "SA", "SAS", "SARL", "EURL", "PAI",
];

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}(/\d{2,4})?$").expect("valid date pattern"));
static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid numeric pattern"));
static SHORT_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[[:alnum:]]{1,2}$").expect("valid short token pattern"));
static REFERENCE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{6,10}$").expect("valid reference code pattern"));

/// Words of a label worth searching for in other labels.
pub fn extract_keywords(label: &str) -> BTreeSet<String> {
    normalize_label(label)
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '/'))
        .map(str::trim)
        .filter(|token| is_keyword(token))
        .map(str::to_string)
        .collect()
}

fn is_keyword(token: &str) -> bool {
    !(token.is_empty()
        || DATE.is_match(token)
        || NUMERIC.is_match(token)
        || SHORT_ALPHANUMERIC.is_match(token)
        || is_reference_code(token)
        || token.chars().count() < 3
        || STOP_WORDS.contains(&token))
}

/// Bank transaction references look like `AB12CD34`.
fn is_reference_code(token: &str) -> bool {
    REFERENCE_CODE.is_match(token) && token.chars().any(|c| c.is_ascii_digit())
}
