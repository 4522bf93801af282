use once_cell::sync::Lazy;
use regex::Regex;

static SARL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bS\.?\s*A\.?\s*R\.?\s*L\b\.?").expect("valid SARL pattern"));
static SAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bS\.?\s*A\.?\s*S\b\.?").expect("valid SAS pattern"));
static EURL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bE\.?\s*U\.?\s*R\.?\s*L\b\.?").expect("valid EURL pattern"));
static COMPANY_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+ET\s+C[IE]*\.?\s*$").expect("valid suffix pattern"));
static BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[()\[\]]").expect("valid bracket pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Canonical form of a bank statement label: uppercased, legal forms collapsed, brackets and
/// extra whitespace removed.
pub fn normalize_label(label: &str) -> String {
    let label = label.to_uppercase();
    let label = SARL.replace_all(&label, "SARL");
    let label = SAS.replace_all(&label, "SAS");
    let label = EURL.replace_all(&label, "EURL");
    let label = COMPANY_SUFFIX.replace(&label, "");
    let label = BRACKETS.replace_all(&label, " ");
    let label = WHITESPACE.replace_all(&label, " ");
    label.trim().to_string()
}
