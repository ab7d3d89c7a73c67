//! Field normalizers.
//!
//! Every normalizer takes one raw, possibly absent field and returns its
//! canonical form, or `None` when nothing usable remains. None of them fail:
//! a field that cannot be normalized simply becomes absent so a batch keeps
//! moving.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::constants::CNPJ_DIGITS;
use crate::text::fold;

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static SCHEME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Brazilian states (and the Federal District) by folded, uppercased name.
const STATE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("ACRE", "AC"),
    ("ALAGOAS", "AL"),
    ("AMAPA", "AP"),
    ("AMAZONAS", "AM"),
    ("BAHIA", "BA"),
    ("CEARA", "CE"),
    ("DISTRITO FEDERAL", "DF"),
    ("ESPIRITO SANTO", "ES"),
    ("GOIAS", "GO"),
    ("MARANHAO", "MA"),
    ("MATO GROSSO", "MT"),
    ("MATO GROSSO DO SUL", "MS"),
    ("MINAS GERAIS", "MG"),
    ("PARA", "PA"),
    ("PARAIBA", "PB"),
    ("PARANA", "PR"),
    ("PERNAMBUCO", "PE"),
    ("PIAUI", "PI"),
    ("RIO DE JANEIRO", "RJ"),
    ("RIO GRANDE DO NORTE", "RN"),
    ("RIO GRANDE DO SUL", "RS"),
    ("RONDONIA", "RO"),
    ("RORAIMA", "RR"),
    ("SANTA CATARINA", "SC"),
    ("SAO PAULO", "SP"),
    ("SERGIPE", "SE"),
    ("TOCANTINS", "TO"),
];

fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Strips punctuation and keeps the CNPJ only when exactly 14 digits remain.
#[must_use]
pub fn normalize_cnpj(raw: Option<&str>) -> Option<String> {
    let digits = digits_only(raw?);
    (digits.len() == CNPJ_DIGITS).then_some(digits)
}

/// Reduces a website to `scheme://host`.
///
/// A missing scheme becomes `https://`. When the value cannot be parsed as a
/// URL the cleaned string is returned as-is rather than dropped.
#[must_use]
pub fn normalize_website(raw: Option<&str>) -> Option<String> {
    let cleaned = WHITESPACE_REGEX.replace_all(raw?.trim(), "").into_owned();
    if cleaned.is_empty() {
        return None;
    }
    let with_scheme =
        if SCHEME_REGEX.is_match(&cleaned) { cleaned } else { format!("https://{cleaned}") };
    match Url::parse(&with_scheme) {
        Ok(url) => match url.host_str() {
            Some(host) if !host.is_empty() => Some(format!("{}://{}", url.scheme(), host)),
            _ => Some(with_scheme),
        },
        Err(_) => Some(with_scheme),
    }
}

/// Lowercased host of a website with any leading `www.` removed.
#[must_use]
pub fn extract_domain(website: Option<&str>) -> Option<String> {
    let trimmed = website?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if SCHEME_REGEX.is_match(trimmed) {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };
    let url = Url::parse(&candidate).ok()?;
    let mut host = url.host_str()?.to_lowercase();
    while let Some(rest) = host.strip_prefix("www.") {
        host = rest.to_owned();
    }
    (!host.is_empty()).then_some(host)
}

/// Two-letter state code; full state names (with or without accents) are translated.
///
/// Unrecognized values pass through uppercased.
#[must_use]
pub fn normalize_uf(raw: Option<&str>) -> Option<String> {
    let cleaned = raw?.trim().to_uppercase();
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.chars().count() == 2 {
        return Some(cleaned);
    }
    let key = WHITESPACE_REGEX.replace_all(&fold(&cleaned), " ").to_uppercase();
    let abbreviation = STATE_ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, uf)| (*uf).to_owned());
    Some(abbreviation.unwrap_or(cleaned))
}

/// Lowercased e-mail; rejected unless it contains both `@` and `.`.
#[must_use]
pub fn normalize_email(raw: Option<&str>) -> Option<String> {
    let cleaned = raw?.trim().to_lowercase();
    (cleaned.contains('@') && cleaned.contains('.')).then_some(cleaned)
}

/// Digits of a phone number; no length validation.
#[must_use]
pub fn normalize_phone(raw: Option<&str>) -> Option<String> {
    let digits = digits_only(raw?);
    (!digits.is_empty()).then_some(digits)
}

/// Trimmed free text, absent when blank.
#[must_use]
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(ToOwned::to_owned)
}
