//! Text and field normalization for matching keys.
//!
//! Normalized values are derived deterministically and stored apart
//! from the raw rows; the display value is never overwritten. Parse
//! failures are row-scoped: an unreadable date or amount becomes
//! `None`, never an aborted load.

use chrono::NaiveDate;

/// Street-suffix abbreviations applied token-wise to address keys.
const STREET_SUFFIXES: &[(&str, &str)] = &[
    ("STREET", "ST"),
    ("AVENUE", "AVE"),
    ("ROAD", "RD"),
    ("BOULEVARD", "BLVD"),
    ("DRIVE", "DR"),
    ("LANE", "LN"),
    ("COURT", "CT"),
    ("PLACE", "PL"),
    ("CIRCLE", "CIR"),
    ("HIGHWAY", "HWY"),
    ("PARKWAY", "PKWY"),
    ("TURNPIKE", "TPKE"),
];

/// Corporate suffixes stripped from the tail of name keys.
const CORP_SUFFIXES: &[&str] = &[
    "LLC",
    "INC",
    "CORP",
    "CO",
    "LTD",
    "LP",
    "LLP",
    "PC",
    "PLC",
    "CORPORATION",
    "COMPANY",
    "LIMITED",
    "INCORPORATED",
];

/// Uppercase, drop punctuation, collapse whitespace.
fn canonical_tokens(raw: &str) -> Vec<String> {
    raw.to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Canonical join key for an address: "100 Main Street, Apt 2" and
/// "100 MAIN ST APT 2" normalize to the same key.
pub fn address_key(raw: &str) -> String {
    let tokens: Vec<String> = canonical_tokens(raw)
        .into_iter()
        .map(|token| {
            for (long, short) in STREET_SUFFIXES {
                if token == *long {
                    return (*short).to_owned();
                }
            }
            token
        })
        .collect();
    tokens.join(" ")
}

/// Canonical join key for a business or owner name. Trailing corporate
/// suffixes are stripped so "Acme Corp" and "ACME CORPORATION" meet.
pub fn name_key(raw: &str) -> String {
    let mut tokens = canonical_tokens(raw);
    while let Some(last) = tokens.last() {
        if tokens.len() > 1 && CORP_SUFFIXES.contains(&last.as_str()) {
            tokens.pop();
        } else {
            break;
        }
    }
    tokens.join(" ")
}

/// Lenient date parsing over the formats municipal exports actually
/// use. Unknown formats yield None; the row stays in the table and is
/// only excluded from analyses that need the date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    None
}

/// Parse a currency string ("$1,234.56") into a float.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}
