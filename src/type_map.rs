//! Attribute type mapping
//!
//! Maps a declared attribute type token from the source model to a JSON
//! Schema property type. Total: unknown tokens become plain strings.
//!
//! Rules are tried in a fixed order and the first match wins. Several token
//! families share a prefix (`N6` vs `N10.2`, `AN10` vs short codes), so the
//! order below is part of the contract:
//!
//! 1. empty token
//! 2. boolean keywords
//! 3. integer keywords and `N<digits>`
//! 4. decimal keywords and `N<digits>[.,]<digits>`
//! 5. date/time keywords
//! 6. url, email, iban and phone keywords
//! 7. geometry keywords
//! 8. guid
//! 9. binary keywords
//! 10. `AN<digits>`
//! 11. `varchar` / `varchar2`, optionally with `(<length>)`
//! 12. generic text keywords
//! 13. short alphabetic codes
//! 14. fallback

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static INTEGER_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^N\d+$").expect("valid regex"));
static DECIMAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^N\d+[.,]\d+$").expect("valid regex"));
static ALPHANUMERIC_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^AN(\d+)$").expect("valid regex"));
static VARCHAR_LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^varchar2?\((\d+)\)").expect("valid regex"));

/// Default maximum length of a `varchar` without an explicit length
pub const DEFAULT_VARCHAR_LENGTH: u64 = 255;

/// JSON Schema primitive type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

/// String format annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringFormat {
    Date,
    DateTime,
    Time,
    Uri,
    Email,
    Uuid,
    Binary,
    Geo,
}

/// Result of mapping an attribute type token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyType {
    #[serde(rename = "type")]
    pub kind: JsonType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<StringFormat>,
    #[serde(default, rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

impl PropertyType {
    pub const fn of(kind: JsonType) -> Self {
        Self {
            kind,
            format: None,
            max_length: None,
        }
    }

    pub const fn string() -> Self {
        Self::of(JsonType::String)
    }

    pub const fn formatted(format: StringFormat) -> Self {
        Self {
            kind: JsonType::String,
            format: Some(format),
            max_length: None,
        }
    }

    pub const fn bounded(max_length: u64) -> Self {
        Self {
            kind: JsonType::String,
            format: None,
            max_length: Some(max_length),
        }
    }
}

/// Map a declared attribute type to a property type
pub fn map_type(type_name: &str) -> PropertyType {
    let t = type_name.trim();
    if t.is_empty() {
        return PropertyType::string();
    }
    let lower = t.to_lowercase();

    match lower.as_str() {
        "boolean" | "bool" | "indic" | "stdindijn" => return PropertyType::of(JsonType::Boolean),
        "int" | "integer" | "number" => return PropertyType::of(JsonType::Integer),
        _ => {}
    }
    if INTEGER_CODE_RE.is_match(t) {
        return PropertyType::of(JsonType::Integer);
    }

    match lower.as_str() {
        "double" | "decimal" | "float" | "bedrag" | "geldbedrag" => {
            return PropertyType::of(JsonType::Number)
        }
        _ => {}
    }
    if DECIMAL_CODE_RE.is_match(t) {
        return PropertyType::of(JsonType::Number);
    }

    match lower.as_str() {
        // Date/time
        "date" | "datum" | "jaar" | "year" => return PropertyType::formatted(StringFormat::Date),
        "datetime" | "datumtijd" => return PropertyType::formatted(StringFormat::DateTime),
        "time" => return PropertyType::formatted(StringFormat::Time),
        "onvolledgedatum" => return PropertyType::string(),

        // Contact details; iban and phone numbers stay untyped
        "url" | "uri" => return PropertyType::formatted(StringFormat::Uri),
        "email" => return PropertyType::formatted(StringFormat::Email),
        "iban" | "telefoonnummer" => return PropertyType::string(),

        // Geometry
        "point" | "punt" | "gm_point" | "gm_punt" | "gm_surface" | "gm_multisurface" | "vlak"
        | "spatial" | "gm_curve" | "gm_lijn" | "gm_multicurve" | "gm_multipoint"
        | "multipuntlijn(multi)vlak" => return PropertyType::formatted(StringFormat::Geo),

        "guid" => return PropertyType::formatted(StringFormat::Uuid),

        "blob" | "image" => return PropertyType::formatted(StringFormat::Binary),
        _ => {}
    }

    if let Some(caps) = ALPHANUMERIC_CODE_RE.captures(t) {
        return PropertyType::bounded(parse_length(&caps[1]));
    }

    if lower.starts_with("varchar") {
        let length = VARCHAR_LENGTH_RE
            .captures(&lower)
            .map(|caps| parse_length(&caps[1]))
            .unwrap_or(DEFAULT_VARCHAR_LENGTH);
        return PropertyType::bounded(length);
    }

    // Generic text, short alphabetic codes and everything else (enumeration
    // names, complex types) are plain strings
    PropertyType::string()
}

/// Declared length of a digit run; lengths beyond `u64` saturate
fn parse_length(digits: &str) -> u64 {
    digits.parse().unwrap_or(u64::MAX)
}
