//! Name transforms shared by every generation step
//!
//! - [`slugify`]: display name to URL-safe lowercase slug
//! - [`to_property_name`]: attribute or role name to lowerCamel property key
//! - [`strip_html`]: note text without markup

use regex::Regex;
use std::sync::LazyLock;

static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static HYPHENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));
static NON_IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s_]").expect("valid regex"));
static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Convert a display name to a URL-friendly slug.
///
/// Idempotent; the result has no leading, trailing or repeated hyphens.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let kept = NON_SLUG_RE.replace_all(&lower, "");
    let hyphenated = WHITESPACE_RE.replace_all(&kept, "-");
    let collapsed = HYPHENS_RE.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Convert a raw attribute or role name to a lowerCamel property key.
///
/// Returns an empty string when nothing usable is left.
pub fn to_property_name(raw: &str) -> String {
    let cleaned = NON_IDENT_RE.replace_all(raw.trim(), "");
    let mut parts = cleaned.split_whitespace();

    let Some(first) = parts.next() else {
        return String::new();
    };

    let mut result = String::with_capacity(cleaned.len());
    let mut chars = first.chars();
    if let Some(c) = chars.next() {
        result.extend(c.to_lowercase());
        result.push_str(chars.as_str());
    }

    for part in parts {
        let mut chars = part.chars();
        if let Some(c) = chars.next() {
            result.extend(c.to_uppercase());
            result.push_str(chars.as_str());
        }
    }

    result
}

/// Remove markup tags from note text and trim it
pub fn strip_html(text: &str) -> String {
    HTML_TAG_RE.replace_all(text, "").trim().to_string()
}
