//! String helpers shared by the URL grammar and the providers.

use regex::Regex;
use std::sync::LazyLock;

/// Delimiters accepted between list entries (`to=a,b c#d`)
static LIST_DELIMITERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\n,#\\/]+").expect("valid list delimiter regex"));

/// Email detection, optionally preceded by a display name (`Name <user@host>`)
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?i)^(([\s"']+)?(?P<name>[^:<'"]+)?[:<\s'"]+)?"#,
        r"(?P<full_email>((?P<label>[^+]+)\+)?",
        r"(?P<email>(?P<userid>[a-z0-9_!#$%&*/=?`{|}~^-]+",
        r"(?:\.[a-z0-9_!#$%&'*/=?`{|}~^-]+)*)@(?P<domain>(",
        r"(?:[a-z0-9](?:[a-z0-9_-]*[a-z0-9])?\.)+",
        r"[a-z0-9](?:[a-z0-9_-]*[a-z0-9]))|",
        r"[a-z0-9][a-z0-9_-]{5,})))",
        r"\s*>?$",
    ))
    .expect("valid email regex")
});

/// A parsed email address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    /// Display name, empty when none was given
    pub name: String,
    /// Address including an optional `label+` prefix
    pub full_email: String,
    /// Address without the label
    pub email: String,
    pub domain: String,
}

/// Interpret a loosely written boolean (`yes`, `on`, `1`, `never`, ...)
///
/// Only the first two characters are inspected. Anything unrecognised yields
/// `default`.
pub fn parse_bool(value: &str, default: bool) -> bool {
    let head: String = value.trim().to_lowercase().chars().take(2).collect();

    match head.as_str() {
        "de" | "di" | "ne" | "f" | "n" | "no" | "of" | "0" | "fa" => false,
        "en" | "al" | "t" | "y" | "ye" | "on" | "1" | "tr" => true,
        _ => default,
    }
}

/// Split a delimited string into its non-empty entries, preserving order
pub fn parse_list(value: &str) -> Vec<String> {
    LIST_DELIMITERS
        .split(value)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Detect an email address, returning its parts when `value` is one
pub fn is_email(value: &str) -> Option<EmailAddress> {
    let captures = EMAIL_RE.captures(value.trim())?;
    Some(EmailAddress {
        name: captures
            .name("name")
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        full_email: captures.name("full_email")?.as_str().to_string(),
        email: captures.name("email")?.as_str().to_string(),
        domain: captures.name("domain")?.as_str().to_string(),
    })
}

/// Remove duplicate entries, keeping the first occurrence of each
pub fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}
