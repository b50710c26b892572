//! Helper functions for settings operations.

use crate::core::personality::{personalities, Personality};
use crate::core::templates::{find_template, Template};

use super::error::SettingError;

/// Parse a boolean value from user input.
///
/// Accepts: on/off, true/false, yes/no (case-insensitive).
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Format a boolean value for display.
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

pub fn success_set(key: &str, value: &str) -> String {
    format!("✅ Set {key} to: {value}")
}

pub fn success_unset(key: &str) -> String {
    format!("✅ Unset {key}")
}

/// Truncate a string to `max_chars` characters, appending "..." if truncated.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{truncated}...")
    } else {
        truncated
    }
}

/// Resolve a personality id exactly (case-insensitive). Unlike the runtime
/// lookup, unknown ids are an error here rather than a silent fallback.
pub fn validate_personality(input: &str) -> Result<&'static Personality, SettingError> {
    let input = input.trim();
    personalities()
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(input))
        .ok_or_else(|| SettingError::UnknownItem {
            kind: "personality",
            input: input.to_string(),
            list_command: "personalities",
        })
}

pub fn validate_template(input: &str) -> Result<&'static Template, SettingError> {
    find_template(input).ok_or_else(|| SettingError::UnknownItem {
        kind: "template",
        input: input.trim().to_string(),
        list_command: "templates",
    })
}
