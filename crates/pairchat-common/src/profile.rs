//! Self-reported participant profile, sanitized at ingress.

use serde::{Deserialize, Serialize};

pub const MAX_NAME_CHARS: usize = 30;
pub const MAX_CATEGORY_CHARS: usize = 20;
pub const DEFAULT_NAME: &str = "Anon";
pub const DEFAULT_CATEGORY: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: String,
    pub category: String,
}

impl Profile {
    /// Build a profile from raw client input. Missing or blank fields fall
    /// back to the defaults; everything else is trimmed, stripped of control
    /// characters and truncated by character count.
    pub fn sanitized(name: Option<&str>, category: Option<&str>) -> Self {
        Self {
            display_name: sanitize_field(name, MAX_NAME_CHARS, DEFAULT_NAME),
            category: sanitize_field(category, MAX_CATEGORY_CHARS, DEFAULT_CATEGORY),
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::sanitized(None, None)
    }
}

fn sanitize_field(raw: Option<&str>, max_chars: usize, fallback: &str) -> String {
    let cleaned: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .chars()
        .take(max_chars)
        .collect();

    let cleaned = cleaned.trim_end();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}
