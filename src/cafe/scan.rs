// Scanned payload normalization
//
// Barcode wedges, QR codes and hand-typed input all arrive as text. QR codes
// printed on ID cards may carry a URL or a small JSON object instead of the
// bare identifier.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use serde_json::Value;

/// Keys that may carry the identifier in JSON and URL payloads
const ID_KEYS: [&str; 4] = ["student_id", "studentId", "sid", "id"];

// `student_id: X`, `Student-ID=X`, `sid:X`, `id = X`
static PREFIX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:student[_\- ]?id|sid|id)\s*[:=]\s*(.+)$").unwrap()
});

/// Extract a student identifier from a raw scan
///
/// Returns `None` when nothing usable is left.
pub fn normalize_scan(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = if trimmed.starts_with('{') {
        from_json(trimmed)?
    } else if is_url(trimmed) {
        from_url(trimmed)?
    } else if let Some(caps) = PREFIX_PATTERN.captures(trimmed) {
        caps.get(1).map(|m| m.as_str().to_string())?
    } else {
        trimmed.to_string()
    };

    let cleaned: String = candidate.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn is_url(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn from_json(text: &str) -> Option<String> {
    let json: Value = serde_json::from_str(text).ok()?;
    let object = json.as_object()?;

    ID_KEYS.iter().find_map(|key| match object.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn from_url(text: &str) -> Option<String> {
    let url = Url::parse(text).ok()?;

    for key in ID_KEYS {
        if let Some((_, value)) = url.query_pairs().find(|(k, _)| k == key) {
            if !value.trim().is_empty() {
                return Some(value.into_owned());
            }
        }
    }

    // Path segments stay percent-encoded; query pairs are already decoded
    let segment = url.path_segments()?.filter(|segment| !segment.is_empty()).last()?;
    urlencoding::decode(segment).ok().map(|decoded| decoded.into_owned())
}
