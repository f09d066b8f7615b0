use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// File-name stand-in for a number with no digits.
pub const UNKNOWN_NUMBER_SLUG: &str = "unknown";

/// Keep only digits and a leading `+`.
pub fn sanitize_number(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if c == '+' && out.is_empty() {
            out.push(c);
        }
    }
    out
}

/// `call_<number>_<YYYYMMDD_HHMMSS>.<ext>`
pub fn recording_file_name(number: Option<&str>, at: NaiveDateTime, extension: &str) -> String {
    let sanitized = number.map(sanitize_number).unwrap_or_default();
    let slug = if sanitized.chars().any(|c| c.is_ascii_digit()) {
        sanitized
    } else {
        UNKNOWN_NUMBER_SLUG.to_string()
    };

    format!("call_{}_{}.{}", slug, at.format("%Y%m%d_%H%M%S"), extension)
}

/// Recording path under `dir` that does not exist yet.
///
/// Uses [`recording_file_name`] and appends `_1`, `_2`, … to the stem when
/// two calls with the same number start within the same second.
pub fn unique_recording_path(
    dir: &Path,
    number: Option<&str>,
    at: NaiveDateTime,
    extension: &str,
) -> PathBuf {
    let candidate = dir.join(recording_file_name(number, at, extension));
    if !candidate.exists() {
        return candidate;
    }

    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    (1u32..)
        .map(|n| dir.join(format!("{}_{}.{}", stem, n, extension)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
