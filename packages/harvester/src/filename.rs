//! Filesystem-safe names for archives and archive entries.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::config::MAX_FILENAME_LENGTH;

/// Matches everything that is not allowed in a sanitized name.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid regex"));

/// Characters replaced by an underscore before unsafe characters are stripped.
const REPLACED_CHARS: [char; 3] = [' ', ':', '/'];

/// Format a timestamp as `YYYY-MM-DD_HH-MM-SS`.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use oai_harvester::filename::sanitize_timestamp;
///
/// let t = NaiveDate::from_ymd_opt(2024, 3, 9)
///     .unwrap()
///     .and_hms_opt(7, 5, 30)
///     .unwrap();
/// assert_eq!(sanitize_timestamp(&t), "2024-03-09_07-05-30");
/// ```
pub fn sanitize_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
        .replace(' ', "_")
        .replace(':', "-")
}

/// Turn an OAI identifier into a filename stem.
///
/// Spaces, colons and slashes become underscores, every other character
/// outside `[A-Za-z0-9_.-]` is dropped, and the result is cut to
/// [`MAX_FILENAME_LENGTH`] characters. The output may be empty.
///
/// # Examples
/// ```
/// use oai_harvester::filename::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("a b:c.d/e"), "a_b_c.d_e");
/// assert_eq!(sanitize_identifier("oai:repo.org:123"), "oai_repo.org_123");
/// ```
pub fn sanitize_identifier(identifier: &str) -> String {
    let replaced: String = identifier
        .chars()
        .map(|c| if REPLACED_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let mut safe = UNSAFE_CHARS.replace_all(&replaced, "").into_owned();
    // Only ASCII survives the strip, so byte length equals char count.
    safe.truncate(MAX_FILENAME_LENGTH);
    safe
}
