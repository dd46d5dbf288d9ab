pub mod html;


use crate::error::{Result, ScrapeError};
use crate::results::{EmployeeRecord, RawEntry};
use serde::{Deserialize, Serialize};

/// Path marker that precedes the profile identifier in a profile URL
pub const PROFILE_MARKER: &str = "/in/";

/// What to do with an entry whose URL has no profile marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPolicy {
    /// Fail the whole normalization on the first malformed URL
    #[default]
    Abort,
    /// Drop the malformed entry and keep going
    Skip,
}

/// Extracts the percent-decoded profile identifier from a profile URL
///
/// The identifier is the text after the first `/in/` up to the next `/` or
/// `?`, or the end of the string.
pub fn extract_profile_id(url: &str) -> Option<String> {
    let start = url.find(PROFILE_MARKER)? + PROFILE_MARKER.len();
    let rest = &url[start..];
    let end = rest.find(['/', '?']).unwrap_or(rest.len());
    Some(percent_decode(&rest[..end]))
}

/// Decodes `%XX` escapes; invalid UTF-8 is replaced rather than rejected.
/// `+` is left alone since this is a path segment, not a form value.
fn percent_decode(segment: &str) -> String {
    let bytes = urlencoding::decode_binary(segment.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Turns raw page entries into employee records
///
/// Entries with an empty name are dropped before extraction. Relative order
/// is preserved and duplicates are kept.
pub fn normalize(entries: &[RawEntry], policy: ExtractionPolicy) -> Result<Vec<EmployeeRecord>> {
    let mut records = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        if entry.display_text.is_empty() {
            ::log::trace!("Dropping entry {} with empty name", index);
            continue;
        }

        match extract_profile_id(&entry.profile_url) {
            Some(profile_id) => records.push(EmployeeRecord {
                name: entry.display_text.clone(),
                profile_id,
            }),
            None => match policy {
                ExtractionPolicy::Abort => {
                    return Err(ScrapeError::Extraction {
                        index,
                        url: entry.profile_url.clone(),
                    });
                }
                ExtractionPolicy::Skip => {
                    ::log::warn!(
                        "Skipping entry {} ({}): no profile identifier in {}",
                        index,
                        entry.display_text,
                        entry.profile_url
                    );
                }
            },
        }
    }

    ::log::debug!(
        "Normalized {} of {} raw entries",
        records.len(),
        entries.len()
    );
    Ok(records)
}
