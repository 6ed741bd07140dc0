//! Prefix-scoped listing transformation
//!
//! Partitions one delimiter-scoped listing call into folder and file
//! entries and produces display-ready names and sizes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::client::ObjectClient;

/// Whether an entry is a pseudo-folder or an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Folder,
    File,
}

/// One row of listing output for a `(profile, prefix)` query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Full remote path
    pub key: String,
    pub kind: EntryKind,
    /// Always 0 for folders
    pub size_bytes: u64,
    /// `None` for folders
    pub last_modified: Option<DateTime<Utc>>,
    /// Key with the queried prefix stripped
    pub display_name: String,
}

/// List entries one level below `prefix` (empty string means bucket root)
///
/// A remote fault is logged and degrades to an empty listing; navigation
/// always succeeds from the caller's point of view.
pub async fn list_entries(
    client: &dyn ObjectClient,
    bucket: &str,
    prefix: &str,
) -> Vec<ListingEntry> {
    let outcome = match client.list_objects(bucket, prefix, "/").await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(bucket = %bucket, prefix = %prefix, error = %e, "listing failed, returning empty");
            return Vec::new();
        }
    };

    let mut entries = Vec::new();

    for folder in outcome.common_prefixes {
        entries.push(ListingEntry {
            display_name: display_name(&folder, prefix),
            key: folder,
            kind: EntryKind::Folder,
            size_bytes: 0,
            last_modified: None,
        });
    }

    for object in outcome.objects {
        // The queried prefix shows up as a zero-length content entry on
        // some backends; the current directory is not an entry of itself.
        if object.key == prefix {
            continue;
        }
        entries.push(ListingEntry {
            display_name: display_name(&object.key, prefix),
            key: object.key,
            kind: EntryKind::File,
            size_bytes: object.size,
            last_modified: object.last_modified,
        });
    }

    entries
}

/// Strip the queried prefix and any trailing delimiter from a key
pub fn display_name(key: &str, prefix: &str) -> String {
    if key == prefix {
        return prefix.trim_end_matches('/').to_string();
    }
    if let Some(stripped) = key.strip_prefix(prefix) {
        return stripped.trim_end_matches('/').to_string();
    }
    // Unexpected key outside the queried prefix; show it as-is
    key.to_string()
}

/// Render a byte count as a one-decimal human-readable size
pub fn human_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}
