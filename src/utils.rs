//! Shared utility functions.

use std::path::Path;
use std::time::Duration;

/// Lowercase, dash-separated form of `text`, keeping only alphanumerics.
///
/// # Examples
///
/// ```
/// use folio::utils::slugify;
///
/// assert_eq!(slugify("Cedar House"), "cedar-house");
/// assert_eq!(slugify("  Loft / 2019 "), "loft-2019");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Image key derived from a file name, without its extension.
///
/// Returns `None` when nothing usable is left.
#[must_use]
pub fn key_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let key = slugify(stem);
    (!key.is_empty()).then_some(key)
}

/// Format bytes in human-readable form.
///
/// # Examples
///
/// ```
/// use folio::utils::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 bytes");
/// assert_eq!(format_bytes(1024), "1.0 KB");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(1048576), "1.0 MB");
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;

    if bytes == 0 {
        "0 bytes".to_string()
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

/// Format an elapsed time for command summaries.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use folio::utils::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_millis(250)), "250ms");
/// assert_eq!(format_elapsed(Duration::from_secs(90)), "1m 30s");
/// ```
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs == 0 {
        format!("{}ms", elapsed.as_millis())
    } else if secs < 60 {
        format!("{:.1}s", elapsed.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
