//! Utility functions for file naming and console formatting

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Get a path that does not exist yet, adding ` (1)`, ` (2)`, ... before the
/// extension when `path` is taken
///
/// # Examples
///
/// ```
/// use fpds_task_orders::utils::get_unique_path;
/// use std::path::Path;
///
/// let path = Path::new("/tmp/fpds_ref_idv_N0002325D0001_1735689600.json");
/// let unique = get_unique_path(path).unwrap();
/// // If the file exists, returns ".../fpds_ref_idv_N0002325D0001_1735689600 (1).json"
/// ```
pub fn get_unique_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Ok(path.to_path_buf());
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Other(format!("cannot extract file stem from {}", path.display())))?;

    let extension = path.extension().and_then(|e| e.to_str());

    let parent = path.parent().ok_or_else(|| {
        Error::Other(format!(
            "cannot extract parent directory from {}",
            path.display()
        ))
    })?;

    for i in 1..=MAX_RENAME_ATTEMPTS {
        let new_name = match extension {
            Some(ext) => format!("{} ({}).{}", stem, i, ext),
            None => format!("{} ({})", stem, i),
        };
        let new_path = parent.join(new_name);
        if !new_path.exists() {
            return Ok(new_path);
        }
    }

    Err(Error::Other(format!(
        "could not find a free name for {} after {} attempts",
        path.display(),
        MAX_RENAME_ATTEMPTS
    )))
}

/// Format a dollar amount with thousands separators and two decimals
///
/// ```
/// use fpds_task_orders::utils::format_usd;
///
/// assert_eq!(format_usd(1234567.891), "1,234,567.89");
/// assert_eq!(format_usd(-42.0), "-42.00");
/// ```
pub fn format_usd(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // "-0.00" reads as noise in a listing
    let sign = if amount < 0.0 && fixed != "0.00" {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{cents}")
}

/// First `max` characters of `s`, on a character boundary
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
