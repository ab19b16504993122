//! Document Loading
//!
//! Reads one markup file fully into memory. Failures become a single
//! `IoFailure` diagnostic for that file.

use std::fs;
use std::path::Path;

use crate::core::Diagnostic;

/// Load a file as UTF-8 text, dropping a leading byte order mark.
///
/// The file handle is scoped to `fs::read`, so it is closed on every path.
pub fn load_source(path: &Path) -> Result<String, Diagnostic> {
    let bytes = fs::read(path)
        .map_err(|e| Diagnostic::io_failure(format!("Error reading file: {e}")))?;

    let mut text = String::from_utf8(bytes).map_err(|e| {
        Diagnostic::io_failure(format!(
            "File is not valid UTF-8 (invalid byte at offset {})",
            e.utf8_error().valid_up_to()
        ))
    })?;

    if text.starts_with('\u{feff}') {
        text.drain(..'\u{feff}'.len_utf8());
    }

    Ok(text)
}
