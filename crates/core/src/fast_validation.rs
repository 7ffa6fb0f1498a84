//! Pre-upload fast validation gate.
//!
//! Rejects obviously malformed catalog uploads before spending a round
//! trip, without attempting full validation. Checks run in order and
//! short-circuit on the first failing class:
//!
//! 1. File size ceiling.
//! 2. Allowed extension set.
//! 3. (CSV only, small files only) required header columns after
//!    normalization, parsed from a bounded preview window.
//!
//! Spreadsheet files and CSVs above the sniff threshold skip header
//! sniffing and are optimistically accepted; full validation is deferred
//! to the backend pipeline. That is a deliberate precision/latency
//! trade-off.
//!
//! This module is pure and synchronous. The client crate wraps the
//! header sniff in a timeout and maps a hang to [`FastValidationError::ParseError`].

use serde::Serialize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum accepted upload size.
pub const MAX_UPLOAD_SIZE_BYTES: u64 = 20 * 1024 * 1024;

/// CSVs above this size skip header sniffing entirely.
pub const HEADER_SNIFF_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// File extensions the import pipeline accepts.
pub const ALLOWED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

/// Spreadsheet extensions, which are never header-sniffed client-side.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Normalized name of the required product name column.
pub const COLUMN_PRODUCT_NAME: &str = "product_name";

/// Canonical normalized name of the required identifier column.
pub const COLUMN_PRODUCT_IDENTIFIER: &str = "product_identifier";

/// Accepted normalized names for the identifier column. The catalog
/// format names it `upid` with `sku` as a secondary key.
pub const IDENTIFIER_ALIASES: &[&str] = &["product_identifier", "upid", "sku"];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A reason the fast validation gate rejected a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FastValidationError {
    /// File exceeds [`MAX_UPLOAD_SIZE_BYTES`].
    FileTooLarge { size_bytes: u64, limit_bytes: u64 },
    /// Extension is not in [`ALLOWED_EXTENSIONS`].
    UnsupportedExtension { extension: String },
    /// A required column is absent. One error per missing column.
    MissingColumns { column: &'static str },
    /// The preview window could not be parsed (or parsing timed out).
    ParseError { message: String },
}

impl FastValidationError {
    /// Stable error code for UI dispatch.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::UnsupportedExtension { .. } => "UNSUPPORTED_EXTENSION",
            Self::MissingColumns { .. } => "MISSING_COLUMNS",
            Self::ParseError { .. } => "PARSE_ERROR",
        }
    }
}

// ---------------------------------------------------------------------------
// Header normalization
// ---------------------------------------------------------------------------

/// Normalize a raw header cell for comparison.
///
/// Lowercase, trim, replace any run of non `[a-z0-9_]` characters with a
/// single `_`, collapse repeated `_`, strip leading/trailing `_`.
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            // Any other character (including '_') acts as a separator run.
            pending_sep = true;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Lowercase extension of a filename, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    let ext = filename.rsplit('.').next()?;
    if ext == filename {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Size and extension checks. First failing class wins.
pub fn validate_file_meta(filename: &str, size_bytes: u64) -> Result<(), FastValidationError> {
    if size_bytes > MAX_UPLOAD_SIZE_BYTES {
        return Err(FastValidationError::FileTooLarge {
            size_bytes,
            limit_bytes: MAX_UPLOAD_SIZE_BYTES,
        });
    }
    let ext = file_extension(filename).unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(FastValidationError::UnsupportedExtension { extension: ext });
    }
    Ok(())
}

/// Whether the header sniff applies to this file at all.
///
/// Spreadsheets and large CSVs are optimistically accepted without
/// sniffing.
pub fn needs_header_sniff(filename: &str, size_bytes: u64) -> bool {
    match file_extension(filename).as_deref() {
        Some("csv") => size_bytes <= HEADER_SNIFF_MAX_BYTES,
        _ => false,
    }
}

/// Check normalized headers for the required columns.
///
/// Returns one [`FastValidationError::MissingColumns`] per missing
/// required column, reporting the canonical column name.
pub fn check_required_headers(headers: &[String]) -> Vec<FastValidationError> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut errors = Vec::new();

    if !normalized.iter().any(|h| h == COLUMN_PRODUCT_NAME) {
        errors.push(FastValidationError::MissingColumns {
            column: COLUMN_PRODUCT_NAME,
        });
    }
    if !normalized
        .iter()
        .any(|h| IDENTIFIER_ALIASES.contains(&h.as_str()))
    {
        errors.push(FastValidationError::MissingColumns {
            column: COLUMN_PRODUCT_IDENTIFIER,
        });
    }
    errors
}

/// Parse the header row out of a bounded CSV preview window.
///
/// The window is expected to hold at most the header plus one data row;
/// callers truncate before handing it over.
pub fn parse_header_preview(preview: &str) -> Result<Vec<String>, FastValidationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(preview.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FastValidationError::ParseError {
            message: e.to_string(),
        })?;

    if headers.is_empty() || (headers.len() == 1 && headers[0].trim().is_empty()) {
        return Err(FastValidationError::ParseError {
            message: "empty header row".to_string(),
        });
    }

    Ok(headers.iter().map(|h| h.to_string()).collect())
}

/// Run the full synchronous gate for a CSV preview window.
///
/// `preview` is ignored when [`needs_header_sniff`] says so. On failure
/// the returned vector holds either a single size/extension/parse error
/// or one entry per missing column.
pub fn validate_upload(
    filename: &str,
    size_bytes: u64,
    preview: Option<&str>,
) -> Result<(), Vec<FastValidationError>> {
    if let Err(e) = validate_file_meta(filename, size_bytes) {
        return Err(vec![e]);
    }
    if !needs_header_sniff(filename, size_bytes) {
        return Ok(());
    }
    let Some(preview) = preview else {
        // No preview window supplied; accept optimistically.
        return Ok(());
    };
    let headers = parse_header_preview(preview).map_err(|e| vec![e])?;
    let missing = check_required_headers(&headers);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
