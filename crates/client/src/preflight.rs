//! Async pre-upload gate.
//!
//! Wraps the synchronous fast-validation checks with the bounded,
//! time-limited preview read. The preview producer is a seam so the
//! embedding shell decides how bytes are read (file handle, drag-drop
//! blob); a read that hangs or fails is reported as a parse error
//! rather than blocking the upload flow.

use std::future::Future;
use std::time::Duration;

use dpp_core::fast_validation::{self, FastValidationError};

/// Ceiling on the preview read plus parse. A sniff that cannot finish
/// inside this window is treated as unparseable.
pub const PREVIEW_PARSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Truncate raw CSV contents to the preview window: the header row plus
/// at most one data row.
///
/// Splits on raw newlines, so a quoted field containing a newline can
/// shorten the window. That only ever hands the parser *less* input,
/// and the parser runs in flexible mode, so the gate stays optimistic.
pub fn preview_window(contents: &str) -> &str {
    let mut newlines = 0;
    for (i, b) in contents.bytes().enumerate() {
        if b == b'\n' {
            newlines += 1;
            if newlines == 2 {
                return &contents[..=i];
            }
        }
    }
    contents
}

/// Run the full pre-upload gate.
///
/// Size and extension are checked first; `read_preview` is only invoked
/// when the header sniff applies (small CSV files). On failure the
/// vector holds a single size/extension/parse error or one entry per
/// missing required column.
pub async fn preflight<F, Fut>(
    filename: &str,
    size_bytes: u64,
    read_preview: F,
) -> Result<(), Vec<FastValidationError>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::io::Result<String>>,
{
    fast_validation::validate_file_meta(filename, size_bytes).map_err(|e| vec![e])?;

    if !fast_validation::needs_header_sniff(filename, size_bytes) {
        return Ok(());
    }

    let preview = match tokio::time::timeout(PREVIEW_PARSE_TIMEOUT, read_preview()).await {
        Ok(Ok(contents)) => contents,
        Ok(Err(e)) => {
            return Err(vec![FastValidationError::ParseError {
                message: e.to_string(),
            }])
        }
        Err(_) => {
            return Err(vec![FastValidationError::ParseError {
                message: format!(
                    "header sniff timed out after {}s",
                    PREVIEW_PARSE_TIMEOUT.as_secs()
                ),
            }])
        }
    };

    fast_validation::validate_upload(filename, size_bytes, Some(preview_window(&preview)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use dpp_core::fast_validation::{COLUMN_PRODUCT_IDENTIFIER, MAX_UPLOAD_SIZE_BYTES};

    #[test]
    fn preview_window_is_header_plus_one_row() {
        let contents = "product_name,upid\nTee,UP-1\nHoodie,UP-2\n";
        assert_eq!(preview_window(contents), "product_name,upid\nTee,UP-1\n");
        // Header only, no trailing newline.
        assert_eq!(preview_window("product_name,upid"), "product_name,upid");
    }

    #[tokio::test]
    async fn oversize_file_rejected_without_reading_preview() {
        let read = AtomicBool::new(false);
        let errors = preflight("catalog.csv", MAX_UPLOAD_SIZE_BYTES + 1, || {
            read.store(true, Ordering::SeqCst);
            async { Ok(String::new()) }
        })
        .await
        .unwrap_err();
        assert_eq!(errors[0].code(), "FILE_TOO_LARGE");
        assert!(!read.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn spreadsheet_skips_the_preview_read() {
        let read = AtomicBool::new(false);
        let result = preflight("catalog.xlsx", 512, || {
            read.store(true, Ordering::SeqCst);
            async { Ok(String::new()) }
        })
        .await;
        assert!(result.is_ok());
        assert!(!read.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn valid_csv_passes() {
        let contents = "Product Name,UPID\nTee,UP-1\nHoodie,UP-2\n".to_string();
        let result = preflight("catalog.csv", 512, move || async move { Ok(contents) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_identifier_column_reported() {
        let contents = "product_name,description\nTee,Soft\n".to_string();
        let errors = preflight("catalog.csv", 512, move || async move { Ok(contents) })
            .await
            .unwrap_err();
        assert_eq!(
            errors,
            vec![FastValidationError::MissingColumns {
                column: COLUMN_PRODUCT_IDENTIFIER,
            }]
        );
    }

    #[tokio::test]
    async fn read_failure_maps_to_parse_error() {
        let errors = preflight("catalog.csv", 512, || async {
            Err(std::io::Error::other("device gone"))
        })
        .await
        .unwrap_err();
        assert_eq!(errors[0].code(), "PARSE_ERROR");
    }

    #[tokio::test(start_paused = true)]
    async fn hung_preview_read_times_out_as_parse_error() {
        let errors = preflight("catalog.csv", 512, || {
            std::future::pending::<std::io::Result<String>>()
        })
        .await
        .unwrap_err();
        assert_eq!(errors[0].code(), "PARSE_ERROR");
    }
}
