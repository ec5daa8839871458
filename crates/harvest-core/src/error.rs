use thiserror::Error;

/// Message shown to the caller when the page could not be fetched.
pub const UNREACHABLE_MESSAGE: &str = "No internet connection or URL not reachable";

/// Message shown to the caller when nothing usable matched the requested tag.
pub const NO_MATCHES_MESSAGE: &str = "No matching tags found on this page";

/// Application-wide error types for Harvest.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The selector found no element with the requested tag.
    #[error("No elements matched tag <{0}>")]
    NoMatches(String),

    /// A matched table element has no rows or no columns.
    #[error("No tabular data: {0}")]
    NoTabularData(String),

    /// Requested output format is not one of csv, excel, pdf.
    #[error("Unsupported output format: '{0}' (expected csv, excel or pdf)")]
    UnsupportedFormat(String),

    /// Encoding a dataset collection failed inside an exporter.
    #[error("Export error: {0}")]
    ExportError(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if the page could not be retrieved at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_) | AppError::NetworkError(_) | AppError::Timeout(_)
        )
    }

    /// One-line message suitable for returning to the end user.
    ///
    /// Internal failures (export, config) collapse to a generic message; their
    /// details belong in the logs, not in the response body.
    pub fn user_message(&self) -> String {
        match self {
            e if e.is_unreachable() => UNREACHABLE_MESSAGE.to_string(),
            AppError::NoMatches(_) | AppError::NoTabularData(_) => NO_MATCHES_MESSAGE.to_string(),
            AppError::UnsupportedFormat(_) => self.to_string(),
            _ => "Internal error".to_string(),
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::ExportError(format!("CSV: {err}"))
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::ExportError(format!("XLSX: {err}"))
    }
}
