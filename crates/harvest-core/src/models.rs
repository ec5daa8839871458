use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// The only tag whose matches are turned into datasets instead of text.
pub const TABLE_TAG: &str = "table";

/// Normalize a user-supplied tag name for matching (`" TABLE "` -> `"table"`).
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_ascii_lowercase()
}

/// Headers plus rows extracted from one HTML table.
///
/// Every row has exactly `headers.len()` cells; construction goes through
/// [`Dataset::new`], which fits irregular rows with [`fit_row_width`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset, fitting every row to the header width.
    ///
    /// Fails with [`AppError::NoTabularData`] when there are no headers.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, AppError> {
        if headers.is_empty() {
            return Err(AppError::NoTabularData("table has no columns".into()));
        }
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|row| fit_row_width(row, width))
            .collect();
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of columns (always at least 1).
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Number of data rows, header excluded.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Header row followed by data rows.
    pub fn records(&self) -> impl Iterator<Item = &[String]> {
        std::iter::once(self.headers.as_slice()).chain(self.rows.iter().map(Vec::as_slice))
    }
}

/// Pad a row with empty cells on the right, or drop cells past `width`.
pub fn fit_row_width(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}

/// Datasets for one request, in document order.
///
/// Position in the collection is the table number used by every exporter
/// (`Table 1`, `Table_1`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCollection(Vec<Dataset>);

impl DatasetCollection {
    pub fn new(datasets: Vec<Dataset>) -> Result<Self, AppError> {
        if datasets.is_empty() {
            return Err(AppError::NoTabularData(
                "no table could be parsed on this page".into(),
            ));
        }
        Ok(Self(datasets))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(number, dataset)` pairs with numbering starting at 1.
    pub fn iter_numbered(&self) -> impl Iterator<Item = (usize, &Dataset)> {
        self.0.iter().enumerate().map(|(i, d)| (i + 1, d))
    }
}

/// Output encoding for a dataset collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Excel, ExportFormat::Pdf];

    /// Download name offered to the client.
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "tables_separate.csv",
            ExportFormat::Excel => "tables_separate.xlsx",
            ExportFormat::Pdf => "tables_separate.pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
            ExportFormat::Pdf => "pdf",
        };
        f.write_str(token)
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(AppError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// An encoded export ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// One element returned by an [`ElementSelector`](crate::traits::ElementSelector).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedElement {
    /// Outer HTML of the element.
    pub html: String,
    /// Text nodes, each trimmed, empty ones dropped, joined without separator.
    pub text: String,
}

/// A single harvest request as submitted by the caller.
#[derive(Debug, Clone)]
pub struct HarvestRequest {
    pub url: String,
    pub tag: String,
    /// Only consulted when `tag` is `table`.
    pub format: Option<ExportFormat>,
}

impl HarvestRequest {
    pub fn is_table(&self) -> bool {
        normalize_tag(&self.tag) == TABLE_TAG
    }
}

/// What a harvest produces: plain text for ordinary tags, a file for tables.
#[derive(Debug, Clone)]
pub enum HarvestOutcome {
    Text(String),
    Export(ExportArtifact),
}
