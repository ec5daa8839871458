//! Multi-table exporters.
//!
//! Every exporter walks the collection in order and labels table `i`
//! (1-based) the same way: `Table {i}` in CSV and PDF, `Table_{i}` as the
//! sheet name in XLSX.

pub mod csv;
pub mod pdf;
pub mod xlsx;

use crate::error::AppError;
use crate::models::{DatasetCollection, ExportArtifact, ExportFormat};

/// Title used for table `number` in CSV and PDF output.
pub fn table_title(number: usize) -> String {
    format!("Table {number}")
}

/// Encode `tables` in the requested format.
pub fn export(format: ExportFormat, tables: &DatasetCollection) -> Result<ExportArtifact, AppError> {
    let bytes = match format {
        ExportFormat::Csv => csv::tables_to_csv(tables)?,
        ExportFormat::Excel => xlsx::tables_to_xlsx(tables)?,
        ExportFormat::Pdf => pdf::tables_to_pdf(tables)?,
    };

    tracing::info!(
        %format,
        tables = tables.len(),
        bytes = bytes.len(),
        "Export complete"
    );

    Ok(ExportArtifact {
        file_name: format.file_name(),
        content_type: format.content_type(),
        bytes,
    })
}
