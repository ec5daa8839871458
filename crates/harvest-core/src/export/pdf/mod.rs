//! Paginated A4 document with one bold heading and one bordered grid per table.
//!
//! Layout and serialization are separate steps: [`layout_document`] places
//! every heading and cell on a page, [`render`] writes the PDF objects.

mod layout;
mod metrics;
mod render;

pub use layout::{
    CellBox, Document, DocumentStyle, DrawOp, Page, PageGeometry, column_widths, layout_document,
};
pub use metrics::{Font, encode_win_ansi, text_width};
pub use render::render;

use crate::error::AppError;
use crate::models::DatasetCollection;

/// Lay out and render all tables on A4 pages.
pub fn tables_to_pdf(tables: &DatasetCollection) -> Result<Vec<u8>, AppError> {
    let document = layout_document(tables, PageGeometry::a4(), DocumentStyle::default())?;
    tracing::debug!(pages = document.pages.len(), "PDF layout complete");
    Ok(render(&document))
}
