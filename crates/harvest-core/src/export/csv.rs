use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::AppError;
use crate::export::table_title;
use crate::models::DatasetCollection;

/// Separator written between consecutive tables: two empty lines.
const TABLE_SEPARATOR: &[u8] = b"\n\n";

/// Encode all tables into one UTF-8 CSV stream.
///
/// Each table is a `Table {i}` line followed by its header row and data
/// rows. Cells containing a comma, quote or newline are quoted.
pub fn tables_to_csv(tables: &DatasetCollection) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();

    for (i, dataset) in tables.iter_numbered() {
        if i > 1 {
            buffer.extend_from_slice(TABLE_SEPARATOR);
        }
        buffer.extend_from_slice(table_title(i).as_bytes());
        buffer.push(b'\n');

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut buffer);
        for record in dataset.records() {
            writer.write_record(record)?;
        }
        writer
            .flush()
            .map_err(|e| AppError::ExportError(format!("CSV: {e}")))?;
    }

    Ok(buffer)
}
