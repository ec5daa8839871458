use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, Workbook, Worksheet};

use crate::error::AppError;
use crate::models::{Dataset, DatasetCollection};

/// Most significant digits Excel stores without rounding.
const MAX_EXACT_DIGITS: usize = 15;

/// Longest string a worksheet cell can hold, in characters.
const MAX_CELL_CHARS: usize = 32_767;

/// One worksheet to be written: its name and the dataset it holds.
#[derive(Debug, Clone, Copy)]
pub struct SheetPlan<'a> {
    pub number: usize,
    pub dataset: &'a Dataset,
}

impl SheetPlan<'_> {
    pub fn name(&self) -> String {
        sheet_name(self.number)
    }
}

/// Sheet name for table `number`.
pub fn sheet_name(number: usize) -> String {
    format!("Table_{number}")
}

/// Sheets in workbook order, one per dataset.
pub fn plan_workbook(tables: &DatasetCollection) -> Vec<SheetPlan<'_>> {
    tables
        .iter_numbered()
        .map(|(number, dataset)| SheetPlan { number, dataset })
        .collect()
}

/// Encode all tables into one XLSX workbook, one sheet per table.
///
/// Row 0 of each sheet holds the headers (bold, bordered); data starts at
/// row 1. Numeric-looking cells are stored as numbers, empty cells are left
/// blank.
pub fn tables_to_xlsx(tables: &DatasetCollection) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);

    for sheet in plan_workbook(tables) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name())?;
        write_sheet(worksheet, sheet.dataset, &header_format)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_sheet(
    worksheet: &mut Worksheet,
    dataset: &Dataset,
    header_format: &Format,
) -> Result<(), AppError> {
    for (col, header) in dataset.headers().iter().enumerate() {
        let text = cell_text(header, 0, col);
        worksheet.write_string_with_format(0, col_num(col)?, text, header_format)?;
    }

    for (r, row) in dataset.rows().iter().enumerate() {
        let row_num = row_num(r + 1)?;
        for (col, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let col_index = col_num(col)?;
            match numeric_value(cell) {
                Some(n) => worksheet.write_number(row_num, col_index, n)?,
                None => worksheet.write_string(row_num, col_index, cell_text(cell, r + 1, col))?,
            };
        }
    }

    Ok(())
}

/// Cut `text` to the cell size limit on a char boundary.
fn cell_text(text: &str, row: usize, col: usize) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            tracing::warn!(
                row,
                col,
                chars = text.chars().count(),
                "Cell exceeds {MAX_CELL_CHARS} characters, truncating"
            );
            &text[..cut]
        }
        None => text,
    }
}

/// Parse a cell as a number if Excel can hold it exactly.
fn numeric_value(cell: &str) -> Option<f64> {
    let digits = cell.chars().filter(char::is_ascii_digit).count();
    if digits == 0 || digits > MAX_EXACT_DIGITS {
        return None;
    }
    cell.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn row_num(index: usize) -> Result<RowNum, AppError> {
    RowNum::try_from(index)
        .map_err(|_| AppError::ExportError(format!("row {index} exceeds worksheet limits")))
}

fn col_num(index: usize) -> Result<ColNum, AppError> {
    ColNum::try_from(index)
        .map_err(|_| AppError::ExportError(format!("column {index} exceeds worksheet limits")))
}
