use crate::error::AppError;
use crate::export::table_title;
use crate::models::{Dataset, DatasetCollection};

use super::metrics::{Font, text_width};

/// Page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// A4 portrait with 30pt margins on every side.
    pub fn a4() -> Self {
        Self {
            width: 595.2756,
            height: 841.8898,
            margin: 30.0,
        }
    }

    /// Width between the left and right margins.
    pub fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    fn top(&self) -> f32 {
        self.height - self.margin
    }

    fn bottom(&self) -> f32 {
        self.margin
    }
}

/// Fixed visual theme of the generated document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentStyle {
    pub heading_size: f32,
    pub heading_leading: f32,
    pub heading_space_after: f32,
    /// Spacer between a heading and its table.
    pub heading_gap: f32,
    /// Spacer after a table.
    pub table_gap: f32,
    pub cell_font_size: f32,
    pub cell_leading: f32,
    pub header_padding: f32,
    pub body_padding: f32,
    pub grid_width: f32,
    /// Fill of the header row (0 = black, 1 = white).
    pub header_gray: f32,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self {
            heading_size: 14.0,
            heading_leading: 18.0,
            heading_space_after: 6.0,
            heading_gap: 10.0,
            table_gap: 30.0,
            cell_font_size: 8.0,
            cell_leading: 9.6,
            header_padding: 6.0,
            body_padding: 3.0,
            grid_width: 1.0,
            header_gray: 0.827,
        }
    }
}

impl DocumentStyle {
    fn padding(&self, header: bool) -> f32 {
        if header {
            self.header_padding
        } else {
            self.body_padding
        }
    }

    /// Height of a grid row: text leading plus top and bottom padding.
    pub fn row_height(&self, header: bool) -> f32 {
        self.cell_leading + 2.0 * self.padding(header)
    }

    fn heading_block(&self) -> f32 {
        self.heading_leading + self.heading_space_after + self.heading_gap
    }
}

/// One grid cell: its box and where its (centred) text starts.
#[derive(Debug, Clone, PartialEq)]
pub struct CellBox {
    pub x: f32,
    /// Bottom edge of the cell.
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub text_x: f32,
    pub baseline: f32,
    pub header: bool,
}

impl CellBox {
    pub fn font(&self) -> Font {
        if self.header { Font::Bold } else { Font::Regular }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Heading { x: f32, baseline: f32, text: String },
    Cell(CellBox),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Positioned content for every page of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub geometry: PageGeometry,
    pub style: DocumentStyle,
    pub pages: Vec<Page>,
}

/// Equal column widths filling `usable_width`.
///
/// Widths shrink without limit as the column count grows; zero columns is
/// rejected since there is nothing to divide the width between.
pub fn column_widths(usable_width: f32, columns: usize) -> Result<Vec<f32>, AppError> {
    if columns == 0 {
        return Err(AppError::NoTabularData(
            "cannot lay out a table with zero columns".into(),
        ));
    }
    Ok(vec![usable_width / columns as f32; columns])
}

/// Place every heading and grid cell of `tables` onto pages.
pub fn layout_document(
    tables: &DatasetCollection,
    geometry: PageGeometry,
    style: DocumentStyle,
) -> Result<Document, AppError> {
    let mut cursor = Cursor {
        geometry,
        pages: vec![Page::default()],
        y: geometry.top(),
    };

    for (number, dataset) in tables.iter_numbered() {
        layout_table(&mut cursor, &style, number, dataset)?;
    }

    Ok(Document {
        geometry,
        style,
        pages: cursor.pages,
    })
}

/// Vertical position on the current page, moving down as content is placed.
struct Cursor {
    geometry: PageGeometry,
    pages: Vec<Page>,
    y: f32,
}

impl Cursor {
    /// Start a new page unless `needed` points still fit on this one.
    /// A fresh page never breaks again, so oversized content is placed anyway.
    fn reserve(&mut self, needed: f32) {
        let fresh = self.y >= self.geometry.top();
        if !fresh && self.y - needed < self.geometry.bottom() {
            self.pages.push(Page::default());
            self.y = self.geometry.top();
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

fn layout_table(
    cursor: &mut Cursor,
    style: &DocumentStyle,
    number: usize,
    dataset: &Dataset,
) -> Result<(), AppError> {
    let left = cursor.geometry.margin;
    let widths = column_widths(cursor.geometry.usable_width(), dataset.width())?;

    // keep a heading on the same page as at least the header row
    cursor.reserve(style.heading_block() + style.row_height(true));
    cursor.push(DrawOp::Heading {
        x: left,
        baseline: cursor.y - style.heading_size,
        text: table_title(number),
    });
    cursor.y -= style.heading_block();

    for (index, record) in dataset.records().enumerate() {
        let header = index == 0;
        let height = style.row_height(header);
        cursor.reserve(height);

        let y = cursor.y - height;
        let baseline = y + style.padding(header) + (style.cell_leading - style.cell_font_size);
        let mut x = left;
        for (text, &width) in record.iter().zip(&widths) {
            let font = if header { Font::Bold } else { Font::Regular };
            let text_x = x + (width - text_width(text, font, style.cell_font_size)) / 2.0;
            cursor.push(DrawOp::Cell(CellBox {
                x,
                y,
                width,
                height,
                text: text.clone(),
                text_x,
                baseline,
                header,
            }));
            x += width;
        }
        cursor.y = y;
    }

    cursor.y -= style.table_gap;
    Ok(())
}
