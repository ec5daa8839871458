use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use super::layout::{CellBox, Document, DocumentStyle, DrawOp, Page};
use super::metrics::{Font, encode_win_ansi};

const CATALOG_ID: i32 = 1;
const PAGE_TREE_ID: i32 = 2;
const REGULAR_FONT_ID: i32 = 3;
const BOLD_FONT_ID: i32 = 4;
const INFO_ID: i32 = 5;
/// Pages take two consecutive ids each (page object, content stream).
const FIRST_PAGE_ID: i32 = 6;

/// Serialize a laid-out document to PDF bytes.
///
/// Output depends only on the document: no timestamps or random ids.
pub fn render(document: &Document) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let page_tree_id = Ref::new(PAGE_TREE_ID);
    let regular_id = Ref::new(REGULAR_FONT_ID);
    let bold_id = Ref::new(BOLD_FONT_ID);

    let page_ids: Vec<(Ref, Ref)> = (0..document.pages.len())
        .map(|k| {
            let base = FIRST_PAGE_ID + 2 * k as i32;
            (Ref::new(base), Ref::new(base + 1))
        })
        .collect();

    pdf.catalog(Ref::new(CATALOG_ID)).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);

    for (id, font) in [(regular_id, Font::Regular), (bold_id, Font::Bold)] {
        pdf.type1_font(id)
            .base_font(Name(font.base_font()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    pdf.document_info(Ref::new(INFO_ID))
        .title(TextStr("Extracted tables"))
        .producer(TextStr("harvest"));

    let media_box = Rect::new(0.0, 0.0, document.geometry.width, document.geometry.height);
    for (page, &(page_id, content_id)) in document.pages.iter().zip(&page_ids) {
        let mut writer = pdf.page(page_id);
        writer
            .media_box(media_box)
            .parent(page_tree_id)
            .contents(content_id);
        writer
            .resources()
            .fonts()
            .pair(Name(Font::Regular.resource_name()), regular_id)
            .pair(Name(Font::Bold.resource_name()), bold_id);
        writer.finish();

        let content = page_content(page, &document.style);
        pdf.stream(content_id, &content.finish());
    }

    pdf.finish()
}

fn page_content(page: &Page, style: &DocumentStyle) -> Content {
    let mut content = Content::new();
    for op in &page.ops {
        match op {
            DrawOp::Heading { x, baseline, text } => {
                content.set_fill_gray(0.0);
                show_text(&mut content, Font::Bold, style.heading_size, *x, *baseline, text);
            }
            DrawOp::Cell(cell) => draw_cell(&mut content, cell, style),
        }
    }
    content
}

fn draw_cell(content: &mut Content, cell: &CellBox, style: &DocumentStyle) {
    if cell.header {
        content.save_state();
        content.set_fill_gray(style.header_gray);
        content.rect(cell.x, cell.y, cell.width, cell.height);
        content.fill_nonzero();
        content.restore_state();
    }

    // text never escapes its cell
    content.save_state();
    content.rect(cell.x, cell.y, cell.width, cell.height);
    content.clip_nonzero();
    content.end_path();
    content.set_fill_gray(0.0);
    show_text(
        content,
        cell.font(),
        style.cell_font_size,
        cell.text_x,
        cell.baseline,
        &cell.text,
    );
    content.restore_state();

    content.save_state();
    content.set_line_width(style.grid_width);
    content.set_stroke_gray(0.0);
    content.rect(cell.x, cell.y, cell.width, cell.height);
    content.stroke();
    content.restore_state();
}

fn show_text(content: &mut Content, font: Font, size: f32, x: f32, baseline: f32, text: &str) {
    if text.is_empty() {
        return;
    }
    let encoded = encode_win_ansi(text);
    content.begin_text();
    content.set_font(Name(font.resource_name()), size);
    content.next_line(x, baseline);
    content.show(Str(&encoded));
    content.end_text();
}
