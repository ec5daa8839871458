//! Table Normalizer: one `<table>` fragment in, one [`Dataset`] out.
//!
//! Row and cell segmentation follows what `read_html`-style parsers do:
//! `thead` rows first, then body rows, then `tfoot` rows; `colspan` and
//! `rowspan` cells are repeated into every grid slot they cover; elements
//! hidden with `display: none` are ignored. The first grid row becomes the
//! header and every other row is fitted to its width.

use std::collections::VecDeque;
use std::sync::LazyLock;

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::error::AppError;
use crate::models::Dataset;

/// Upper bound for `colspan`/`rowspan` values taken from the page.
const MAX_SPAN: usize = 1000;

/// Upper bound for grid slots produced by span expansion of one table.
const MAX_GRID_CELLS: usize = 1_000_000;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("static selector is valid"));

/// Parse a table fragment into a [`Dataset`].
///
/// Fails with [`AppError::NoTabularData`] when the fragment holds no table,
/// the table has no rows, or its header row has no cells.
pub fn normalize_table(fragment: &str) -> Result<Dataset, AppError> {
    let document = Html::parse_fragment(fragment);
    let table = document
        .select(&TABLE_SELECTOR)
        .next()
        .ok_or_else(|| AppError::NoTabularData("fragment contains no <table>".into()))?;

    let mut grid = expand_spans(table_rows(table))?;
    if grid.is_empty() {
        return Err(AppError::NoTabularData("table has no rows".into()));
    }

    let headers = grid.remove(0);
    if headers.is_empty() {
        return Err(AppError::NoTabularData("table has no columns".into()));
    }

    Dataset::new(headers, grid)
}

/// A parsed cell before span expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawCell {
    text: String,
    colspan: usize,
    rowspan: usize,
}

/// Rows that belong to `table` itself, excluding rows of nested tables.
fn table_rows(table: ElementRef<'_>) -> Vec<Vec<RawCell>> {
    let mut head = Vec::new();
    let mut body = Vec::new();
    let mut foot = Vec::new();

    for child in visible_children(table) {
        match child.value().name() {
            "tr" => body.push(child),
            "thead" => head.extend(visible_children(child).filter(is_row)),
            "tbody" => body.extend(visible_children(child).filter(is_row)),
            "tfoot" => foot.extend(visible_children(child).filter(is_row)),
            _ => {}
        }
    }

    head.into_iter()
        .chain(body)
        .chain(foot)
        .map(|row| {
            visible_children(row)
                .filter(|c| matches!(c.value().name(), "td" | "th"))
                .map(|cell| RawCell {
                    text: cell_text(cell),
                    colspan: span_attr(cell, "colspan"),
                    rowspan: span_attr(cell, "rowspan"),
                })
                .collect()
        })
        .collect()
}

/// Lay cells out on a grid, repeating spanned text into every covered slot.
///
/// Rows that end up with no cells at all are dropped. Rowspans running past
/// the last row produce trailing rows made of the carried-over cells. Once the
/// header row is laid out its width bounds every later row, and the whole grid
/// is capped at [`MAX_GRID_CELLS`] slots.
fn expand_spans(rows: Vec<Vec<RawCell>>) -> Result<Vec<Vec<String>>, AppError> {
    let mut grid = Vec::new();
    let mut width = None;
    let mut budget = MAX_GRID_CELLS;
    // (column, text, rows still to fill), ordered by column
    let mut carried: VecDeque<(usize, String, usize)> = VecDeque::new();

    for row in rows {
        let mut line = GridRow::new(width, &mut budget);

        for cell in row {
            line.place_carried(&mut carried, false)?;
            for _ in 0..cell.colspan {
                if !line.push(cell.text.clone(), cell.rowspan)? {
                    break;
                }
            }
        }
        line.place_carried(&mut carried, true)?;

        let (out, next) = line.finish();
        if !out.is_empty() {
            width.get_or_insert(out.len());
            grid.push(out);
        }
        carried = next;
    }

    while !carried.is_empty() {
        let mut line = GridRow::new(width, &mut budget);
        line.place_carried(&mut carried, true)?;
        let (out, next) = line.finish();
        if out.is_empty() {
            break;
        }
        grid.push(out);
        carried = next;
    }

    Ok(grid)
}

/// One grid row under construction, plus the spans it hands to the next row.
struct GridRow<'a> {
    out: Vec<String>,
    next: VecDeque<(usize, String, usize)>,
    limit: usize,
    budget: &'a mut usize,
}

impl<'a> GridRow<'a> {
    fn new(width: Option<usize>, budget: &'a mut usize) -> Self {
        Self {
            out: Vec::new(),
            next: VecDeque::new(),
            limit: width.unwrap_or(usize::MAX),
            budget,
        }
    }

    /// Append one slot. Returns `false` once the row is full.
    fn push(&mut self, text: String, rowspan: usize) -> Result<bool, AppError> {
        if self.out.len() >= self.limit {
            return Ok(false);
        }
        if *self.budget == 0 {
            return Err(AppError::NoTabularData(format!(
                "table expands to more than {MAX_GRID_CELLS} cells"
            )));
        }
        *self.budget -= 1;
        if rowspan > 1 {
            self.next.push_back((self.out.len(), text.clone(), rowspan - 1));
        }
        self.out.push(text);
        Ok(true)
    }

    /// Emit carried-over cells whose column is at or before the current
    /// position (or all of them when `flush` is set).
    fn place_carried(
        &mut self,
        carried: &mut VecDeque<(usize, String, usize)>,
        flush: bool,
    ) -> Result<(), AppError> {
        while let Some((col, _, _)) = carried.front() {
            if !flush && *col > self.out.len() {
                break;
            }
            let Some((_, text, remaining)) = carried.pop_front() else {
                break;
            };
            if !self.push(text, remaining)? {
                carried.clear();
                break;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> (Vec<String>, VecDeque<(usize, String, usize)>) {
        self.next.make_contiguous().sort_by_key(|(col, _, _)| *col);
        (self.out, self.next)
    }
}

fn visible_children<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| !is_hidden(*child))
}

fn is_row(el: &ElementRef<'_>) -> bool {
    el.value().name() == "tr"
}

fn is_hidden(el: ElementRef<'_>) -> bool {
    el.value().attr("style").is_some_and(|style| {
        style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase()
            .contains("display:none")
    })
}

fn span_attr(cell: ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

/// Flattened visible text of a cell with whitespace runs collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(cell, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if !is_hidden(child) {
                        collect_text(child, out);
                        // keep words from separate block elements apart
                        if is_block(child.value().name()) {
                            out.push(' ');
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "br" | "p" | "div" | "li" | "tr" | "td" | "th" | "table" | "ul" | "ol"
    )
}
