use log::debug;

use super::canvas::{wrap, Canvas, BLACK, BOLD, HEADER_BLUE, LIGHT_GREY, REGULAR, WHITE};
use super::{BOTTOM_LIMIT, PAGE_HEIGHT};
use crate::report::BuildRow;

const LEFT: f32 = 12.0;
const FONT_SIZE: f32 = 6.0;
const LINE_HEIGHT: f32 = 7.0;
const CELL_PADDING: f32 = 2.0;

/// Lines a single cell may wrap to. Keeps every row shorter than a page.
const MAX_CELL_LINES: usize = 40;

/// Column widths in points, in `BuildRow::HEADERS` order. Sums to the A4
/// width minus the side margins.
const COLUMN_WIDTHS: [f32; 14] = [
    44.0, 34.0, 38.0, 40.0, 30.0, 44.0, 44.0, 44.0, 34.0, 34.0, 36.0, 48.0, 44.0, 57.0,
];

/// Lays out one pipeline's builds, starting a new page whenever the next row
/// would run into the footer. The header row is repeated on every page.
pub(super) fn table_pages(pipeline_name: &str, rows: &[BuildRow]) -> Vec<Canvas> {
    let header = wrap_cells(&BuildRow::HEADERS);

    let mut pages = Vec::new();
    let mut canvas = Canvas::new();
    canvas.text(LEFT, PAGE_HEIGHT - 40.0, 18.0, BOLD, BLACK, "Build Details by Pipeline");
    canvas.text(
        LEFT,
        PAGE_HEIGHT - 62.0,
        14.0,
        REGULAR,
        BLACK,
        &format!("Pipeline: {pipeline_name}"),
    );
    let mut y = draw_row(&mut canvas, PAGE_HEIGHT - 75.0, &header, RowStyle::Header);

    for (index, row) in rows.iter().enumerate() {
        let cells = wrap_cells(&row.cells());
        if y - row_height(&cells) < BOTTOM_LIMIT {
            pages.push(std::mem::take(&mut canvas));
            canvas.text(
                LEFT,
                PAGE_HEIGHT - 30.0,
                10.0,
                REGULAR,
                BLACK,
                &format!("Pipeline: {pipeline_name} (continued)"),
            );
            y = draw_row(&mut canvas, PAGE_HEIGHT - 42.0, &header, RowStyle::Header);
        }

        let style = if index % 2 == 0 {
            RowStyle::Plain
        } else {
            RowStyle::Shaded
        };
        y = draw_row(&mut canvas, y, &cells, style);
    }

    pages.push(canvas);
    pages
}

#[derive(Clone, Copy)]
enum RowStyle {
    Header,
    Plain,
    Shaded,
}

fn wrap_cells(cells: &[&str]) -> Vec<Vec<String>> {
    cells
        .iter()
        .zip(COLUMN_WIDTHS)
        .map(|(text, width)| {
            clamp_lines(wrap(text, width - 2.0 * CELL_PADDING, FONT_SIZE))
        })
        .collect()
}

/// Drops lines past `MAX_CELL_LINES`, marking the cut with `..`.
fn clamp_lines(mut lines: Vec<String>) -> Vec<String> {
    if lines.len() <= MAX_CELL_LINES {
        return lines;
    }
    debug!("Cutting a table cell from {} to {MAX_CELL_LINES} lines", lines.len());
    lines.truncate(MAX_CELL_LINES);
    if let Some(last) = lines.last_mut() {
        let kept = last.chars().count().saturating_sub(2);
        *last = format!("{}..", last.chars().take(kept).collect::<String>());
    }
    lines
}

fn row_height(cells: &[Vec<String>]) -> f32 {
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
    lines as f32 * LINE_HEIGHT + 2.0 * CELL_PADDING
}

/// Draws a row whose top edge is at `top` and returns its bottom edge.
fn draw_row(canvas: &mut Canvas, top: f32, cells: &[Vec<String>], style: RowStyle) -> f32 {
    let height = row_height(cells);
    let bottom = top - height;
    let width: f32 = COLUMN_WIDTHS.iter().sum();

    let (background, font, color) = match style {
        RowStyle::Header => (Some(HEADER_BLUE), BOLD, WHITE),
        RowStyle::Plain => (None, REGULAR, BLACK),
        RowStyle::Shaded => (Some(LIGHT_GREY), REGULAR, BLACK),
    };
    if let Some(background) = background {
        canvas.rect(LEFT, bottom, width, height, background);
    }

    let mut x = LEFT;
    for (lines, column_width) in cells.iter().zip(COLUMN_WIDTHS) {
        for (i, line) in lines.iter().enumerate() {
            let baseline = top - CELL_PADDING - (i as f32 + 1.0) * LINE_HEIGHT + 1.5;
            canvas.text(x + CELL_PADDING, baseline, FONT_SIZE, font, color, line);
        }
        x += column_width;
    }

    bottom
}
