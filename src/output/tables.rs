use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::report::{RESULT_FAILED, RESULT_SUCCEEDED};

const BAR_WIDTH: usize = 20;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

pub fn color_coded_result_cell(result: &str) -> Cell {
    let color = match result {
        RESULT_SUCCEEDED => TableColor::Green,
        RESULT_FAILED => TableColor::Red,
        "partiallySucceeded" => TableColor::Yellow,
        _ => TableColor::DarkGrey,
    };
    Cell::new(result).fg(color)
}

pub fn color_coded_success_cell(rate: f64) -> Cell {
    let text = format!("{rate:.1}%");
    if rate > 80.0 {
        Cell::new(text).fg(TableColor::Green)
    } else if rate >= 50.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}

/// Horizontal bar proportional to `count / max`.
pub fn share_bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = (count * BAR_WIDTH).div_ceil(max).min(BAR_WIDTH);
    "█".repeat(filled)
}
