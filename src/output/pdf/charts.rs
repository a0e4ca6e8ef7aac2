use std::f32::consts::{FRAC_PI_2, TAU};

use super::canvas::{fit, palette, Canvas, BLACK, BOLD, GREY, LIGHT_GREY, REGULAR};
use super::{PAGE_HEIGHT, PAGE_WIDTH};
use crate::report::{Bucket, Chart, ChartKind, ChartSet, PullRequestBuild};

const MARGIN: f32 = 30.0;
const GUTTER: f32 = 12.0;
const COLUMNS: usize = 2;
const ROWS: usize = 4;
const GRID_TOP: f32 = PAGE_HEIGHT - 50.0;
const GRID_BOTTOM: f32 = 40.0;

#[derive(Debug, Clone, Copy)]
struct Card {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Card {
    fn at(slot: usize) -> Self {
        let width = (PAGE_WIDTH - 2.0 * MARGIN - GUTTER * (COLUMNS - 1) as f32) / COLUMNS as f32;
        let height = (GRID_TOP - GRID_BOTTOM - GUTTER * (ROWS - 1) as f32) / ROWS as f32;
        let column = slot % COLUMNS;
        let row = slot / COLUMNS;
        Self {
            x: MARGIN + column as f32 * (width + GUTTER),
            y: GRID_TOP - (row + 1) as f32 * height - row as f32 * GUTTER,
            width,
            height,
        }
    }

    fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// One page holding every chart of a chart set in a two-column grid.
pub(super) fn chart_page(heading: &str, set: &ChartSet) -> Canvas {
    let mut canvas = Canvas::new();
    canvas.text(MARGIN, PAGE_HEIGHT - 30.0, 16.0, BOLD, BLACK, heading);

    let total = [Bucket {
        name: "Total".to_string(),
        count: set.total,
    }];
    draw_card_frame(&mut canvas, Card::at(0), "Total Builds");
    draw_bars(&mut canvas, Card::at(0), &total);

    for (index, chart) in set.charts.iter().take(COLUMNS * ROWS - 2).enumerate() {
        let card = Card::at(index + 1);
        draw_chart(&mut canvas, card, chart);
    }

    if !set.pull_requests.is_empty() {
        let card = Card::at(set.charts.len().min(COLUMNS * ROWS - 2) + 1);
        draw_card_frame(&mut canvas, card, "PR Build Results");
        draw_pull_requests(&mut canvas, card, &set.pull_requests);
    }

    canvas
}

fn draw_chart(canvas: &mut Canvas, card: Card, chart: &Chart) {
    draw_card_frame(canvas, card, &chart.title);
    if chart.buckets.is_empty() {
        let y = card.y + card.height / 2.0;
        canvas.text(card.x + 10.0, y, 9.0, REGULAR, GREY, "No data");
        return;
    }
    match chart.kind {
        ChartKind::Proportion => draw_pie(canvas, card, &chart.buckets),
        ChartKind::Count => draw_bars(canvas, card, &chart.buckets),
    }
}

fn draw_card_frame(canvas: &mut Canvas, card: Card, title: &str) {
    let (x, y, w, h) = (card.x, card.y, card.width, card.height);
    canvas.line((x, y), (x + w, y), 0.5, LIGHT_GREY);
    canvas.line((x, y + h), (x + w, y + h), 0.5, LIGHT_GREY);
    canvas.line((x, y), (x, y + h), 0.5, LIGHT_GREY);
    canvas.line((x + w, y), (x + w, y + h), 0.5, LIGHT_GREY);
    canvas.text(x + 6.0, card.top() - 14.0, 10.0, BOLD, BLACK, title);
}

fn draw_pie(canvas: &mut Canvas, card: Card, buckets: &[Bucket]) {
    let total: usize = buckets.iter().map(|b| b.count).sum();
    let area_top = card.top() - 22.0;
    let area_bottom = card.y + 6.0;
    let radius = ((area_top - area_bottom) / 2.0).min(card.width * 0.22);
    let center = (card.x + 10.0 + radius, (area_top + area_bottom) / 2.0);

    // Clockwise from twelve o'clock.
    let mut angle = FRAC_PI_2;
    for (index, bucket) in buckets.iter().enumerate() {
        let sweep = bucket.count as f32 / total as f32 * TAU;
        canvas.slice(center, radius, angle - sweep, angle, palette(index));
        angle -= sweep;
    }

    let legend_x = center.0 + radius + 12.0;
    let legend_width = card.x + card.width - legend_x - 16.0;
    let capacity = ((area_top - area_bottom) / 10.0).floor().max(1.0) as usize;
    let shown = if buckets.len() > capacity {
        capacity - 1
    } else {
        buckets.len()
    };

    let mut y = area_top - 8.0;
    for (index, bucket) in buckets.iter().take(shown).enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let percent = bucket.count as f32 / total as f32 * 100.0;
        canvas.rect(legend_x, y, 6.0, 6.0, palette(index));
        let label = format!("{} ({}, {percent:.0}%)", bucket.name, bucket.count);
        let label = fit(&label, legend_width, 7.0);
        canvas.text(legend_x + 10.0, y, 7.0, REGULAR, BLACK, &label);
        y -= 10.0;
    }
    if shown < buckets.len() {
        let rest = format!("+{} more", buckets.len() - shown);
        canvas.text(legend_x + 10.0, y, 7.0, REGULAR, GREY, &rest);
    }
}

fn draw_bars(canvas: &mut Canvas, card: Card, buckets: &[Bucket]) {
    let left = card.x + 26.0;
    let right = card.x + card.width - 8.0;
    let bottom = card.y + 18.0;
    let top = card.top() - 30.0;

    canvas.line((left, bottom), (right, bottom), 0.5, GREY);
    canvas.line((left, bottom), (left, top), 0.5, GREY);

    let max = buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    canvas.text(card.x + 6.0, top - 3.0, 6.0, REGULAR, GREY, &max.to_string());
    canvas.text(card.x + 6.0, bottom - 2.0, 6.0, REGULAR, GREY, "0");

    let slot = (right - left) / buckets.len().max(1) as f32;
    for (index, bucket) in buckets.iter().enumerate() {
        let height = bucket.count as f32 / max as f32 * (top - bottom);
        let bar_width = slot * 0.6;
        let x = left + slot * index as f32 + (slot - bar_width) / 2.0;
        canvas.rect(x, bottom, bar_width, height, palette(index));

        let count = bucket.count.to_string();
        canvas.text(x, bottom + height + 2.0, 6.0, REGULAR, BLACK, &count);
        let label = fit(&bucket.name, slot - 2.0, 6.0);
        let label_x = left + slot * index as f32 + 1.0;
        canvas.text(label_x, bottom - 8.0, 6.0, REGULAR, BLACK, &label);
    }
}

fn draw_pull_requests(canvas: &mut Canvas, card: Card, builds: &[PullRequestBuild]) {
    let width = card.width - 12.0;
    let capacity = ((card.height - 26.0) / 18.0).floor().max(1.0) as usize;

    let mut y = card.top() - 28.0;
    for build in builds.iter().take(capacity) {
        let headline = format!("{}: {} ({})", build.sender, build.result, build.status);
        canvas.text(card.x + 6.0, y, 7.0, BOLD, BLACK, &fit(&headline, width, 7.0));
        let title = fit(&build.title, width, 7.0);
        canvas.text(card.x + 6.0, y - 8.0, 7.0, REGULAR, GREY, &title);
        y -= 18.0;
    }
    if builds.len() > capacity {
        let rest = format!("+{} more", builds.len() - capacity);
        canvas.text(card.x + 6.0, y, 7.0, REGULAR, GREY, &rest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(name: &str, count: usize) -> Bucket {
        Bucket {
            name: name.to_string(),
            count,
        }
    }

    #[test]
    fn test_cards_stay_on_page_and_do_not_overlap() {
        let cards: Vec<_> = (0..COLUMNS * ROWS).map(Card::at).collect();

        for card in &cards {
            assert!(card.x >= MARGIN - 0.01);
            assert!(card.x + card.width <= PAGE_WIDTH - MARGIN + 0.01);
            assert!(card.y >= GRID_BOTTOM - 0.01);
            assert!(card.top() <= GRID_TOP + 0.01);
        }
        for (i, a) in cards.iter().enumerate() {
            for b in cards.iter().skip(i + 1) {
                let apart_x = a.x + a.width <= b.x + 0.01 || b.x + b.width <= a.x + 0.01;
                let apart_y = a.top() <= b.y + 0.01 || b.top() <= a.y + 0.01;
                assert!(apart_x || apart_y);
            }
        }
    }

    #[test]
    fn test_chart_page_draws_every_card() {
        let set = ChartSet {
            total: 3,
            charts: vec![
                Chart {
                    title: "Build Results".to_string(),
                    kind: ChartKind::Proportion,
                    buckets: vec![bucket("succeeded", 2), bucket("failed", 1)],
                },
                Chart {
                    title: "Build Reasons".to_string(),
                    kind: ChartKind::Count,
                    buckets: vec![],
                },
            ],
            pull_requests: vec![PullRequestBuild {
                sender: "octocat".to_string(),
                title: "Fix it".to_string(),
                result: "succeeded".to_string(),
                status: "completed".to_string(),
            }],
        };

        let ops = chart_page("Pipeline: CI", &set).into_operations();
        let slices = ops.iter().filter(|op| op.operator == "c").count();
        let texts = ops.iter().filter(|op| op.operator == "Tj").count();

        // two slices, each at least one curve segment
        assert!(slices >= 2);
        // heading, 4 card titles, legend, axis and label texts
        assert!(texts > 10);
    }
}
