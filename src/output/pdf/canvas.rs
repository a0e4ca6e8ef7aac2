use lopdf::content::Operation;
use lopdf::{Object, StringFormat};
use std::f32::consts::FRAC_PI_2;

pub(super) const REGULAR: &str = "F1";
pub(super) const BOLD: &str = "F2";

/// Rough Helvetica advance width as a fraction of the font size.
const AVG_CHAR_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Rgb(pub f32, pub f32, pub f32);

pub(super) const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
pub(super) const GREY: Rgb = Rgb(0.45, 0.45, 0.45);
pub(super) const LIGHT_GREY: Rgb = Rgb(0.93, 0.93, 0.93);
pub(super) const HEADER_BLUE: Rgb = Rgb(0.16, 0.5, 0.73);
pub(super) const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);

/// Slice and bar colours, cycled by index.
pub(super) const PALETTE: [Rgb; 8] = [
    Rgb(0.0, 0.533, 0.996),
    Rgb(0.0, 0.769, 0.624),
    Rgb(1.0, 0.733, 0.157),
    Rgb(1.0, 0.502, 0.259),
    Rgb(0.533, 0.518, 0.847),
    Rgb(0.51, 0.792, 0.616),
    Rgb(1.0, 0.42, 0.42),
    Rgb(0.306, 0.804, 0.769),
];

pub(super) fn palette(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}

/// Estimated rendered width of `text` in points.
pub(super) fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_CHAR_WIDTH
}

/// Cuts `text` so it fits in `width` points, marking the cut with `..`.
pub(super) fn fit(text: &str, width: f32, size: f32) -> String {
    let max_chars = (width / (size * AVG_CHAR_WIDTH)).floor().max(0.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(2)).collect();
    format!("{kept}..")
}

/// Word-wraps `text` into lines of at most `width` points, hard-splitting
/// words that are longer than a line.
pub(super) fn wrap(text: &str, width: f32, size: f32) -> Vec<String> {
    let max_chars = ((width / (size * AVG_CHAR_WIDTH)).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..max_chars).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Characters WinAnsi places in 0x80..=0x9F, where Latin-1 has control codes.
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Encodes `text` for the standard fonts' WinAnsi encoding. Characters it
/// cannot show become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match u32::from(c) {
        0x00..=0x7F | 0xA0..=0xFF => u32::from(c) as u8,
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(glyph, _)| *glyph == c)
            .map_or(b'?', |&(_, byte)| byte),
    }
}

/// Accumulates drawing operations for one page body.
/// Coordinates are PDF points with the origin at the bottom-left.
#[derive(Default)]
pub(super) struct Canvas {
    ops: Vec<Operation>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.ops
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    pub fn fill_color(&mut self, color: Rgb) {
        self.op("rg", vec![color.0.into(), color.1.into(), color.2.into()]);
    }

    fn stroke_color(&mut self, color: Rgb) {
        self.op("RG", vec![color.0.into(), color.1.into(), color.2.into()]);
    }

    pub fn text(&mut self, x: f32, y: f32, size: f32, font: &str, color: Rgb, text: &str) {
        self.fill_color(color);
        self.op("BT", vec![]);
        self.op("Tf", vec![font.into(), size.into()]);
        self.op("Td", vec![x.into(), y.into()]);
        self.op(
            "Tj",
            vec![Object::String(encode_text(text), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
    }

    pub fn text_centered(&mut self, cx: f32, y: f32, size: f32, font: &str, text: &str) {
        let x = cx - text_width(text, size) / 2.0;
        self.text(x, y, size, font, BLACK, text);
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.fill_color(color);
        self.op("re", vec![x.into(), y.into(), width.into(), height.into()]);
        self.op("f", vec![]);
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
        self.stroke_color(color);
        self.op("w", vec![width.into()]);
        self.op("m", vec![from.0.into(), from.1.into()]);
        self.op("l", vec![to.0.into(), to.1.into()]);
        self.op("S", vec![]);
    }

    /// Filled pie slice from `start` to `end` (radians, counter-clockwise),
    /// built from cubic Bézier arcs of at most a quarter turn each.
    pub fn slice(&mut self, center: (f32, f32), radius: f32, start: f32, end: f32, color: Rgb) {
        let (cx, cy) = center;
        let point = |angle: f32| (cx + radius * angle.cos(), cy + radius * angle.sin());

        self.fill_color(color);
        self.op("m", vec![cx.into(), cy.into()]);
        let (sx, sy) = point(start);
        self.op("l", vec![sx.into(), sy.into()]);

        let segments = ((end - start) / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = (end - start) / segments as f32;
        for i in 0..segments {
            let a0 = start + step * i as f32;
            let a1 = a0 + step;
            let k = 4.0 / 3.0 * (step / 4.0).tan() * radius;
            let (x0, y0) = point(a0);
            let (x3, y3) = point(a1);
            let (x1, y1) = (x0 - k * a0.sin(), y0 + k * a0.cos());
            let (x2, y2) = (x3 + k * a1.sin(), y3 - k * a1.cos());
            self.op(
                "c",
                vec![
                    x1.into(),
                    y1.into(),
                    x2.into(),
                    y2.into(),
                    x3.into(),
                    y3.into(),
                ],
            );
        }

        self.op("h", vec![]);
        self.op("f", vec![]);
    }
}
