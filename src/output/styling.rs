use console::{style, StyledObject};
use std::fmt::Display;

/// How good a reported figure is, mapped to a terminal colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Warning,
    Bad,
}

pub fn toned(text: impl Display, tone: Tone) -> StyledObject<String> {
    let styled = style(text.to_string()).bright();
    match tone {
        Tone::Good => styled.green(),
        Tone::Warning => styled.yellow(),
        Tone::Bad => styled.red(),
    }
}

/// Section title: bright and underlined.
pub fn heading(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().underlined()
}

pub fn label(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn value(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).cyan()
}

pub fn banner_title(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}
