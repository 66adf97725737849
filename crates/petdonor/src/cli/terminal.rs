//! Colour and width of the output terminal.

use owo_colors::{OwoColorize, Style};
use petdonor_core::Urgency;

/// Below this width the request table keeps only its identifying columns.
const NARROW_COLUMNS: u16 = 100;

fn color_enabled() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Whether stdout is a terminal too narrow for the full request table.
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(width, _)| width.0 < NARROW_COLUMNS)
}

/// Renders `text` in `style`, or unchanged when colour is off.
fn paint(text: &str, style: Style, enabled: bool) -> String {
    if enabled {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Status colours for short labels.
pub trait Colorize {
    fn success(&self) -> String;
    fn warning(&self) -> String;
    fn danger(&self) -> String;
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        paint(self, Style::new().green(), color_enabled())
    }

    fn warning(&self) -> String {
        paint(self, Style::new().yellow(), color_enabled())
    }

    fn danger(&self) -> String {
        paint(self, Style::new().red().bold(), color_enabled())
    }

    fn dim(&self) -> String {
        paint(self, Style::new().dimmed(), color_enabled())
    }
}

/// Spanish urgency label, red when high.
pub fn urgency(urgency: Urgency) -> String {
    match urgency {
        Urgency::High => urgency.label().danger(),
        Urgency::Medium => urgency.label().warning(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_without_colour_is_plain() {
        assert_eq!(paint("Alta", Style::new().red(), false), "Alta");
    }

    #[test]
    fn paint_with_colour_wraps_in_escapes() {
        let painted = paint("Alta", Style::new().red(), true);
        assert!(painted.starts_with("\x1b["));
        assert!(painted.contains("Alta"));
        assert!(painted.ends_with("\x1b[0m"));
    }
}
