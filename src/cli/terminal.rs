//! Styling for messages and separator rules

use owo_colors::{OwoColorize, Style};

/// Rules never grow wider than this, even on wide terminals.
const RULE_WIDTH: usize = 40;

/// Whether stdout accepts ANSI colors.
fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// A horizontal rule made of `ch`, fitted to the terminal.
pub fn rule(ch: char) -> String {
    let width = terminal_size::terminal_size()
        .map_or(RULE_WIDTH, |(w, _)| usize::from(w.0).min(RULE_WIDTH));
    ch.to_string().repeat(width)
}

fn paint(text: &str, style: Style, enabled: bool) -> String {
    if enabled {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Outcome styling for menu and command output.
pub trait Colorize {
    /// An operation completed.
    fn success(&self) -> String;
    /// Nothing was changed, but nothing went wrong either.
    fn warning(&self) -> String;
    /// An operation was rejected.
    fn failure(&self) -> String;
    /// A section title.
    fn heading(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), Style::new().green(), supports_color())
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), Style::new().yellow(), supports_color())
    }

    fn failure(&self) -> String {
        paint(self.as_ref(), Style::new().red(), supports_color())
    }

    fn heading(&self) -> String {
        paint(self.as_ref(), Style::new().bold(), supports_color())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_is_bounded() {
        let rule = rule('=');
        assert!(rule.chars().count() <= RULE_WIDTH);
        assert!(rule.chars().all(|c| c == '='));
    }

    #[test]
    fn paint_without_color_is_plain() {
        assert_eq!(paint("Saved", Style::new().green(), false), "Saved");
    }

    #[test]
    fn paint_with_color_wraps_text() {
        let painted = paint("Saved", Style::new().red(), true);
        assert!(painted.contains("Saved"));
        assert_ne!(painted, "Saved");
    }
}
