/// Injected color theme for terminal output
use crate::config::DisplayConfig;
use colored::{Color, Colorize};
use tracing::warn;

/// Colors and terminal capabilities used by every renderer
#[derive(Debug, Clone)]
pub struct Theme {
    enabled: bool,
    hyperlinks: bool,
    accent: Color,
    header: Color,
    highlight: Color,
    error: Color,
    link: Color,
}

impl Theme {
    pub fn from_config(display: &DisplayConfig) -> Self {
        let theme = &display.theme;
        Self {
            enabled: display.color,
            hyperlinks: display.color && display.hyperlinks,
            accent: parse_color(&theme.accent, Color::BrightGreen),
            header: parse_color(&theme.header, Color::BrightCyan),
            highlight: parse_color(&theme.highlight, Color::BrightYellow),
            error: parse_color(&theme.error, Color::BrightRed),
            link: parse_color(&theme.link, Color::Green),
        }
    }

    /// No colors, no escape sequences
    pub fn plain() -> Self {
        Self {
            enabled: false,
            hyperlinks: false,
            accent: Color::White,
            header: Color::White,
            highlight: Color::White,
            error: Color::White,
            link: Color::White,
        }
    }

    pub fn accent(&self, text: &str) -> String {
        self.paint(text, self.accent)
    }

    pub fn header(&self, text: &str) -> String {
        if self.enabled {
            text.color(self.header).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, self.error)
    }

    pub fn dim(&self, text: &str) -> String {
        if self.enabled {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str) -> String {
        if self.enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Underlined link text, wrapped in an OSC 8 hyperlink when supported
    pub fn link(&self, url: &str, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }

        let styled = text.color(self.link).underline().to_string();
        if self.hyperlinks {
            format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, styled)
        } else {
            styled
        }
    }

    /// View count text colored by magnitude tier
    pub fn views(&self, text: &str, count: u64) -> String {
        if !self.enabled {
            return text.to_string();
        }

        match count {
            c if c >= 1_000_000_000 => text.color(self.highlight).bold().to_string(),
            c if c >= 1_000_000 => text.color(self.highlight).to_string(),
            c if c >= 100_000 => text.color(self.header).to_string(),
            _ => text.dimmed().to_string(),
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.enabled {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}

fn parse_color(name: &str, fallback: Color) -> Color {
    match name.parse::<Color>() {
        Ok(color) => color,
        Err(_) => {
            warn!("Unknown color '{}', using default", name);
            fallback
        }
    }
}
