use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Green,
    Red,
    Yellow,
    Cyan,
    Dim,
}

/// Apply a [`Style`] to anything string-like.
pub trait StyledText {
    fn with_style(&self, style: Style) -> ColoredString;
}

impl<T: AsRef<str> + ?Sized> StyledText for T {
    fn with_style(&self, style: Style) -> ColoredString {
        let text = self.as_ref();
        match style {
            Style::Green => text.green(),
            Style::Red => text.red(),
            Style::Yellow => text.yellow(),
            Style::Cyan => text.cyan(),
            Style::Dim => text.dimmed(),
        }
    }
}

pub mod icons {
    use colored::{ColoredString, Colorize};

    pub fn success() -> ColoredString {
        "✓".green().bold()
    }

    pub fn error() -> ColoredString {
        "✗".red().bold()
    }

    pub fn warning() -> ColoredString {
        "!".yellow().bold()
    }

    pub fn info() -> ColoredString {
        "•".blue().bold()
    }
}
