use std::borrow::Cow;
use std::time::Duration;

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

use crate::style::icons;

const TICK: Duration = Duration::from_millis(100);

pub struct SpinnerBuilder {
    message: Cow<'static, str>,
    hidden: bool,
}

impl SpinnerBuilder {
    /// Do not draw anything (for non-interactive output).
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn start(self) -> Spinner {
        let bar = if self.hidden {
            IndicatifBar::hidden()
        } else {
            IndicatifBar::new_spinner()
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(self.message);
        bar.enable_steady_tick(TICK);
        Spinner { bar }
    }
}

/// A single-line activity indicator that resolves to a status line.
pub struct Spinner {
    bar: IndicatifBar,
}

impl Spinner {
    pub fn builder(message: impl Into<Cow<'static, str>>) -> SpinnerBuilder {
        SpinnerBuilder {
            message: message.into(),
            hidden: false,
        }
    }

    pub fn success(self, message: impl AsRef<str>) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", icons::success(), message.as_ref());
    }

    pub fn error(self, message: impl AsRef<str>) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", icons::error(), message.as_ref());
    }
}
