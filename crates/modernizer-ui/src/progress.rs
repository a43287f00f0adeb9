use std::borrow::Cow;

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

pub struct ProgressBarBuilder {
    len: u64,
    message: Cow<'static, str>,
    hidden: bool,
}

impl ProgressBarBuilder {
    pub fn message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn start(self) -> ProgressBar {
        let bar = if self.hidden {
            IndicatifBar::hidden()
        } else {
            IndicatifBar::new(self.len)
        };
        bar.set_length(self.len);
        if let Ok(style) =
            ProgressStyle::with_template("{msg} [{bar:30.cyan/blue}] {pos}/{len} {elapsed}")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message(self.message);
        ProgressBar { bar }
    }
}

/// Counts work items; lines printed through [`ProgressBar::println`] appear
/// above the bar.
pub struct ProgressBar {
    bar: IndicatifBar,
}

impl ProgressBar {
    pub fn builder(len: u64) -> ProgressBarBuilder {
        ProgressBarBuilder {
            len,
            message: Cow::Borrowed(""),
            hidden: false,
        }
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn println(&self, line: impl AsRef<str>) {
        self.bar.println(line);
    }

    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
