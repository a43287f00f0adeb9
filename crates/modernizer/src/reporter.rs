use std::path::Path;

use inquire::Confirm;
use modernizer_core::{Level, Reporter};
use modernizer_ui::prelude::*;
use modernizer_ui::icons;

/// Terminal rendering of engine output.
///
/// Lines go above the progress bar when one is drawn. Prompts are only shown
/// on an interactive terminal; otherwise every question is answered no.
pub struct TerminalReporter<'a> {
    progress: Option<&'a ProgressBar>,
    interactive: bool,
}

impl<'a> TerminalReporter<'a> {
    pub fn new(progress: Option<&'a ProgressBar>, interactive: bool) -> Self {
        Self {
            progress,
            interactive,
        }
    }

    pub fn line(&self, line: impl AsRef<str>) {
        match self.progress {
            Some(bar) if self.interactive => bar.println(line),
            _ => eprintln!("{}", line.as_ref()),
        }
    }

    fn suspended<R>(&self, f: impl FnOnce() -> R) -> R {
        match self.progress {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }
}

impl Reporter for TerminalReporter<'_> {
    fn status(&self, level: Level, message: &str) {
        let line = match level {
            Level::Info => format!("{} {message}", icons::info()),
            Level::Success => format!("{} {}", icons::success(), message.with_style(Style::Green)),
            Level::Warning => format!("{} {}", icons::warning(), message.with_style(Style::Yellow)),
            Level::Error => format!("{} {}", icons::error(), message.with_style(Style::Red)),
        };
        self.line(line);
    }

    fn diff(&self, file: &Path, diff: &str) {
        self.suspended(|| {
            eprintln!();
            eprintln!("{}", format!("Changes for {}", file.display()).bold());
            for line in diff.lines() {
                eprintln!("{}", colorize_diff_line(line));
            }
        });
    }

    fn confirm(&self, prompt: &str) -> bool {
        if !self.interactive {
            self.line(format!(
                "{} {prompt} (not a terminal, answering no; pass --auto-approve to apply)",
                icons::warning()
            ));
            return false;
        }
        self.suspended(|| {
            Confirm::new(prompt)
                .with_default(false)
                .prompt()
                .unwrap_or(false)
        })
    }
}

fn colorize_diff_line(line: &str) -> String {
    if line.starts_with("+++") || line.starts_with("---") {
        line.bold().to_string()
    } else if line.starts_with("@@") {
        line.with_style(Style::Cyan).to_string()
    } else if line.starts_with('+') {
        line.with_style(Style::Green).to_string()
    } else if line.starts_with('-') {
        line.with_style(Style::Red).to_string()
    } else {
        line.to_string()
    }
}
