use std::cell::RefCell;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

/// Where the engine sends everything a user should see.
pub trait Reporter {
    fn status(&self, level: Level, message: &str);

    fn diff(&self, file: &Path, diff: &str);

    /// Ask the user a yes/no question. Implementations that cannot ask
    /// answer no.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Reporter that records messages and answers every prompt the same way.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    answer: bool,
    messages: RefCell<Vec<(Level, String)>>,
    diffs: RefCell<Vec<String>>,
    prompts: RefCell<Vec<String>>,
}

impl RecordingReporter {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.borrow().clone()
    }

    pub fn diffs(&self) -> Vec<String> {
        self.diffs.borrow().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Reporter for RecordingReporter {
    fn status(&self, level: Level, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }

    fn diff(&self, _file: &Path, diff: &str) {
        self.diffs.borrow_mut().push(diff.to_string());
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answer
    }
}
