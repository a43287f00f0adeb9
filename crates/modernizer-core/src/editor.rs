//! Structural text editing without a parser.
//!
//! A structural unit is the span that starts at an anchor string and ends at
//! the brace that closes the first `{` found at or after the anchor. The scan
//! is a plain nesting-depth counter, so it only works on balanced input and
//! refuses to return anything when the braces never balance.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use log::debug;
use similar::TextDiff;

use crate::error::{Error, Result};

const OPEN: char = '{';
const CLOSE: char = '}';

/// An ordered literal find/replace rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub pattern: String,
    pub replacement: String,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Locate the structural unit introduced by `anchor` in `text`.
///
/// Returns the byte range from the start of the anchor through the matching
/// closing brace, inclusive. `None` when the anchor is missing, no opening
/// brace follows it, or the braces never return to depth zero.
pub fn find_unit(text: &str, anchor: &str) -> Option<Range<usize>> {
    let start = text.find(anchor)?;
    let brace = start + text[start..].find(OPEN)?;

    let mut depth = 0usize;
    for (offset, ch) in text[brace..].char_indices() {
        match ch {
            OPEN => depth += 1,
            CLOSE => depth -= 1,
            _ => continue,
        }
        if depth == 0 {
            return Some(start..brace + offset + ch.len_utf8());
        }
    }
    None
}

/// An in-memory editing session over one file in the workspace.
///
/// `original` is the file content when the session was opened and never
/// changes. `content` is the working buffer; it only ever moves by whole
/// rule substitutions or whole unit replacements.
#[derive(Debug, Clone)]
pub struct SourceEditor {
    path: PathBuf,
    original: String,
    content: String,
}

impl SourceEditor {
    pub fn open(path: &Path) -> Result<Self> {
        let original = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::from_source(path, original))
    }

    pub fn from_source(path: &Path, source: impl Into<String>) -> Self {
        let original = source.into();
        Self {
            path: path.to_path_buf(),
            content: original.clone(),
            original,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Text of the unit introduced by `anchor`, if it is present and balanced.
    pub fn extract_unit(&self, anchor: &str) -> Option<&str> {
        find_unit(&self.content, anchor).map(|range| &self.content[range])
    }

    /// Byte range of the unit introduced by `anchor` in the working buffer.
    pub fn locate_unit(&self, anchor: &str) -> Option<Range<usize>> {
        find_unit(&self.content, anchor)
    }

    /// Replace the unit introduced by `anchor` with `new_text`.
    ///
    /// Silently does nothing when the unit cannot be found. Callers that need
    /// to know whether anything happened compare the content afterwards.
    pub fn replace_unit(&mut self, anchor: &str, new_text: &str) {
        let Some(range) = self.locate_unit(anchor) else {
            debug!("{}: no unit at {anchor:?}, nothing replaced", self.path.display());
            return;
        };
        self.replace_range(range, new_text);
    }

    /// Replace the bytes in `range` with `new_text` and return the range the
    /// new text now occupies.
    ///
    /// `None` (and no change) when `range` is out of bounds or does not fall
    /// on character boundaries.
    pub fn replace_range(&mut self, range: Range<usize>, new_text: &str) -> Option<Range<usize>> {
        if range.start > range.end
            || range.end > self.content.len()
            || !self.content.is_char_boundary(range.start)
            || !self.content.is_char_boundary(range.end)
        {
            return None;
        }
        self.content.replace_range(range.clone(), new_text);
        Some(range.start..range.start + new_text.len())
    }

    /// Apply literal rules in order; each rule sees the previous rule's output.
    pub fn apply_rules(&mut self, rules: &[Rule]) {
        for rule in rules {
            if !rule.pattern.is_empty() && self.content.contains(&rule.pattern) {
                self.content = self.content.replace(&rule.pattern, &rule.replacement);
            }
        }
    }

    pub fn changed_from(&self, reference: &str) -> bool {
        self.content != reference
    }

    /// Unified diff from `reference` to the working buffer.
    pub fn diff(&self, reference: &str, from_label: &str, to_label: &str) -> String {
        let diff = TextDiff::from_lines(reference, self.content.as_str());
        format!(
            "{}",
            diff.unified_diff()
                .context_radius(3)
                .header(from_label, to_label)
        )
    }

    /// Overwrite the session's file with the working buffer.
    pub fn persist(&self) -> Result<()> {
        fs::write(&self.path, &self.content).map_err(|e| Error::io(&self.path, e))
    }
}
