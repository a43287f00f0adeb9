use std::fs;
use std::path::Path;

use log::debug;

use crate::editor::SourceEditor;
use crate::error::{Error, Result};
use crate::report::{Level, Reporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    /// Workspace text equals the original; nothing shown, nothing written.
    Unchanged,
    /// Diff shown, original left alone because of dry-run mode.
    DryRun,
    Promoted,
    Declined,
}

/// Decides whether a workspace file is copied back over the original.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromotionGate {
    pub dry_run: bool,
    pub auto_approve: bool,
}

impl PromotionGate {
    pub fn new(dry_run: bool, auto_approve: bool) -> Self {
        Self {
            dry_run,
            auto_approve,
        }
    }

    /// Compare `editor` against the file currently at `original` and, if they
    /// differ and the user agrees, copy the workspace file over it.
    ///
    /// The comparison is against the on-disk original, not the text the
    /// editor was opened with.
    pub fn promote(
        &self,
        editor: &SourceEditor,
        original: &Path,
        reporter: &dyn Reporter,
    ) -> Result<Promotion> {
        let current = fs::read_to_string(original).map_err(|e| Error::io(original, e))?;
        if !editor.changed_from(&current) {
            return Ok(Promotion::Unchanged);
        }

        // The workspace file must hold exactly what was reviewed.
        editor.persist()?;

        let name = original
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| original.display().to_string());
        let diff = editor.diff(&current, &format!("Original: {name}"), "Migrated (Sandbox)");
        reporter.diff(original, &diff);

        if self.dry_run {
            return Ok(Promotion::DryRun);
        }

        if !self.auto_approve && !reporter.confirm(&format!("Apply changes to {name}?")) {
            reporter.status(Level::Info, &format!("Skipped {name}"));
            return Ok(Promotion::Declined);
        }

        debug!(
            "Promoting {} -> {}",
            editor.path().display(),
            original.display()
        );
        fs::copy(editor.path(), original).map_err(|e| Error::io(original, e))?;
        reporter.status(Level::Success, &format!("Saved {name}"));
        Ok(Promotion::Promoted)
    }
}
