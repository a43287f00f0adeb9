use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Name of the sandbox directory created under the project root.
pub const WORKSPACE_DIR: &str = ".modernizer_sandbox";

/// Directory names never copied into the workspace.
pub const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "target",
    "build",
    "node_modules",
    ".idea",
    ".vscode",
    "venv",
    "__pycache__",
    WORKSPACE_DIR,
];

/// Returns true if a directory with this name is build output, VCS metadata
/// or a dependency cache.
pub fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}

/// A disposable copy of the project tree used for trial edits and builds.
///
/// The workspace lives at `<project_root>/.modernizer_sandbox`. Only the two
/// root paths are held in memory; everything else is on disk.
#[derive(Debug, Clone)]
pub struct Workspace {
    project_root: PathBuf,
    root: PathBuf,
}

impl Workspace {
    /// `project_root` is canonicalized so that `map_path` can work on
    /// canonical file paths.
    pub fn new(project_root: &Path) -> Result<Self> {
        let project_root =
            fs::canonicalize(project_root).map_err(|e| Error::io(project_root, e))?;
        let root = project_root.join(WORKSPACE_DIR);
        Ok(Self { project_root, root })
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discard any stale workspace and copy the project tree into a fresh one.
    pub fn create(&self) -> Result<()> {
        self.cleanup()?;
        debug!(
            "Copying {} into {}",
            self.project_root.display(),
            self.root.display()
        );

        let walker = WalkDir::new(&self.project_root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !entry.file_name().to_str().is_some_and(is_excluded_dir)
            });

        fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))?;
        let mut copied = 0usize;
        for entry in walker {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(&self.project_root)
                .map_err(|_| Error::OutsideProject {
                    path: entry.path().to_path_buf(),
                    root: self.project_root.clone(),
                })?;
            if rel.as_os_str().is_empty() {
                continue;
            }
            let dest = self.root.join(rel);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest).map_err(|e| Error::io(&dest, e))?;
            } else {
                fs::copy(entry.path(), &dest).map_err(|e| Error::io(entry.path(), e))?;
                copied += 1;
            }
        }
        debug!("Workspace ready with {copied} files");
        Ok(())
    }

    /// Map a path under the project root to its counterpart in the workspace.
    ///
    /// `original` must already be absolute and canonical.
    pub fn map_path(&self, original: &Path) -> Result<PathBuf> {
        let rel = original
            .strip_prefix(&self.project_root)
            .map_err(|_| Error::OutsideProject {
                path: original.to_path_buf(),
                root: self.project_root.clone(),
            })?;
        Ok(self.root.join(rel))
    }

    /// Remove the workspace if it exists. Safe to call repeatedly.
    pub fn cleanup(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {
                debug!("Removed workspace {}", self.root.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&self.root, e)),
        }
    }

    pub fn exists(&self) -> bool {
        self.root.exists()
    }
}
