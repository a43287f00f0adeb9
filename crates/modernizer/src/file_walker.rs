use anyhow::Result;
use ignore::WalkBuilder;
use modernizer_core::workspace::is_excluded_dir;
use std::path::{Path, PathBuf};

const SOURCE_EXTENSION: &str = "java";

/// Collect the source files to migrate under `path`.
///
/// A file path is returned as-is. Directories are walked recursively:
/// - respects git ignore patterns
/// - skips hidden entries (including the workspace directory)
/// - skips build output, VCS metadata and dependency caches
/// - returns deterministically sorted paths
pub fn collect_source_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut builder = WalkBuilder::new(path);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .git_global(true)
        .filter_entry(|entry| {
            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                if let Some(name) = entry.file_name().to_str() {
                    if entry.depth() > 0 && is_excluded_dir(name) {
                        return false;
                    }
                }
            }
            true
        });

    let mut files = Vec::new();
    for result in builder.build() {
        let entry = result?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            files.push(path.to_path_buf());
        }
    }
    files.sort(); // Deterministic ordering
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collects_java_sources_only() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        for rel in [
            "src/main/java/b/B.java",
            "src/main/java/a/A.java",
            "src/main/resources/app.yml",
            "target/generated/Gen.java",
            "build/Out.java",
            ".modernizer_sandbox/src/main/java/a/A.java",
            "node_modules/x/X.java",
        ] {
            let p = root.join(rel);
            fs::create_dir_all(p.parent().unwrap())?;
            fs::write(&p, "class X {}")?;
        }

        let files = collect_source_files(root)?;
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["src/main/java/a/A.java", "src/main/java/b/B.java"]);
        Ok(())
    }

    #[test]
    fn test_single_file_is_returned_verbatim() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("Legacy.java");
        fs::write(&file, "class Legacy {}")?;
        assert_eq!(collect_source_files(&file)?, vec![file]);
        Ok(())
    }
}
