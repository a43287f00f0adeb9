use std::path::{Path, PathBuf};

/// Files whose presence marks the root of a buildable project.
const BUILD_DESCRIPTORS: &[&str] = &["pom.xml", "build.gradle", "build.gradle.kts"];

/// Find the project root for `path`.
///
/// Starts at `path` itself when it is a directory, otherwise at its parent,
/// and walks up to the first directory containing a build descriptor. Falls
/// back to the starting directory.
pub fn find_project_root(path: &Path) -> PathBuf {
    let start = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };

    start
        .ancestors()
        .find(|dir| BUILD_DESCRIPTORS.iter().any(|f| dir.join(f).is_file()))
        .unwrap_or(start)
        .to_path_buf()
}
