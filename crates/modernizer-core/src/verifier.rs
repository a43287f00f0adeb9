use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

/// Maximum number of matching error lines kept in a diagnostic excerpt.
pub const MAX_ERROR_LINES: usize = 15;
/// Number of trailing output lines used when no error line matches.
pub const FALLBACK_TAIL_LINES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSystem {
    Gradle,
    Maven,
}

impl BuildSystem {
    /// Pick the build tool for `root`. Falls back to Maven when no Gradle
    /// build script is present, even if there is no `pom.xml` either.
    pub fn detect(root: &Path) -> Self {
        if root.join("build.gradle").exists() || root.join("build.gradle.kts").exists() {
            BuildSystem::Gradle
        } else {
            BuildSystem::Maven
        }
    }

    /// Marker that identifies a compiler error line in this tool's output.
    pub fn error_marker(self) -> &'static str {
        match self {
            BuildSystem::Gradle => "error:",
            BuildSystem::Maven => "[ERROR]",
        }
    }

    fn args(self) -> &'static [&'static str] {
        match self {
            BuildSystem::Gradle => &[
                "clean",
                "compileJava",
                "-x",
                "test",
                "--no-daemon",
                "--console=plain",
            ],
            BuildSystem::Maven => &["clean", "compile", "-DskipTests"],
        }
    }
}

impl std::fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildSystem::Gradle => write!(f, "gradle"),
            BuildSystem::Maven => write!(f, "maven"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    /// The build failed or could not be started. `diagnostic` is a bounded
    /// excerpt, never the full log.
    Failed { diagnostic: String },
}

/// Anything that can tell whether the workspace currently compiles.
pub trait BuildCheck {
    fn check_build(&self) -> BuildOutcome;
}

/// Runs the project's real build tool inside the workspace.
#[derive(Debug, Clone)]
pub struct BuildVerifier {
    root: PathBuf,
    system: BuildSystem,
    /// Directories searched for `gradle`/`mvn`; the process `PATH` by default.
    search_path: Option<OsString>,
}

impl BuildVerifier {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            system: BuildSystem::detect(root),
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Look up build tools in `paths` instead of the process `PATH`.
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    pub fn system(&self) -> BuildSystem {
        self.system
    }

    fn program(&self) -> Result<PathBuf, String> {
        match self.system {
            BuildSystem::Gradle => {
                let wrapper = if cfg!(windows) { "gradlew.bat" } else { "gradlew" };
                let local = self.root.join(wrapper);
                if local.exists() {
                    return Ok(local);
                }
                self.find_tool("gradle")
                    .map_err(|e| format!("Gradle executable not found: {e}"))
            }
            BuildSystem::Maven => self
                .find_tool("mvn")
                .map_err(|_| "Maven executable not found.".to_string()),
        }
    }

    fn find_tool(&self, name: &str) -> which::Result<PathBuf> {
        which::which_in(name, self.search_path.as_ref(), &self.root)
    }
}

impl BuildCheck for BuildVerifier {
    fn check_build(&self) -> BuildOutcome {
        let program = match self.program() {
            Ok(p) => p,
            Err(diagnostic) => return BuildOutcome::Failed { diagnostic },
        };
        let args = self.system.args();
        debug!(
            "Running {} {} in {}",
            program.display(),
            args.join(" "),
            self.root.display()
        );

        let output = match Command::new(&program)
            .args(args)
            .current_dir(&self.root)
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                return BuildOutcome::Failed {
                    diagnostic: format!("Failed to run {}: {e}", program.display()),
                };
            }
        };

        if output.status.success() {
            return BuildOutcome::Success;
        }
        debug!("{} build exited with {}", self.system, output.status);

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        BuildOutcome::Failed {
            diagnostic: summarize_failure(&stdout, &stderr, self.system.error_marker()),
        }
    }
}

/// Reduce a failed build's output to something small enough to send back
/// with a fix request.
///
/// Keeps the first [`MAX_ERROR_LINES`] lines that contain `marker` or
/// `FAILED`; when none match, keeps the last [`FALLBACK_TAIL_LINES`] lines of
/// the combined output.
pub fn summarize_failure(stdout: &str, stderr: &str, marker: &str) -> String {
    let log = format!("{stdout}{stderr}");
    let lines: Vec<&str> = log.lines().collect();

    let errors: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| line.contains(marker) || line.contains("FAILED"))
        .take(MAX_ERROR_LINES)
        .collect();

    if !errors.is_empty() {
        return errors.join("\n");
    }
    let tail = lines.len().saturating_sub(FALLBACK_TAIL_LINES);
    lines[tail..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_detect_build_system() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        assert_eq!(BuildSystem::detect(temp.path()), BuildSystem::Maven);

        fs::write(temp.path().join("pom.xml"), "<project/>")?;
        assert_eq!(BuildSystem::detect(temp.path()), BuildSystem::Maven);

        fs::write(temp.path().join("build.gradle.kts"), "")?;
        assert_eq!(BuildSystem::detect(temp.path()), BuildSystem::Gradle);
        Ok(())
    }

    #[test]
    fn test_summarize_keeps_error_lines() {
        let stdout = "[INFO] Scanning\n[ERROR] App.java:[3,1] cannot find symbol\n[INFO] noise\n";
        let stderr = "[ERROR] BUILD FAILURE\n";
        insta::assert_snapshot!(summarize_failure(stdout, stderr, "[ERROR]"), @r"
        [ERROR] App.java:[3,1] cannot find symbol
        [ERROR] BUILD FAILURE
        ");
    }

    #[test]
    fn test_summarize_matches_failed_token() {
        let out = "> Task :compileJava FAILED\nsomething else\n";
        assert_eq!(
            summarize_failure(out, "", "error:"),
            "> Task :compileJava FAILED"
        );
    }

    #[test]
    fn test_summarize_caps_error_lines() {
        let out: String = (0..40).map(|i| format!("error: problem {i}\n")).collect();
        let summary = summarize_failure(&out, "", "error:");
        let lines: Vec<_> = summary.lines().collect();
        assert_eq!(lines.len(), MAX_ERROR_LINES);
        assert_eq!(lines[0], "error: problem 0");
        assert_eq!(lines[14], "error: problem 14");
    }

    #[test]
    fn test_summarize_falls_back_to_tail() {
        let out: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let summary = summarize_failure(&out, "", "[ERROR]");
        let lines: Vec<_> = summary.lines().collect();
        assert_eq!(lines.len(), FALLBACK_TAIL_LINES);
        assert_eq!(lines[0], "line 10");
        assert_eq!(lines[19], "line 29");

        assert_eq!(summarize_failure("short\n", "", "[ERROR]"), "short");
    }

    #[cfg(unix)]
    fn write_wrapper(root: &Path, script: &str) -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let path = root.join("gradlew");
        fs::write(&path, script)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        fs::write(root.join("build.gradle"), "")?;
        Ok(())
    }

    #[test]
    fn test_missing_maven_is_a_failed_build() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let empty_path = tempfile::tempdir()?;
        fs::write(temp.path().join("pom.xml"), "<project/>")?;

        let outcome = BuildVerifier::new(temp.path())
            .with_search_path(empty_path.path())
            .check_build();
        assert_eq!(
            outcome,
            BuildOutcome::Failed {
                diagnostic: "Maven executable not found.".to_string()
            }
        );
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_unstartable_wrapper_is_a_failed_build() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let temp = tempfile::tempdir()?;
        write_wrapper(temp.path(), "#!/bin/sh\necho \"error: never printed\"\nexit 1\n")?;
        let wrapper = temp.path().join("gradlew");
        fs::set_permissions(&wrapper, fs::Permissions::from_mode(0o644))?;

        let BuildOutcome::Failed { diagnostic } = BuildVerifier::new(temp.path()).check_build()
        else {
            panic!("a wrapper that cannot be executed must fail the build");
        };
        assert!(diagnostic.starts_with("Failed to run"), "{diagnostic}");
        assert!(diagnostic.contains("gradlew"));
        // spawn errors are reported as-is, not as an excerpt of build output
        assert_eq!(diagnostic.lines().count(), 1);
        assert!(!diagnostic.contains("never printed"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_gradle_wrapper_success() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        write_wrapper(temp.path(), "#!/bin/sh\necho \"BUILD SUCCESSFUL\"\nexit 0\n")?;

        let verifier = BuildVerifier::new(temp.path());
        assert_eq!(verifier.system(), BuildSystem::Gradle);
        assert_eq!(verifier.check_build(), BuildOutcome::Success);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_gradle_wrapper_failure_is_summarized() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        write_wrapper(
            temp.path(),
            "#!/bin/sh\necho \"> Task :compileJava\"\necho \"App.java:3: error: ';' expected\" 1>&2\nexit 1\n",
        )?;

        let outcome = BuildVerifier::new(temp.path()).check_build();
        assert_eq!(
            outcome,
            BuildOutcome::Failed {
                diagnostic: "App.java:3: error: ';' expected".to_string()
            }
        );
        Ok(())
    }
}
