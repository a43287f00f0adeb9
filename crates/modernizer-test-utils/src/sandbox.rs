//! Hermetic project sandbox for CLI integration tests.
//!
//! - Lays out a throwaway project tree under an `assert_fs::TempDir`
//! - Runs the `modernizer` binary (or any cargo binary) with a scrubbed
//!   environment: no API keys, isolated `HOME`, only `PATH` inherited
//! - Everything is removed when the sandbox is dropped
//!
//! ## Quick example
//! ```no_run
//! use modernizer_test_utils::sandbox::Sandbox;
//!
//! let mut sb = Sandbox::new();
//! sb.write("pom.xml", "<project></project>")
//!     .write("src/App.java", "class App {}");
//!
//! let out = sb.run("modernizer", ["migrate", "src/App.java", "--dry-run"]);
//! assert!(out.success());
//! ```

use assert_fs::TempDir;
use assert_fs::fixture::PathChild;
use duct::Expression;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Sandbox {
    root: TempDir,
    pub home: PathBuf,
    extra_env: HashMap<String, String>,
}

/// Captured result of a command run inside the sandbox.
#[derive(Debug)]
pub struct RunOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    /// Create a new sandbox; all state is under an auto-cleaned TempDir.
    pub fn new() -> Self {
        let root = TempDir::new().expect("create sandbox TempDir");
        let home = root.child(".home").to_path_buf();
        fs::create_dir_all(&home).expect("create home dir");
        Self {
            root,
            home,
            extra_env: HashMap::new(),
        }
    }

    /// Absolute path to the sandbox root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Write/overwrite a file relative to the sandbox root.
    pub fn write<P: AsRef<Path>, S: AsRef<[u8]>>(&mut self, rel: P, contents: S) -> &mut Self {
        let p = self.root_path().join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(p, contents).expect("write file");
        self
    }

    /// Read a file relative to the sandbox root.
    pub fn read<P: AsRef<Path>>(&self, rel: P) -> String {
        fs::read_to_string(self.root_path().join(rel)).expect("read file")
    }

    pub fn exists<P: AsRef<Path>>(&self, rel: P) -> bool {
        self.root_path().join(rel).exists()
    }

    /// Add an environment variable for subsequent runs.
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.extra_env.insert(key.to_string(), value.to_string());
        self
    }

    /// Run a cargo binary with the sandbox root as working directory.
    /// Never fails on a non-zero exit; inspect the returned [`RunOutput`].
    pub fn run<I>(&self, program: &str, args: I) -> RunOutput
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let cargo_bin_path = assert_cmd::cargo::cargo_bin(program);
        let args: Vec<_> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string_lossy().to_string())
            .collect();

        let expr = duct::cmd(cargo_bin_path, args)
            .dir(self.root_path())
            .stdin_null()
            .stdout_capture()
            .stderr_capture()
            .unchecked();
        let output = self.inject_env(expr).run().expect("spawn command");

        RunOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    pub fn inject_env(&self, expr: Expression) -> Expression {
        let mut env_map: HashMap<String, String> = HashMap::new();
        if let Ok(path) = std::env::var("PATH") {
            env_map.insert("PATH".into(), path);
        }
        env_map.insert("HOME".into(), self.home.to_string_lossy().into_owned());
        env_map.insert("NO_COLOR".into(), "1".into());
        env_map.insert("CI".into(), "1".into());
        env_map.extend(self.extra_env.clone());

        expr.full_env(&env_map)
    }
}
