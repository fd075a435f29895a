//! Judge that runs an exercise's test file with pytest.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use coursetree_core::traits::Judge;

/// Runs `<program> <file>` in the directory of the test file.
///
/// `program` may carry extra arguments, e.g. `python -m pytest`.
pub struct PytestJudge {
    tests_path: PathBuf,
    program: String,
}

impl PytestJudge {
    pub fn new(tests_path: PathBuf) -> Self {
        Self::with_program(tests_path, "pytest")
    }

    pub fn with_program(tests_path: PathBuf, program: impl Into<String>) -> Self {
        Self {
            tests_path,
            program: program.into(),
        }
    }

    pub fn tests_path(&self) -> &Path {
        &self.tests_path
    }

    async fn run_tests(&self) -> Result<bool> {
        anyhow::ensure!(
            self.tests_path.is_file(),
            "{} does not exist",
            self.tests_path.display()
        );
        let directory = match self.tests_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let filename = self
            .tests_path
            .file_name()
            .context("test file has no file name")?;

        let mut words = self.program.split_whitespace();
        let program = words.next().context("empty judge program")?;

        let start = Instant::now();
        let output = Command::new(program)
            .args(words)
            .arg(filename)
            .current_dir(directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to run {program}"))?;

        tracing::debug!(
            "{} finished in {}ms with {}\n{}",
            self.tests_path.display(),
            start.elapsed().as_millis(),
            output.status,
            String::from_utf8_lossy(&output.stdout)
        );

        Ok(output.status.success())
    }
}

#[async_trait]
impl Judge for PytestJudge {
    async fn run(&self) -> bool {
        match self.run_tests().await {
            Ok(passed) => passed,
            Err(e) => {
                tracing::error!("error while judging {}: {e:#}", self.tests_path.display());
                false
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn exit_zero_passes() {
        let dir = tempfile::tempdir().unwrap();
        let tests = script(dir.path(), "tests.sh", "exit 0\n");
        assert!(PytestJudge::with_program(tests, "sh").run().await);
    }

    #[tokio::test]
    async fn nonzero_exit_fails() {
        let dir = tempfile::tempdir().unwrap();
        let tests = script(dir.path(), "tests.sh", "exit 3\n");
        assert!(!PytestJudge::with_program(tests, "sh").run().await);
    }

    #[tokio::test]
    async fn runs_in_test_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("solution.txt"), "42").unwrap();
        let tests = script(dir.path(), "tests.sh", "test -f solution.txt\n");
        assert!(PytestJudge::with_program(tests, "sh").run().await);
    }

    #[tokio::test]
    async fn program_arguments_are_split() {
        let dir = tempfile::tempdir().unwrap();
        let tests = script(dir.path(), "tests.sh", "true\n");
        let judge = PytestJudge::with_program(tests, "sh -e");
        assert!(judge.run().await);
    }

    #[tokio::test]
    async fn missing_test_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let judge = PytestJudge::with_program(dir.path().join("tests.py"), "sh");
        assert!(!judge.run().await);
    }

    #[tokio::test]
    async fn missing_program_fails() {
        let dir = tempfile::tempdir().unwrap();
        let tests = script(dir.path(), "tests.py", "");
        let judge = PytestJudge::with_program(tests, "coursetree-no-such-runner");
        assert!(!judge.run().await);
    }
}
