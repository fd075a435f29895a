//! Maps judge metadata to judge implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use coursetree_core::config::Settings;
use coursetree_core::traits::{Judge, JudgeFactory, JudgeMetadata};

use crate::pytest::PytestJudge;

/// Creates the judge described by `metadata` for the exercise in `exercise_dir`.
pub fn create_judge(
    exercise_dir: &Path,
    metadata: &JudgeMetadata,
    program: &str,
) -> Result<Arc<dyn Judge>> {
    match metadata {
        JudgeMetadata::Pytest { file } => {
            anyhow::ensure!(!file.trim().is_empty(), "pytest judge needs a test file");
            Ok(Arc::new(PytestJudge::with_program(
                exercise_dir.join(file),
                program,
            )))
        }
    }
}

/// Judge factory backed by the real test runners.
#[derive(Debug, Clone)]
pub struct RunnerJudgeFactory {
    program: String,
}

impl RunnerJudgeFactory {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.judge_program.clone())
    }
}

impl Default for RunnerJudgeFactory {
    fn default() -> Self {
        Self::new("pytest")
    }
}

impl JudgeFactory for RunnerJudgeFactory {
    fn create(&self, exercise_dir: &Path, metadata: &JudgeMetadata) -> Result<Arc<dyn Judge>> {
        create_judge(exercise_dir, metadata, &self.program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pytest_metadata_creates_judge() {
        let factory = RunnerJudgeFactory::default();
        let metadata = JudgeMetadata::Pytest {
            file: "tests.py".into(),
        };
        assert!(factory.create(Path::new("/ex"), &metadata).is_ok());
    }

    #[test]
    fn empty_file_rejected() {
        let metadata = JudgeMetadata::Pytest { file: " ".into() };
        assert!(create_judge(Path::new("/ex"), &metadata, "pytest").is_err());
    }

    #[test]
    fn program_comes_from_settings() {
        let settings = Settings {
            judge_program: "python3 -m pytest".into(),
            ..Settings::default()
        };
        let factory = RunnerJudgeFactory::from_settings(&settings);
        assert_eq!(factory.program, "python3 -m pytest");
    }
}
