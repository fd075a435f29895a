//! Judge strategy trait and the metadata that selects a strategy.
//!
//! The trait is implemented in the `coursetree-runner` crate; the tree
//! builder only needs a factory that turns `JudgeMetadata` into a judge.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Produces a verdict for one exercise.
///
/// Implementations must not fail: problems such as a missing test file or a
/// crashing runner are logged and reported as `false`.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Run the judge. `true` means the exercise passes.
    async fn run(&self) -> bool;
}

/// Judge configuration as written in exercise metadata.
///
/// The `type` field selects the strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JudgeMetadata {
    /// Run pytest on `file`, relative to the exercise directory.
    Pytest { file: String },
}

impl JudgeMetadata {
    pub fn kind(&self) -> &'static str {
        match self {
            JudgeMetadata::Pytest { .. } => "pytest",
        }
    }
}

/// Turns judge metadata into a judge, given the exercise directory.
pub trait JudgeFactory {
    fn create(
        &self,
        exercise_dir: &Path,
        metadata: &JudgeMetadata,
    ) -> anyhow::Result<Arc<dyn Judge>>;
}

impl<F> JudgeFactory for F
where
    F: Fn(&Path, &JudgeMetadata) -> anyhow::Result<Arc<dyn Judge>>,
{
    fn create(
        &self,
        exercise_dir: &Path,
        metadata: &JudgeMetadata,
    ) -> anyhow::Result<Arc<dyn Judge>> {
        self(exercise_dir, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judge_metadata_from_toml() {
        let metadata: JudgeMetadata =
            toml::from_str("type = \"pytest\"\nfile = \"tests.py\"").unwrap();
        assert_eq!(
            metadata,
            JudgeMetadata::Pytest {
                file: "tests.py".into()
            }
        );
        assert_eq!(metadata.kind(), "pytest");
    }

    #[test]
    fn unknown_judge_type_rejected() {
        let result = toml::from_str::<JudgeMetadata>("type = \"junit\"\nfile = \"Tests.java\"");
        assert!(result.is_err());
    }
}
