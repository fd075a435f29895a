//! Builds the content tree from resolved metadata.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ContentError;
use crate::model::{ContentNode, Exercise, Explanation, NodeHeader, Section};
use crate::parser::NodeMetadata;
use crate::traits::JudgeFactory;
use crate::treepath::{self, TreePath};

/// Lowest and highest allowed exercise difficulty.
pub const DIFFICULTY_RANGE: std::ops::RangeInclusive<i64> = 1..=20;

/// Build the tree rooted at `metadata`. The root gets the empty tree path.
///
/// `languages` lists documentation languages in order of preference.
pub fn build_tree(
    metadata: NodeMetadata,
    languages: &[String],
    judges: &dyn JudgeFactory,
) -> Result<ContentNode, ContentError> {
    build_node(metadata, TreePath::root(), languages, judges)
}

fn build_node(
    metadata: NodeMetadata,
    tree_path: TreePath,
    languages: &[String],
    judges: &dyn JudgeFactory,
) -> Result<ContentNode, ContentError> {
    match metadata {
        NodeMetadata::Explanation(explanation) => {
            let documentation =
                documentation_file(&explanation.path, &explanation.documentation, languages)
                    .ok_or_else(|| ContentError::MissingLanguage(tree_path.clone()))?;
            let header = NodeHeader {
                tree_path,
                local_path: explanation.path,
                name: explanation.name,
                topics: explanation.topics,
            };
            Ok(ContentNode::Explanation(Explanation::new(header, documentation)))
        }
        NodeMetadata::Exercise(exercise) => {
            if !DIFFICULTY_RANGE.contains(&exercise.difficulty) {
                return Err(ContentError::InvalidDifficulty {
                    path: tree_path,
                    difficulty: exercise.difficulty,
                });
            }
            let documentation =
                documentation_file(&exercise.path, &exercise.documentation, languages)
                    .ok_or_else(|| ContentError::MissingLanguage(tree_path.clone()))?;
            let judge = judges
                .create(&exercise.path, &exercise.judge)
                .map_err(|e| ContentError::Judge {
                    path: tree_path.clone(),
                    message: format!("{e:#}"),
                })?;
            let header = NodeHeader {
                tree_path,
                local_path: exercise.path,
                name: exercise.name,
                topics: exercise.topics,
            };
            Ok(ContentNode::Exercise(Arc::new(Exercise::new(
                header,
                exercise.difficulty as u8,
                documentation,
                judge,
            ))))
        }
        NodeMetadata::Section(section) => {
            let children = section
                .contents
                .into_iter()
                .map(|child| {
                    if !treepath::is_valid_segment(child.id()) {
                        return Err(ContentError::InvalidId {
                            parent: tree_path.clone(),
                            id: child.id().to_string(),
                        });
                    }
                    let child_path = tree_path.child(child.id());
                    build_node(child, child_path, languages, judges)
                })
                .collect::<Result<Vec<_>, _>>()?;
            let header = NodeHeader {
                tree_path,
                local_path: section.path,
                name: section.name,
                topics: section.topics,
            };
            Ok(ContentNode::Section(Section::new(header, children)?))
        }
    }
}

/// Pick the documentation file in the most preferred available language.
fn documentation_file(
    dir: &Path,
    documentation: &BTreeMap<String, String>,
    languages: &[String],
) -> Option<PathBuf> {
    languages
        .iter()
        .find_map(|language| documentation.get(language))
        .map(|file| dir.join(file))
}
