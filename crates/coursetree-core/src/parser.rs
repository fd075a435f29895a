//! TOML metadata parser.
//!
//! Every content directory carries a `metadata.toml` describing one node.
//! Sections list their children inline; `link` nodes pull in the metadata of
//! another directory. Loading resolves all links, so the result contains only
//! sections, exercises, and explanations.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ContentError;
use crate::model::Topics;
use crate::traits::JudgeMetadata;

/// Name of the metadata file inside each content directory.
pub const METADATA_FILE: &str = "metadata.toml";

/// Node descriptor as written in a metadata file.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawNode {
    Section(RawSection),
    Exercise(ExerciseMetadata),
    Explanation(ExplanationMetadata),
    Link(LinkMetadata),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSection {
    id: String,
    name: String,
    #[serde(default)]
    topics: Topics,
    contents: Vec<RawNode>,
}

/// Resolved metadata of a node.
#[derive(Debug, Clone)]
pub enum NodeMetadata {
    Section(SectionMetadata),
    Exercise(ExerciseMetadata),
    Explanation(ExplanationMetadata),
}

impl NodeMetadata {
    pub fn id(&self) -> &str {
        match self {
            NodeMetadata::Section(s) => &s.id,
            NodeMetadata::Exercise(e) => &e.id,
            NodeMetadata::Explanation(e) => &e.id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SectionMetadata {
    /// Directory the section was declared in.
    pub path: PathBuf,
    pub id: String,
    pub name: String,
    pub topics: Topics,
    pub contents: Vec<NodeMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExerciseMetadata {
    /// Directory the exercise was declared in; relative files resolve against it.
    #[serde(skip)]
    pub path: PathBuf,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub topics: Topics,
    pub difficulty: i64,
    /// Maps languages to documentation files, e.g. `en = "assignment.en.md"`.
    pub documentation: BTreeMap<String, String>,
    pub judge: JudgeMetadata,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExplanationMetadata {
    #[serde(skip)]
    pub path: PathBuf,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub topics: Topics,
    pub documentation: BTreeMap<String, String>,
}

/// A reference to the metadata in another directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkMetadata {
    /// Target directory, relative to the directory containing the link.
    pub location: PathBuf,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default = "default_true")]
    pub available_by_default: bool,
}

fn default_true() -> bool {
    true
}

/// Decides whether a link is followed.
pub type LinkPredicate<'a> = &'a dyn Fn(&LinkMetadata) -> bool;

/// Follow links that are available by default, or all links if `force_all`.
pub fn load_everything(force_all: bool) -> impl Fn(&LinkMetadata) -> bool {
    move |link| link.available_by_default || force_all
}

/// Follow links sharing a tag with `tags`; with no tags, behave like
/// `load_everything(false)`.
pub fn filter_by_tags<I, S>(tags: I) -> impl Fn(&LinkMetadata) -> bool
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
    move |link| {
        if tags.is_empty() {
            link.available_by_default
        } else {
            !link.tags.is_disjoint(&tags)
        }
    }
}

/// Load and resolve the metadata rooted at `root_dir`.
///
/// Returns `None` when the root itself is a link rejected by `predicate`.
pub fn load_metadata(
    root_dir: &Path,
    predicate: LinkPredicate<'_>,
) -> Result<Option<NodeMetadata>, ContentError> {
    Resolver::new(predicate).load(root_dir)
}

/// Parse and resolve a metadata document whose base directory is `dir`
/// (useful for testing).
pub fn parse_metadata_str(
    content: &str,
    dir: &Path,
    predicate: LinkPredicate<'_>,
) -> Result<Option<NodeMetadata>, ContentError> {
    let raw = parse_raw(content, &dir.join(METADATA_FILE))?;
    let mut resolver = Resolver::new(predicate);
    resolver.resolving.push(canonical(dir));
    resolver.resolve(dir, raw)
}

fn parse_raw(content: &str, file: &Path) -> Result<RawNode, ContentError> {
    toml::from_str(content).map_err(|e| ContentError::Metadata {
        path: file.to_path_buf(),
        message: e.to_string(),
    })
}

fn canonical(dir: &Path) -> PathBuf {
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

struct Resolver<'a> {
    predicate: LinkPredicate<'a>,
    /// Directories whose metadata is currently being resolved.
    resolving: Vec<PathBuf>,
}

impl<'a> Resolver<'a> {
    fn new(predicate: LinkPredicate<'a>) -> Self {
        Self {
            predicate,
            resolving: Vec::new(),
        }
    }

    fn load(&mut self, dir: &Path) -> Result<Option<NodeMetadata>, ContentError> {
        let file = dir.join(METADATA_FILE);
        tracing::debug!("loading {}", file.display());
        if !file.is_file() {
            return Err(ContentError::MissingMetadata(file));
        }

        let key = canonical(dir);
        if self.resolving.contains(&key) {
            return Err(ContentError::LinkCycle(dir.to_path_buf()));
        }

        let content = std::fs::read_to_string(&file).map_err(|source| ContentError::Io {
            path: file.clone(),
            source,
        })?;
        let raw = parse_raw(&content, &file)?;

        self.resolving.push(key);
        let resolved = self.resolve(dir, raw);
        self.resolving.pop();
        resolved
    }

    fn resolve(
        &mut self,
        dir: &Path,
        raw: RawNode,
    ) -> Result<Option<NodeMetadata>, ContentError> {
        match raw {
            RawNode::Exercise(mut exercise) => {
                exercise.path = dir.to_path_buf();
                Ok(Some(NodeMetadata::Exercise(exercise)))
            }
            RawNode::Explanation(mut explanation) => {
                explanation.path = dir.to_path_buf();
                Ok(Some(NodeMetadata::Explanation(explanation)))
            }
            RawNode::Link(link) => {
                if (self.predicate)(&link) {
                    self.load(&dir.join(&link.location))
                } else {
                    tracing::debug!("skipping link to {}", link.location.display());
                    Ok(None)
                }
            }
            RawNode::Section(section) => {
                let mut contents = Vec::with_capacity(section.contents.len());
                for child in section.contents {
                    if let Some(resolved) = self.resolve(dir, child)? {
                        contents.push(resolved);
                    }
                }
                Ok(Some(NodeMetadata::Section(SectionMetadata {
                    path: dir.to_path_buf(),
                    id: section.id,
                    name: section.name,
                    topics: section.topics,
                    contents,
                })))
            }
        }
    }
}
