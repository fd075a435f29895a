//! Content tree data model.
//!
//! A tree consists of sections (branches) and two kinds of leaves:
//! exercises, which can be judged, and explanations, which cannot.
//! The tree is built once and never changes shape; the only mutable state
//! is the judgment of each exercise.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::judgment::{Judgment, JudgmentCell, JudgmentObserver};
use crate::traits::Judge;
use crate::treepath::TreePath;

/// Topic constraints of a node, checked by the topic-order checker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Topics {
    #[serde(default)]
    pub introduces: Vec<String>,
    #[serde(default)]
    pub must_come_before: Vec<String>,
    #[serde(default)]
    pub must_come_after: Vec<String>,
}

/// Discriminator of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Section,
    Exercise,
    Explanation,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Section => write!(f, "section"),
            NodeKind::Exercise => write!(f, "exercise"),
            NodeKind::Explanation => write!(f, "explanation"),
        }
    }
}

/// Fields shared by every node.
#[derive(Debug, Clone)]
pub struct NodeHeader {
    pub tree_path: TreePath,
    /// Directory the node was loaded from; several nodes can share one.
    pub local_path: PathBuf,
    pub name: String,
    pub topics: Topics,
}

/// A node in the content tree.
#[derive(Debug)]
pub enum ContentNode {
    Section(Section),
    Exercise(Arc<Exercise>),
    Explanation(Explanation),
}

impl ContentNode {
    fn header(&self) -> &NodeHeader {
        match self {
            ContentNode::Section(section) => &section.header,
            ContentNode::Exercise(exercise) => &exercise.header,
            ContentNode::Explanation(explanation) => &explanation.header,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ContentNode::Section(_) => NodeKind::Section,
            ContentNode::Exercise(_) => NodeKind::Exercise,
            ContentNode::Explanation(_) => NodeKind::Explanation,
        }
    }

    pub fn name(&self) -> &str {
        &self.header().name
    }

    pub fn tree_path(&self) -> &TreePath {
        &self.header().tree_path
    }

    pub fn local_path(&self) -> &Path {
        &self.header().local_path
    }

    pub fn topics(&self) -> &Topics {
        &self.header().topics
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, ContentNode::Section(_))
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            ContentNode::Section(section) => Some(section),
            _ => None,
        }
    }

    pub fn as_exercise(&self) -> Option<&Arc<Exercise>> {
        match self {
            ContentNode::Exercise(exercise) => Some(exercise),
            _ => None,
        }
    }

    /// Iterate over this node and all its descendants in preorder.
    pub fn preorder_traversal(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    /// Iterate over all exercises in this subtree, in preorder.
    pub fn exercises(&self) -> impl Iterator<Item = &Arc<Exercise>> + '_ {
        self.preorder_traversal().filter_map(ContentNode::as_exercise)
    }

    /// Follow `path` (relative to this node) down the tree.
    pub fn descend(&self, path: &[String]) -> Result<&ContentNode, ContentError> {
        let mut current = self;
        for segment in path {
            current = match current {
                ContentNode::Section(section) => section.child(segment),
                _ => None,
            }
            .ok_or_else(|| {
                ContentError::InvalidDescent(TreePath::new(
                    self.tree_path().segments().iter().chain(path.iter()).cloned(),
                ))
            })?;
        }
        Ok(current)
    }

    /// Markdown text of a leaf's documentation; `None` for sections.
    pub fn markdown(&self) -> Option<Result<String, ContentError>> {
        let file = match self {
            ContentNode::Section(_) => return None,
            ContentNode::Exercise(exercise) => &exercise.documentation,
            ContentNode::Explanation(explanation) => &explanation.documentation,
        };
        Some(
            std::fs::read_to_string(file).map_err(|source| ContentError::Io {
                path: file.clone(),
                source,
            }),
        )
    }
}

impl fmt::Display for ContentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind(), self.tree_path())
    }
}

/// Preorder iterator over a subtree.
pub struct Preorder<'a> {
    stack: Vec<&'a ContentNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a ContentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let ContentNode::Section(section) = node {
            self.stack.extend(section.children.iter().rev());
        }
        Some(node)
    }
}

/// Branch node with insertion-ordered children keyed by their last path segment.
#[derive(Debug)]
pub struct Section {
    pub(crate) header: NodeHeader,
    pub(crate) children: Vec<ContentNode>,
}

impl Section {
    /// Create a section, rejecting children whose ids collide.
    pub fn new(header: NodeHeader, children: Vec<ContentNode>) -> Result<Self, ContentError> {
        for (i, child) in children.iter().enumerate() {
            let key = child.tree_path().last();
            if children[..i].iter().any(|c| c.tree_path().last() == key) {
                return Err(ContentError::DuplicateChild {
                    parent: header.tree_path.clone(),
                    child: key.unwrap_or_default().to_string(),
                });
            }
        }
        Ok(Self { header, children })
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn tree_path(&self) -> &TreePath {
        &self.header.tree_path
    }

    pub fn children(&self) -> &[ContentNode] {
        &self.children
    }

    /// Look up a direct child by id.
    pub fn child(&self, key: &str) -> Option<&ContentNode> {
        self.children
            .iter()
            .find(|child| child.tree_path().last() == Some(key))
    }
}

/// Leaf node that can be judged.
pub struct Exercise {
    pub(crate) header: NodeHeader,
    difficulty: u8,
    documentation: PathBuf,
    judge: Arc<dyn Judge>,
    judgment: JudgmentCell,
    // Number of judging rounds started; guards judgment transitions.
    generation: Mutex<u64>,
    // Held for the duration of a judge run so runs on one exercise never overlap.
    run_lock: tokio::sync::Mutex<()>,
}

impl Exercise {
    pub fn new(
        header: NodeHeader,
        difficulty: u8,
        documentation: PathBuf,
        judge: Arc<dyn Judge>,
    ) -> Self {
        Self {
            header,
            difficulty,
            documentation,
            judge,
            judgment: JudgmentCell::default(),
            generation: Mutex::new(0),
            run_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn tree_path(&self) -> &TreePath {
        &self.header.tree_path
    }

    pub fn local_path(&self) -> &Path {
        &self.header.local_path
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    pub fn documentation(&self) -> &Path {
        &self.documentation
    }

    pub fn judge(&self) -> &Arc<dyn Judge> {
        &self.judge
    }

    pub fn judgment(&self) -> Judgment {
        self.judgment.get()
    }

    pub fn set_judgment(&self, judgment: Judgment) {
        self.judgment.set(judgment);
    }

    pub fn observe_judgment(&self, observer: JudgmentObserver) {
        self.judgment.observe(observer);
    }

    /// Start a new judging round: reset the judgment to `Unknown` and
    /// return the round's generation number.
    pub fn begin_judging(&self) -> u64 {
        let mut generation = self.lock_generation();
        *generation += 1;
        self.judgment.set(Judgment::Unknown);
        *generation
    }

    /// Record the verdict of round `generation`.
    ///
    /// Returns `false` and leaves the judgment untouched if a newer round
    /// has started in the meantime.
    pub fn complete_judging(&self, generation: u64, judgment: Judgment) -> bool {
        let current = self.lock_generation();
        if *current != generation {
            return false;
        }
        self.judgment.set(judgment);
        true
    }

    /// Whether `generation` is the most recently started round.
    pub fn is_current(&self, generation: u64) -> bool {
        *self.lock_generation() == generation
    }

    fn lock_generation(&self) -> std::sync::MutexGuard<'_, u64> {
        self.generation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn run_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.run_lock
    }
}

impl fmt::Debug for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exercise")
            .field("tree_path", &self.header.tree_path)
            .field("difficulty", &self.difficulty)
            .field("judgment", &self.judgment())
            .finish_non_exhaustive()
    }
}

/// Leaf node without a judgment.
#[derive(Debug)]
pub struct Explanation {
    pub(crate) header: NodeHeader,
    documentation: PathBuf,
}

impl Explanation {
    pub fn new(header: NodeHeader, documentation: PathBuf) -> Self {
        Self {
            header,
            documentation,
        }
    }

    pub fn documentation(&self) -> &Path {
        &self.documentation
    }
}
