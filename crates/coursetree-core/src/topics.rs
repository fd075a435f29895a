//! Topic ordering checks.
//!
//! Walks the leaves in reading order and verifies that every node's topic
//! constraints hold with respect to the topics introduced before it.

use std::collections::HashSet;
use std::fmt;

use crate::model::ContentNode;
use crate::navigator::ContentNavigator;
use crate::treepath::TreePath;

/// What went wrong with a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A topic listed in `must_come_after` was not introduced earlier.
    MissingPrerequisite,
    /// A topic listed in `must_come_before` was already introduced.
    PrematureTopic,
    /// A topic was introduced a second time.
    DuplicateIntroduction,
}

/// A single violated topic constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicViolation {
    pub node: TreePath,
    pub topic: String,
    pub kind: ViolationKind,
}

impl fmt::Display for TopicViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (node, topic) = (&self.node, &self.topic);
        match self.kind {
            ViolationKind::MissingPrerequisite => {
                write!(f, "{node} requires {topic} to have been discussed earlier")
            }
            ViolationKind::PrematureTopic => {
                write!(f, "{node} requires {topic} NOT to have been discussed earlier")
            }
            ViolationKind::DuplicateIntroduction => {
                write!(f, "{node} introduces {topic}, but it was already introduced earlier")
            }
        }
    }
}

/// Check topic constraints of all leaves under `root`, in preorder.
pub fn check_topic_order(
    root: &ContentNode,
    navigator: &ContentNavigator<'_>,
) -> Vec<TopicViolation> {
    let mut violations = Vec::new();
    let mut introduced: HashSet<&str> = HashSet::new();
    let mut current = root;

    while let Some(next) = navigator.find_successor_leaf(current) {
        let topics = next.topics();
        let mut report = |topic: &String, kind: ViolationKind| {
            violations.push(TopicViolation {
                node: next.tree_path().clone(),
                topic: topic.clone(),
                kind,
            })
        };

        for topic in &topics.must_come_after {
            if !introduced.contains(topic.as_str()) {
                report(topic, ViolationKind::MissingPrerequisite);
            }
        }
        for topic in &topics.must_come_before {
            if introduced.contains(topic.as_str()) {
                report(topic, ViolationKind::PrematureTopic);
            }
        }
        for topic in &topics.introduces {
            if !introduced.insert(topic.as_str()) {
                report(topic, ViolationKind::DuplicateIntroduction);
            }
        }

        current = next;
    }

    violations
}
