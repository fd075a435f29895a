//! Order-relative queries over a built content tree.
//!
//! The navigator walks the tree once and keeps the preorder sequence, an
//! index into it, and a parent map. Successor and predecessor queries scan
//! the sequence linearly.

use std::collections::HashMap;

use crate::model::{ContentNode, Section};
use crate::treepath::TreePath;

/// Read-only index over a content tree.
pub struct ContentNavigator<'a> {
    nodes: Vec<&'a ContentNode>,
    index: HashMap<&'a TreePath, usize>,
    parents: HashMap<&'a TreePath, &'a Section>,
}

impl<'a> ContentNavigator<'a> {
    pub fn new(root: &'a ContentNode) -> Self {
        let mut nodes = Vec::new();
        let mut index = HashMap::new();
        let mut parents = HashMap::new();

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            index.insert(node.tree_path(), nodes.len());
            nodes.push(node);
            if let ContentNode::Section(section) = node {
                for child in section.children().iter().rev() {
                    parents.insert(child.tree_path(), section);
                    stack.push(child);
                }
            }
        }

        Self {
            nodes,
            index,
            parents,
        }
    }

    /// All nodes in preorder.
    pub fn nodes(&self) -> &[&'a ContentNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by its tree path.
    pub fn find(&self, path: &TreePath) -> Option<&'a ContentNode> {
        self.index.get(path).map(|&i| self.nodes[i])
    }

    /// First leaf after `node` in preorder.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not part of the tree this navigator was built from.
    pub fn find_successor_leaf(&self, node: &ContentNode) -> Option<&'a ContentNode> {
        let start = self.position(node) + 1;
        self.nodes[start..].iter().copied().find(|n| n.is_leaf())
    }

    /// Last leaf before `node` in preorder.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not part of the tree this navigator was built from.
    pub fn find_predecessor_leaf(&self, node: &ContentNode) -> Option<&'a ContentNode> {
        let end = self.position(node);
        self.nodes[..end].iter().rev().copied().find(|n| n.is_leaf())
    }

    /// The section directly containing `node`; `None` for the root.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not part of the tree this navigator was built from.
    pub fn find_parent(&self, node: &ContentNode) -> Option<&'a Section> {
        self.position(node);
        self.parents.get(node.tree_path()).copied()
    }

    fn position(&self, node: &ContentNode) -> usize {
        match self.index.get(node.tree_path()) {
            Some(&i) if std::ptr::eq(self.nodes[i], node) => i,
            _ => panic!("unknown node {node}: not part of the navigated tree"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::sample_tree;

    fn path(s: &str) -> TreePath {
        s.parse().unwrap()
    }

    fn leaf_paths(navigator: &ContentNavigator<'_>) -> Vec<String> {
        navigator
            .nodes()
            .iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.tree_path().to_string())
            .collect()
    }

    #[test]
    fn preorder_contains_every_node_once() {
        let tree = sample_tree();
        let navigator = ContentNavigator::new(&tree);
        assert_eq!(navigator.len(), tree.preorder_traversal().count());
        assert_eq!(navigator.len(), 7);

        let mut seen = std::collections::HashSet::new();
        for node in navigator.nodes() {
            assert!(seen.insert(node.tree_path().clone()));
        }
    }

    #[test]
    fn successor_skips_sections() {
        let tree = sample_tree();
        let navigator = ContentNavigator::new(&tree);

        let root_next = navigator.find_successor_leaf(&tree).unwrap();
        assert_eq!(root_next.tree_path(), &path("a,a1"));

        // a2 is followed by the empty section b, then c, then c1
        let a2 = navigator.find(&path("a,a2")).unwrap();
        let next = navigator.find_successor_leaf(a2).unwrap();
        assert_eq!(next.tree_path(), &path("c,c1"));

        let last = navigator.find(&path("c,c1")).unwrap();
        assert!(navigator.find_successor_leaf(last).is_none());
    }

    #[test]
    fn predecessor_mirrors_successor() {
        let tree = sample_tree();
        let navigator = ContentNavigator::new(&tree);
        let leaves = leaf_paths(&navigator);

        for pair in leaves.windows(2) {
            let p = navigator.find(&path(&pair[0])).unwrap();
            let s = navigator.find(&path(&pair[1])).unwrap();
            assert!(std::ptr::eq(navigator.find_successor_leaf(p).unwrap(), s));
            assert!(std::ptr::eq(navigator.find_predecessor_leaf(s).unwrap(), p));
        }

        let first = navigator.find(&path("a,a1")).unwrap();
        assert!(navigator.find_predecessor_leaf(first).is_none());
        assert!(navigator.find_predecessor_leaf(&tree).is_none());

        let c = navigator.find(&path("c")).unwrap();
        assert_eq!(
            navigator.find_predecessor_leaf(c).unwrap().tree_path(),
            &path("a,a2")
        );
    }

    #[test]
    fn parents_contain_their_children() {
        let tree = sample_tree();
        let navigator = ContentNavigator::new(&tree);

        assert!(navigator.find_parent(&tree).is_none());
        for node in navigator.nodes().iter().skip(1) {
            let parent = navigator.find_parent(node).unwrap();
            assert!(parent.children().iter().any(|c| std::ptr::eq(c, *node)));
            assert_ne!(parent.tree_path(), node.tree_path());
        }
    }

    #[test]
    fn no_node_is_its_own_ancestor() {
        let tree = sample_tree();
        let navigator = ContentNavigator::new(&tree);

        for node in navigator.nodes() {
            let mut current = navigator.find_parent(node);
            let mut depth = 0;
            while let Some(section) = current {
                assert_ne!(section.tree_path(), node.tree_path());
                let section_node = navigator.find(section.tree_path()).unwrap();
                current = navigator.find_parent(section_node);
                depth += 1;
                assert!(depth <= node.tree_path().len());
            }
        }
    }

    #[test]
    #[should_panic(expected = "unknown node")]
    fn foreign_node_panics() {
        let tree = sample_tree();
        let other = sample_tree();
        let navigator = ContentNavigator::new(&tree);
        let foreign = other.descend(&["a".into(), "a1".into()]).unwrap();
        navigator.find_successor_leaf(foreign);
    }
}
