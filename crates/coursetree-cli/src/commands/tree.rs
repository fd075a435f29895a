//! The `coursetree tree` command.

use anyhow::Result;

use coursetree_core::parser::{filter_by_tags, load_everything, LinkMetadata};
use coursetree_core::ContentNode;

use super::{load_course_with, GlobalOptions};

pub fn execute(options: &GlobalOptions, tags: Option<String>, all: bool) -> Result<()> {
    let settings = options.settings()?;

    let predicate: Box<dyn Fn(&LinkMetadata) -> bool> = if all {
        Box::new(load_everything(true))
    } else {
        let tags: Vec<String> = tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        Box::new(filter_by_tags(tags))
    };

    let root = load_course_with(&settings, &*predicate)?;
    print!("{}", render(&root));
    Ok(())
}

/// Indented outline of the tree, one node per line.
fn render(root: &ContentNode) -> String {
    let mut out = String::new();
    render_node(root, 0, &mut out);
    out
}

fn render_node(node: &ContentNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let line = match node {
        ContentNode::Exercise(exercise) => format!(
            "{indent}{} [{}] (exercise, difficulty {})",
            exercise.name(),
            exercise.tree_path(),
            exercise.difficulty()
        ),
        _ if node.tree_path().is_root() => format!("{indent}{}", node.name()),
        _ => format!(
            "{indent}{} [{}] ({})",
            node.name(),
            node.tree_path(),
            node.kind()
        ),
    };
    out.push_str(&line);
    out.push('\n');

    if let Some(section) = node.as_section() {
        for child in section.children() {
            render_node(child, depth + 1, out);
        }
    }
}
