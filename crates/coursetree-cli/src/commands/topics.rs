//! The `coursetree topics` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use coursetree_core::ContentNode;

use super::{load_course, GlobalOptions};

pub fn execute(options: &GlobalOptions) -> Result<()> {
    let settings = options.settings()?;
    let root = load_course(&settings)?;

    let table = topics_table(&root);
    println!("{table}");
    Ok(())
}

/// One row per node that declares any topic constraint.
fn topics_table(root: &ContentNode) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Node", "Kind", "Introduces", "Requires", "Forbids"]);

    for node in root.preorder_traversal() {
        let topics = node.topics();
        if topics.introduces.is_empty()
            && topics.must_come_after.is_empty()
            && topics.must_come_before.is_empty()
        {
            continue;
        }
        table.add_row(vec![
            Cell::new(node.tree_path()),
            Cell::new(node.kind()),
            Cell::new(topics.introduces.join(", ")),
            Cell::new(topics.must_come_after.join(", ")),
            Cell::new(topics.must_come_before.join(", ")),
        ]);
    }
    table
}
