//! The `coursetree status` command.

use std::collections::BTreeMap;

use anyhow::Result;
use comfy_table::{Cell, Table};

use coursetree_core::{ContentNode, Judgment, TreePath};
use coursetree_runner::{CachingService, Worker};

use super::{load_course, GlobalOptions};

pub fn execute(options: &GlobalOptions) -> Result<()> {
    let settings = options.settings()?;
    let root = load_course(&settings)?;

    let worker = Worker::start()?;
    let cache = CachingService::new(&root, &worker, &settings);

    let (table, totals) = report(&root, &cache.snapshot());
    println!("{table}");
    println!("{totals}");
    Ok(())
}

/// One row per exercise plus a totals line. Exercises missing from
/// `judgments` count as not judged.
fn report(root: &ContentNode, judgments: &BTreeMap<TreePath, Judgment>) -> (Table, String) {
    let mut table = Table::new();
    table.set_header(vec!["Exercise", "Name", "Difficulty", "Judgment"]);

    let (mut passed, mut failed, mut unknown) = (0usize, 0usize, 0usize);
    for exercise in root.exercises() {
        let judgment = judgments
            .get(exercise.tree_path())
            .copied()
            .unwrap_or(Judgment::Unknown);
        match judgment {
            Judgment::Pass => passed += 1,
            Judgment::Fail => failed += 1,
            Judgment::Unknown => unknown += 1,
        }
        table.add_row(vec![
            Cell::new(exercise.tree_path()),
            Cell::new(exercise.name()),
            Cell::new(exercise.difficulty()),
            Cell::new(judgment),
        ]);
    }

    let totals = format!("{passed} passed, {failed} failed, {unknown} not judged");
    (table, totals)
}
