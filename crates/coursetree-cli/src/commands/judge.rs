//! The `coursetree judge` command.

use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use coursetree_core::{Judgment, TreePath};
use coursetree_runner::{wait_all, CachingService, JudgingService, Worker};

use super::{find_node, load_course, GlobalOptions};

pub async fn execute(
    options: &GlobalOptions,
    path: Option<String>,
    only_unknown: bool,
) -> Result<()> {
    let settings = options.settings()?;
    let root = load_course(&settings)?;
    let target = find_node(&root, path.as_deref().unwrap_or_default())?;

    let worker = Worker::start()?;
    let cache = CachingService::new(&root, &worker, &settings);
    let judging = JudgingService::new(worker.clone());

    let handles = judging.judge_recursively(target, only_unknown);
    if handles.is_empty() {
        println!("Nothing to judge under {target}.");
        return Ok(());
    }

    eprintln!("Judging {} exercise(s)...", handles.len());
    let start = Instant::now();
    let results = wait_all(handles).await;

    cache
        .flush_now()
        .with_context(|| format!("failed to write {}", cache.cache_path().display()))?;

    print_results(&results);
    let passed = count(&results, Judgment::Pass);
    let failed = count(&results, Judgment::Fail);
    println!(
        "{passed} passed, {failed} failed ({:.1}s)",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn count(results: &[(TreePath, Option<Judgment>)], judgment: Judgment) -> usize {
    results
        .iter()
        .filter(|(_, outcome)| *outcome == Some(judgment))
        .count()
}

fn print_results(results: &[(TreePath, Option<Judgment>)]) {
    let mut table = Table::new();
    table.set_header(vec!["Exercise", "Judgment"]);
    for (path, outcome) in results {
        let judgment = outcome.unwrap_or(Judgment::Unknown);
        table.add_row(vec![Cell::new(path), Cell::new(judgment)]);
    }
    println!("{table}");
}
