//! The `coursetree show` command.

use anyhow::{Context, Result};

use super::{find_node, load_course, GlobalOptions};

pub fn execute(options: &GlobalOptions, path: &str) -> Result<()> {
    let settings = options.settings()?;
    let root = load_course(&settings)?;
    let node = find_node(&root, path)?;

    let markdown = node
        .markdown()
        .with_context(|| format!("{node} is a section and has no documentation"))??;
    println!("{markdown}");
    Ok(())
}
