pub mod cache;
pub mod check;
pub mod init;
pub mod judge;
pub mod show;
pub mod status;
pub mod topics;
pub mod tree;

use std::path::PathBuf;

use anyhow::{Context, Result};

use coursetree_core::builder::build_tree;
use coursetree_core::config::{load_settings_from, Settings};
use coursetree_core::parser::{load_everything, load_metadata, LinkPredicate};
use coursetree_core::{ContentNode, TreePath};
use coursetree_runner::RunnerJudgeFactory;

/// Options shared by every command.
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
}

impl GlobalOptions {
    /// Load settings, applying the `--root` override.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = load_settings_from(self.config.as_deref())?;
        if let Some(root) = &self.root {
            settings.repository_root = root.clone();
        }
        Ok(settings)
    }
}

/// Load the course, following only links visible by default.
pub fn load_course(settings: &Settings) -> Result<ContentNode> {
    load_course_with(settings, &load_everything(false))
}

/// Load the course, following the links accepted by `predicate`.
pub fn load_course_with(settings: &Settings, predicate: LinkPredicate<'_>) -> Result<ContentNode> {
    let root_dir = &settings.repository_root;
    let metadata = load_metadata(root_dir, predicate)
        .with_context(|| format!("failed to load course from {}", root_dir.display()))?
        .with_context(|| format!("course root {} is not available", root_dir.display()))?;

    let judges = RunnerJudgeFactory::from_settings(settings);
    let root = build_tree(metadata, &settings.language_priorities, &judges)
        .context("invalid course structure")?;
    tracing::debug!("loaded course from {}", root_dir.display());
    Ok(root)
}

/// Resolve a comma-separated tree path given on the command line.
pub fn find_node<'a>(root: &'a ContentNode, path: &str) -> Result<&'a ContentNode> {
    let tree_path: TreePath = match path.parse() {
        Ok(tree_path) => tree_path,
        Err(e) => match e {},
    };
    Ok(root.descend(tree_path.segments())?)
}
