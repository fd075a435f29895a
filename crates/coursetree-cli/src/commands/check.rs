//! The `coursetree check` command.

use anyhow::Result;

use coursetree_core::topics::check_topic_order;
use coursetree_core::ContentNavigator;

use super::{load_course, GlobalOptions};

pub fn execute(options: &GlobalOptions) -> Result<()> {
    let settings = options.settings()?;
    let root = load_course(&settings)?;
    let navigator = ContentNavigator::new(&root);

    let violations = check_topic_order(&root, &navigator);
    for violation in &violations {
        println!("  {violation}");
    }

    if violations.is_empty() {
        println!("Topic order is consistent ({} nodes checked).", navigator.len());
        Ok(())
    } else {
        anyhow::bail!("{} topic order violation(s) found", violations.len())
    }
}
