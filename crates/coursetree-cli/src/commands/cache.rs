//! The `coursetree cache` commands.

use anyhow::Result;

use coursetree_runner::clear_cache;

use super::GlobalOptions;

pub fn path(options: &GlobalOptions) -> Result<()> {
    let settings = options.settings()?;
    println!("{}", settings.judgment_cache.display());
    Ok(())
}

pub fn clear(options: &GlobalOptions) -> Result<()> {
    let settings = options.settings()?;
    let path = &settings.judgment_cache;
    if clear_cache(path)? {
        println!("Removed {}", path.display());
    } else {
        println!("No cache at {}", path.display());
    }
    Ok(())
}
