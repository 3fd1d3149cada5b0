//! Config command handlers.

use anyhow::Result;
use threadview_core::config::ViewConfig;

pub fn show(config: &ViewConfig) -> Result<()> {
    let toml = config.to_toml()?;
    print!("{toml}");
    Ok(())
}
