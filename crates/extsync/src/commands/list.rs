//! `extsync list`

use anyhow::Result;
use extsync_engine::{InventoryReader, LocalInventory};

use crate::cli::{ListArgs, SyncOverrides};
use crate::output;

pub fn run(args: ListArgs) -> Result<()> {
    let config = super::load_config(&SyncOverrides {
        extensions_dir: args.extensions_dir,
        ..Default::default()
    })?;
    let dir = config.resolved_extensions_dir()?;

    let inventory = LocalInventory::new(&dir);
    let installed = inventory.list_installed(&args.exclude)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&installed)?);
        return Ok(());
    }

    output::header(&format!("Installed extensions in {}", dir.display()));
    if installed.is_empty() {
        output::info("No extensions installed");
        return Ok(());
    }
    for record in &installed {
        output::kv(&record.id, &record.version);
    }
    println!();
    output::info(&format!("{} extensions", installed.len()));
    Ok(())
}
