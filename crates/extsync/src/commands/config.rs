//! `extsync config`

use anyhow::Result;

use crate::cli::{ConfigArgs, SyncOverrides};

pub fn run(args: ConfigArgs) -> Result<()> {
    let mut config = super::load_config(&SyncOverrides::default())?;
    if config.extensions_dir.is_none() {
        config.extensions_dir = Some(config.resolved_extensions_dir()?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", serde_yaml_ng::to_string(&config)?);
    }
    Ok(())
}
