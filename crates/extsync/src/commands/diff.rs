//! `extsync diff`

use anyhow::Result;
use extsync_core::types::ExtensionRecord;
use extsync_engine::DiffResult;
use serde::Serialize;

use crate::cli::DiffArgs;
use crate::output;

pub async fn run(args: DiffArgs) -> Result<()> {
    let config = super::load_config(&args.overrides)?;
    let desired = super::load_desired(&args.desired)?;
    let engine = super::build_engine(config)?;

    let diff = engine.compute_diff(&desired).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&DiffSummary::from(&diff))?);
        return Ok(());
    }

    if diff.is_empty() {
        output::success(&format!(
            "Nothing to do ({} extensions up to date)",
            diff.reserved.len()
        ));
        return Ok(());
    }

    print_section("To add", "+", &diff.added);
    print_section("To update", "~", &diff.updated);
    print_section("To remove", "-", &diff.removed);
    println!();
    output::kv("Changes", &diff.total().to_string());
    output::kv("Unchanged", &diff.reserved.len().to_string());
    Ok(())
}

/// JSON form of the plan: the four sets plus the number of changes
#[derive(Serialize)]
struct DiffSummary<'a> {
    #[serde(flatten)]
    diff: &'a DiffResult,
    total: usize,
}

impl<'a> From<&'a DiffResult> for DiffSummary<'a> {
    fn from(diff: &'a DiffResult) -> Self {
        Self {
            diff,
            total: diff.total(),
        }
    }
}

fn print_section(title: &str, marker: &str, records: &[ExtensionRecord]) {
    if records.is_empty() {
        return;
    }
    output::header(title);
    for record in records {
        output::item(marker, &record.to_string());
    }
}
