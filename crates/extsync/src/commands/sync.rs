//! `extsync sync`

use anyhow::{bail, Result};
use extsync_core::types::ExtensionRecord;
use extsync_engine::{LedgerOutcome, SyncOutcome, SyncReport};
use serde::Serialize;
use std::sync::Arc;

use crate::cli::SyncArgs;
use crate::output::{self, SyncProgressBar};

#[derive(Serialize)]
struct SyncSummary<'a> {
    timestamp: String,
    success: bool,
    added: OutcomeSummary<'a>,
    updated: OutcomeSummary<'a>,
    removed: OutcomeSummary<'a>,
    ledger: &'static str,
}

#[derive(Serialize)]
struct OutcomeSummary<'a> {
    succeeded: &'a [ExtensionRecord],
    failed: Vec<FailureSummary<'a>>,
}

#[derive(Serialize)]
struct FailureSummary<'a> {
    id: &'a str,
    version: &'a str,
    phase: String,
    kind: &'static str,
    error: String,
}

impl<'a> OutcomeSummary<'a> {
    fn from_outcome(outcome: &'a SyncOutcome) -> Self {
        Self {
            succeeded: &outcome.succeeded,
            failed: outcome
                .failed
                .iter()
                .map(|f| FailureSummary {
                    id: &f.record.id,
                    version: &f.record.version,
                    phase: f.phase.to_string(),
                    kind: f.error.kind(),
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

fn ledger_label(ledger: Option<LedgerOutcome>) -> &'static str {
    match ledger {
        Some(LedgerOutcome::Skipped) => "skipped",
        Some(LedgerOutcome::Written { .. }) => "written",
        Some(LedgerOutcome::Deleted) => "deleted",
        None => "failed",
    }
}

pub async fn run(args: SyncArgs) -> Result<()> {
    let config = super::load_config(&args.overrides)?;
    let desired = super::load_desired(&args.desired)?;
    let show_progress = !args.no_progress && !args.json;

    let engine = super::build_engine(config)?.with_progress(Arc::new(SyncProgressBar::new()));

    if !args.json {
        output::info(&format!(
            "Synchronizing {} desired extensions from {}",
            desired.len(),
            args.desired
        ));
    }

    let report = engine.sync(&desired, show_progress).await?;

    if args.json {
        let summary = SyncSummary {
            timestamp: chrono::Utc::now().to_rfc3339(),
            success: report.is_success(),
            added: OutcomeSummary::from_outcome(&report.added),
            updated: OutcomeSummary::from_outcome(&report.updated),
            removed: OutcomeSummary::from_outcome(&report.removed),
            ledger: ledger_label(report.ledger),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(&report);
    }

    if !report.is_success() {
        bail!(
            "{} of {} extension changes failed",
            report.total_failed(),
            report.total_failed() + report.total_succeeded()
        );
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    if report.total_succeeded() + report.total_failed() == 0 {
        output::success("Extensions already in sync");
        return;
    }

    for (label, marker, outcome) in [
        ("Added", "+", &report.added),
        ("Updated", "~", &report.updated),
        ("Removed", "-", &report.removed),
    ] {
        if outcome.is_empty() {
            continue;
        }
        output::header(&format!(
            "{} ({} ok, {} failed)",
            label,
            outcome.succeeded.len(),
            outcome.failed.len()
        ));
        for record in &outcome.succeeded {
            output::item(marker, &record.to_string());
        }
        for failure in &outcome.failed {
            output::item(
                "!",
                &format!("{} [{}] {}", failure.record, failure.phase, failure.error),
            );
        }
    }
    println!();

    if report.is_success() {
        output::success(&format!(
            "Synchronized {} extensions",
            report.total_succeeded()
        ));
    } else if report.is_partial() {
        output::warning(&format!(
            "Partially synchronized: {} succeeded, {} failed",
            report.total_succeeded(),
            report.total_failed()
        ));
    } else {
        output::error(&format!(
            "All {} extension changes failed",
            report.total_failed()
        ));
    }

    if report.ledger.is_none() {
        output::warning("Obsolete ledger could not be updated; see log for details");
    }
}
