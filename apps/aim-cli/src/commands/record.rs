// record.rs — `aim record`: govern an externally run action and seal its record.
//
// The action itself already happened (in a CI job, a chat bot, a script).
// This command puts its request through the same gate as an in-process
// caller, then seals the reported outcome into the configured audit log.

use std::path::Path;

use aim_audit::{AuditLog, AuditOutcome};
use aim_gateway::{ActionOutput, EventDispatcher, GovernanceConfig, GovernanceOutcome, Governor, LogSink};
use anyhow::Context;
use clap::ValueEnum;

/// Outcome reported for the external action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportedOutcome {
    Success,
    Failure,
}

pub fn execute(
    config: &GovernanceConfig,
    file: &Path,
    outcome: ReportedOutcome,
    error: Option<&str>,
    output_file: Option<&Path>,
) -> anyhow::Result<()> {
    let request = super::load_request(file)?;
    let text = output_file
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read output file {}", path.display()))
        })
        .transpose()?;

    let audit = AuditLog::open(&config.audit_log)?;
    let mut events = EventDispatcher::new();
    events.add_sink(Box::new(LogSink::new(&config.events_log)));
    let mut governor = Governor::new(config.clone(), audit, events);

    let result = governor.govern(request, |_| match outcome {
        ReportedOutcome::Success => Ok(ActionOutput {
            result: serde_json::Value::Null,
            text,
        }),
        ReportedOutcome::Failure => Err(error.unwrap_or("action reported failure").to_string()),
    })?;

    let record = result.record();
    println!("Trace:     {}", record.trace_id);
    println!("Outcome:   {}", record.outcome);
    println!("Integrity: {}", record.integrity_hash.as_deref().unwrap_or("-"));
    println!("Log:       {}", config.audit_log.display());

    match &result {
        GovernanceOutcome::Rejected { reason, .. } => {
            if let Some(body) = result.error_body() {
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            anyhow::bail!("Request rejected: {}", reason)
        }
        GovernanceOutcome::Completed { record, .. }
            if outcome == ReportedOutcome::Success && record.outcome == AuditOutcome::Failure =>
        {
            anyhow::bail!(
                "Action output violated the phrase policy: {}",
                record.error.as_deref().unwrap_or("-")
            )
        }
        GovernanceOutcome::Completed { .. } => Ok(()),
    }
}
