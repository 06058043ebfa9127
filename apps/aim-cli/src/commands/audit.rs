// audit.rs — Audit subcommands: verify, tail.

use std::path::PathBuf;

use aim_audit::AuditLog;
use aim_gateway::GovernanceConfig;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Recompute every record's integrity hash.
    Verify {
        /// Path to audit log (defaults to .aim/audit.jsonl).
        #[arg(long)]
        log: Option<String>,
    },
    /// Show recent audit records with their integrity status.
    Tail {
        /// Path to audit log (defaults to .aim/audit.jsonl).
        #[arg(long)]
        log: Option<String>,
        /// Number of records to show.
        #[arg(short, default_value = "10")]
        n: usize,
    },
}

pub fn execute(cmd: &AuditCommands, config: &GovernanceConfig) -> anyhow::Result<()> {
    match cmd {
        AuditCommands::Verify { log } => {
            let path = log_path(log.as_deref(), config);
            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            let report = AuditLog::verify(&path)?;
            if report.is_intact() {
                println!(
                    "Audit log verified: {} record(s), all integrity hashes match.",
                    report.total
                );
                return Ok(());
            }

            println!(
                "INTEGRITY VIOLATION: {} of {} record(s) failed verification:",
                report.tampered.len(),
                report.total
            );
            for tampered in &report.tampered {
                println!(
                    "  line {:<5} {:<38} {}",
                    tampered.line,
                    tampered.trace_id.as_deref().unwrap_or("-"),
                    tampered.problem
                );
            }
            println!();
            println!("The audit log may have been tampered with.");
            anyhow::bail!("Audit log integrity check failed");
        }

        AuditCommands::Tail { log, n } => {
            let path = log_path(log.as_deref(), config);
            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            let records = AuditLog::read_all(&path)?;
            let start = records.len().saturating_sub(*n);
            let recent = &records[start..];

            if recent.is_empty() {
                println!("No audit records.");
                return Ok(());
            }

            println!(
                "{:<20} {:<9} {:<9} {:<9} {:<24} TRACE",
                "TIMESTAMP", "STATUS", "MODE", "OUTCOME", "WORKFLOW"
            );
            println!("{}", "-".repeat(110));

            let mut tampered = 0;
            for record in recent {
                let status = if record.verify_integrity() {
                    "ok"
                } else {
                    tampered += 1;
                    tracing::warn!(
                        trace_id = %record.trace_id,
                        path = %path.display(),
                        "audit record failed integrity check"
                    );
                    "TAMPERED"
                };
                println!(
                    "{:<20} {:<9} {:<9} {:<9} {:<24} {}",
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    status,
                    record.mode,
                    record.outcome,
                    record.workflow_name,
                    record.trace_id,
                );
            }

            if tampered > 0 {
                println!();
                println!(
                    "{} of {} record(s) shown failed verification; their contents cannot be trusted.",
                    tampered,
                    recent.len()
                );
                anyhow::bail!("Audit log integrity check failed");
            }
        }
    }

    Ok(())
}

fn log_path(log: Option<&str>, config: &GovernanceConfig) -> PathBuf {
    log.map(PathBuf::from)
        .unwrap_or_else(|| config.audit_log.clone())
}
