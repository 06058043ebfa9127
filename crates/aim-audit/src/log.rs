// log.rs — Append-only JSONL audit log.
//
// The audit log is stored as a JSONL (JSON Lines) file: one sealed
// AuditRecord per line. This format is simple, append-friendly, and easy to
// parse with standard tools (jq, grep, etc.).
//
// The log never rewrites existing lines. Each line carries its own
// integrity hash, so `verify()` can point at exactly which records were
// modified after they were written.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AuditError;
use crate::record::AuditRecord;

/// An append-only audit log backed by a JSONL file.
///
/// `BufWriter` batches writes; we flush after each record for durability.
pub struct AuditLog {
    writer: BufWriter<File>,
    path: PathBuf,
}

/// A record in a stored log that failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TamperedRecord {
    /// 1-based line number in the log file.
    pub line: usize,
    /// The record's trace id, when the line still parses.
    pub trace_id: Option<String>,
    /// What went wrong ("hash mismatch", "missing integrity hash", "malformed JSON: ...").
    pub problem: String,
}

/// Result of verifying every record in a stored log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// Number of non-blank lines inspected.
    pub total: usize,
    /// Lines whose record cannot be trusted.
    pub tampered: Vec<TamperedRecord>,
}

impl IntegrityReport {
    /// True when every record verified.
    pub fn is_intact(&self) -> bool {
        self.tampered.is_empty()
    }
}

impl AuditLog {
    /// Open (or create) an audit log at the given path.
    ///
    /// Missing parent directories are created. The file is opened in append
    /// mode, so existing records are never overwritten.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| AuditError::OpenFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditError::OpenFailed {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Append a sealed record to the log.
    ///
    /// Unsealed records are refused: nothing reaches the file without an
    /// integrity hash.
    pub fn append(&mut self, record: &AuditRecord) -> Result<(), AuditError> {
        if !record.is_finalized() {
            return Err(AuditError::NotFinalized {
                trace_id: record.trace_id.clone(),
            });
        }

        // Serialize to a single JSON line (no pretty-printing).
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;

        tracing::debug!(
            trace_id = %record.trace_id,
            outcome = %record.outcome,
            path = %self.path.display(),
            "audit record appended"
        );
        Ok(())
    }

    /// Read all records from a log file, oldest first. Blank lines are skipped.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<AuditRecord>, AuditError> {
        let reader = Self::reader(path.as_ref())?;
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }

        Ok(records)
    }

    /// Verify every record in a log file.
    ///
    /// Unlike `read_all`, a malformed line does not abort: it is reported as
    /// tampered alongside records whose hash no longer matches.
    pub fn verify(path: impl AsRef<Path>) -> Result<IntegrityReport, AuditError> {
        let reader = Self::reader(path.as_ref())?;
        let mut report = IntegrityReport::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            report.total += 1;

            let problem = match serde_json::from_str::<AuditRecord>(&line) {
                Ok(record) if record.verify_integrity() => continue,
                Ok(record) => {
                    let problem = if record.integrity_hash.is_none() {
                        "missing integrity hash"
                    } else {
                        "hash mismatch"
                    };
                    (Some(record.trace_id), problem.to_string())
                }
                Err(e) => (None, format!("malformed JSON: {}", e)),
            };

            tracing::warn!(
                line = idx + 1,
                trace_id = problem.0.as_deref().unwrap_or("-"),
                problem = %problem.1,
                "audit record failed integrity check"
            );
            report.tampered.push(TamperedRecord {
                line: idx + 1,
                trace_id: problem.0,
                problem: problem.1,
            });
        }

        Ok(report)
    }

    /// Return the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reader(path: &Path) -> Result<BufReader<File>, AuditError> {
        let file = File::open(path).map_err(|source| AuditError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AuditOutcome;
    use tempfile::tempdir;

    fn sealed(trace_id: &str, outcome: AuditOutcome) -> AuditRecord {
        let mut record = AuditRecord::new(
            trace_id,
            serde_json::json!({"actor": {"name": "Jake Smith"}}),
            "execute",
            "deploy-to-staging",
            outcome,
        );
        record.finalize().unwrap();
        record
    }

    #[test]
    fn append_and_read_round_trip() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.jsonl");

        {
            let mut log = AuditLog::open(&log_path).unwrap();
            log.append(&sealed("t-1", AuditOutcome::Success)).unwrap();
            log.append(&sealed("t-2", AuditOutcome::Rejected)).unwrap();
        }

        let records = AuditLog::read_all(&log_path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outcome, AuditOutcome::Success);
        assert_eq!(records[1].trace_id, "t-2");
        assert!(records.iter().all(|r| r.verify_integrity()));
    }

    #[test]
    fn unsealed_record_is_refused() {
        let dir = tempdir().unwrap();
        let mut log = AuditLog::open(dir.path().join("audit.jsonl")).unwrap();
        let record = AuditRecord::new(
            "t-raw",
            serde_json::Value::Null,
            "draft",
            "wf",
            AuditOutcome::Success,
        );
        match log.append(&record) {
            Err(AuditError::NotFinalized { trace_id }) => assert_eq!(trace_id, "t-raw"),
            other => panic!("expected NotFinalized, got {:?}", other),
        }
        assert!(AuditLog::read_all(log.path()).unwrap().is_empty());
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join(".aim").join("nested").join("audit.jsonl");
        AuditLog::open(&log_path).unwrap();
        assert!(log_path.exists());
    }

    #[test]
    fn reopen_appends_instead_of_truncating() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.jsonl");

        {
            let mut log = AuditLog::open(&log_path).unwrap();
            log.append(&sealed("t-1", AuditOutcome::Success)).unwrap();
        }
        {
            let mut log = AuditLog::open(&log_path).unwrap();
            log.append(&sealed("t-2", AuditOutcome::Failure)).unwrap();
        }

        assert_eq!(AuditLog::read_all(&log_path).unwrap().len(), 2);
        assert!(AuditLog::verify(&log_path).unwrap().is_intact());
    }

    #[test]
    fn verify_reports_modified_line() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.jsonl");

        {
            let mut log = AuditLog::open(&log_path).unwrap();
            log.append(&sealed("t-1", AuditOutcome::Success)).unwrap();
            log.append(&sealed("t-2", AuditOutcome::Failure)).unwrap();
            log.append(&sealed("t-3", AuditOutcome::Success)).unwrap();
        }

        // Rewrite the second record's outcome behind the log's back.
        let content = fs::read_to_string(&log_path).unwrap();
        let tampered: Vec<String> = content
            .lines()
            .enumerate()
            .map(|(i, line)| {
                if i == 1 {
                    line.replace("\"failure\"", "\"success\"")
                } else {
                    line.to_string()
                }
            })
            .collect();
        fs::write(&log_path, tampered.join("\n") + "\n").unwrap();

        let report = AuditLog::verify(&log_path).unwrap();
        assert_eq!(report.total, 3);
        assert!(!report.is_intact());
        assert_eq!(
            report.tampered,
            vec![TamperedRecord {
                line: 2,
                trace_id: Some("t-2".to_string()),
                problem: "hash mismatch".to_string(),
            }]
        );
    }

    #[test]
    fn verify_flags_malformed_lines_without_aborting() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.jsonl");

        {
            let mut log = AuditLog::open(&log_path).unwrap();
            log.append(&sealed("t-1", AuditOutcome::Success)).unwrap();
        }
        let mut content = fs::read_to_string(&log_path).unwrap();
        content.push_str("{not json\n");
        fs::write(&log_path, content).unwrap();

        let report = AuditLog::verify(&log_path).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.tampered.len(), 1);
        assert_eq!(report.tampered[0].line, 2);
        assert_eq!(report.tampered[0].trace_id, None);
        assert!(report.tampered[0].problem.starts_with("malformed JSON"));
    }

    #[test]
    fn stripped_hash_is_reported() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.jsonl");
        let mut record = sealed("t-1", AuditOutcome::Success);
        record.integrity_hash = None;
        fs::write(&log_path, serde_json::to_string(&record).unwrap() + "\n").unwrap();

        let report = AuditLog::verify(&log_path).unwrap();
        assert_eq!(report.tampered[0].problem, "missing integrity hash");
    }
}
