// sink.rs — Where sealed audit records go.
//
// Callers pass a sink in; nothing in this crate reaches for a global one.
// Every sink refuses records that have not been finalized.

use crate::error::AuditError;
use crate::log::AuditLog;
use crate::record::AuditRecord;

/// Accepts sealed audit records as append-only writes.
pub trait AuditSink: Send {
    /// Take ownership of a finalized record.
    fn record(&mut self, record: AuditRecord) -> Result<(), AuditError>;
}

impl AuditSink for AuditLog {
    fn record(&mut self, record: AuditRecord) -> Result<(), AuditError> {
        self.append(&record)
    }
}

/// Keeps records in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Vec<AuditRecord>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records received so far, oldest first.
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&mut self, record: AuditRecord) -> Result<(), AuditError> {
        if !record.is_finalized() {
            return Err(AuditError::NotFinalized {
                trace_id: record.trace_id,
            });
        }
        self.records.push(record);
        Ok(())
    }
}
