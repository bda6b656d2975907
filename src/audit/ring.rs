//! Bounded in-memory audit log.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::observability::metrics;

/// Read view of the audit log, as served by the live-logs endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AuditSnapshot {
    pub logs: Vec<String>,
    pub total: usize,
    pub timestamp: String,
}

/// FIFO buffer keeping the most recent `capacity` lines.
pub struct AuditLog {
    lines: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append a line, evicting the oldest ones beyond capacity.
    pub fn append(&self, line: impl Into<String>) {
        let len = {
            let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
            lines.push_back(line.into());
            while lines.len() > self.capacity {
                lines.pop_front();
            }
            lines.len()
        };
        metrics::record_audit_size(len);
    }

    /// Copy of the current buffer, oldest first.
    pub fn snapshot(&self) -> AuditSnapshot {
        let logs: Vec<String> = self
            .lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        AuditSnapshot {
            total: logs.len(),
            logs,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
