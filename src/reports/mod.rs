//! Security report storage.
//!
//! Reports are opaque JSON documents produced by the dashboard's scanners.
//! The store is a collaborator behind [`ReportStore`]; the default backend
//! keeps them in memory.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryReportStore;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report must be a JSON object")]
    InvalidReport,
    #[error("report backend unavailable: {0}")]
    Backend(String),
}

/// A persisted report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub report: serde_json::Value,
}

impl StoredReport {
    pub fn new(report: serde_json::Value) -> Result<Self, ReportError> {
        if !report.is_object() {
            return Err(ReportError::InvalidReport);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            report,
        })
    }
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist a report and return the stored record.
    async fn save(&self, report: serde_json::Value) -> Result<StoredReport, ReportError>;

    /// All stored reports, newest first.
    async fn list(&self) -> Result<Vec<StoredReport>, ReportError>;
}
