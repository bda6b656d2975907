use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::RwLock;

use crate::reports::{ReportError, ReportStore, StoredReport};

/// In-process report store holding at most `max_reports` entries.
pub struct MemoryReportStore {
    reports: RwLock<VecDeque<StoredReport>>,
    max_reports: usize,
}

impl MemoryReportStore {
    pub fn new(max_reports: usize) -> Self {
        Self {
            reports: RwLock::new(VecDeque::new()),
            max_reports: max_reports.max(1),
        }
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn save(&self, report: serde_json::Value) -> Result<StoredReport, ReportError> {
        let stored = StoredReport::new(report)?;
        let mut reports = self.reports.write().await;
        reports.push_front(stored.clone());
        reports.truncate(self.max_reports);
        tracing::debug!(report_id = %stored.id, total = reports.len(), "Stored security report");
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<StoredReport>, ReportError> {
        Ok(self.reports.read().await.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryReportStore::new(10);
        store.save(json!({ "target": "a" })).await.unwrap();
        store.save(json!({ "target": "b" })).await.unwrap();

        let reports = store.list().await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].report["target"], "b");
        assert_eq!(reports[1].report["target"], "a");
    }

    #[tokio::test]
    async fn test_drops_oldest_beyond_capacity() {
        let store = MemoryReportStore::new(2);
        for target in ["a", "b", "c"] {
            store.save(json!({ "target": target })).await.unwrap();
        }
        let targets: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.report["target"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(targets, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_rejects_non_object() {
        let store = MemoryReportStore::new(2);
        assert!(matches!(
            store.save(json!(["not", "an", "object"])).await,
            Err(ReportError::InvalidReport)
        ));
        assert!(store.list().await.unwrap().is_empty());
    }
}
