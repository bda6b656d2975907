//! Audit trail of inspected requests.

pub mod line;
pub mod ring;

pub use line::{AuditLine, ThreatStatus};
pub use ring::{AuditLog, AuditSnapshot};
