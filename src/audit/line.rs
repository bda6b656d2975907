//! Audit line construction.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

use crate::security::RequestAction;

/// Classification recorded for an inspected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatStatus {
    Normal,
    IntrusionAttempt,
    DdosThreat,
}

impl ThreatStatus {
    /// Rate limiting outranks intrusion, which outranks normal traffic.
    pub fn from_signals(rate_limited: bool, intrusion: bool) -> Self {
        if rate_limited {
            ThreatStatus::DdosThreat
        } else if intrusion {
            ThreatStatus::IntrusionAttempt
        } else {
            ThreatStatus::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatStatus::Normal => "NORMAL",
            ThreatStatus::IntrusionAttempt => "INTRUSION_ATTEMPT",
            ThreatStatus::DdosThreat => "DDOS_THREAT",
        }
    }
}

impl fmt::Display for ThreatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inspected request, rendered as
/// `[ts] [LIVE_REAL_TIME] IP:ip | COUNTRY:c | ACTION:a | STATUS:s`.
#[derive(Debug, Clone)]
pub struct AuditLine {
    pub timestamp: DateTime<Utc>,
    pub client_ip: String,
    pub country: String,
    pub action: RequestAction,
    pub status: ThreatStatus,
}

impl fmt::Display for AuditLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [LIVE_REAL_TIME] IP:{} | COUNTRY:{} | ACTION:{} | STATUS:{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.client_ip,
            self.country,
            self.action,
            self.status
        )
    }
}
