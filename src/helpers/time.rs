use chrono::{SecondsFormat, Utc};
use tokio::time::Instant;

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Current UTC time as RFC 3339, e.g. `2025-01-01T00:00:00Z`
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
