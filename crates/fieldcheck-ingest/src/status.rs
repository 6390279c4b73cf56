//! Timeliness classification

use std::fmt;

use serde::Serialize;

/// Offsets at or above this many seconds count as early
pub const EARLY_THRESHOLD_SECONDS: i64 = 120;

/// How a service compared with its schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Timeliness {
    Late,
    OnTime,
    Early,
}

impl Timeliness {
    /// Wire name (`late`, `on-time`, `early`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeliness::Late => "late",
            Timeliness::OnTime => "on-time",
            Timeliness::Early => "early",
        }
    }
}

impl fmt::Display for Timeliness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a signed schedule offset in seconds.
///
/// Negative is late, `0..120` is on time, 120 and above is early.
pub fn classify(total_seconds: i64) -> Timeliness {
    if total_seconds < 0 {
        Timeliness::Late
    } else if total_seconds < EARLY_THRESHOLD_SECONDS {
        Timeliness::OnTime
    } else {
        Timeliness::Early
    }
}
