/// How the engine should proceed after one processor round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Success,
    /// Declined, but another attempt may succeed.
    Retry { reason: Option<String> },
    /// Declined with a reason that must never be retried.
    Terminal { reason: String },
}

impl Decision {
    /// Builds the decline decision for `reason`, terminal when it is listed in `non_transient`.
    pub fn declined(reason: Option<String>, non_transient: &[&str]) -> Self {
        match reason {
            Some(reason) if non_transient.contains(&reason.as_str()) => Self::Terminal { reason },
            reason => Self::Retry { reason },
        }
    }

    pub fn retry(&self) -> bool {
        matches!(self, Self::Retry { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Retry { reason } => reason.as_deref(),
            Self::Terminal { reason } => Some(reason),
        }
    }
}

/// Result of one network round trip, folded into the engine state and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub attempt: u32,
    pub status: u16,
    pub body: String,
    pub decision: Decision,
}
