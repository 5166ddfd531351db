#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NoOp,
    Created,
    Updated,
    Skipped,
    Failed,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::NoOp => write!(f, "noop"),
            Outcome::Created => write!(f, "created"),
            Outcome::Updated => write!(f, "updated"),
            Outcome::Skipped => write!(f, "skipped"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

/// What one reconcile invocation did, and why when it did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileResult {
    pub outcome: Outcome,
    pub reason: Option<String>,
}

impl ReconcileResult {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            reason: None,
        }
    }

    pub fn with_reason(outcome: Outcome, reason: impl Into<String>) -> Self {
        Self {
            outcome,
            reason: Some(reason.into()),
        }
    }

    pub fn failed(err: &impl std::fmt::Display) -> Self {
        Self::with_reason(Outcome::Failed, err.to_string())
    }
}

impl std::fmt::Display for ReconcileResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{} ({reason})", self.outcome),
            None => write!(f, "{}", self.outcome),
        }
    }
}
