//! Custom error types for the test harness
//!
//! Provides structured error handling with context for the failure scenarios
//! a run can end in: a missed deadline, a failing webhook handler, or use of
//! the interception endpoint before setup.

use std::fmt;

/// Main error type for the harness
#[derive(Debug)]
pub enum HarnessError {
    /// The combined workload did not settle within the deadline
    Timeout {
        duration_ms: u64,
        pending: Vec<String>,
    },

    /// A registered webhook handler failed during delivery
    Handler {
        event: String,
        source: anyhow::Error,
    },

    /// The interception endpoint was used before `setup` ran
    NetworkDisabled,
}

impl HarnessError {
    /// Whether this error is a deadline expiry rather than a workload failure
    pub fn is_timeout(&self) -> bool {
        matches!(self, HarnessError::Timeout { .. })
    }
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::Timeout {
                duration_ms,
                pending,
            } => {
                write!(f, "Timed out in {} ms", duration_ms)?;

                if !pending.is_empty() {
                    write!(f, " expecting:")?;
                    for item in pending {
                        write!(f, "\n- {}", item.to_lowercase())?;
                    }
                }

                Ok(())
            }
            HarnessError::Handler { event, source } => {
                write!(f, "Webhook handler error for '{}': {}", event, source)
            }
            HarnessError::NetworkDisabled => {
                write!(f, "Interception endpoint not available: call setup() first")
            }
        }
    }
}

impl std::error::Error for HarnessError {}
