//! Engine fault types
//!
//! Faults mean "this function is not analyzable", and are kept strictly apart
//! from predicted-error findings: a finding terminates one explored path and
//! is attached to its trace, while a fault aborts the analysis of the whole
//! function. A fault must never be recorded in a trace's error slot.

use crate::shared::models::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Analysis fault: the function is not analyzable
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AnalysisError {
    /// Expression or statement shape the interpreter cannot model
    #[error("unsupported construct: {0}")]
    Unsupported(String),

    /// A state failed its self-check
    #[error("state invariant violated: {0}")]
    Invariant(String),

    /// The exploration budget was exhausted before all paths terminated
    #[error("exploration budget exceeded: {0}")]
    BudgetExceeded(String),

    /// Malformed input IR (dangling block/decl references, untagged edges)
    #[error("malformed IR: {0}")]
    MalformedIr(String),
}

impl AnalysisError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        AnalysisError::Unsupported(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        AnalysisError::Invariant(message.into())
    }

    pub fn budget_exceeded(message: impl Into<String>) -> Self {
        AnalysisError::BudgetExceeded(message.into())
    }

    pub fn malformed_ir(message: impl Into<String>) -> Self {
        AnalysisError::MalformedIr(message.into())
    }

    /// Append the source location to the message, when one is known
    pub fn with_span(self, span: Option<Span>) -> Self {
        let Some(span) = span else { return self };
        self.map_message(|m| format!("{} at {}", m, span))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Unsupported(_) => "unsupported",
            AnalysisError::Invariant(_) => "invariant",
            AnalysisError::BudgetExceeded(_) => "budget_exceeded",
            AnalysisError::MalformedIr(_) => "malformed_ir",
        }
    }

    fn map_message(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            AnalysisError::Unsupported(m) => AnalysisError::Unsupported(f(m)),
            AnalysisError::Invariant(m) => AnalysisError::Invariant(f(m)),
            AnalysisError::BudgetExceeded(m) => AnalysisError::BudgetExceeded(f(m)),
            AnalysisError::MalformedIr(m) => AnalysisError::MalformedIr(f(m)),
        }
    }
}

/// Result type alias for engine-level operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_display() {
        let err = AnalysisError::unsupported("nested address-of").with_span(Some(Span::new(42, 8)));
        let msg = err.to_string();
        assert!(msg.contains("unsupported"));
        assert!(msg.contains("nested address-of"));
        assert!(msg.contains("42:8"));
    }

    #[test]
    fn test_fault_without_span() {
        let err = AnalysisError::budget_exceeded("gave up after 4096 transitions");
        assert_eq!(
            err.to_string(),
            "exploration budget exceeded: gave up after 4096 transitions"
        );
        assert_eq!(err.kind(), "budget_exceeded");
    }

    #[test]
    fn test_with_span_none_is_identity() {
        let err = AnalysisError::invariant("dangling region handle");
        assert_eq!(err.clone().with_span(None), err);
    }
}
