//! Predicted errors and internal control-flow signals
//!
//! A predicted error is an analysis finding: a defect proven reachable on
//! some path. It terminates that path only. The `Interrupt` type is the
//! discriminated result threaded out of evaluation and stepping; callers
//! match exhaustively instead of catching exceptions. Split requests and
//! missing-value defaults never escape the engine; faults abort the whole
//! function's analysis.

use crate::features::ir::domain::Expr;
use crate::features::memory::domain::AbstractValue;
use crate::shared::models::{span, AnalysisError, Span};
use std::fmt;

/// A defect the analysis proved reachable on the current path
#[derive(Debug, Clone, PartialEq)]
pub enum PredictedError {
    /// Dereferencing a NULL pointer
    NullPtrDereference {
        expr: Expr,
        ptr: AbstractValue,
        /// True when no speculative split precedes the error: NULL is the
        /// only possibility, not one of several forked worlds
        definite: bool,
        span: Option<Span>,
    },
    /// Reading storage that has been freed
    ReadFromDeallocatedMemory {
        value: AbstractValue,
        span: Option<Span>,
    },
    /// Passing NULL for a parameter documented as never-NULL
    InvalidlyNullParameter {
        callee: String,
        /// 1-based
        param_index: usize,
        value: AbstractValue,
        span: Option<Span>,
    },
    /// Raised by a collaborator statement handler
    Domain {
        description: String,
        span: Option<Span>,
    },
}

impl PredictedError {
    pub fn kind(&self) -> &'static str {
        match self {
            PredictedError::NullPtrDereference { .. } => "null-ptr-dereference",
            PredictedError::ReadFromDeallocatedMemory { .. } => "read-from-deallocated",
            PredictedError::InvalidlyNullParameter { .. } => "invalidly-null-parameter",
            PredictedError::Domain { .. } => "domain",
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            PredictedError::NullPtrDereference { span, .. }
            | PredictedError::ReadFromDeallocatedMemory { span, .. }
            | PredictedError::InvalidlyNullParameter { span, .. }
            | PredictedError::Domain { span, .. } => *span,
        }
    }

    /// Stamp the triggering statement's span when the raise site had none
    pub fn with_span_if_missing(mut self, fallback: Option<Span>) -> Self {
        let slot = match &mut self {
            PredictedError::NullPtrDereference { span, .. }
            | PredictedError::ReadFromDeallocatedMemory { span, .. }
            | PredictedError::InvalidlyNullParameter { span, .. }
            | PredictedError::Domain { span, .. } => span,
        };
        if slot.is_none() {
            *slot = fallback;
        }
        self
    }
}

impl fmt::Display for PredictedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictedError::NullPtrDereference {
                expr,
                definite,
                span: at,
                ..
            } => {
                if *definite {
                    write!(f, "dereferencing NULL ({}) at {}", expr, span::display_opt(*at))
                } else {
                    write!(
                        f,
                        "possibly dereferencing NULL ({}) at {}",
                        expr,
                        span::display_opt(*at)
                    )
                }
            }
            PredictedError::ReadFromDeallocatedMemory { value, span: at } => write!(
                f,
                "reading from deallocated memory at {}: {}",
                span::display_opt(*at),
                value
            ),
            PredictedError::InvalidlyNullParameter {
                callee,
                param_index,
                value,
                ..
            } => write!(
                f,
                "{} can be called with NULL as parameter {}; {}",
                callee, param_index, value
            ),
            PredictedError::Domain { description, span: at } => {
                write!(f, "{} at {}", description, span::display_opt(*at))
            }
        }
    }
}

/// Request to fork the search over the concrete alternatives of an
/// ambiguous value
#[derive(Debug, Clone)]
pub struct SplitRequest {
    /// The ambiguous value (identity matters: its `ValueId` is what gets
    /// substituted across the store)
    pub value: AbstractValue,
    /// Alternatives to decompose it into, already marked `from_split`
    pub alternatives: Vec<AbstractValue>,
}

/// Discriminated result of evaluation/stepping
#[derive(Debug)]
pub enum Interrupt {
    /// Tier 1: an analysis finding; closes the current path
    Predicted(PredictedError),
    /// Tier 2: fork the search; handled entirely inside the engine
    Split(SplitRequest),
    /// Tier 3: implementation limitation; the function is not analyzable
    Fault(AnalysisError),
}

impl From<AnalysisError> for Interrupt {
    fn from(err: AnalysisError) -> Self {
        Interrupt::Fault(err)
    }
}

pub type EvalResult<T> = Result<T, Interrupt>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir::domain::Ty;

    #[test]
    fn test_null_deref_message() {
        let err = PredictedError::NullPtrDereference {
            expr: Expr::deref(
                Expr::Var {
                    decl: crate::features::ir::domain::DeclId(0),
                    name: "p".to_string(),
                },
                Ty::int(),
            ),
            ptr: AbstractValue::concrete(Ty::ptr(Ty::int()), None, 0),
            definite: true,
            span: Some(Span::new(4, 2)),
        };
        assert_eq!(err.to_string(), "dereferencing NULL (*p) at 4:2");

        let possible = match err {
            PredictedError::NullPtrDereference { expr, ptr, span, .. } => {
                PredictedError::NullPtrDereference {
                    expr,
                    ptr,
                    definite: false,
                    span,
                }
            }
            _ => unreachable!(),
        };
        assert!(possible.to_string().starts_with("possibly dereferencing"));
    }

    #[test]
    fn test_span_stamping() {
        let err = PredictedError::Domain {
            description: "released a borrowed reference".to_string(),
            span: None,
        };
        let stamped = err.with_span_if_missing(Some(Span::new(9, 0)));
        assert_eq!(stamped.span(), Some(Span::new(9, 0)));
        // An existing span wins
        let kept = stamped.with_span_if_missing(Some(Span::new(1, 1)));
        assert_eq!(kept.span(), Some(Span::new(9, 0)));
    }

    #[test]
    fn test_invalid_null_param_message() {
        let err = PredictedError::InvalidlyNullParameter {
            callee: "do_visit".to_string(),
            param_index: 2,
            value: AbstractValue::concrete(Ty::ptr(Ty::Void), None, 0),
            span: None,
        };
        assert_eq!(
            err.to_string(),
            "do_visit can be called with NULL as parameter 2; (void *)0"
        );
    }
}
