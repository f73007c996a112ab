//! Source location types
//!
//! Positions in the analyzed source, as reported by the host compiler's IR.
//! Statements may legitimately carry no span; diagnostics fall back to the
//! enclosing function's span in that case.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Span in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Create a zero span (0:0)
    pub fn zero() -> Self {
        Self::new(0, 0)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Render an optional span for diagnostics
pub fn display_opt(span: Option<Span>) -> String {
    match span {
        Some(s) => s.to_string(),
        None => "<unknown location>".to_string(),
    }
}
