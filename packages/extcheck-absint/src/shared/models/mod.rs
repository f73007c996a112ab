//! Shared models used across features

pub mod error;
pub mod span;

pub use error::{AnalysisError, Result};
pub use span::Span;
