/*
 * extcheck-absint - Path-Sensitive Abstract Interpreter
 *
 * Feature-First Hexagonal Architecture:
 * - shared/   : Common models (Span, AnalysisError)
 * - features/ : Vertical slices (ir -> memory -> interp)
 *
 * The engine enumerates every feasible execution path through one compiled
 * function, maintaining a symbolic region/value store per path, and reports
 * predicted errors (NULL dereference, read from freed memory, violated
 * non-null contracts, collaborator-defined defects) on the traces that reach
 * them. Diagnostic rendering, IR production, and domain handler packs are
 * external collaborators.
 */

/// Shared models and utilities
pub mod shared;

/// Feature modules
pub mod features;

// Re-exports for the public API
pub use features::interp::{
    iter_traces, AnalysisCtx, CallHandler, CallSite, ExploreConfig, HandlerRegistry, Location,
    PredictedError, State, StateGraph, Trace, TraceExplorer, Transition,
};
pub use features::ir::{FunctionBuilder, FunctionIr};
pub use features::memory::{AbstractValue, DomainValue, RegionId, RegionStore};
pub use shared::models::{AnalysisError, Span};
