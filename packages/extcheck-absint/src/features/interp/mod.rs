//! # Path-Sensitive Abstract Interpretation
//!
//! Walks the CFG of one compiled function and, for each feasible execution
//! path, maintains a symbolic memory model sufficient to prove or refute
//! reference-counting and NULL-pointer-dereference defects.
//!
//! Not a fixpoint engine: there is no widening or join across paths, and no
//! full points-to analysis. Precision at unresolved pointer values is kept by
//! forking the search into concrete alternatives rather than merging
//! abstract states.
//!
//! ## Usage
//! ```text
//! use extcheck_absint::features::interp::{TraceExplorer, ExploreConfig};
//!
//! let explorer = TraceExplorer::new()
//!     .with_handler("obj_new", Box::new(AllocCallHandler));
//!
//! for trace in explorer.explore(&fun)? {
//!     if let Some(err) = &trace.err {
//!         println!("{}", err);
//!     }
//! }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-exports for public API
pub use application::{iter_traces, ExploreConfig, StateGraph, TraceExplorer};
pub use domain::{
    AnalysisCtx, Interrupt, Location, PredictedError, ResourceEvent, Resources, SplitRequest,
    State, Trace, Transition,
};
pub use ports::{CallHandler, CallSite, HandlerRegistry};
