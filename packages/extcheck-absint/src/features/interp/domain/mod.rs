//! Domain models for the path-sensitive interpreter
//!
//! - Location: a program point within the CFG
//! - State: the symbolic store at one program point
//! - Transition/Trace: explored edges and paths
//! - PredictedError/Interrupt: findings and internal control-flow signals
//! - Resources: the acquire/release ledger

pub mod ctx;
pub mod findings;
pub mod location;
pub mod resources;
pub mod state;
pub mod trace;

pub use ctx::AnalysisCtx;
pub use findings::{EvalResult, Interrupt, PredictedError, SplitRequest};
pub use location::Location;
pub use resources::{ResourceEvent, Resources};
pub use state::State;
pub use trace::{Trace, Transition};
