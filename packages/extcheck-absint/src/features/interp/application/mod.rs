//! Exploration algorithms over interpreter states

pub mod explorer;
pub mod state_graph;
pub mod step;

pub use explorer::{iter_traces, ExploreConfig, TraceExplorer};
pub use state_graph::StateGraph;
