//! Transitions and traces
//!
//! A transition is one edge between states with a human-readable
//! justification; a trace is one explored path from function entry,
//! terminated by a return, a non-returning call, a predicted error, or a
//! detected loop.

use super::findings::PredictedError;
use super::location::Location;
use super::state::State;
use crate::features::ir::domain::Cfg;
use crate::features::memory::domain::AbstractValue;
use crate::shared::models::Span;
use std::sync::Arc;

/// Immutable edge between two states
#[derive(Debug, Clone)]
pub struct Transition {
    pub src: Arc<State>,
    pub dest: Arc<State>,
    pub desc: String,
}

impl Transition {
    pub fn new(src: Arc<State>, dest: Arc<State>, desc: impl Into<String>) -> Self {
        Self {
            src,
            dest,
            desc: desc.into(),
        }
    }
}

/// One explored execution path from function entry
///
/// States are retained for the lifetime of the trace so diagnostics can
/// replay the path. The entry state itself is not part of the sequence; the
/// first element is the destination of the first transition.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    pub states: Vec<Arc<State>>,
    pub transitions: Vec<Transition>,
    /// At most one terminal finding
    pub err: Option<PredictedError>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, transition: Transition) {
        self.states.push(transition.dest.clone());
        self.transitions.push(transition);
    }

    pub fn add_error(&mut self, err: PredictedError) {
        self.err = Some(err);
    }

    pub fn is_clean(&self) -> bool {
        self.err.is_none()
    }

    pub fn last_state(&self) -> Option<&Arc<State>> {
        self.states.last()
    }

    pub fn last_location(&self) -> Option<Location> {
        self.last_state().map(|s| s.loc)
    }

    /// Span of the statement the path ended at
    pub fn last_span(&self, cfg: &Cfg) -> Option<Span> {
        self.last_state().and_then(|s| s.loc.span(cfg))
    }

    /// Value returned along this path, when it returned
    pub fn return_value(&self) -> Option<&AbstractValue> {
        self.last_state().and_then(|s| s.return_rvalue.as_ref())
    }

    /// Is the tail state at a location this path has visited before?
    ///
    /// Deliberately conservative: any repeat cuts the path, so loop bodies
    /// are never explored past their first iteration. Two exemptions keep
    /// legitimate same-location revisits alive: the immediate product of a
    /// value split, and a non-returning tail.
    pub fn has_looped(&self) -> bool {
        let Some(end) = self.states.last() else {
            return false;
        };
        if end.from_split {
            return false;
        }
        if end.not_returning {
            return false;
        }
        self.states[..self.states.len() - 1]
            .iter()
            .any(|s| s.loc == end.loc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir::domain::BlockId;

    fn state_at(block: u32, idx: usize) -> Arc<State> {
        Arc::new(State::new(Location::new(BlockId(block), idx)))
    }

    fn chain(trace: &mut Trace, dest: Arc<State>) {
        let src = trace
            .last_state()
            .cloned()
            .unwrap_or_else(|| state_at(0, 0));
        trace.add(Transition::new(src, dest, "step"));
    }

    #[test]
    fn test_has_looped_on_repeat() {
        let mut trace = Trace::new();
        chain(&mut trace, state_at(1, 0));
        chain(&mut trace, state_at(1, 1));
        assert!(!trace.has_looped());
        chain(&mut trace, state_at(1, 0));
        assert!(trace.has_looped());
    }

    #[test]
    fn test_split_product_exempt() {
        let mut trace = Trace::new();
        chain(&mut trace, state_at(1, 0));
        let mut split = State::new(Location::new(BlockId(1), 0));
        split.from_split = true;
        chain(&mut trace, Arc::new(split));
        assert!(!trace.has_looped());
    }

    #[test]
    fn test_not_returning_exempt() {
        let mut trace = Trace::new();
        chain(&mut trace, state_at(1, 0));
        let mut exiting = State::new(Location::new(BlockId(1), 0));
        exiting.not_returning = true;
        chain(&mut trace, Arc::new(exiting));
        assert!(!trace.has_looped());
    }

    #[test]
    fn test_empty_trace_has_not_looped() {
        assert!(!Trace::new().has_looped());
    }
}
