//! Dispatch contract for domain statement handlers
//!
//! A handler owns the semantics of calls to one callee (an allocator, a
//! releaser, an ownership primitive). It receives the pre-call state (already
//! past the non-null contract check) and returns the successor states with
//! their justifications, or any interrupt evaluation can raise: a predicted
//! error, a split request, or a fault.

use crate::features::interp::domain::{AnalysisCtx, Interrupt, State};
use crate::features::ir::domain::{CalleeDecl, Expr};
use crate::shared::models::Span;
use rustc_hash::FxHashMap;

/// View of one call statement, as seen by a handler
#[derive(Debug)]
pub struct CallSite<'a> {
    pub callee: &'a CalleeDecl,
    pub lhs: Option<&'a Expr>,
    pub args: &'a [Expr],
    pub span: Option<Span>,
}

pub trait CallHandler {
    /// Produce the successor states of this call: `(state, description)`
    /// pairs, each state advanced past the statement (or marked terminal)
    fn on_call(
        &self,
        state: &State,
        ctx: &mut AnalysisCtx<'_>,
        call: &CallSite<'_>,
    ) -> Result<Vec<(State, String)>, Interrupt>;
}

/// Per-callee handler registry
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: FxHashMap<String, Box<dyn CallHandler + Send + Sync>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        callee: impl Into<String>,
        handler: Box<dyn CallHandler + Send + Sync>,
    ) {
        self.handlers.insert(callee.into(), handler);
    }

    pub fn get(&self, callee: &str) -> Option<&(dyn CallHandler + Send + Sync)> {
        self.handlers.get(callee).map(|h| h.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("callees", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
