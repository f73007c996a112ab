/*
 * Trace exploration
 *
 * Depth-first enumeration of every finite, non-looping execution path
 * through one function.
 *
 * # Algorithm
 * - Terminal states (returned / not returning) close the path as a Trace
 * - A repeated Location within one path cuts it (discarded as incomplete),
 *   guaranteeing termination on back edges; split products are exempt
 * - A predicted error closes the path as an errored Trace
 * - A split request forks the state into one sibling per alternative, each
 *   with the ambiguous value substituted throughout the store
 *
 * Exploration order is depth-first in successor order; it affects only the
 * order traces are enumerated in, never their contents.
 */

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::step;
use crate::features::interp::domain::{
    AnalysisCtx, Interrupt, Location, SplitRequest, State, Trace, Transition,
};
use crate::features::interp::ports::{CallHandler, HandlerRegistry};
use crate::features::ir::domain::FunctionIr;
use crate::features::memory::domain::RegionId;
use crate::shared::models::AnalysisError;

/// Exploration limits and toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploreConfig {
    /// Hard ceiling on explored transitions; pathologically branchy
    /// functions without back edges are not otherwise bounded
    pub max_transitions: usize,

    /// Run the state self-check after every transition
    pub verify_states: bool,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            max_transitions: 16_384,
            verify_states: true,
        }
    }
}

/// Enumerates all traces through a function
#[derive(Debug, Default)]
pub struct TraceExplorer {
    config: ExploreConfig,
    handlers: HandlerRegistry,
}

impl TraceExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ExploreConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a statement handler for calls to the named function
    pub fn with_handler(
        mut self,
        callee: impl Into<String>,
        handler: Box<dyn CallHandler + Send + Sync>,
    ) -> Self {
        self.handlers.register(callee, handler);
        self
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Traverse the tree of program states, returning every complete Trace
    pub fn explore(&self, fun: &FunctionIr) -> Result<Vec<Trace>, AnalysisError> {
        fun.validate()?;
        let mut ctx = AnalysisCtx::new(fun);
        let mut initial = State::new(Location::block_start(fun.cfg.entry));
        initial.init_for_function(&mut ctx);
        if self.config.verify_states {
            initial.verify(&ctx)?;
        }

        let mut traces = Vec::new();
        let mut spent = 0usize;
        self.walk(&mut ctx, Trace::new(), Arc::new(initial), &mut spent, &mut traces)?;
        debug!(
            function = %fun.decl.name,
            traces = traces.len(),
            transitions = spent,
            "exploration finished"
        );
        Ok(traces)
    }

    fn walk(
        &self,
        ctx: &mut AnalysisCtx<'_>,
        prefix: Trace,
        cur: Arc<State>,
        spent: &mut usize,
        out: &mut Vec<Trace>,
    ) -> Result<(), AnalysisError> {
        if !prefix.states.is_empty() {
            if cur.has_returned || cur.not_returning {
                out.push(prefix);
                return Ok(());
            }
            if prefix.has_looped() {
                // Incomplete path; do not emit it
                debug!(loc = %cur.loc, "loop detected; cutting path");
                return Ok(());
            }
        }

        let transitions = match step::transitions(&cur, ctx, &self.handlers) {
            Ok(ts) => ts,
            Err(Interrupt::Predicted(err)) => {
                let fun = ctx.fun;
                let err = err.with_span_if_missing(cur.loc.span(&fun.cfg).or(fun.span));
                debug!(%err, "path closed with predicted error");
                let mut errored = prefix;
                errored.add_error(err);
                out.push(errored);
                return Ok(());
            }
            Err(Interrupt::Split(req)) => split_transitions(&cur, ctx, &req),
            Err(Interrupt::Fault(fault)) => return Err(fault),
        };

        if transitions.is_empty() {
            out.push(prefix);
            return Ok(());
        }

        for transition in transitions {
            *spent += 1;
            if *spent > self.config.max_transitions {
                return Err(AnalysisError::budget_exceeded(format!(
                    "exploration of {} exceeded {} transitions",
                    ctx.fun.decl.name, self.config.max_transitions
                )));
            }
            if self.config.verify_states {
                transition.dest.verify(ctx)?;
            }
            let mut next = prefix.clone();
            next.add(transition.clone());
            self.walk(ctx, next, transition.dest.clone(), spent, out)?;
        }
        Ok(())
    }
}

/// Traverse with default configuration and no handlers
pub fn iter_traces(fun: &FunctionIr) -> Result<Vec<Trace>, AnalysisError> {
    TraceExplorer::new().explore(fun)
}

/// Materialize one sibling per alternative of a split request
///
/// Each sibling is a full copy of the current store with every slot holding
/// the ambiguous value replaced by the alternative, and is marked as
/// split-derived: exempt from loop detection, and any NULL-dereference it
/// reaches is "possible" rather than "definite".
pub(crate) fn split_transitions(
    cur: &Arc<State>,
    ctx: &AnalysisCtx<'_>,
    req: &SplitRequest,
) -> Vec<Transition> {
    req.alternatives
        .iter()
        .map(|alt| {
            let mut sibling = (**cur).clone();
            sibling.from_split = true;
            let slots: Vec<RegionId> = sibling
                .value_for_region
                .iter()
                .filter(|(_, v)| v.same_identity(&req.value))
                .map(|(r, _)| *r)
                .collect();
            for region in slots {
                sibling.value_for_region.insert(region, alt.clone());
            }
            let desc = format!(
                "treating {} as {}",
                req.value,
                alt.display_with(&ctx.regions)
            );
            Transition::new(cur.clone(), Arc::new(sibling), desc)
        })
        .collect()
}
