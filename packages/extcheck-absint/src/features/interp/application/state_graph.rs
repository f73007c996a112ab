//! Flattened state graph
//!
//! The same reachability as trace enumeration, materialized as one directed
//! graph of every visited state, for callers that want random access and
//! predecessor lookup instead of a list of linear paths. Loop cutting
//! applies here too, so construction terminates on back edges.

use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::debug;

use super::explorer::{split_transitions, ExploreConfig};
use super::step;
use crate::features::interp::domain::{
    AnalysisCtx, Interrupt, Location, PredictedError, State,
};
use crate::features::interp::ports::HandlerRegistry;
use crate::features::ir::domain::FunctionIr;
use crate::shared::models::AnalysisError;

pub struct StateGraph {
    graph: DiGraph<Arc<State>, String>,
    entry: NodeIndex,
    /// Predicted errors, attached to the node that raised them
    errors: Vec<(NodeIndex, PredictedError)>,
}

impl StateGraph {
    /// Recursively gather every reachable state of the function
    pub fn build(
        fun: &FunctionIr,
        handlers: &HandlerRegistry,
        config: &ExploreConfig,
    ) -> Result<Self, AnalysisError> {
        fun.validate()?;
        let mut ctx = AnalysisCtx::new(fun);
        let mut initial = State::new(Location::block_start(fun.cfg.entry));
        initial.init_for_function(&mut ctx);

        let mut graph = DiGraph::new();
        let entry = graph.add_node(Arc::new(initial));
        let mut sg = Self {
            graph,
            entry,
            errors: Vec::new(),
        };
        let mut path: Vec<Location> = Vec::new();
        let mut spent = 0usize;
        sg.gather(&mut ctx, handlers, config, entry, &mut path, &mut spent)?;
        debug!(
            function = %fun.decl.name,
            states = sg.graph.node_count(),
            "state graph built"
        );
        Ok(sg)
    }

    fn gather(
        &mut self,
        ctx: &mut AnalysisCtx<'_>,
        handlers: &HandlerRegistry,
        config: &ExploreConfig,
        node: NodeIndex,
        path: &mut Vec<Location>,
        spent: &mut usize,
    ) -> Result<(), AnalysisError> {
        let cur = self.graph[node].clone();

        let transitions = match step::transitions(&cur, ctx, handlers) {
            Ok(ts) => ts,
            Err(Interrupt::Predicted(err)) => {
                let fun = ctx.fun;
                let err = err.with_span_if_missing(cur.loc.span(&fun.cfg).or(fun.span));
                let errstate = Arc::new((*cur).clone());
                let errnode = self.graph.add_node(errstate);
                self.graph.add_edge(node, errnode, err.to_string());
                self.errors.push((errnode, err));
                return Ok(());
            }
            Err(Interrupt::Split(req)) => split_transitions(&cur, ctx, &req),
            Err(Interrupt::Fault(fault)) => return Err(fault),
        };

        for transition in transitions {
            *spent += 1;
            if *spent > config.max_transitions {
                return Err(AnalysisError::budget_exceeded(format!(
                    "state graph of {} exceeded {} transitions",
                    ctx.fun.decl.name, config.max_transitions
                )));
            }
            let dest = transition.dest.clone();
            let destnode = self.graph.add_node(dest.clone());
            self.graph.add_edge(node, destnode, transition.desc.clone());

            if dest.has_returned || dest.not_returning {
                continue;
            }
            if !dest.from_split && path.contains(&dest.loc) {
                debug!(loc = %dest.loc, "loop detected; not descending");
                continue;
            }
            path.push(dest.loc);
            self.gather(ctx, handlers, config, destnode, path, spent)?;
            path.pop();
        }
        Ok(())
    }

    pub fn entry(&self) -> NodeIndex {
        self.entry
    }

    pub fn state(&self, node: NodeIndex) -> &Arc<State> {
        &self.graph[node]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn states(&self) -> impl Iterator<Item = &Arc<State>> {
        self.graph.node_weights()
    }

    pub fn errors(&self) -> &[(NodeIndex, PredictedError)] {
        &self.errors
    }

    /// The state this one was reached from, if any
    pub fn get_prev_state(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .next()
    }

    pub fn graph(&self) -> &DiGraph<Arc<State>, String> {
        &self.graph
    }
}
