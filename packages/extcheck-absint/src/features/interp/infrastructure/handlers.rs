//! Reference call handlers
//!
//! Minimal handlers exercising the dispatch contract: an allocator whose
//! result must be NULL-checked, a releaser that frees the pointee, and a
//! non-returning call. Real deployments register collaborator handlers with
//! richer semantics; these are enough to drive the engine's deallocation,
//! resource-ledger, and no-return paths.

use crate::features::interp::domain::{
    AnalysisCtx, Interrupt, PredictedError, ResourceEvent, State,
};
use crate::features::interp::ports::{CallHandler, CallSite};
use crate::features::memory::domain::AbstractValue;
use crate::shared::models::AnalysisError;

/// Models a malloc-like callee: on success the result points at a fresh heap
/// region and the resource is acquired; on failure the result is NULL. Both
/// worlds are explored.
#[derive(Debug, Default)]
pub struct AllocCallHandler;

impl CallHandler for AllocCallHandler {
    fn on_call(
        &self,
        state: &State,
        ctx: &mut AnalysisCtx<'_>,
        call: &CallSite<'_>,
    ) -> Result<Vec<(State, String)>, Interrupt> {
        let fun = ctx.fun;
        let cfg = &fun.cfg;
        let span = call.span;
        let ret_ty = call.callee.ret_ty.clone();

        let mut ok = state.clone();
        let region =
            ctx.make_heap_region(format!("memory allocated by {}", call.callee.name), span);
        let resource = ctx.regions.name(region).to_string();
        ok.resources.acquire(ResourceEvent::new(resource, span));
        if let Some(lhs) = call.lhs {
            let value = AbstractValue::PointerTo {
                ty: Some(ret_ty.clone()),
                span,
                region,
                from_split: false,
            };
            ok.assign_value(ctx, lhs, value, span)?;
        }
        ok.advance_loc(cfg);

        let mut fail = state.clone();
        if let Some(lhs) = call.lhs {
            fail.assign_value(ctx, lhs, AbstractValue::concrete(ret_ty, span, 0), span)?;
        }
        fail.advance_loc(cfg);

        Ok(vec![
            (ok, format!("when {} succeeds", call.callee.name)),
            (fail, format!("when {} fails", call.callee.name)),
        ])
    }
}

/// Models a free-like callee: marks the pointee deallocated and records the
/// release. Releasing NULL is a no-op; releasing an unresolved pointer forks
/// the search; releasing twice is a finding.
#[derive(Debug, Default)]
pub struct ReleaseCallHandler;

impl CallHandler for ReleaseCallHandler {
    fn on_call(
        &self,
        state: &State,
        ctx: &mut AnalysisCtx<'_>,
        call: &CallSite<'_>,
    ) -> Result<Vec<(State, String)>, Interrupt> {
        let fun = ctx.fun;
        let cfg = &fun.cfg;
        let span = call.span;
        let Some(arg) = call.args.first() else {
            return Err(Interrupt::Fault(
                AnalysisError::unsupported(format!(
                    "{} called without an argument to release",
                    call.callee.name
                ))
                .with_span(span),
            ));
        };

        let mut s = state.clone();
        let ptr = s.eval_rvalue(ctx, arg, span)?;
        match ptr {
            AbstractValue::PointerTo { region, .. } => {
                let resource = ctx.regions.name(region).to_string();
                if matches!(
                    s.value_for_region.get(&region),
                    Some(AbstractValue::Deallocated { .. })
                ) {
                    return Err(Interrupt::Predicted(PredictedError::Domain {
                        description: format!("double release of {}", resource),
                        span,
                    }));
                }
                s.value_for_region
                    .insert(region, AbstractValue::Deallocated { span });
                s.resources.release(ResourceEvent::new(resource, span));
                s.advance_loc(cfg);
                Ok(vec![(s, format!("releasing via {}", call.callee.name))])
            }
            ref v if v.is_null_ptr() => {
                s.advance_loc(cfg);
                Ok(vec![(
                    s,
                    format!("{} of NULL is a no-op", call.callee.name),
                )])
            }
            value @ AbstractValue::Unknown { .. } => {
                Err(s.raise_split_value(ctx, &value, span))
            }
            other => Err(Interrupt::Fault(
                AnalysisError::unsupported(format!(
                    "{} applied to {}",
                    call.callee.name, other
                ))
                .with_span(span),
            )),
        }
    }
}

/// Models exit/abort: the call never returns, terminating the path cleanly
#[derive(Debug, Default)]
pub struct NoReturnCallHandler;

impl CallHandler for NoReturnCallHandler {
    fn on_call(
        &self,
        state: &State,
        _ctx: &mut AnalysisCtx<'_>,
        call: &CallSite<'_>,
    ) -> Result<Vec<(State, String)>, Interrupt> {
        let mut s = state.clone();
        s.not_returning = true;
        Ok(vec![(
            s,
            format!("calling {} (does not return)", call.callee.name),
        )])
    }
}
