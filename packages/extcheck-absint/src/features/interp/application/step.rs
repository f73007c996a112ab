//! Symbolic execution of one statement
//!
//! Computes the outgoing transitions of a state: one per CFG successor, or
//! several when a conditional's truth value is unresolved. Works on a clone
//! of the current state throughout; the input state is never mutated once it
//! is reachable from a transition.

use std::sync::Arc;

use tracing::trace;

use super::super::domain::{
    AnalysisCtx, EvalResult, Interrupt, Location, PredictedError, State, Transition,
};
use super::super::ports::{CallSite, HandlerRegistry};
use crate::features::ir::domain::{CmpOp, Statement};
use crate::features::memory::domain::AbstractValue;
use crate::shared::models::AnalysisError;

/// Outcome of deciding a conditional against the abstract operands
enum Decision {
    Known(bool),
    /// The comparison hinges on an unknown pointer vs NULL; fork instead of
    /// guessing
    SplitOn(AbstractValue),
    Unresolved,
}

fn decide(op: CmpOp, a: &AbstractValue, b: &AbstractValue) -> Decision {
    use AbstractValue::{Concrete, PointerTo, Unknown};
    match (a, b) {
        (Concrete { value: x, .. }, Concrete { value: y, .. }) => Decision::Known(op.eval(*x, *y)),
        // A pointer into a region is provably non-NULL
        (PointerTo { .. }, c @ Concrete { .. }) | (c @ Concrete { .. }, PointerTo { .. })
            if c.is_null_ptr() =>
        {
            match op {
                CmpOp::Eq => Decision::Known(false),
                CmpOp::Ne => Decision::Known(true),
                _ => Decision::Unresolved,
            }
        }
        (u @ Unknown { ty: Some(t), .. }, c @ Concrete { .. })
        | (c @ Concrete { .. }, u @ Unknown { ty: Some(t), .. })
            if t.is_pointer() && c.is_null_ptr() && matches!(op, CmpOp::Eq | CmpOp::Ne) =>
        {
            Decision::SplitOn(u.clone())
        }
        _ => Decision::Unresolved,
    }
}

/// Execute the statement at the state's location symbolically
pub fn transitions(
    state: &Arc<State>,
    ctx: &mut AnalysisCtx<'_>,
    handlers: &HandlerRegistry,
) -> EvalResult<Vec<Transition>> {
    let fun = ctx.fun;
    let cfg = &fun.cfg;
    trace!(loc = %state.loc, "computing transitions");

    let mut s = (**state).clone();
    s.from_split = false;

    let Some(stmt) = state.loc.stmt(cfg) else {
        // Past the end of the block: fall through to each successor
        let dests = state
            .loc
            .next_locs(cfg)
            .into_iter()
            .map(|l| (s.update_loc(l), "falling through".to_string()))
            .collect();
        return Ok(wrap(state, dests));
    };

    match stmt {
        Statement::Assign { lhs, rhs, span } => {
            s.assign(ctx, lhs, rhs, *span)?;
            s.advance_loc(cfg);
            Ok(wrap_one(state, s, stmt.describe()))
        }
        Statement::PointerPlus {
            lhs, base, offset, span,
        } => {
            let region = s.pointer_plus_region(ctx, base, offset, *span)?;
            let ty = s.expr_ty(ctx, lhs);
            let value = AbstractValue::PointerTo {
                ty,
                span: *span,
                region,
                from_split: false,
            };
            s.assign_value(ctx, lhs, value, *span)?;
            s.advance_loc(cfg);
            Ok(wrap_one(state, s, stmt.describe()))
        }
        Statement::Call {
            lhs, callee, args, span,
        } => {
            // Enforce the callee's documented non-null contract before
            // anything else; a concrete NULL argument is a finding
            for &idx in &callee.nonnull_params {
                let Some(arg) = args.get(idx) else { continue };
                let value = s.eval_rvalue(ctx, arg, *span)?;
                if value.is_null_ptr() {
                    return Err(Interrupt::Predicted(
                        PredictedError::InvalidlyNullParameter {
                            callee: callee.name.clone(),
                            param_index: idx + 1,
                            value,
                            span: *span,
                        },
                    ));
                }
            }

            let call = CallSite {
                callee,
                lhs: lhs.as_ref(),
                args,
                span: *span,
            };
            if let Some(handler) = handlers.get(&callee.name) {
                let dests = handler.on_call(&s, ctx, &call)?;
                return Ok(wrap(state, dests));
            }

            // No handler: the call produces an unknown of the return type
            if let Some(lhs) = lhs {
                let value = ctx.fresh_unknown(Some(callee.ret_ty.clone()), *span);
                s.assign_value(ctx, lhs, value, *span)?;
            }
            s.advance_loc(cfg);
            Ok(wrap_one(state, s, format!("calling {}", callee.name)))
        }
        Statement::Cond { op, lhs, rhs, span } => {
            let a = s.eval_rvalue(ctx, lhs, *span)?;
            let b = s.eval_rvalue(ctx, rhs, *span)?;
            let block = cfg.block(state.loc.block);
            let (true_target, false_target) = match (block.true_edge(), block.false_edge()) {
                (Some(t), Some(f)) => (t.target, f.target),
                _ => {
                    return Err(Interrupt::Fault(AnalysisError::malformed_ir(format!(
                        "conditional block {} lacks tagged edges",
                        block.id
                    ))))
                }
            };
            match decide(*op, &a, &b) {
                Decision::Known(truth) => {
                    let target = if truth { true_target } else { false_target };
                    let dest = s.update_loc(Location::block_start(target));
                    let desc = format!(
                        "taking {} path",
                        if truth { "true" } else { "false" }
                    );
                    Ok(wrap_one(state, dest, desc))
                }
                Decision::SplitOn(value) => Err(s.raise_split_value(ctx, &value, *span)),
                Decision::Unresolved => {
                    let dests = vec![
                        (
                            s.update_loc(Location::block_start(true_target)),
                            "taking true path".to_string(),
                        ),
                        (
                            s.update_loc(Location::block_start(false_target)),
                            "taking false path".to_string(),
                        ),
                    ];
                    Ok(wrap(state, dests))
                }
            }
        }
        Statement::Return { value, span } => {
            if let Some(expr) = value {
                let v = s.eval_rvalue(ctx, expr, *span)?;
                s.return_rvalue = Some(v);
            }
            s.has_returned = true;
            Ok(wrap_one(state, s, "returning"))
        }
    }
}

fn wrap(src: &Arc<State>, dests: Vec<(State, String)>) -> Vec<Transition> {
    dests
        .into_iter()
        .map(|(dest, desc)| Transition::new(src.clone(), Arc::new(dest), desc))
        .collect()
}

fn wrap_one(src: &Arc<State>, dest: State, desc: impl Into<String>) -> Vec<Transition> {
    vec![Transition::new(src.clone(), Arc::new(dest), desc.into())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir::domain::{CalleeDecl, Expr, Ty};
    use crate::features::ir::infrastructure::FunctionBuilder;

    fn start_state(fun: &crate::features::ir::domain::FunctionIr) -> (AnalysisCtx<'_>, Arc<State>) {
        let mut ctx = AnalysisCtx::new(fun);
        let mut state = State::new(Location::block_start(fun.cfg.entry));
        state.init_for_function(&mut ctx);
        (ctx, Arc::new(state))
    }

    #[test]
    fn test_assign_advances_and_writes() {
        let mut b = FunctionBuilder::new("f");
        let x = b.local("x", Ty::int());
        let bb = b.block();
        b.set_entry(bb);
        let x_var = b.var(x);
        b.push(
            bb,
            Statement::Assign {
                lhs: x_var.clone(),
                rhs: Expr::int_const(3, Ty::int()),
                span: None,
            },
        );
        let fun = b.finish().unwrap();
        let (mut ctx, state) = start_state(&fun);

        let ts = transitions(&state, &mut ctx, &HandlerRegistry::new()).unwrap();
        assert_eq!(ts.len(), 1);
        let dest = &ts[0].dest;
        assert_eq!(dest.loc.idx, 1);
        let region = *dest.region_for_var.get(&x).unwrap();
        assert_eq!(
            dest.value_for_region.get(&region),
            Some(&AbstractValue::concrete(Ty::int(), None, 3))
        );
        // Source state untouched
        let src_region = *state.region_for_var.get(&x).unwrap();
        assert!(matches!(
            state.value_for_region.get(&src_region),
            Some(AbstractValue::Uninitialized { .. })
        ));
    }

    #[test]
    fn test_concrete_cond_takes_single_edge() {
        let mut b = FunctionBuilder::new("f");
        let b0 = b.block();
        let b_true = b.block();
        let b_false = b.block();
        b.set_entry(b0);
        b.push(
            b0,
            Statement::Cond {
                op: CmpOp::Eq,
                lhs: Expr::int_const(1, Ty::int()),
                rhs: Expr::int_const(1, Ty::int()),
                span: None,
            },
        );
        b.branch(b0, b_true, b_false);
        let fun = b.finish().unwrap();
        let (mut ctx, state) = start_state(&fun);

        let ts = transitions(&state, &mut ctx, &HandlerRegistry::new()).unwrap();
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].dest.loc.block, b_true);
        assert_eq!(ts[0].desc, "taking true path");
    }

    #[test]
    fn test_unresolved_cond_forks_both_edges() {
        let mut b = FunctionBuilder::new("f");
        let n = b.param("n", Ty::int());
        let b0 = b.block();
        let b_true = b.block();
        let b_false = b.block();
        b.set_entry(b0);
        let n_var = b.var(n);
        b.push(
            b0,
            Statement::Cond {
                op: CmpOp::Lt,
                lhs: n_var,
                rhs: Expr::int_const(10, Ty::int()),
                span: None,
            },
        );
        b.branch(b0, b_true, b_false);
        let fun = b.finish().unwrap();
        let (mut ctx, state) = start_state(&fun);

        let ts = transitions(&state, &mut ctx, &HandlerRegistry::new()).unwrap();
        assert_eq!(ts.len(), 2);
        assert_eq!(ts[0].dest.loc.block, b_true);
        assert_eq!(ts[1].dest.loc.block, b_false);
    }

    #[test]
    fn test_null_arg_to_nonnull_callee_is_finding() {
        let mut b = FunctionBuilder::new("f");
        let bb = b.block();
        b.set_entry(bb);
        b.push(
            bb,
            Statement::Call {
                lhs: None,
                callee: CalleeDecl::new("do_visit", Ty::Void).with_nonnull_params([0]),
                args: vec![Expr::null_ptr(Ty::ptr(Ty::Void))],
                span: None,
            },
        );
        let fun = b.finish().unwrap();
        let (mut ctx, state) = start_state(&fun);

        match transitions(&state, &mut ctx, &HandlerRegistry::new()) {
            Err(Interrupt::Predicted(PredictedError::InvalidlyNullParameter {
                callee,
                param_index,
                ..
            })) => {
                assert_eq!(callee, "do_visit");
                assert_eq!(param_index, 1);
            }
            other => panic!("expected InvalidlyNullParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_unhandled_call_yields_unknown_result() {
        let mut b = FunctionBuilder::new("f");
        let x = b.local("x", Ty::int());
        let bb = b.block();
        b.set_entry(bb);
        let x_var = b.var(x);
        b.push(
            bb,
            Statement::Call {
                lhs: Some(x_var),
                callee: CalleeDecl::new("opaque", Ty::int()),
                args: vec![],
                span: None,
            },
        );
        let fun = b.finish().unwrap();
        let (mut ctx, state) = start_state(&fun);

        let ts = transitions(&state, &mut ctx, &HandlerRegistry::new()).unwrap();
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].desc, "calling opaque");
        let region = *ts[0].dest.region_for_var.get(&x).unwrap();
        assert!(matches!(
            ts[0].dest.value_for_region.get(&region),
            Some(AbstractValue::Unknown { .. })
        ));
    }

    #[test]
    fn test_return_sets_rvalue_and_flag() {
        let mut b = FunctionBuilder::new("f");
        b.set_ret_ty(Ty::int());
        let bb = b.block();
        b.set_entry(bb);
        b.push(
            bb,
            Statement::Return {
                value: Some(Expr::int_const(0, Ty::int())),
                span: None,
            },
        );
        let fun = b.finish().unwrap();
        let (mut ctx, state) = start_state(&fun);

        let ts = transitions(&state, &mut ctx, &HandlerRegistry::new()).unwrap();
        assert_eq!(ts.len(), 1);
        assert!(ts[0].dest.has_returned);
        assert_eq!(
            ts[0].dest.return_rvalue,
            Some(AbstractValue::concrete(Ty::int(), None, 0))
        );
    }
}
