//! Symbolic state for one program point
//!
//! A `State` is a Location plus the symbolic store: which region each
//! variable names, and what is known about each region's content. The store
//! maps are persistent (structurally shared), so the copy-on-branch
//! discipline — every state-advancing operation clones the predecessor and
//! mutates only the clone — costs O(log n) per branch instead of a deep copy.
//!
//! Evaluation materializes regions and values on demand. Anything it cannot
//! model is reported as a fault, never silently approximated.

use im::OrdMap;
use tracing::trace;

use super::ctx::AnalysisCtx;
use super::findings::{EvalResult, Interrupt, PredictedError, SplitRequest};
use super::location::Location;
use super::resources::Resources;
use crate::features::ir::domain::{Cfg, DeclId, Expr, StorageClass, Ty};
use crate::features::memory::domain::{AbstractValue, RegionId, RegionKind, RegionStore};
use crate::shared::models::{AnalysisError, Span};

#[derive(Debug, Clone)]
pub struct State {
    pub loc: Location,
    /// Which region each declaration's storage occupies
    pub region_for_var: OrdMap<DeclId, RegionId>,
    /// What is known about each region's content
    pub value_for_region: OrdMap<RegionId, AbstractValue>,
    pub return_rvalue: Option<AbstractValue>,
    pub has_returned: bool,
    pub not_returning: bool,
    /// True only on the immediate product of a speculative split; cleared
    /// when the state advances. Exempts the state from loop detection.
    pub from_split: bool,
    pub resources: Resources,
}

impl State {
    pub fn new(loc: Location) -> Self {
        Self {
            loc,
            region_for_var: OrdMap::new(),
            value_for_region: OrdMap::new(),
            return_rvalue: None,
            has_returned: false,
            not_returning: false,
            from_split: false,
            resources: Resources::new(),
        }
    }

    /// Seed the entry state: a stack frame under a fresh root, parameters
    /// with their declared contracts, locals uninitialized
    ///
    /// A parameter documented never-NULL starts as a pointer into a fresh
    /// unconstrained region; the documented contract is assumed here, and
    /// violations surface separately at call sites that pass NULL. All other
    /// parameters start unknown.
    pub fn init_for_function(&mut self, ctx: &mut AnalysisCtx<'_>) {
        let fun = ctx.fun;
        let root = ctx.regions.root();
        let stack = ctx
            .regions
            .stack(format!("stack for {}", fun.decl.name), Some(root));

        for (idx, &param_id) in fun.decl.params.iter().enumerate() {
            let param = fun.decl(param_id);
            let region = ctx
                .regions
                .stack(format!("region for {}", param.name), Some(stack));
            self.region_for_var.insert(param_id, region);
            if fun.decl.is_nonnull_param(idx) {
                let target = ctx
                    .regions
                    .stack(format!("region-for-arg-{}", param.name), None);
                self.value_for_region.insert(
                    region,
                    AbstractValue::PointerTo {
                        ty: Some(param.ty.clone()),
                        span: param.span,
                        region: target,
                        from_split: false,
                    },
                );
            } else {
                let value = ctx.fresh_unknown(Some(param.ty.clone()), param.span);
                self.value_for_region.insert(region, value);
            }
        }

        for local in fun.locals() {
            let region = ctx
                .regions
                .stack(format!("region for {}", local.name), Some(stack));
            self.region_for_var.insert(local.id, region);
            self.value_for_region.insert(
                region,
                AbstractValue::Uninitialized {
                    ty: Some(local.ty.clone()),
                    span: fun.span,
                },
            );
        }
    }

    /// Self-check: every handle the store mentions must be live in the arena
    pub fn verify(&self, ctx: &AnalysisCtx<'_>) -> Result<(), AnalysisError> {
        for (decl, region) in self.region_for_var.iter() {
            if !ctx.regions.contains(*region) {
                return Err(AnalysisError::invariant(format!(
                    "variable {:?} maps to dead region {}",
                    ctx.fun.decl(*decl).name,
                    region
                )));
            }
        }
        for (region, value) in self.value_for_region.iter() {
            if !ctx.regions.contains(*region) {
                return Err(AnalysisError::invariant(format!(
                    "store entry for dead region {}",
                    region
                )));
            }
            if let AbstractValue::PointerTo { region: target, .. } = value {
                if !ctx.regions.contains(*target) {
                    return Err(AnalysisError::invariant(format!(
                        "pointer in {} aims at dead region {}",
                        region, target
                    )));
                }
            }
        }
        Ok(())
    }

    /// Region holding the given variable's storage
    ///
    /// Locals and parameters are seeded at entry, so a miss here is a global:
    /// its region is materialized and recorded on first reference.
    pub fn var_region(&mut self, ctx: &mut AnalysisCtx<'_>, decl: DeclId) -> RegionId {
        if let Some(&region) = self.region_for_var.get(&decl) {
            return region;
        }
        let fun = ctx.fun;
        let d = fun.decl(decl);
        if d.storage != StorageClass::Global {
            trace!(name = %d.name, "unseeded non-global treated as global storage");
        }
        let region = ctx.regions.global(decl, &d.name);
        self.region_for_var.insert(decl, region);
        region
    }

    /// Resolve an expression to the region it designates
    pub fn eval_lvalue(
        &mut self,
        ctx: &mut AnalysisCtx<'_>,
        expr: &Expr,
        span: Option<Span>,
    ) -> EvalResult<RegionId> {
        trace!(%expr, "eval_lvalue");
        match expr {
            Expr::Var { decl, .. } => Ok(self.var_region(ctx, *decl)),
            Expr::Index { base, index, .. } => self.element_region(ctx, base, index, span),
            Expr::Field { .. } => self.field_region(ctx, expr, span),
            Expr::StrConst { text } => Ok(ctx.regions.string_constant(text)),
            Expr::Deref { operand, .. } => {
                // Write through a pointer
                let dest_ptr = self.eval_rvalue(ctx, operand, span)?;
                self.raise_any_null_ptr_deref(expr, &dest_ptr, span)?;
                match dest_ptr {
                    AbstractValue::Unknown { .. } => {
                        Err(self.raise_split_value(ctx, &dest_ptr, span))
                    }
                    AbstractValue::PointerTo { region, .. } => Ok(region),
                    other => Err(Interrupt::Fault(
                        AnalysisError::unsupported(format!(
                            "dereference of {} in {}",
                            other, expr
                        ))
                        .with_span(span),
                    )),
                }
            }
            other => Err(Interrupt::Fault(
                AnalysisError::unsupported(format!("{} is not an lvalue", other)).with_span(span),
            )),
        }
    }

    /// Evaluate an expression to the abstract value it currently holds
    pub fn eval_rvalue(
        &mut self,
        ctx: &mut AnalysisCtx<'_>,
        expr: &Expr,
        span: Option<Span>,
    ) -> EvalResult<AbstractValue> {
        trace!(%expr, "eval_rvalue");
        match expr {
            Expr::IntConst { value, ty } => {
                Ok(AbstractValue::concrete(ty.clone(), span, *value))
            }
            Expr::Var { decl, .. } => {
                let region = self.var_region(ctx, *decl);
                let ty = ctx.fun.decl(*decl).ty.clone();
                self.load(ctx, region, Some(ty), span)
            }
            Expr::Field { ty, .. } => {
                let region = self.field_region(ctx, expr, span)?;
                self.load(ctx, region, Some(ty.clone()), span)
            }
            Expr::AddrOf { operand, ty } => {
                let lvalue = self.eval_lvalue(ctx, operand, span)?;
                Ok(AbstractValue::PointerTo {
                    ty: Some(ty.clone()),
                    span,
                    region: lvalue,
                    from_split: false,
                })
            }
            Expr::Index { ty, .. } => {
                let lvalue = self.eval_lvalue(ctx, expr, span)?;
                self.load(ctx, lvalue, Some(ty.clone()), span)
            }
            Expr::Deref { operand, ty } => {
                let opvalue = self.eval_rvalue(ctx, operand, span)?;
                self.raise_any_null_ptr_deref(expr, &opvalue, span)?;
                match opvalue {
                    AbstractValue::Unknown { .. } => {
                        Err(self.raise_split_value(ctx, &opvalue, span))
                    }
                    AbstractValue::PointerTo { region, .. } => {
                        self.load(ctx, region, Some(ty.clone()), span)
                    }
                    other => Err(Interrupt::Fault(
                        AnalysisError::unsupported(format!(
                            "dereference of {} in {}",
                            other, expr
                        ))
                        .with_span(span),
                    )),
                }
            }
            Expr::StrConst { .. } => Err(Interrupt::Fault(
                AnalysisError::unsupported("string constant outside address-of context")
                    .with_span(span),
            )),
        }
    }

    /// Evaluate both sides and write the value into the destination region.
    /// Last write wins; there is no merging.
    pub fn assign(
        &mut self,
        ctx: &mut AnalysisCtx<'_>,
        lhs: &Expr,
        rhs: &Expr,
        span: Option<Span>,
    ) -> EvalResult<()> {
        trace!(%lhs, %rhs, "assign");
        let dest_region = self.eval_lvalue(ctx, lhs, span)?;
        let value = self.eval_rvalue(ctx, rhs, span)?;
        self.value_for_region.insert(dest_region, value);
        Ok(())
    }

    /// Write an already-computed value into the destination lvalue
    pub fn assign_value(
        &mut self,
        ctx: &mut AnalysisCtx<'_>,
        lhs: &Expr,
        value: AbstractValue,
        span: Option<Span>,
    ) -> EvalResult<()> {
        let dest_region = self.eval_lvalue(ctx, lhs, span)?;
        self.value_for_region.insert(dest_region, value);
        Ok(())
    }

    /// Nearest recorded value for the region, walking ancestors
    fn lookup_store(&self, regions: &RegionStore, region: RegionId) -> Option<AbstractValue> {
        let mut cur = Some(region);
        while let Some(r) = cur {
            if let Some(v) = self.value_for_region.get(&r) {
                return Some(v.clone());
            }
            cur = regions.parent(r);
        }
        None
    }

    /// Value stored for a region, materializing a default on a miss
    ///
    /// The first observation of a global records an unknown scoped to its
    /// declaration, so subsequent reads stay consistent. Misses elsewhere
    /// default to a transient unknown that is not recorded: an uninitialized
    /// read must not teach the store a value for an address never written.
    pub fn get_store(
        &mut self,
        ctx: &mut AnalysisCtx<'_>,
        region: RegionId,
        ty: Option<Ty>,
        span: Option<Span>,
    ) -> AbstractValue {
        if let Some(value) = self.lookup_store(&ctx.regions, region) {
            return value;
        }
        let kind = ctx.regions.kind(region).clone();
        if let RegionKind::Global { decl } = kind {
            let fun = ctx.fun;
            let d = fun.decl(decl);
            let (global_ty, global_span) = (d.ty.clone(), d.span);
            let value = ctx.fresh_unknown(Some(global_ty), global_span);
            trace!(global = %d.name, %value, "first observation of global");
            self.value_for_region.insert(region, value.clone());
            return value;
        }
        ctx.fresh_unknown(ty, span)
    }

    /// `get_store` plus the freed-storage check: any read of deallocated
    /// memory is a predicted error
    fn load(
        &mut self,
        ctx: &mut AnalysisCtx<'_>,
        region: RegionId,
        ty: Option<Ty>,
        span: Option<Span>,
    ) -> EvalResult<AbstractValue> {
        let value = self.get_store(ctx, region, ty, span);
        if matches!(value, AbstractValue::Deallocated { .. }) {
            return Err(Interrupt::Predicted(
                PredictedError::ReadFromDeallocatedMemory { value, span },
            ));
        }
        Ok(value)
    }

    /// Region for `base[index]`; the index must be a known constant
    fn element_region(
        &mut self,
        ctx: &mut AnalysisCtx<'_>,
        base: &Expr,
        index: &Expr,
        span: Option<Span>,
    ) -> EvalResult<RegionId> {
        let parent = self.eval_lvalue(ctx, base, span)?;
        let idx = self.eval_rvalue(ctx, index, span)?;
        match idx {
            AbstractValue::Concrete { value, .. } => Ok(ctx.regions.element_child(parent, value)),
            other => Err(Interrupt::Fault(
                AnalysisError::unsupported(format!(
                    "array index is not a known constant: {}",
                    other
                ))
                .with_span(span),
            )),
        }
    }

    /// Region for a field access, resolving the base first
    fn field_region(
        &mut self,
        ctx: &mut AnalysisCtx<'_>,
        expr: &Expr,
        span: Option<Span>,
    ) -> EvalResult<RegionId> {
        let Expr::Field { base, field, .. } = expr else {
            return Err(Interrupt::Fault(
                AnalysisError::invariant(format!("field_region on non-field {}", expr))
                    .with_span(span),
            ));
        };
        match base.as_ref() {
            Expr::Deref { operand, .. } => {
                let ptr = self.eval_rvalue(ctx, operand, span)?;
                self.raise_any_null_ptr_deref(expr, &ptr, span)?;
                match ptr {
                    AbstractValue::Unknown { .. } => Err(self.raise_split_value(ctx, &ptr, span)),
                    AbstractValue::PointerTo { region, .. } => {
                        Ok(ctx.regions.field_child(region, field))
                    }
                    other => Err(Interrupt::Fault(
                        AnalysisError::unsupported(format!(
                            "field access through {} in {}",
                            other, expr
                        ))
                        .with_span(span),
                    )),
                }
            }
            Expr::Var { decl, .. } => {
                let vr = self.var_region(ctx, *decl);
                Ok(ctx.regions.field_child(vr, field))
            }
            Expr::Field { .. } => {
                let vr = self.field_region(ctx, base, span)?;
                Ok(ctx.regions.field_child(vr, field))
            }
            other => Err(Interrupt::Fault(
                AnalysisError::unsupported(format!("field access base {}", other)).with_span(span),
            )),
        }
    }

    /// Treat pointer-plus-constant as indexing into the target region.
    /// The offset is in bytes; the element size comes from the pointee type.
    pub fn pointer_plus_region(
        &mut self,
        ctx: &mut AnalysisCtx<'_>,
        base: &Expr,
        offset: &Expr,
        span: Option<Span>,
    ) -> EvalResult<RegionId> {
        let a = self.eval_rvalue(ctx, base, span)?;
        let b = self.eval_rvalue(ctx, offset, span)?;
        match (&a, &b) {
            (
                AbstractValue::PointerTo { region, .. },
                AbstractValue::Concrete { value, .. },
            ) => {
                let elem_size = self
                    .expr_ty(ctx, base)
                    .as_ref()
                    .and_then(Ty::pointee)
                    .and_then(Ty::size_of);
                match elem_size {
                    Some(size) if size > 0 => {
                        Ok(ctx.regions.element_child(*region, value / size as i64))
                    }
                    _ => Err(Interrupt::Fault(
                        AnalysisError::unsupported(format!(
                            "pointer arithmetic on pointee of unknown size in {}",
                            base
                        ))
                        .with_span(span),
                    )),
                }
            }
            _ => Err(Interrupt::Fault(
                AnalysisError::unsupported(format!(
                    "pointer addition of {} and {}",
                    a, b
                ))
                .with_span(span),
            )),
        }
    }

    /// Static type of an expression, consulting declarations for variables
    pub fn expr_ty(&self, ctx: &AnalysisCtx<'_>, expr: &Expr) -> Option<Ty> {
        match expr {
            Expr::Var { decl, .. } => Some(ctx.fun.decl(*decl).ty.clone()),
            other => other.ty().cloned(),
        }
    }

    /// Predicted error if the pointer is a concrete NULL
    ///
    /// Definite unless the value came out of a split: after a split, NULL is
    /// only one of the forked possibilities.
    pub fn raise_any_null_ptr_deref(
        &self,
        expr: &Expr,
        ptr: &AbstractValue,
        span: Option<Span>,
    ) -> EvalResult<()> {
        if ptr.is_null_ptr() {
            return Err(Interrupt::Predicted(PredictedError::NullPtrDereference {
                expr: expr.clone(),
                ptr: ptr.clone(),
                definite: !ptr.from_split(),
                span,
            }));
        }
        Ok(())
    }

    /// Split request decomposing an unknown pointer into a non-NULL pointer
    /// at a fresh region versus a concrete NULL
    pub fn raise_split_value(
        &self,
        ctx: &mut AnalysisCtx<'_>,
        value: &AbstractValue,
        span: Option<Span>,
    ) -> Interrupt {
        let ty = match value {
            AbstractValue::Unknown { ty: Some(t), .. } if t.is_pointer() => t.clone(),
            _ => {
                return Interrupt::Fault(
                    AnalysisError::unsupported(format!(
                        "cannot split {} into pointer alternatives",
                        value
                    ))
                    .with_span(span),
                )
            }
        };
        let region = ctx.regions.fresh();
        let non_null = AbstractValue::PointerTo {
            ty: Some(ty.clone()),
            span,
            region,
            from_split: true,
        };
        let null = AbstractValue::Concrete {
            ty,
            span,
            value: 0,
            from_split: true,
        };
        trace!(%value, "splitting into non-NULL/NULL worlds");
        Interrupt::Split(SplitRequest {
            value: value.clone(),
            alternatives: vec![non_null, null],
        })
    }

    /// Copy of this state at another location
    pub fn update_loc(&self, loc: Location) -> State {
        let mut new = self.clone();
        new.loc = loc;
        new.from_split = false;
        new
    }

    /// Copy of this state at the unique next location
    pub fn use_next_loc(&self, cfg: &Cfg) -> State {
        self.update_loc(self.loc.next_loc(cfg))
    }

    /// Advance past the current statement in place: the next statement, the
    /// single successor block, or one-past-end when the path ends here
    pub fn advance_loc(&mut self, cfg: &Cfg) {
        let block = cfg.block(self.loc.block);
        self.loc = if self.loc.idx + 1 < block.stmts.len() || block.succs.len() != 1 {
            Location::new(self.loc.block, self.loc.idx + 1)
        } else {
            Location::block_start(block.succs[0].target)
        };
        self.from_split = false;
    }

    /// Lookup `varname.field` without disturbing stored values; test support
    pub fn value_of_field_by_varname(
        &self,
        ctx: &mut AnalysisCtx<'_>,
        varname: &str,
        field: &str,
    ) -> Option<AbstractValue> {
        let fun = ctx.fun;
        let decl = fun.decl_by_name(varname)?;
        let region = *self.region_for_var.get(&decl.id)?;
        let field_region = ctx.regions.field_child(region, field);
        self.value_for_region.get(&field_region).cloned()
    }

    /// Lookup `region->field` against already-materialized children; test
    /// support
    pub fn value_of_field_by_region(
        &self,
        regions: &RegionStore,
        region: RegionId,
        field: &str,
    ) -> Option<AbstractValue> {
        let field_region = regions.existing_field_child(region, field)?;
        self.value_for_region.get(&field_region).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir::infrastructure::FunctionBuilder;
    use pretty_assertions::assert_eq;

    /// `void f(void) { int x; int *p; struct S g; }` with a global `gv`
    fn fixture() -> crate::features::ir::domain::FunctionIr {
        let mut b = FunctionBuilder::new("f");
        b.local("x", Ty::int());
        b.local("p", Ty::ptr(Ty::int()));
        b.global("gv", Ty::int());
        let entry = b.block();
        b.set_entry(entry);
        b.finish().expect("well-formed fixture")
    }

    #[test]
    fn test_init_seeds_locals_uninitialized() {
        let fun = fixture();
        let mut ctx = AnalysisCtx::new(&fun);
        let mut state = State::new(Location::block_start(fun.cfg.entry));
        state.init_for_function(&mut ctx);

        let x = fun.decl_by_name("x").unwrap();
        let region = *state.region_for_var.get(&x.id).unwrap();
        assert!(matches!(
            state.value_for_region.get(&region),
            Some(AbstractValue::Uninitialized { .. })
        ));
        assert!(ctx.regions.is_on_stack(region));
    }

    #[test]
    fn test_global_first_read_is_recorded() {
        let fun = fixture();
        let mut ctx = AnalysisCtx::new(&fun);
        let mut state = State::new(Location::block_start(fun.cfg.entry));
        state.init_for_function(&mut ctx);

        let gv = fun.decl_by_name("gv").unwrap();
        let expr = Expr::var(gv);
        let first = state.eval_rvalue(&mut ctx, &expr, None).unwrap();
        let second = state.eval_rvalue(&mut ctx, &expr, None).unwrap();
        assert!(matches!(first, AbstractValue::Unknown { .. }));
        assert_eq!(first, second);
        // Identity is preserved too: the recorded unknown is returned again
        assert!(first.same_identity(&second));
    }

    #[test]
    fn test_transient_unknown_not_recorded() {
        let fun = fixture();
        let mut ctx = AnalysisCtx::new(&fun);
        let mut state = State::new(Location::block_start(fun.cfg.entry));
        state.init_for_function(&mut ctx);

        let heap = ctx.regions.heap("obj", None);
        let field = ctx.regions.field_child(heap, "bits");
        let before = state.value_for_region.len();
        let v = state.get_store(&mut ctx, field, Some(Ty::int()), None);
        assert!(matches!(v, AbstractValue::Unknown { .. }));
        assert_eq!(state.value_for_region.len(), before);
    }

    #[test]
    fn test_store_miss_inherits_parent_value() {
        let fun = fixture();
        let mut ctx = AnalysisCtx::new(&fun);
        let mut state = State::new(Location::block_start(fun.cfg.entry));
        state.init_for_function(&mut ctx);

        // A field of a local with no per-field entry inherits the nearest
        // recorded ancestor value
        let x = fun.decl_by_name("x").unwrap();
        let region = *state.region_for_var.get(&x.id).unwrap();
        let field = ctx.regions.field_child(region, "bits");
        let v = state.get_store(&mut ctx, field, Some(Ty::int()), None);
        assert!(matches!(v, AbstractValue::Uninitialized { .. }));
    }

    #[test]
    fn test_copy_isolation() {
        let fun = fixture();
        let mut ctx = AnalysisCtx::new(&fun);
        let mut state = State::new(Location::block_start(fun.cfg.entry));
        state.init_for_function(&mut ctx);

        let x = fun.decl_by_name("x").unwrap();
        let lhs = Expr::var(x);
        let mut copy = state.clone();
        copy.assign(&mut ctx, &lhs, &Expr::int_const(7, Ty::int()), None)
            .unwrap();

        let region = *state.region_for_var.get(&x.id).unwrap();
        assert!(matches!(
            state.value_for_region.get(&region),
            Some(AbstractValue::Uninitialized { .. })
        ));
        assert_eq!(
            copy.value_for_region.get(&region),
            Some(&AbstractValue::concrete(Ty::int(), None, 7))
        );
    }

    #[test]
    fn test_field_region_memoized_across_evals() {
        let fun = fixture();
        let mut ctx = AnalysisCtx::new(&fun);
        let mut state = State::new(Location::block_start(fun.cfg.entry));
        state.init_for_function(&mut ctx);

        let gv = fun.decl_by_name("gv").unwrap();
        let expr = Expr::field(Expr::var(gv), "count", Ty::int());
        let r1 = state.eval_lvalue(&mut ctx, &expr, None).unwrap();
        let r2 = state.eval_lvalue(&mut ctx, &expr, None).unwrap();
        assert_eq!(r1, r2);
    }

    #[test]
    fn test_null_deref_is_definite_without_split() {
        let fun = fixture();
        let mut ctx = AnalysisCtx::new(&fun);
        let mut state = State::new(Location::block_start(fun.cfg.entry));
        state.init_for_function(&mut ctx);

        let p = fun.decl_by_name("p").unwrap();
        // p = NULL; then *p as lvalue
        state
            .assign(
                &mut ctx,
                &Expr::var(p),
                &Expr::null_ptr(Ty::ptr(Ty::int())),
                None,
            )
            .unwrap();
        let deref = Expr::deref(Expr::var(p), Ty::int());
        match state.eval_lvalue(&mut ctx, &deref, None) {
            Err(Interrupt::Predicted(PredictedError::NullPtrDereference {
                definite, ..
            })) => assert!(definite),
            other => panic!("expected a NULL dereference, got {:?}", other),
        }
    }

    #[test]
    fn test_deref_unknown_requests_split() {
        let fun = fixture();
        let mut ctx = AnalysisCtx::new(&fun);
        let mut state = State::new(Location::block_start(fun.cfg.entry));
        state.init_for_function(&mut ctx);

        let p = fun.decl_by_name("p").unwrap();
        let region = *state.region_for_var.get(&p.id).unwrap();
        let unknown = ctx.fresh_unknown(Some(Ty::ptr(Ty::int())), None);
        state.value_for_region.insert(region, unknown.clone());

        let deref = Expr::deref(Expr::var(p), Ty::int());
        match state.eval_rvalue(&mut ctx, &deref, None) {
            Err(Interrupt::Split(req)) => {
                assert!(req.value.same_identity(&unknown));
                assert_eq!(req.alternatives.len(), 2);
                assert!(req.alternatives.iter().all(|a| a.from_split()));
                assert!(req.alternatives.iter().any(|a| a.is_null_ptr()));
            }
            other => panic!("expected a split request, got {:?}", other),
        }
    }

    #[test]
    fn test_pointer_plus_resolves_element() {
        let fun = fixture();
        let mut ctx = AnalysisCtx::new(&fun);
        let mut state = State::new(Location::block_start(fun.cfg.entry));
        state.init_for_function(&mut ctx);

        let p = fun.decl_by_name("p").unwrap();
        let region = *state.region_for_var.get(&p.id).unwrap();
        let target = ctx.regions.heap("buf", None);
        state.value_for_region.insert(
            region,
            AbstractValue::pointer_to(Some(Ty::ptr(Ty::int())), None, target),
        );

        // p + 8 bytes over int elements lands on buf[2]
        let r = state
            .pointer_plus_region(
                &mut ctx,
                &Expr::var(p),
                &Expr::int_const(8, Ty::long()),
                None,
            )
            .unwrap();
        assert_eq!(ctx.regions.name(r), "buf[2]");
    }

    #[test]
    fn test_uninitialized_deref_is_fault() {
        let fun = fixture();
        let mut ctx = AnalysisCtx::new(&fun);
        let mut state = State::new(Location::block_start(fun.cfg.entry));
        state.init_for_function(&mut ctx);

        let p = fun.decl_by_name("p").unwrap();
        let deref = Expr::deref(Expr::var(p), Ty::int());
        assert!(matches!(
            state.eval_rvalue(&mut ctx, &deref, None),
            Err(Interrupt::Fault(_))
        ));
    }

    #[test]
    fn test_verify_accepts_seeded_state() {
        let fun = fixture();
        let mut ctx = AnalysisCtx::new(&fun);
        let mut state = State::new(Location::block_start(fun.cfg.entry));
        state.init_for_function(&mut ctx);
        assert!(state.verify(&ctx).is_ok());
    }
}
