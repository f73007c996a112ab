//! Programmatic construction of function IR
//!
//! Hosts (and the test-suite) assemble declarations, blocks, and edges
//! through this builder; `finish` validates the result so the engine can
//! index handles directly afterwards.

use crate::features::ir::domain::{
    BasicBlock, BlockId, CalleeDecl, Cfg, CfgEdge, Decl, DeclId, EdgeKind, Expr, FnDecl,
    FunctionIr, Statement, StorageClass, Ty,
};
use crate::shared::models::{AnalysisError, Span};

#[derive(Debug)]
pub struct FunctionBuilder {
    name: String,
    ret_ty: Ty,
    params: Vec<DeclId>,
    nonnull_params: Vec<usize>,
    decls: Vec<Decl>,
    blocks: Vec<BasicBlock>,
    entry: Option<BlockId>,
    span: Option<Span>,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ret_ty: Ty::Void,
            params: Vec::new(),
            nonnull_params: Vec::new(),
            decls: Vec::new(),
            blocks: Vec::new(),
            entry: None,
            span: None,
        }
    }

    pub fn set_ret_ty(&mut self, ty: Ty) {
        self.ret_ty = ty;
    }

    pub fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    fn add_decl(&mut self, name: &str, ty: Ty, storage: StorageClass) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(Decl {
            id,
            name: name.to_string(),
            ty,
            storage,
            span: None,
        });
        id
    }

    pub fn param(&mut self, name: &str, ty: Ty) -> DeclId {
        let id = self.add_decl(name, ty, StorageClass::Param);
        self.params.push(id);
        id
    }

    /// Parameter carrying a documented never-NULL contract
    pub fn param_nonnull(&mut self, name: &str, ty: Ty) -> DeclId {
        self.nonnull_params.push(self.params.len());
        self.param(name, ty)
    }

    pub fn local(&mut self, name: &str, ty: Ty) -> DeclId {
        self.add_decl(name, ty, StorageClass::Local)
    }

    pub fn global(&mut self, name: &str, ty: Ty) -> DeclId {
        self.add_decl(name, ty, StorageClass::Global)
    }

    pub fn block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock {
            id,
            stmts: Vec::new(),
            succs: Vec::new(),
        });
        id
    }

    pub fn set_entry(&mut self, block: BlockId) {
        self.entry = Some(block);
    }

    pub fn push(&mut self, block: BlockId, stmt: Statement) {
        self.blocks[block.0 as usize].stmts.push(stmt);
    }

    pub fn edge(&mut self, from: BlockId, to: BlockId, kind: EdgeKind) {
        self.blocks[from.0 as usize]
            .succs
            .push(CfgEdge { target: to, kind });
    }

    /// Tagged true/false edges out of a conditional block
    pub fn branch(&mut self, from: BlockId, on_true: BlockId, on_false: BlockId) {
        self.edge(from, on_true, EdgeKind::True);
        self.edge(from, on_false, EdgeKind::False);
    }

    /// Reference to a declared variable
    pub fn var(&self, decl: DeclId) -> Expr {
        Expr::var(&self.decls[decl.0 as usize])
    }

    /// Convenience: `lhs = rhs` appended to the block
    pub fn assign(&mut self, block: BlockId, lhs: Expr, rhs: Expr, span: Option<Span>) {
        self.push(block, Statement::Assign { lhs, rhs, span });
    }

    /// Convenience: call appended to the block
    pub fn call(
        &mut self,
        block: BlockId,
        lhs: Option<Expr>,
        callee: CalleeDecl,
        args: Vec<Expr>,
        span: Option<Span>,
    ) {
        self.push(
            block,
            Statement::Call {
                lhs,
                callee,
                args,
                span,
            },
        );
    }

    pub fn finish(self) -> Result<FunctionIr, AnalysisError> {
        let entry = self.entry.ok_or_else(|| {
            AnalysisError::malformed_ir(format!("function {} has no entry block", self.name))
        })?;
        let fun = FunctionIr {
            decl: FnDecl {
                name: self.name,
                ret_ty: self.ret_ty,
                params: self.params,
                nonnull_params: self.nonnull_params,
                span: self.span,
            },
            decls: self.decls,
            cfg: Cfg {
                entry,
                blocks: self.blocks,
            },
            span: self.span,
        };
        fun.validate()?;
        Ok(fun)
    }
}
