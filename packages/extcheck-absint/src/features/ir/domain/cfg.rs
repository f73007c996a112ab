//! Control-flow graph of one function under analysis
//!
//! Basic blocks hold an ordered statement list; edges out of a conditional
//! block are tagged true/false. The engine treats the whole structure as
//! read-only input.

use super::decl::{Decl, DeclId, FnDecl, StorageClass};
use super::expr::Expr;
use super::stmt::Statement;
use crate::shared::models::{AnalysisError, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle for a basic block; doubles as its index in `Cfg::blocks`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// CFG edge kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Unconditional successor
    Fallthrough,
    /// True branch of a conditional block
    True,
    /// False branch of a conditional block
    False,
}

/// Outgoing CFG edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfgEdge {
    pub target: BlockId,
    pub kind: EdgeKind,
}

/// Basic block: ordered statements plus outgoing edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub stmts: Vec<Statement>,
    pub succs: Vec<CfgEdge>,
}

impl BasicBlock {
    pub fn true_edge(&self) -> Option<&CfgEdge> {
        self.succs.iter().find(|e| e.kind == EdgeKind::True)
    }

    pub fn false_edge(&self) -> Option<&CfgEdge> {
        self.succs.iter().find(|e| e.kind == EdgeKind::False)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cfg {
    pub entry: BlockId,
    pub blocks: Vec<BasicBlock>,
}

impl Cfg {
    /// Look up a block by handle
    ///
    /// Valid after `FunctionIr::validate`; indexes directly.
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0 as usize]
    }
}

/// Everything the engine consumes about one function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionIr {
    pub decl: FnDecl,
    /// All declarations referenced by the body, indexed by `DeclId`
    pub decls: Vec<Decl>,
    pub cfg: Cfg,
    pub span: Option<Span>,
}

impl FunctionIr {
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.0 as usize]
    }

    pub fn decl_by_name(&self, name: &str) -> Option<&Decl> {
        self.decls.iter().find(|d| d.name == name)
    }

    /// Function-local declarations (excluding parameters)
    pub fn locals(&self) -> impl Iterator<Item = &Decl> {
        self.decls
            .iter()
            .filter(|d| d.storage == StorageClass::Local)
    }

    /// Check internal references so later lookups can index directly
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let nblocks = self.cfg.blocks.len();
        let bad_block = |id: BlockId| AnalysisError::malformed_ir(format!(
            "function {} references missing block {}",
            self.decl.name, id
        ));
        if self.cfg.entry.0 as usize >= nblocks {
            return Err(bad_block(self.cfg.entry));
        }
        for (idx, block) in self.cfg.blocks.iter().enumerate() {
            if block.id.0 as usize != idx {
                return Err(AnalysisError::malformed_ir(format!(
                    "block {} stored at index {}",
                    block.id, idx
                )));
            }
            for edge in &block.succs {
                if edge.target.0 as usize >= nblocks {
                    return Err(bad_block(edge.target));
                }
            }
            for (sidx, stmt) in block.stmts.iter().enumerate() {
                self.validate_stmt(stmt)?;
                let is_last = sidx + 1 == block.stmts.len();
                if matches!(stmt, Statement::Cond { .. }) {
                    if !is_last {
                        return Err(AnalysisError::malformed_ir(format!(
                            "conditional in the middle of block {}",
                            block.id
                        )));
                    }
                    if block.true_edge().is_none() || block.false_edge().is_none() {
                        return Err(AnalysisError::malformed_ir(format!(
                            "conditional block {} lacks tagged true/false edges",
                            block.id
                        )));
                    }
                } else if is_last && block.succs.len() > 1 {
                    return Err(AnalysisError::malformed_ir(format!(
                        "block {} has multiple successors without a conditional",
                        block.id
                    )));
                }
            }
        }
        for (idx, decl) in self.decls.iter().enumerate() {
            if decl.id.0 as usize != idx {
                return Err(AnalysisError::malformed_ir(format!(
                    "declaration {:?} stored at index {}",
                    decl.name, idx
                )));
            }
        }
        for param in &self.decl.params {
            if param.0 as usize >= self.decls.len() {
                return Err(AnalysisError::malformed_ir(format!(
                    "function {} references missing parameter declaration",
                    self.decl.name
                )));
            }
        }
        Ok(())
    }

    fn validate_stmt(&self, stmt: &Statement) -> Result<(), AnalysisError> {
        match stmt {
            Statement::Assign { lhs, rhs, .. } => {
                self.validate_expr(lhs)?;
                self.validate_expr(rhs)
            }
            Statement::PointerPlus {
                lhs, base, offset, ..
            } => {
                self.validate_expr(lhs)?;
                self.validate_expr(base)?;
                self.validate_expr(offset)
            }
            Statement::Call { lhs, args, .. } => {
                if let Some(lhs) = lhs {
                    self.validate_expr(lhs)?;
                }
                args.iter().try_for_each(|a| self.validate_expr(a))
            }
            Statement::Cond { lhs, rhs, .. } => {
                self.validate_expr(lhs)?;
                self.validate_expr(rhs)
            }
            Statement::Return { value, .. } => match value {
                Some(v) => self.validate_expr(v),
                None => Ok(()),
            },
        }
    }

    fn validate_expr(&self, expr: &Expr) -> Result<(), AnalysisError> {
        match expr {
            Expr::Var { decl, name } => {
                if decl.0 as usize >= self.decls.len() {
                    return Err(AnalysisError::malformed_ir(format!(
                        "reference to undeclared variable {:?}",
                        name
                    )));
                }
                Ok(())
            }
            Expr::IntConst { .. } | Expr::StrConst { .. } => Ok(()),
            Expr::Field { base, .. } => self.validate_expr(base),
            Expr::Index { base, index, .. } => {
                self.validate_expr(base)?;
                self.validate_expr(index)
            }
            Expr::AddrOf { operand, .. } | Expr::Deref { operand, .. } => {
                self.validate_expr(operand)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir::domain::types::Ty;

    fn empty_fn(entry: BlockId, blocks: Vec<BasicBlock>) -> FunctionIr {
        FunctionIr {
            decl: FnDecl {
                name: "f".to_string(),
                ret_ty: Ty::Void,
                params: vec![],
                nonnull_params: vec![],
                span: None,
            },
            decls: vec![],
            cfg: Cfg { entry, blocks },
            span: None,
        }
    }

    #[test]
    fn test_validate_dangling_edge() {
        let fun = empty_fn(
            BlockId(0),
            vec![BasicBlock {
                id: BlockId(0),
                stmts: vec![],
                succs: vec![CfgEdge {
                    target: BlockId(7),
                    kind: EdgeKind::Fallthrough,
                }],
            }],
        );
        assert!(fun.validate().is_err());
    }

    #[test]
    fn test_validate_ok_and_edge_lookup() {
        let fun = empty_fn(
            BlockId(0),
            vec![
                BasicBlock {
                    id: BlockId(0),
                    stmts: vec![],
                    succs: vec![
                        CfgEdge {
                            target: BlockId(1),
                            kind: EdgeKind::True,
                        },
                        CfgEdge {
                            target: BlockId(1),
                            kind: EdgeKind::False,
                        },
                    ],
                },
                BasicBlock {
                    id: BlockId(1),
                    stmts: vec![],
                    succs: vec![],
                },
            ],
        );
        assert!(fun.validate().is_ok());
        let b0 = fun.cfg.block(BlockId(0));
        assert_eq!(b0.true_edge().map(|e| e.target), Some(BlockId(1)));
        assert_eq!(b0.false_edge().map(|e| e.target), Some(BlockId(1)));
    }
}
