//! Consumed IR contract
//!
//! What the engine reads off the host compiler, and a builder for
//! constructing it programmatically.

pub mod domain;
pub mod infrastructure;

pub use domain::{
    BasicBlock, BlockId, CalleeDecl, Cfg, CfgEdge, CmpOp, Decl, DeclId, EdgeKind, Expr, FnDecl,
    FunctionIr, Statement, StorageClass, Ty,
};
pub use infrastructure::FunctionBuilder;
