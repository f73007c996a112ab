//! Domain models for the consumed IR
//!
//! CFG, basic blocks, three-address statements, expressions, declarations,
//! and static types, as supplied by the host compiler. Read-only input; the
//! engine never mutates these structures.

pub mod cfg;
pub mod decl;
pub mod expr;
pub mod stmt;
pub mod types;

pub use cfg::{BasicBlock, BlockId, Cfg, CfgEdge, EdgeKind, FunctionIr};
pub use decl::{CalleeDecl, Decl, DeclId, FnDecl, StorageClass};
pub use expr::Expr;
pub use stmt::{CmpOp, Statement};
pub use types::Ty;
