//! Declarations consumed from the host compiler
//!
//! The engine reads three things off a declaration: its name (diagnostics),
//! its static type, and its storage class. Non-null parameter contracts live
//! on the function declaration, derived by the host from documentation or
//! attributes.

use super::types::Ty;
use crate::shared::models::Span;
use serde::{Deserialize, Serialize};

/// Stable handle for a variable/parameter declaration within one function's IR
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DeclId(pub u32);

/// Where the declared storage lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageClass {
    /// Static/global storage (.data or .bss)
    Global,
    /// Function-local storage
    Local,
    /// Formal parameter
    Param,
}

/// A variable or parameter declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    pub id: DeclId,
    pub name: String,
    pub ty: Ty,
    pub storage: StorageClass,
    pub span: Option<Span>,
}

/// Declaration of the function under analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnDecl {
    pub name: String,
    pub ret_ty: Ty,
    /// Parameter declarations, in call order
    pub params: Vec<DeclId>,
    /// 0-based indices of parameters documented as never-NULL
    pub nonnull_params: Vec<usize>,
    pub span: Option<Span>,
}

impl FnDecl {
    pub fn is_nonnull_param(&self, idx: usize) -> bool {
        self.nonnull_params.contains(&idx)
    }
}

/// Declared contract of a called function
///
/// Callees are external to the function under analysis; only the pieces of
/// their declaration the engine acts on are carried on the call statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalleeDecl {
    pub name: String,
    pub ret_ty: Ty,
    /// 0-based indices of parameters documented as never-NULL
    pub nonnull_params: Vec<usize>,
}

impl CalleeDecl {
    pub fn new(name: impl Into<String>, ret_ty: Ty) -> Self {
        Self {
            name: name.into(),
            ret_ty,
            nonnull_params: Vec::new(),
        }
    }

    pub fn with_nonnull_params(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.nonnull_params = indices.into_iter().collect();
        self
    }
}
