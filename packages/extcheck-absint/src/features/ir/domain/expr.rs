//! Expression shapes consumed from the host compiler
//!
//! A small closed set: variable references, field access, array index,
//! address-of, pointer dereference, and integer/string constants. Every
//! expression carries its static type; `Var` additionally carries the
//! declaration's name so diagnostics can render without a symbol table.

use super::decl::{Decl, DeclId};
use super::types::Ty;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Reference to a variable or parameter
    Var { decl: DeclId, name: String },
    IntConst {
        value: i64,
        ty: Ty,
    },
    StrConst {
        text: String,
    },
    /// `base.field` (or `p->field` when base is a dereference)
    Field {
        base: Box<Expr>,
        field: String,
        ty: Ty,
    },
    /// `base[index]`
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        ty: Ty,
    },
    /// `&operand`
    AddrOf {
        operand: Box<Expr>,
        ty: Ty,
    },
    /// `*operand`
    Deref {
        operand: Box<Expr>,
        ty: Ty,
    },
}

impl Expr {
    pub fn var(decl: &Decl) -> Self {
        Expr::Var {
            decl: decl.id,
            name: decl.name.clone(),
        }
    }

    pub fn int_const(value: i64, ty: Ty) -> Self {
        Expr::IntConst { value, ty }
    }

    /// NULL of the given pointer type
    pub fn null_ptr(ty: Ty) -> Self {
        Expr::IntConst { value: 0, ty }
    }

    pub fn str_const(text: impl Into<String>) -> Self {
        Expr::StrConst { text: text.into() }
    }

    pub fn field(base: Expr, field: impl Into<String>, ty: Ty) -> Self {
        Expr::Field {
            base: Box::new(base),
            field: field.into(),
            ty,
        }
    }

    pub fn index(base: Expr, index: Expr, ty: Ty) -> Self {
        Expr::Index {
            base: Box::new(base),
            index: Box::new(index),
            ty,
        }
    }

    pub fn addr_of(operand: Expr, ty: Ty) -> Self {
        Expr::AddrOf {
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn deref(operand: Expr, ty: Ty) -> Self {
        Expr::Deref {
            operand: Box::new(operand),
            ty,
        }
    }

    /// Static type, when carried by the expression itself
    ///
    /// `Var` types live on the declaration; use `ty_in` when a function
    /// context is available.
    pub fn ty(&self) -> Option<&Ty> {
        match self {
            Expr::Var { .. } | Expr::StrConst { .. } => None,
            Expr::IntConst { ty, .. }
            | Expr::Field { ty, .. }
            | Expr::Index { ty, .. }
            | Expr::AddrOf { ty, .. }
            | Expr::Deref { ty, .. } => Some(ty),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var { name, .. } => write!(f, "{}", name),
            Expr::IntConst { value, .. } => write!(f, "{}", value),
            Expr::StrConst { text } => write!(f, "\"{}\"", text),
            Expr::Field { base, field, .. } => {
                // Render p->f for a dereferenced base, C-style
                if let Expr::Deref { operand, .. } = base.as_ref() {
                    write!(f, "{}->{}", operand, field)
                } else {
                    write!(f, "{}.{}", base, field)
                }
            }
            Expr::Index { base, index, .. } => write!(f, "{}[{}]", base, index),
            Expr::AddrOf { operand, .. } => write!(f, "&{}", operand),
            Expr::Deref { operand, .. } => write!(f, "*{}", operand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir::domain::decl::StorageClass;

    fn decl(name: &str, ty: Ty) -> Decl {
        Decl {
            id: DeclId(0),
            name: name.to_string(),
            ty,
            storage: StorageClass::Local,
            span: None,
        }
    }

    #[test]
    fn test_display_deref_field() {
        let p = decl("p", Ty::ptr(Ty::strukt("Obj")));
        let e = Expr::field(
            Expr::deref(Expr::var(&p), Ty::strukt("Obj")),
            "refcnt",
            Ty::long(),
        );
        assert_eq!(e.to_string(), "p->refcnt");
    }

    #[test]
    fn test_display_index_and_addr() {
        let a = decl("a", Ty::ptr(Ty::int()));
        let e = Expr::index(Expr::var(&a), Expr::int_const(3, Ty::int()), Ty::int());
        assert_eq!(e.to_string(), "a[3]");
        let addr = Expr::addr_of(e, Ty::ptr(Ty::int()));
        assert_eq!(addr.to_string(), "&a[3]");
    }
}
