//! Statement shapes consumed from the host compiler
//!
//! Three-address statements in a small closed set: assignment, call,
//! conditional branch, return, and the exprcode-tagged pointer-arithmetic
//! form. Anything else the host lowers before handing IR to the engine.

use super::decl::CalleeDecl;
use super::expr::Expr;
use crate::shared::models::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a conditional branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn eval(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Assign {
        lhs: Expr,
        rhs: Expr,
        span: Option<Span>,
    },
    /// `lhs = base + offset` where base is a pointer and offset is in bytes
    PointerPlus {
        lhs: Expr,
        base: Expr,
        offset: Expr,
        span: Option<Span>,
    },
    Call {
        lhs: Option<Expr>,
        callee: CalleeDecl,
        args: Vec<Expr>,
        span: Option<Span>,
    },
    /// Conditional branch; the block's true/false edges pick the successor
    Cond {
        op: CmpOp,
        lhs: Expr,
        rhs: Expr,
        span: Option<Span>,
    },
    Return {
        value: Option<Expr>,
        span: Option<Span>,
    },
}

impl Statement {
    pub fn span(&self) -> Option<Span> {
        match self {
            Statement::Assign { span, .. }
            | Statement::PointerPlus { span, .. }
            | Statement::Call { span, .. }
            | Statement::Cond { span, .. }
            | Statement::Return { span, .. } => *span,
        }
    }

    /// Short human-readable description for transition labels
    pub fn describe(&self) -> String {
        match self {
            Statement::Call { callee, span, .. } => match span {
                Some(s) => format!("call to {} at line {}", callee.name, s.line),
                None => format!("call to {}", callee.name),
            },
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Assign { lhs, rhs, .. } => write!(f, "{} = {}", lhs, rhs),
            Statement::PointerPlus {
                lhs, base, offset, ..
            } => write!(f, "{} = {} + {}", lhs, base, offset),
            Statement::Call {
                lhs, callee, args, ..
            } => {
                if let Some(lhs) = lhs {
                    write!(f, "{} = ", lhs)?;
                }
                write!(f, "{}(", callee.name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Statement::Cond { op, lhs, rhs, .. } => write!(f, "if ({} {} {})", lhs, op, rhs),
            Statement::Return { value, .. } => match value {
                Some(v) => write!(f, "return {}", v),
                None => write!(f, "return"),
            },
        }
    }
}
