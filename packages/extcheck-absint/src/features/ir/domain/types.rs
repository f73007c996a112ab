//! Static types attached to IR expressions
//!
//! The host compiler annotates every expression with a static type. The
//! interpreter only needs a coarse view: pointer-ness (for NULL reasoning),
//! sizes (for pointer arithmetic), and a printable name (for diagnostics).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Static type of an IR expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ty {
    Void,
    Char,
    Int { bytes: u8, signed: bool },
    Ptr(Box<Ty>),
    Struct { name: String },
}

impl Ty {
    /// Plain C `int`
    pub fn int() -> Self {
        Ty::Int {
            bytes: 4,
            signed: true,
        }
    }

    pub fn long() -> Self {
        Ty::Int {
            bytes: 8,
            signed: true,
        }
    }

    pub fn ptr(pointee: Ty) -> Self {
        Ty::Ptr(Box::new(pointee))
    }

    pub fn strukt(name: impl Into<String>) -> Self {
        Ty::Struct { name: name.into() }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Ty::Ptr(_))
    }

    pub fn pointee(&self) -> Option<&Ty> {
        match self {
            Ty::Ptr(inner) => Some(inner),
            _ => None,
        }
    }

    /// Size in bytes, when statically known
    pub fn size_of(&self) -> Option<u64> {
        match self {
            Ty::Void => None,
            Ty::Char => Some(1),
            Ty::Int { bytes, .. } => Some(u64::from(*bytes)),
            Ty::Ptr(_) => Some(8),
            Ty::Struct { .. } => None,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Void => write!(f, "void"),
            Ty::Char => write!(f, "char"),
            Ty::Int { bytes, signed } => {
                let name = match (bytes, signed) {
                    (1, true) => "signed char",
                    (1, false) => "unsigned char",
                    (2, true) => "short",
                    (2, false) => "unsigned short",
                    (4, true) => "int",
                    (4, false) => "unsigned int",
                    (8, true) => "long",
                    (8, false) => "unsigned long",
                    _ => return write!(f, "{}{}", if *signed { "i" } else { "u" }, bytes * 8),
                };
                write!(f, "{}", name)
            }
            Ty::Ptr(inner) => write!(f, "{} *", inner),
            Ty::Struct { name } => write!(f, "struct {}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ty_display() {
        assert_eq!(Ty::int().to_string(), "int");
        assert_eq!(Ty::ptr(Ty::int()).to_string(), "int *");
        assert_eq!(Ty::ptr(Ty::ptr(Ty::Char)).to_string(), "char * *");
        assert_eq!(Ty::strukt("FooObject").to_string(), "struct FooObject");
    }

    #[test]
    fn test_size_of() {
        assert_eq!(Ty::int().size_of(), Some(4));
        assert_eq!(Ty::ptr(Ty::Void).size_of(), Some(8));
        assert_eq!(Ty::Void.size_of(), None);
        assert_eq!(Ty::strukt("S").size_of(), None);
    }

    #[test]
    fn test_pointee() {
        let p = Ty::ptr(Ty::int());
        assert!(p.is_pointer());
        assert_eq!(p.pointee(), Some(&Ty::int()));
        assert_eq!(Ty::int().pointee(), None);
    }
}
