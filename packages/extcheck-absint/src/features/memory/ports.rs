//! Extension point for collaborator-defined abstract values
//!
//! The ownership/refcount collaborator extends the value lattice with its own
//! variants (e.g. a tracked reference count). The engine only needs to print,
//! compare, and copy such values; everything else happens in the
//! collaborator's statement handlers.

use std::any::Any;
use std::fmt;

pub trait DomainValue: fmt::Debug + fmt::Display {
    /// Equality across trait objects
    fn dyn_eq(&self, other: &dyn DomainValue) -> bool;

    /// Downcast support for the owning collaborator
    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tag(u32);

    impl fmt::Display for Tag {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "tag {}", self.0)
        }
    }

    impl DomainValue for Tag {
        fn dyn_eq(&self, other: &dyn DomainValue) -> bool {
            other
                .as_any()
                .downcast_ref::<Tag>()
                .is_some_and(|o| o == self)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_dyn_eq() {
        let a = Tag(1);
        let b = Tag(1);
        let c = Tag(2);
        assert!(a.dyn_eq(&b));
        assert!(!a.dyn_eq(&c));
    }
}
