//! Abstract value lattice
//!
//! What is known about the content of a region or temporary: nothing, a
//! concrete scalar, a provably non-NULL pointer, freed storage, or storage
//! that was never written. A `Domain` variant is the extension point for the
//! ownership-tracking collaborator; the engine treats it as opaque.

use super::region::{RegionId, RegionStore};
use crate::features::ir::domain::Ty;
use crate::features::memory::ports::DomainValue;
use crate::shared::models::{span, Span};
use std::fmt;
use std::sync::Arc;

/// Identity of an `Unknown` value, used only by split substitution
///
/// Two unknowns reading equal can still be distinct ambiguities; the id is
/// what a split replaces across the store. Value equality ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub u32);

#[derive(Debug, Clone)]
pub enum AbstractValue {
    /// Nothing is known about this value
    Unknown {
        id: ValueId,
        ty: Option<Ty>,
        span: Option<Span>,
    },
    /// A known scalar, e.g. 0
    Concrete {
        ty: Ty,
        span: Option<Span>,
        value: i64,
        /// True when this value was materialized by a speculative split
        from_split: bool,
    },
    /// A provably non-NULL pointer aimed at a specific region
    PointerTo {
        ty: Option<Ty>,
        span: Option<Span>,
        region: RegionId,
        from_split: bool,
    },
    /// This storage has been freed; any read is an error
    Deallocated { span: Option<Span> },
    /// Storage exists but has never been written
    Uninitialized {
        ty: Option<Ty>,
        span: Option<Span>,
    },
    /// Collaborator-defined value (ownership tracking); opaque to the engine
    Domain(Arc<dyn DomainValue + Send + Sync>),
}

impl AbstractValue {
    pub fn concrete(ty: Ty, span: Option<Span>, value: i64) -> Self {
        AbstractValue::Concrete {
            ty,
            span,
            value,
            from_split: false,
        }
    }

    pub fn pointer_to(ty: Option<Ty>, span: Option<Span>, region: RegionId) -> Self {
        AbstractValue::PointerTo {
            ty,
            span,
            region,
            from_split: false,
        }
    }

    /// True iff this is a concrete pointer-typed zero
    pub fn is_null_ptr(&self) -> bool {
        match self {
            AbstractValue::Concrete { ty, value, .. } => ty.is_pointer() && *value == 0,
            _ => false,
        }
    }

    /// True when this value came out of a speculative split
    pub fn from_split(&self) -> bool {
        match self {
            AbstractValue::Concrete { from_split, .. }
            | AbstractValue::PointerTo { from_split, .. } => *from_split,
            _ => false,
        }
    }

    pub fn ty(&self) -> Option<&Ty> {
        match self {
            AbstractValue::Unknown { ty, .. } | AbstractValue::Uninitialized { ty, .. } => {
                ty.as_ref()
            }
            AbstractValue::Concrete { ty, .. } => Some(ty),
            AbstractValue::PointerTo { ty, .. } => ty.as_ref(),
            AbstractValue::Deallocated { .. } | AbstractValue::Domain(_) => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            AbstractValue::Unknown { span, .. }
            | AbstractValue::Concrete { span, .. }
            | AbstractValue::PointerTo { span, .. }
            | AbstractValue::Deallocated { span }
            | AbstractValue::Uninitialized { span, .. } => *span,
            AbstractValue::Domain(_) => None,
        }
    }

    /// Same ambiguity as `other` (Unknown id match); the relation a split
    /// substitutes on
    pub fn same_identity(&self, other: &AbstractValue) -> bool {
        match (self, other) {
            (AbstractValue::Unknown { id: a, .. }, AbstractValue::Unknown { id: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Render including the target region's name
    pub fn display_with(&self, regions: &RegionStore) -> String {
        match self {
            AbstractValue::PointerTo { ty, span, region, .. } => {
                let target = regions.name(*region);
                let prefix = match ty {
                    Some(t) => format!("({})&{}", t, target),
                    None => format!("&{}", target),
                };
                match span {
                    Some(s) => format!("{} from {}", prefix, s),
                    None => prefix,
                }
            }
            other => other.to_string(),
        }
    }
}

/// Value equality ignores `Unknown` identity and split provenance; the
/// determinism contract is value equality, not identity equality.
impl PartialEq for AbstractValue {
    fn eq(&self, other: &Self) -> bool {
        use AbstractValue::*;
        match (self, other) {
            (
                Unknown { ty: a_ty, span: a_span, .. },
                Unknown { ty: b_ty, span: b_span, .. },
            ) => a_ty == b_ty && a_span == b_span,
            (
                Concrete { ty: a_ty, value: a, .. },
                Concrete { ty: b_ty, value: b, .. },
            ) => a_ty == b_ty && a == b,
            (
                PointerTo { ty: a_ty, region: a, .. },
                PointerTo { ty: b_ty, region: b, .. },
            ) => a_ty == b_ty && a == b,
            (Deallocated { span: a }, Deallocated { span: b }) => a == b,
            (
                Uninitialized { ty: a_ty, span: a_span },
                Uninitialized { ty: b_ty, span: b_span },
            ) => a_ty == b_ty && a_span == b_span,
            (Domain(a), Domain(b)) => a.dyn_eq(b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Display for AbstractValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractValue::Unknown { ty, span, .. } => match (ty, span) {
                (Some(t), Some(s)) => write!(f, "unknown {} from {}", t, s),
                (Some(t), None) => write!(f, "unknown {}", t),
                (None, Some(s)) => write!(f, "unknown value from {}", s),
                (None, None) => write!(f, "unknown value"),
            },
            AbstractValue::Concrete { ty, span, value, .. } => match span {
                Some(s) => write!(f, "({}){} from {}", ty, value, s),
                None => write!(f, "({}){}", ty, value),
            },
            AbstractValue::PointerTo { ty, span, region, .. } => {
                match ty {
                    Some(t) => write!(f, "({})&{}", t, region)?,
                    None => write!(f, "&{}", region)?,
                }
                if let Some(s) = span {
                    write!(f, " from {}", s)?;
                }
                Ok(())
            }
            AbstractValue::Deallocated { span } => match span {
                Some(s) => write!(f, "memory deallocated at {}", s),
                None => write!(f, "deallocated memory"),
            },
            AbstractValue::Uninitialized { span, .. } => {
                write!(f, "uninitialized data at {}", span::display_opt(*span))
            }
            AbstractValue::Domain(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn null_ptr() -> AbstractValue {
        AbstractValue::concrete(Ty::ptr(Ty::int()), None, 0)
    }

    #[test]
    fn test_is_null_ptr() {
        assert!(null_ptr().is_null_ptr());
        assert!(!AbstractValue::concrete(Ty::int(), None, 0).is_null_ptr());
        assert!(!AbstractValue::concrete(Ty::ptr(Ty::int()), None, 4).is_null_ptr());
    }

    #[test]
    fn test_unknown_equality_ignores_id() {
        let a = AbstractValue::Unknown {
            id: ValueId(1),
            ty: Some(Ty::int()),
            span: None,
        };
        let b = AbstractValue::Unknown {
            id: ValueId(2),
            ty: Some(Ty::int()),
            span: None,
        };
        assert_eq!(a, b);
        assert!(!a.same_identity(&b));
    }

    #[test]
    fn test_display_variants() {
        assert_eq!(
            AbstractValue::concrete(Ty::ptr(Ty::int()), Some(Span::new(3, 1)), 0).to_string(),
            "(int *)0 from 3:1"
        );
        assert_eq!(
            AbstractValue::Deallocated { span: None }.to_string(),
            "deallocated memory"
        );
        let unk = AbstractValue::Unknown {
            id: ValueId(0),
            ty: None,
            span: None,
        };
        assert_eq!(unk.to_string(), "unknown value");
    }

    #[test]
    fn test_display_with_region_name() {
        let mut regions = RegionStore::new();
        let r = regions.heap("obj", None);
        let v = AbstractValue::pointer_to(Some(Ty::ptr(Ty::strukt("Obj"))), None, r);
        assert_eq!(v.display_with(&regions), "(struct Obj *)&obj");
    }
}
