//! Symbolic memory model: regions and abstract values

pub mod domain;
pub mod ports;

pub use domain::{AbstractValue, RegionId, RegionKind, RegionStore, ValueId};
pub use ports::DomainValue;
