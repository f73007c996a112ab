//! Region model: abstract names for disjoint pieces of storage
//!
//! Regions form a forest (globals, stack frames, heap allocations, string
//! constants, with field/element children). They are arena-allocated and
//! addressed by stable `RegionId` handles; hash/equality are on the handle,
//! and the memoized child map guarantees that two lookups of the same logical
//! sub-location yield the same handle.
//!
//! Regions are immutable once created except for the lazily populated child
//! map; there is no removal operation. The arena lives for the analysis of
//! one function invocation.

use crate::features::ir::domain::DeclId;
use crate::shared::models::Span;
use rustc_hash::FxHashMap;
use std::fmt;

/// Stable handle for a region; ids are allocated monotonically, so ordering
/// by handle is creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

/// What kind of storage a region names
#[derive(Debug, Clone, PartialEq)]
pub enum RegionKind {
    /// Synthetic root of the region forest
    Root,
    /// .data/.bss storage of a global, keyed by its declaration
    Global { decl: DeclId },
    /// Stack storage (frames and the variables within them)
    Stack,
    /// Heap storage, keyed by the allocating statement's location
    Heap { alloc_span: Option<Span> },
    /// Storage backing a string literal
    StringConstant { text: String },
    /// Field/element sub-location, or a fresh region conjured by a split
    Plain,
}

/// Key into a region's memoized child map
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ChildKey {
    Field(String),
    Element(i64),
}

#[derive(Debug, Clone)]
struct RegionRecord {
    name: String,
    kind: RegionKind,
    parent: Option<RegionId>,
    children: FxHashMap<ChildKey, RegionId>,
}

/// Arena of all regions materialized during one function analysis
#[derive(Debug, Clone, Default)]
pub struct RegionStore {
    records: Vec<RegionRecord>,
}

impl RegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, name: String, kind: RegionKind, parent: Option<RegionId>) -> RegionId {
        let id = RegionId(self.records.len() as u32);
        self.records.push(RegionRecord {
            name,
            kind,
            parent,
            children: FxHashMap::default(),
        });
        id
    }

    pub fn root(&mut self) -> RegionId {
        self.add("root".to_string(), RegionKind::Root, None)
    }

    pub fn global(&mut self, decl: DeclId, name: &str) -> RegionId {
        self.add(name.to_string(), RegionKind::Global { decl }, None)
    }

    pub fn stack(&mut self, name: impl Into<String>, parent: Option<RegionId>) -> RegionId {
        self.add(name.into(), RegionKind::Stack, parent)
    }

    /// Fresh heap region; one per allocating call, never memoized
    pub fn heap(&mut self, name: impl Into<String>, alloc_span: Option<Span>) -> RegionId {
        self.add(name.into(), RegionKind::Heap { alloc_span }, None)
    }

    /// Fresh region backing a string literal; never memoized
    pub fn string_constant(&mut self, text: &str) -> RegionId {
        self.add(
            format!("\"{}\"", text),
            RegionKind::StringConstant {
                text: text.to_string(),
            },
            None,
        )
    }

    /// Fresh unconstrained region, used when a split conjures a non-NULL
    /// pointer target out of an unknown value
    pub fn fresh(&mut self) -> RegionId {
        let id = self.records.len() as u32;
        self.add(format!("heap-region-{}", id), RegionKind::Plain, None)
    }

    /// Memoized field sub-location: `parent.field`
    pub fn field_child(&mut self, parent: RegionId, field: &str) -> RegionId {
        let key = ChildKey::Field(field.to_string());
        if let Some(&child) = self.records[parent.0 as usize].children.get(&key) {
            return child;
        }
        let name = format!("{}.{}", self.records[parent.0 as usize].name, field);
        let child = self.add(name, RegionKind::Plain, Some(parent));
        self.records[parent.0 as usize].children.insert(key, child);
        child
    }

    /// Already-materialized field sub-location, without creating one
    pub fn existing_field_child(&self, parent: RegionId, field: &str) -> Option<RegionId> {
        self.records[parent.0 as usize]
            .children
            .get(&ChildKey::Field(field.to_string()))
            .copied()
    }

    /// Memoized array-element sub-location: `parent[index]`
    pub fn element_child(&mut self, parent: RegionId, index: i64) -> RegionId {
        let key = ChildKey::Element(index);
        if let Some(&child) = self.records[parent.0 as usize].children.get(&key) {
            return child;
        }
        let name = format!("{}[{}]", self.records[parent.0 as usize].name, index);
        let child = self.add(name, RegionKind::Plain, Some(parent));
        self.records[parent.0 as usize].children.insert(key, child);
        child
    }

    pub fn contains(&self, id: RegionId) -> bool {
        (id.0 as usize) < self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn name(&self, id: RegionId) -> &str {
        &self.records[id.0 as usize].name
    }

    pub fn kind(&self, id: RegionId) -> &RegionKind {
        &self.records[id.0 as usize].kind
    }

    pub fn parent(&self, id: RegionId) -> Option<RegionId> {
        self.records[id.0 as usize].parent
    }

    /// True if the region or any ancestor is stack storage
    pub fn is_on_stack(&self, id: RegionId) -> bool {
        let mut cur = Some(id);
        while let Some(r) = cur {
            if matches!(self.records[r.0 as usize].kind, RegionKind::Stack) {
                return true;
            }
            cur = self.records[r.0 as usize].parent;
        }
        false
    }
}
