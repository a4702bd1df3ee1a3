//! # Catalog (area → type → documents)
//!
//! The browsable hierarchy is always derived, never stored: [`Catalog::build`]
//! is a pure function of the document list. Areas and types are kept in
//! sorted maps so listings are stable; documents inside a bucket keep
//! manifest order.
//!
//! Every document lands in exactly one `(area, type)` bucket, so
//!
//! - a type's `count` is the length of its document list,
//! - an area's `count` is the sum of its types' counts,
//! - the catalog's `total` is the sum of the area counts.
//!
//! A catalog is immutable once built. Consumers hold it behind an `Arc` and a
//! rebuild swaps in a whole new value.

use crate::model::DocumentRecord;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeNode {
    pub count: usize,
    pub documents: Vec<DocumentRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaNode {
    pub count: usize,
    pub types: BTreeMap<String, TypeNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub total: usize,
    pub areas: BTreeMap<String, AreaNode>,
}

impl Catalog {
    pub fn build(documents: &[DocumentRecord]) -> Self {
        let mut catalog = Catalog::default();
        for doc in documents {
            let area = catalog.areas.entry(doc.area.clone()).or_default();
            let bucket = area.types.entry(doc.kind.clone()).or_default();
            bucket.documents.push(doc.clone());
            bucket.count += 1;
            area.count += 1;
            catalog.total += 1;
        }
        catalog
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn area(&self, name: &str) -> Option<&AreaNode> {
        self.areas.get(name)
    }

    pub fn bucket(&self, area: &str, kind: &str) -> Option<&TypeNode> {
        self.areas.get(area).and_then(|a| a.types.get(kind))
    }

    /// All documents, area by area and type by type.
    pub fn documents(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.areas
            .values()
            .flat_map(|a| a.types.values())
            .flat_map(|t| t.documents.iter())
    }
}
