// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type metadata registry.
//!
//! Accumulates, per type id, the union of every field ever written for the
//! type. Entries are copy-on-write `Arc` snapshots in a `DashMap`: readers
//! clone an `Arc`, writers merge under the map entry so concurrent
//! registrations of different layouts always end up with the union of their
//! fields.

use crate::error::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Name and last-seen value type of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    pub name: String,
    pub type_name: String,
}

/// Everything known about one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMetadata {
    pub type_id: u32,
    pub type_name: String,
    pub fields: BTreeMap<u32, FieldMeta>,
    pub schemas: BTreeSet<u32>,
}

impl TypeMetadata {
    pub fn new(type_id: u32, type_name: impl Into<String>) -> Self {
        Self {
            type_id,
            type_name: type_name.into(),
            fields: BTreeMap::new(),
            schemas: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_field(
        mut self,
        field_id: u32,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        self.fields.insert(
            field_id,
            FieldMeta {
                name: name.into(),
                type_name: type_name.into(),
            },
        );
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema_id: u32) -> Self {
        self.schemas.insert(schema_id);
        self
    }

    pub fn field_name(&self, field_id: u32) -> Option<&str> {
        self.fields.get(&field_id).map(|f| f.name.as_str())
    }

    /// Merge `update` into a copy of `self`.
    ///
    /// Returns `Ok(None)` when `update` adds nothing. A field id already
    /// known under another name is a collision and nothing is merged.
    fn merge(&self, update: &TypeMetadata) -> Result<Option<TypeMetadata>> {
        for (field_id, field) in &update.fields {
            if let Some(existing) = self.fields.get(field_id) {
                if existing.name != field.name {
                    log::error!(
                        "[registry] field id collision in '{}': '{}' and '{}' both map to {:#010x}",
                        self.type_name,
                        existing.name,
                        field.name,
                        field_id
                    );
                    return Err(Error::FieldIdCollision {
                        type_id: self.type_id,
                        field_id: *field_id,
                        existing: existing.name.clone(),
                        conflicting: field.name.clone(),
                    });
                }
            }
        }

        if update.type_name != self.type_name {
            log::warn!(
                "[registry] type {:#010x} registered as '{}' and '{}'",
                self.type_id,
                self.type_name,
                update.type_name
            );
        }

        let mut merged: Option<TypeMetadata> = None;
        for (field_id, field) in &update.fields {
            match self.fields.get(field_id) {
                Some(existing) if existing.type_name == field.type_name => {}
                Some(existing) => {
                    log::warn!(
                        "[registry] field '{}' of '{}' changed type {} -> {}",
                        field.name,
                        self.type_name,
                        existing.type_name,
                        field.type_name
                    );
                    merged
                        .get_or_insert_with(|| self.clone())
                        .fields
                        .insert(*field_id, field.clone());
                }
                None => {
                    merged
                        .get_or_insert_with(|| self.clone())
                        .fields
                        .insert(*field_id, field.clone());
                }
            }
        }
        for schema_id in &update.schemas {
            if !self.schemas.contains(schema_id) {
                merged
                    .get_or_insert_with(|| self.clone())
                    .schemas
                    .insert(*schema_id);
            }
        }
        Ok(merged)
    }
}

/// Sink and source of type metadata outside one registry.
///
/// Implementations back metadata with whatever store is shared between the
/// processes reading and writing a type.
pub trait MetadataHandler: Send + Sync {
    /// Called with the new snapshot whenever a registration changed it.
    fn add_meta(&self, type_id: u32, meta: &TypeMetadata);

    /// Metadata for a type this registry has not seen.
    fn metadata(&self, type_id: u32) -> Option<TypeMetadata>;
}

/// Handler that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetadataHandler;

impl MetadataHandler for NoopMetadataHandler {
    fn add_meta(&self, _type_id: u32, _meta: &TypeMetadata) {}

    fn metadata(&self, _type_id: u32) -> Option<TypeMetadata> {
        None
    }
}

/// In-memory handler; share one instance (behind an `Arc`) between several
/// marshallers to give them common metadata.
#[derive(Debug, Default)]
pub struct InMemoryMetadataHandler {
    store: DashMap<u32, TypeMetadata>,
}

impl InMemoryMetadataHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl MetadataHandler for InMemoryMetadataHandler {
    fn add_meta(&self, type_id: u32, meta: &TypeMetadata) {
        match self.store.entry(type_id) {
            // A conflicting name is logged by `merge` and refused.
            Entry::Occupied(mut entry) => {
                if let Ok(Some(merged)) = entry.get().merge(meta) {
                    entry.insert(merged);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(meta.clone());
            }
        }
    }

    fn metadata(&self, type_id: u32) -> Option<TypeMetadata> {
        self.store.get(&type_id).map(|m| m.value().clone())
    }
}

/// Concurrent registry of [`TypeMetadata`] keyed by type id.
pub struct MetadataRegistry {
    types: DashMap<u32, Arc<TypeMetadata>>,
    handler: Arc<dyn MetadataHandler>,
}

impl MetadataRegistry {
    pub fn new(handler: Arc<dyn MetadataHandler>) -> Self {
        Self {
            types: DashMap::new(),
            handler,
        }
    }

    /// Merge `update` into the metadata of `update.type_id`.
    ///
    /// Idempotent; returns the current snapshot. When `update` carries a
    /// field id unknown locally, the handler's metadata is merged first so
    /// collisions with names published elsewhere are caught. On a field id
    /// collision nothing from `update` is applied.
    pub fn register(&self, update: TypeMetadata) -> Result<Arc<TypeMetadata>> {
        let type_id = update.type_id;

        let adds_fields = match self.types.get(&type_id) {
            Some(local) => update.fields.keys().any(|id| !local.fields.contains_key(id)),
            None => true,
        };
        if adds_fields {
            self.sync_from_handler(type_id)?;
        }

        let (snapshot, changed) = match self.types.entry(type_id) {
            Entry::Occupied(mut entry) => match entry.get().merge(&update)? {
                Some(merged) => {
                    let merged = Arc::new(merged);
                    entry.insert(Arc::clone(&merged));
                    (merged, true)
                }
                None => (Arc::clone(entry.get()), false),
            },
            Entry::Vacant(entry) => {
                log::debug!(
                    "[registry] new type '{}' ({:#010x}) with {} field(s)",
                    update.type_name,
                    type_id,
                    update.fields.len()
                );
                let snapshot = Arc::new(update);
                entry.insert(Arc::clone(&snapshot));
                (snapshot, true)
            }
        };

        if changed {
            self.handler.add_meta(type_id, &snapshot);
        }
        Ok(snapshot)
    }

    /// Merge the handler's current metadata of `type_id` into the local
    /// entry and return the result.
    ///
    /// Picks up fields other marshallers published after this registry
    /// first saw the type. The handler is never called under a map lock.
    pub fn refresh(&self, type_id: u32) -> Result<Option<Arc<TypeMetadata>>> {
        self.sync_from_handler(type_id)?;
        Ok(self.types.get(&type_id).map(|meta| Arc::clone(meta.value())))
    }

    fn sync_from_handler(&self, type_id: u32) -> Result<()> {
        let Some(remote) = self.handler.metadata(type_id) else {
            return Ok(());
        };
        match self.types.entry(type_id) {
            Entry::Occupied(mut entry) => {
                if let Some(merged) = entry.get().merge(&remote)? {
                    log::debug!(
                        "[registry] merged handler metadata of '{}' ({:#010x})",
                        merged.type_name,
                        type_id
                    );
                    entry.insert(Arc::new(merged));
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(remote));
            }
        }
        Ok(())
    }

    /// Metadata of `type_id`, asking the handler when unknown locally.
    pub fn lookup(&self, type_id: u32) -> Option<Arc<TypeMetadata>> {
        if let Some(meta) = self.types.get(&type_id) {
            return Some(Arc::clone(meta.value()));
        }
        let remote = self.handler.metadata(type_id)?;
        log::debug!(
            "[registry] loaded '{}' ({:#010x}) from metadata handler",
            remote.type_name,
            type_id
        );
        let entry = self
            .types
            .entry(type_id)
            .or_insert_with(|| Arc::new(remote));
        Some(Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn type_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.types.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }
}

impl std::fmt::Debug for MetadataRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataRegistry")
            .field("types", &self.types.len())
            .finish_non_exhaustive()
    }
}
