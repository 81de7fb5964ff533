// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object schemas and the concurrent `(type, schema)` LRU cache.
//!
//! A [`Schema`] is the ordered list of field ids of one concrete layout. Its
//! id is stored in every object header, so a reader that has seen the
//! layout before can find a field's footer slot without scanning.

use crate::ids;
use lru::LruCache;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Schemas at or below this size are searched linearly.
const INDEXED_SCHEMA_THRESHOLD: usize = 8;

/// Immutable ordered field id list.
#[derive(Debug, Clone)]
pub struct Schema {
    id: u32,
    field_ids: Arc<[u32]>,
    index: Option<HashMap<u32, usize>>,
}

impl Schema {
    pub fn new(field_ids: Vec<u32>) -> Self {
        let id = ids::schema_id(&field_ids);
        let index = (field_ids.len() > INDEXED_SCHEMA_THRESHOLD).then(|| {
            field_ids
                .iter()
                .enumerate()
                .map(|(pos, id)| (*id, pos))
                .collect()
        });
        Self {
            id,
            field_ids: field_ids.into(),
            index,
        }
    }

    /// Schema claiming `id` regardless of its field ids.
    #[cfg(test)]
    pub(crate) fn with_id(id: u32, field_ids: Vec<u32>) -> Self {
        Self {
            id,
            ..Self::new(field_ids)
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn field_ids(&self) -> &[u32] {
        &self.field_ids
    }

    pub fn len(&self) -> usize {
        self.field_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_ids.is_empty()
    }

    /// Footer slot of `field_id` in this layout.
    pub fn order(&self, field_id: u32) -> Option<usize> {
        match &self.index {
            Some(index) => index.get(&field_id).copied(),
            None => self.field_ids.iter().position(|id| *id == field_id),
        }
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.field_ids == other.field_ids
    }
}

impl Eq for Schema {}

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
}

impl LookupStats {
    pub(crate) fn record_hit(&mut self) {
        self.hits = self.hits.saturating_add(1);
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses = self.misses.saturating_add(1);
    }
}

/// Bounded LRU of schemas keyed by `(type_id, schema_id)`.
///
/// Lookups take the read lock and `peek`, then promote the hit when the
/// write lock is free; a hit that loses the race is not promoted. Insertion
/// always takes the write lock. Entries are shared as `Arc<Schema>`.
pub struct SchemaCache {
    inner: RwLock<LruCache<(u32, u32), Arc<Schema>>>,
    stats: RwLock<LookupStats>,
}

impl SchemaCache {
    /// Cache holding at most `capacity` schemas (a capacity of 0 holds one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: RwLock::new(LruCache::new(capacity)),
            stats: RwLock::new(LookupStats::default()),
        }
    }

    /// Cached schema for `(type_id, schema_id)`, recording a hit or miss.
    pub fn get(&self, type_id: u32, schema_id: u32) -> Option<Arc<Schema>> {
        let key = (type_id, schema_id);
        let hit = self.inner.read().peek(&key).map(Arc::clone);
        if hit.is_some() {
            if let Some(mut cache) = self.inner.try_write() {
                cache.promote(&key);
            }
            self.stats.write().record_hit();
        } else {
            self.stats.write().record_miss();
        }
        hit
    }

    /// Insert `schema` for `type_id`, returning the shared entry.
    ///
    /// If an equal entry is already cached it is kept (and promoted).
    pub fn insert(&self, type_id: u32, schema: Schema) -> Arc<Schema> {
        let key = (type_id, schema.id());
        let mut cache = self.inner.write();
        if let Some(existing) = cache.get(&key) {
            if **existing != schema {
                log::warn!(
                    "[schema-cache] schema id {:#010x} of type {:#010x} maps to two layouts, keeping the first",
                    key.1,
                    type_id
                );
            }
            return Arc::clone(existing);
        }
        log::debug!(
            "[schema-cache] new schema {:#010x} for type {:#010x} ({} fields)",
            key.1,
            type_id,
            schema.len()
        );
        let schema = Arc::new(schema);
        cache.put(key, Arc::clone(&schema));
        schema
    }

    /// Cached schema, or `build()` it and insert the result.
    pub fn get_or_insert_with<F>(&self, type_id: u32, schema_id: u32, build: F) -> Arc<Schema>
    where
        F: FnOnce() -> Schema,
    {
        if let Some(hit) = self.get(type_id, schema_id) {
            return hit;
        }
        self.insert(type_id, build())
    }

    /// Overwrite the entry for `(type_id, schema.id())`.
    #[cfg(test)]
    pub(crate) fn replace(&self, type_id: u32, schema: Schema) {
        self.inner
            .write()
            .put((type_id, schema.id()), Arc::new(schema));
    }

    pub fn contains(&self, type_id: u32, schema_id: u32) -> bool {
        self.inner.read().contains(&(type_id, schema_id))
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().cap().get()
    }

    #[must_use]
    pub fn stats(&self) -> LookupStats {
        *self.stats.read()
    }
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("stats", &self.stats())
            .finish()
    }
}
