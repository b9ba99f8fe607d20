// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Opt-in descriptor extraction for Rust types, performed once per type.

use crate::descriptor::TypeDescriptor;
use crate::error::SchemaError;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, instrument};

/// Implemented by types that can describe their own member surface.
///
/// This is the reflection seam: a type (or a marker standing in for a trait
/// object) lists its methods, properties, and fields once, and every mock of
/// it is built from that description.
pub trait Describe {
    /// Produce the type's descriptor.
    fn describe() -> Result<TypeDescriptor, SchemaError>;
}

/// Shared store of extracted descriptors keyed by Rust type.
///
/// Extraction runs at most once per type; later lookups hand out clones of the
/// same `Arc`. Descriptors are immutable, so readers never contend on anything
/// but the map itself.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
}

impl DescriptorCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached descriptor for `T`, extracting it on first use.
    #[instrument(level = "debug", skip(self), fields(ty = std::any::type_name::<T>()))]
    pub fn get<T: Describe + 'static>(&self) -> Result<Arc<TypeDescriptor>, SchemaError> {
        let key = TypeId::of::<T>();
        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(hit));
        }

        let described = Arc::new(T::describe()?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have won the race; keep the first descriptor.
        let entry = entries.entry(key).or_insert_with(|| {
            debug!(type_name = described.name(), members = described.len(), "descriptor extracted");
            Arc::clone(&described)
        });
        Ok(Arc::clone(entry))
    }

    /// Whether `T` has already been extracted.
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }

    /// Number of cached descriptors.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been extracted yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
