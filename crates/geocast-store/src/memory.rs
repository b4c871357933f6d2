//! In-memory collection backend.
//!
//! Documents live in a `Vec` (insertion order) with a hash index from id to
//! slot. Everything sits behind one `RwLock`, so each trait call is atomic
//! with respect to the others.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::collection::Collection;
use crate::document::Document;
use crate::predicate::Predicate;
use crate::{Result, StoreError};

struct Inner<D: Document> {
    docs: Vec<D>,
    index: HashMap<D::Id, usize>,
}

/// A collection held entirely in process memory.
///
/// Not suitable for production - data is lost on restart.
pub struct MemoryCollection<D: Document> {
    inner: RwLock<Inner<D>>,
    closed: AtomicBool,
}

impl<D: Document> MemoryCollection<D> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                docs: Vec::new(),
                index: HashMap::new(),
            }),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of documents, regardless of state.
    pub fn len(&self) -> usize {
        self.read().map_or(0, |inner| inner.docs.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable(format!(
                "{} collection is closed",
                D::COLLECTION
            )));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner<D>>> {
        self.ensure_open()?;
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable(format!("{} lock poisoned", D::COLLECTION)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner<D>>> {
        self.ensure_open()?;
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable(format!("{} lock poisoned", D::COLLECTION)))
    }
}

impl<D: Document> Default for MemoryCollection<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Document> Collection<D> for MemoryCollection<D> {
    fn insert(&self, doc: D) -> Result<()> {
        let mut inner = self.write()?;
        if inner.index.contains_key(doc.id()) {
            return Err(StoreError::DuplicateKey {
                collection: D::COLLECTION,
                id: doc.id().to_string(),
            });
        }
        let slot = inner.docs.len();
        inner.index.insert(doc.id().clone(), slot);
        inner.docs.push(doc);
        Ok(())
    }

    fn find_by_id(&self, id: &D::Id) -> Result<Option<D>> {
        let inner = self.read()?;
        Ok(inner.index.get(id).map(|&slot| inner.docs[slot].clone()))
    }

    fn update_if(
        &self,
        id: &D::Id,
        guard: &Predicate<D::Field>,
        patch: &D::Patch,
    ) -> Result<Option<D>> {
        let mut inner = self.write()?;
        let Some(&slot) = inner.index.get(id) else {
            return Ok(None);
        };
        let doc = &mut inner.docs[slot];
        if !guard.matches(doc) {
            return Ok(None);
        }
        doc.apply(patch);
        Ok(Some(doc.clone()))
    }

    fn update_many_by_ids(&self, ids: &[D::Id], patch: &D::Patch) -> Result<usize> {
        let mut inner = self.write()?;
        let mut slots: Vec<usize> = ids
            .iter()
            .filter_map(|id| inner.index.get(id).copied())
            .collect();
        slots.sort_unstable();
        slots.dedup();
        for &slot in &slots {
            inner.docs[slot].apply(patch);
        }
        Ok(slots.len())
    }

    fn count_where(&self, predicate: &Predicate<D::Field>) -> Result<usize> {
        let inner = self.read()?;
        Ok(inner.docs.iter().filter(|d| predicate.matches(*d)).count())
    }

    fn find_where(&self, predicate: &Predicate<D::Field>, limit: usize) -> Result<Vec<D>> {
        let inner = self.read()?;
        Ok(inner
            .docs
            .iter()
            .filter(|d| predicate.matches(*d))
            .take(limit)
            .cloned()
            .collect())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
