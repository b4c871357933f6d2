//! The collection trait every backend implements.

use crate::Result;
use crate::document::Document;
use crate::predicate::Predicate;

/// A document collection with indexed range scans.
///
/// Scans return documents in insertion order; callers that need a stable
/// "arrival order" rely on this.
///
/// Implementations must be safe to share across request threads. No
/// operation spans more than one call: there are no multi-call
/// transactions.
pub trait Collection<D: Document>: Send + Sync {
    /// Inserts a new document.
    ///
    /// # Errors
    ///
    /// [`crate::StoreError::DuplicateKey`] if a document with the same id exists.
    fn insert(&self, doc: D) -> Result<()>;

    fn find_by_id(&self, id: &D::Id) -> Result<Option<D>>;

    /// Applies `patch` to the document `id` if it currently matches `guard`.
    ///
    /// The check and the write are atomic. Returns the updated document, or
    /// `None` when the id is unknown or the guard did not match.
    fn update_if(
        &self,
        id: &D::Id,
        guard: &Predicate<D::Field>,
        patch: &D::Patch,
    ) -> Result<Option<D>>;

    /// Applies `patch` to every listed document that exists. Returns the
    /// number of documents updated.
    fn update_many_by_ids(&self, ids: &[D::Id], patch: &D::Patch) -> Result<usize>;

    fn count_where(&self, predicate: &Predicate<D::Field>) -> Result<usize>;

    /// Returns up to `limit` matching documents in insertion order.
    fn find_where(&self, predicate: &Predicate<D::Field>, limit: usize) -> Result<Vec<D>>;

    /// Releases the backend. Later calls fail with `StoreError::Unavailable`.
    fn close(&self) {}

    /// Applies `patch` to the document `id` unconditionally.
    fn update_fields(&self, id: &D::Id, patch: &D::Patch) -> Result<Option<D>> {
        self.update_if(id, &Predicate::All, patch)
    }
}
