//! geocast-store: Document stores for `Geocast`
//!
//! The clustering kernel and the query service only need a small
//! document-store surface: insert, point lookup, guarded field update,
//! bulk update by id, count and bounded scan, with predicates built from
//! equality, range, set membership and conjunction.
//!
//! # Architecture
//!
//! - [`Document`]: a record type plus its indexed fields and patch type
//! - [`Predicate`]: filters over indexed fields
//! - [`Collection`]: the backend trait, one instance per record type
//! - [`Store`]: the explicitly constructed handle that owns both collections
//!
//! # Example
//!
//! ```
//! use geocast_store::{Predicate, Store, StreamField};
//! use geocast_types::StreamStatus;
//!
//! let store = Store::in_memory();
//! let live = Predicate::eq(StreamField::Status, StreamStatus::Live);
//! assert_eq!(store.streams().count_where(&live).unwrap(), 0);
//! store.shutdown();
//! ```

use std::sync::Arc;

use geocast_config::{StoreBackend, StoreConfig};
use geocast_types::{Event, Stream};

mod collection;
mod document;
mod memory;
mod predicate;
mod value;


pub use collection::Collection;
pub use document::{Document, EventField, EventPatch, StreamField, StreamPatch};
pub use memory::MemoryCollection;
pub use predicate::Predicate;
pub use value::Value;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by store backends.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend cannot serve requests (I/O failure, shut down, poisoned).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("duplicate {collection} id: {id}")]
    DuplicateKey {
        collection: &'static str,
        id: String,
    },
}

/// Handle to the stream and event collections.
///
/// Cheap to clone; clones share the same collections. Build one at startup
/// and pass it to the kernel and the query service.
#[derive(Clone)]
pub struct Store {
    streams: Arc<dyn Collection<Stream>>,
    events: Arc<dyn Collection<Event>>,
}

impl Store {
    /// Wraps caller-provided backends.
    pub fn new(streams: Arc<dyn Collection<Stream>>, events: Arc<dyn Collection<Event>>) -> Self {
        Self { streams, events }
    }

    /// Creates an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryCollection::<Stream>::new()),
            Arc::new(MemoryCollection::<Event>::new()),
        )
    }

    /// Opens the backend selected by `config`.
    pub fn open(config: &StoreConfig) -> Self {
        match config.backend {
            StoreBackend::Memory => {
                tracing::debug!("opening in-memory store");
                Self::in_memory()
            }
        }
    }

    pub fn streams(&self) -> &dyn Collection<Stream> {
        self.streams.as_ref()
    }

    pub fn events(&self) -> &dyn Collection<Event> {
        self.events.as_ref()
    }

    /// Closes both collections. Every later operation on this handle or its
    /// clones fails with [`StoreError::Unavailable`].
    pub fn shutdown(&self) {
        self.streams.close();
        self.events.close();
        tracing::debug!("store shut down");
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}
