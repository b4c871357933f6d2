//! # Geocast
//!
//! Clusters live-location broadcasts into shared events when broadcasters are
//! physically together, and serves geo-bounded queries over both.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Geocast                            │
//! │  ┌──────────┐   ┌────────────┐   ┌─────────┐   ┌──────────┐  │
//! │  │  Stream  │ → │   Kernel   │ → │  Store  │ → │  Query   │  │
//! │  │ (create) │   │ (cluster)  │   │ (docs)  │   │ (masked) │  │
//! │  └──────────┘   └────────────┘   └─────────┘   └──────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use geocast::{Geocast, GeocastConfig, NewStream};
//!
//! let geocast = Geocast::in_memory(GeocastConfig::default()).unwrap();
//! let view = geocast.create_stream(NewStream::new("ana", 41.0082, 28.9784)).unwrap();
//! geocast.end_stream(view.id).unwrap();
//! ```
//!
//! # Modules
//!
//! - **SDK Layer**: [`Geocast`], [`NewStream`], [`GeocastError`]
//! - **Foundation**: ids, records and the [`Clock`] seam
//! - **Views**: [`StreamView`], [`EventView`], [`EventDetail`]

mod error;
mod geocast;
mod stream;


// SDK Layer - Main API
pub use error::{GeocastError, Result};
pub use geocast::Geocast;
pub use stream::{NewStream, StreamEnd};

// Re-export core types
pub use geocast_types::{
    Clock, DeviceCamera, Event, EventId, EventStatus, GeoPoint, ManualClock, PrivacyMode, Stream,
    StreamId, StreamStatus, SystemClock, Timestamp, UserId,
};

// Re-export configuration
pub use geocast_config::{ClusterConfig, GeocastConfig, QueryConfig, StoreConfig};

// Re-export geo utilities
pub use geocast_geo::{BoundingBox, distance};

// Re-export views
pub use geocast_query::{EventDetail, EventView, StreamView};

// Re-export the store handle
pub use geocast_store::Store;
