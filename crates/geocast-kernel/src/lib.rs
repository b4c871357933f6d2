//! # geocast-kernel: Event clustering for `Geocast`
//!
//! Decides which concurrent, co-located streams form an event and keeps each
//! event's aggregate (centroid, stream count, status) in line with its live
//! members.
//!
//! ## Key Principles
//!
//! - **Pure planning**: [`kernel`] turns a stream and its neighbors into a
//!   [`Decision`] plus [`Effect`]s without touching the store or the clock
//! - **Imperative shell**: [`ClusterEngine`] reads candidates, calls the
//!   planner, and hands the effects to the [`Runtime`]
//! - **Recompute, never patch**: an event's centroid and count are always
//!   derived from its current live members
//!
//! ## Architecture
//!
//! - [`effects`]: store writes for the runtime to execute
//! - [`kernel`]: neighbor selection, assignment planning, aggregation, end handling
//! - [`runtime`]: executes effects against a [`geocast_store::Store`]
//! - [`engine`]: stream-created and stream-ended handlers
//! - [`cell_lock`]: spatial-cell locks serializing overlapping passes
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use geocast_config::ClusterConfig;
//! use geocast_kernel::ClusterEngine;
//! use geocast_store::Store;
//! use geocast_types::{
//!     DeviceCamera, GeoPoint, PrivacyMode, Stream, StreamId, SystemClock, Timestamp, UserId,
//! };
//!
//! let store = Store::in_memory();
//! let engine =
//!     ClusterEngine::new(store.clone(), Arc::new(SystemClock), ClusterConfig::default()).unwrap();
//!
//! let stream = Stream::new(
//!     StreamId::generate(),
//!     UserId::from("ana"),
//!     GeoPoint::new(40.7580, -73.9855),
//!     PrivacyMode::Exact,
//!     DeviceCamera::Back,
//!     Timestamp::now(),
//! );
//! store.streams().insert(stream.clone()).unwrap();
//! assert_eq!(engine.on_stream_created(&stream).unwrap(), None);
//! ```

pub mod cell_lock;
pub mod effects;
pub mod engine;
pub mod kernel;
pub mod runtime;


pub use cell_lock::{CellGuard, CellLocks};
pub use effects::Effect;
pub use engine::{ClusterEngine, KernelError, StreamEnded};
pub use kernel::{Aggregate, Decision, aggregate, plan_after_end, plan_assignment, select_neighbors};
pub use runtime::{Runtime, RuntimeError};
