//! Error taxonomy surfaced to callers of the SDK.

use geocast_config::ConfigError;
use geocast_geo::GeoError;
use geocast_kernel::{KernelError, RuntimeError};
use geocast_query::QueryError;
use geocast_store::StoreError;
use geocast_types::Timestamp;

/// Result type for Geocast operations.
pub type Result<T> = std::result::Result<T, GeocastError>;

/// Every failure a Geocast operation can report.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GeocastError {
    /// The referenced stream or event does not exist, or the stream has
    /// already ended.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid time range: from {from} is after to {to}")]
    InvalidRange { from: Timestamp, to: Timestamp },

    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// The backing store failed. Not retried.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The instance was built from a configuration that fails validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GeocastError {
    /// Stable snake_case name of the variant, for wire formats.
    pub fn kind(&self) -> &'static str {
        match self {
            GeocastError::NotFound(_) => "not_found",
            GeocastError::InvalidRange { .. } => "invalid_range",
            GeocastError::InvalidBoundingBox(_) => "invalid_bounding_box",
            GeocastError::StoreUnavailable(_) => "store_unavailable",
            GeocastError::InvalidConfig(_) => "invalid_config",
        }
    }
}

impl From<ConfigError> for GeocastError {
    fn from(err: ConfigError) -> Self {
        GeocastError::InvalidConfig(err.to_string())
    }
}

impl From<StoreError> for GeocastError {
    fn from(err: StoreError) -> Self {
        GeocastError::StoreUnavailable(err.to_string())
    }
}

impl From<GeoError> for GeocastError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::InvalidBoundingBox(reason) => GeocastError::InvalidBoundingBox(reason),
        }
    }
}

impl From<KernelError> for GeocastError {
    fn from(err: KernelError) -> Self {
        match err {
            KernelError::StreamNotFound(id) => {
                GeocastError::NotFound(format!("stream {id} not found or already ended"))
            }
            KernelError::Store(err) | KernelError::Runtime(RuntimeError::Store(err)) => err.into(),
            KernelError::InvalidConfig(reason) => GeocastError::InvalidConfig(reason),
        }
    }
}

impl From<QueryError> for GeocastError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidRange { from, to } => GeocastError::InvalidRange { from, to },
            QueryError::InvalidBoundingBox(err) => err.into(),
            QueryError::EventNotFound(id) => GeocastError::NotFound(format!("event {id} not found")),
            QueryError::Store(err) => err.into(),
        }
    }
}
