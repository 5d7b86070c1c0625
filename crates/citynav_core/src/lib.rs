//! Core domain logic for CityNav.
//! This crate is the single source of truth for business invariants.

pub mod account;
pub mod db;
pub mod kv;
pub mod locations;
pub mod logging;
pub mod model;
pub mod route;

pub use account::{AccountError, AccountResult, AccountService};
pub use kv::{KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore};
pub use locations::codec::{CodecError, CodecResult};
pub use locations::store::{
    AddOutcome, ChangeKind, LocationStore, ObserverId, StoreChange, StoreError, StoreObserver,
    StoreResult,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::catalog::Catalog;
pub use model::point::{
    AnnotatedPoint, Coordinate, PointId, PointValidationError, COORDINATE_EPSILON,
};
pub use route::{NavigationSession, RouteError, RoutePlan, RouteRequest, RouteService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
