//! Domain model for annotated map points.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the shared baseline catalog separate from per-identity state.
//!
//! # Invariants
//! - Every point is identified by a stable `PointId`.
//! - No point with invalid fields ever enters the model.

pub mod catalog;
pub mod point;
