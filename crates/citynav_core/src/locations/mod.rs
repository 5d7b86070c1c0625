//! Location-set synchronization: merge, dedup, persistence, observation.
//!
//! # Responsibility
//! - Keep one identity's visible point set consistent across the shared
//!   baseline catalog, in-memory mutations and the key-value backend.
//!
//! # Invariants
//! - Baseline entries are immutable and never persisted.
//! - Every successful mutation is followed by a synchronous persistence
//!   write and observer notification.

pub mod codec;
pub mod store;
