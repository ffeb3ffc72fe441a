//! Domain model for cycle tracking.
//!
//! # Responsibility
//! - Define the persisted cycle entry shape and its vocabularies.
//! - Own the canonical `YYYY-MM-DD` date value used as storage and sort key.
//!
//! # Invariants
//! - At most one entry exists per (user, date).
//! - `period_start` and `period_end` markers are independent of each other.

pub mod date;
pub mod entry;
pub mod profile;
