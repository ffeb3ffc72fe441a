//! Entry store adapter and profile persistence.
//!
//! # Responsibility
//! - Define the typed store contracts the engine and services consume.
//! - Keep SQL details out of the engine and service layers.
//!
//! # Invariants
//! - No business logic lives here; writes are plain upserts/deletes.
//! - Reads reject invalid persisted data instead of masking it.

pub mod entry_repo;
pub mod profile_repo;
