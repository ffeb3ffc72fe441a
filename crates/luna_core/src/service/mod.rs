//! Use-case services over the engine and repositories.
//!
//! # Responsibility
//! - Own per-user application state and keep it consistent with storage.
//! - Assemble opaque context for the generative-text collaborator.
//!
//! # See also
//! - `engine` for the pure calculations these services drive.

pub mod cycle_service;
pub mod insight_service;
