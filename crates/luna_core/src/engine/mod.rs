//! Cycle-phase inference engine.
//!
//! # Responsibility
//! - Rebuild a continuous period-day calendar from sparse entries.
//! - Classify any date into a cycle phase with a day number.
//! - Apply user log actions to the calendar and describe the write they need.
//!
//! # Invariants
//! - Every function here is pure: no I/O, no shared mutable state.
//! - Calendars are values; operations return fresh ones instead of mutating.

pub mod calendar;
pub mod mutation;
pub mod phase;
