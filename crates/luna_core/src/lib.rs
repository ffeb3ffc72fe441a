//! Core domain logic for Luna cycle tracking.
//! This crate is the single source of truth for cycle-phase invariants.

pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;

pub use engine::calendar::{fill_span, reconstruct, DerivedCalendar, MAX_FILL_DAYS};
pub use engine::mutation::{apply_action, LogAction, MutationOutcome, PendingWrite};
pub use engine::phase::{calculate_phase, Phase, PhaseReading};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::date::{CycleDate, DateError};
pub use model::entry::{
    CycleEntry, EntryFields, EntryId, EntryValidationError, PhaseMarker, Symptom, SymptomLog,
    UserId,
};
pub use model::profile::UserProfile;
pub use repo::entry_repo::{EntryRepository, RepoError, RepoResult, SqliteEntryRepository};
pub use repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
pub use service::cycle_service::{CycleTracker, RefreshOutcome, RefreshTicket, WriteStatus};
pub use service::insight_service::{
    ChatRole, ChatTurn, CycleAnalysis, GenerationError, GenerationRequest, InsightError,
    InsightService, TextGenerator,
};
pub use settings::{CycleSettings, SettingsError};

/// Minimal health-check API for integration probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
