// Name-validation session
//
// Local numbers are computed synchronously on every edit; the remote verdict
// arrives later through a debounced, token-fenced request.
//
// - candidate: one suggested name and its edit lifecycle
// - state: the session context object every operation goes through
// - scheduler: quiet-window delay for validation requests
// - chat: assistant mode, target name, exchange history
// - coordinator: async driver tying state, scheduler and remote service together

pub mod candidate;
pub mod chat;
pub mod coordinator;
pub mod scheduler;
pub mod state;

pub use candidate::{CandidateEntry, CustomNameField, EntryPhase, ValidationState};
pub use chat::ChatSession;
pub use coordinator::ValidationCoordinator;
pub use scheduler::DebounceScheduler;
pub use state::{EditOutcome, SessionState, ValidationJob, ValidationTarget};

use thiserror::Error;

/// User-input conflicts. The requested transition is refused and state is unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    #[error("No candidate at position {0}")]
    UnknownEntry(usize),

    #[error("Candidate {0} is not being edited")]
    NotEditing(usize),

    #[error("\"{0}\" is already confirmed")]
    DuplicateConfirmation(String),

    #[error("Pick a name before switching to name validation")]
    MissingNameContext,

    #[error("No client profile loaded")]
    NoProfile,

    #[error("Name is empty")]
    EmptyName,

    #[error("No confirmed names to report on")]
    NothingConfirmed,
}

/// Failure of an operation that needs both session state and the remote service
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Conflict(#[from] Conflict),

    #[error(transparent)]
    Service(#[from] crate::Error),
}
