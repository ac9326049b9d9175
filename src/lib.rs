// Numerology Engine - Core Library
// Exposes calculators, remote boundary and session coordination for CLI, API server and tests

pub mod table;
pub mod reducer;
pub mod name_metrics;
pub mod date_metrics;
pub mod grid;
pub mod profile;
pub mod remote;
pub mod session;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use table::{clean_name, is_vowel, value_of, CharacterValueTable, CHALDEAN};
pub use reducer::{digit_sum, is_master, reduce, MASTER_NUMBERS};
pub use name_metrics::{expression_number, personality_number, soul_urge_number, NameMetrics};
pub use date_metrics::{birth_day_number, life_path_number, parse_birth_date, DateMetrics};
pub use grid::{build_grid, Grid};
pub use profile::{ClientProfile, NumericProfile};
pub use remote::{
    ChatMode, ChatReply, ChatRequest, ChatRole, ChatTurn, ConfirmedName, HttpNumerologyService,
    NumerologyService, ProfileRequest, ProfileResponse, ReportFormat, ReportPayload,
    ReportRequest, Suggestion, ValidateNameRequest, ValidationOutcome,
};
pub use session::{
    CandidateEntry, Conflict, EntryPhase, SessionError, SessionState, ValidationCoordinator,
    ValidationState, ValidationTarget,
};
pub use config::{ConfigOverrides, EngineConfig};
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
