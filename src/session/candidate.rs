// 📝 Candidate Entry - one suggested name and its edit/validation lifecycle
//
//   Idle → Editing → (Validating ⇄ Validated / Error) → Idle
//
// The entry never talks to the service itself. SessionState hands out request
// tokens and feeds outcomes back through `apply_outcome`.

use crate::profile::{ClientProfile, NumericProfile};
use crate::remote::{ConfirmedName, Suggestion, ValidationOutcome};
use chrono::Utc;
use serde::Serialize;

// ============================================================================
// VALIDATION STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ValidationState {
    /// Nothing requested since the last reset
    NotRequested,

    /// A debounced request is queued or in flight; `last` is the previous
    /// verdict, still shown and still adopted by a save
    Pending { last: Option<ValidationOutcome> },

    /// Service answered
    Validated { outcome: ValidationOutcome },

    /// Service failed; the outcome is synthesized locally
    Failed { outcome: ValidationOutcome },
}

impl ValidationState {
    pub fn outcome(&self) -> Option<&ValidationOutcome> {
        match self {
            ValidationState::Validated { outcome } | ValidationState::Failed { outcome } => {
                Some(outcome)
            }
            ValidationState::Pending { last } => last.as_ref(),
            ValidationState::NotRequested => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ValidationState::Pending { .. })
    }

    /// State after a non-blank edit: pending, carrying the current verdict along
    fn revalidate(&self) -> ValidationState {
        ValidationState::Pending {
            last: self.outcome().cloned(),
        }
    }
}

/// Where an entry sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryPhase {
    Idle,
    Editing,
    Validating,
    Validated,
    Error,
}

// ============================================================================
// CANDIDATE ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEntry {
    /// Name as suggested by the service
    pub original_name: String,

    /// Committed name (changes only on save)
    pub name: String,

    /// Working copy while editing
    pub edited_name: String,

    pub is_editing: bool,

    /// Local quick numbers for the name on screen (edited or committed)
    pub local_metrics: NumericProfile,

    /// Committed expression number
    pub expression_number: u32,

    pub rationale: String,
    pub is_valid: bool,

    pub validation: ValidationState,
    pub confirmed: bool,

    /// Latest request token; responses carrying an older one are dropped
    #[serde(skip)]
    pub(crate) token: u64,
}

impl CandidateEntry {
    pub fn from_suggestion(suggestion: &Suggestion, profile: &ClientProfile) -> Self {
        CandidateEntry {
            original_name: suggestion.name.clone(),
            name: suggestion.name.clone(),
            edited_name: suggestion.name.clone(),
            is_editing: false,
            local_metrics: profile.numbers_for(&suggestion.name),
            expression_number: suggestion.expression_number,
            rationale: suggestion.rationale.clone(),
            // Suggestions come pre-vetted by the service
            is_valid: true,
            validation: ValidationState::NotRequested,
            confirmed: false,
            token: 0,
        }
    }

    pub fn phase(&self) -> EntryPhase {
        if !self.is_editing {
            return EntryPhase::Idle;
        }
        match self.validation {
            ValidationState::NotRequested => EntryPhase::Editing,
            ValidationState::Pending { .. } => EntryPhase::Validating,
            ValidationState::Validated { .. } => EntryPhase::Validated,
            ValidationState::Failed { .. } => EntryPhase::Error,
        }
    }

    pub(crate) fn enter_edit(&mut self, token: u64) {
        self.is_editing = true;
        self.edited_name = self.name.clone();
        self.validation = ValidationState::NotRequested;
        self.token = token;
    }

    /// Update the working name; local numbers are recomputed right away
    pub(crate) fn set_edited_name(&mut self, text: &str, profile: &ClientProfile, token: u64) {
        self.edited_name = text.to_string();
        self.local_metrics = profile.numbers_for(text);
        self.token = token;
        self.validation = if text.trim().is_empty() {
            ValidationState::NotRequested
        } else {
            self.validation.revalidate()
        };
    }

    /// Store a service result if `token` is still the latest. Returns false when stale.
    pub(crate) fn apply_outcome(&mut self, token: u64, outcome: ValidationOutcome, failed: bool) -> bool {
        if !self.is_editing || token != self.token {
            return false;
        }
        self.validation = if failed {
            ValidationState::Failed { outcome }
        } else {
            ValidationState::Validated { outcome }
        };
        true
    }

    /// Commit the working name and leave edit mode
    pub(crate) fn save(&mut self, profile: &ClientProfile, token: u64) {
        self.name = self.edited_name.clone();
        self.local_metrics = profile.numbers_for(&self.name);
        self.expression_number = self.local_metrics.expression_number;

        match self.validation.outcome() {
            Some(outcome) => {
                self.rationale = outcome.rationale.clone();
                self.is_valid = outcome.is_valid;
            }
            None => self.is_valid = true,
        }

        self.leave_edit(token);
    }

    /// Drop the working name and leave edit mode; committed fields stay as they were
    pub(crate) fn cancel(&mut self, profile: &ClientProfile, token: u64) {
        self.edited_name = self.name.clone();
        self.local_metrics = profile.numbers_for(&self.name);
        self.leave_edit(token);
    }

    fn leave_edit(&mut self, token: u64) {
        self.is_editing = false;
        self.validation = ValidationState::NotRequested;
        self.token = token;
    }

    pub fn snapshot(&self) -> ConfirmedName {
        ConfirmedName {
            name: self.name.clone(),
            expression_number: self.expression_number,
            rationale: self.rationale.clone(),
            is_valid: self.is_valid,
            confirmed_at: Utc::now(),
        }
    }
}

// ============================================================================
// CUSTOM NAME FIELD
// ============================================================================

/// Free-standing name box: same local-then-remote flow, no list, no edit mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomNameField {
    pub name: String,
    pub local_metrics: Option<NumericProfile>,
    pub validation: ValidationState,

    #[serde(skip)]
    pub(crate) token: u64,
}

impl CustomNameField {
    pub(crate) fn set_name(&mut self, text: &str, profile: &ClientProfile, token: u64) {
        self.name = text.to_string();
        self.local_metrics = Some(profile.numbers_for(text));
        self.token = token;
        self.validation = if text.trim().is_empty() {
            ValidationState::NotRequested
        } else {
            self.validation.revalidate()
        };
    }

    pub(crate) fn apply_outcome(&mut self, token: u64, outcome: ValidationOutcome, failed: bool) -> bool {
        if token != self.token {
            return false;
        }
        self.validation = if failed {
            ValidationState::Failed { outcome }
        } else {
            ValidationState::Validated { outcome }
        };
        true
    }

    pub fn snapshot(&self) -> ConfirmedName {
        let outcome = self.validation.outcome();
        ConfirmedName {
            name: self.name.clone(),
            expression_number: self
                .local_metrics
                .as_ref()
                .map(|m| m.expression_number)
                .unwrap_or(0),
            rationale: outcome.map(|o| o.rationale.clone()).unwrap_or_default(),
            is_valid: outcome.map(|o| o.is_valid).unwrap_or(true),
            confirmed_at: Utc::now(),
        }
    }
}

impl Default for CustomNameField {
    fn default() -> Self {
        CustomNameField {
            name: String::new(),
            local_metrics: None,
            validation: ValidationState::NotRequested,
            token: 0,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
