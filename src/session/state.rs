// 🗂️ Session State - explicit context for one client's naming session
//
// Holds the client profile, candidate list, confirmed names, the custom-name
// field and the chat. Every mutation goes through a method here, so the
// "one entry editing" rule is enforced in a single place. Purely synchronous;
// the coordinator owns the async side.

use super::candidate::{CandidateEntry, CustomNameField};
use super::chat::ChatSession;
use super::Conflict;
use crate::profile::{ClientProfile, NumericProfile};
use crate::remote::{
    ChatRequest, ConfirmedName, ReportRequest, Suggestion, ValidateNameRequest, ValidationOutcome,
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

// ============================================================================
// TARGETS & JOBS
// ============================================================================

/// What a validation request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationTarget {
    Candidate(usize),
    Custom,
}

/// A validation request waiting for its quiet window
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationJob {
    pub target: ValidationTarget,
    pub token: u64,
    pub request: ValidateNameRequest,
}

/// Result of a keystroke: local numbers now, maybe a remote request later
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    pub local_metrics: NumericProfile,
    pub job: Option<ValidationJob>,
}

// ============================================================================
// SESSION STATE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub id: Uuid,
    pub profile: Option<ClientProfile>,
    pub candidates: Vec<CandidateEntry>,
    pub confirmed: Vec<ConfirmedName>,
    pub custom: CustomNameField,
    pub chat: ChatSession,

    /// Session-wide so tokens are never reused, even across suggestion reloads
    #[serde(skip)]
    next_token: u64,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState {
            id: Uuid::new_v4(),
            profile: None,
            candidates: Vec::new(),
            confirmed: Vec::new(),
            custom: CustomNameField::default(),
            chat: ChatSession::new(),
            next_token: 0,
        }
    }

    fn issue_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn profile(&self) -> Result<&ClientProfile, Conflict> {
        self.profile.as_ref().ok_or(Conflict::NoProfile)
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut CandidateEntry, Conflict> {
        self.candidates
            .get_mut(index)
            .ok_or(Conflict::UnknownEntry(index))
    }

    pub fn entry(&self, index: usize) -> Option<&CandidateEntry> {
        self.candidates.get(index)
    }

    /// Index of the entry currently in edit mode
    pub fn editing_index(&self) -> Option<usize> {
        self.candidates.iter().position(|e| e.is_editing)
    }

    pub fn is_confirmed(&self, name: &str) -> bool {
        self.confirmed.iter().any(|c| c.name == name)
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Replace profile and suggestions with a fresh set.
    /// Confirmed names and the custom field belong to the old profile and are reset.
    pub fn load(&mut self, profile: ClientProfile, suggestions: &[Suggestion]) {
        info!(
            session = %self.id,
            suggestions = suggestions.len(),
            "loading suggestion set"
        );

        self.candidates = suggestions
            .iter()
            .map(|s| CandidateEntry::from_suggestion(s, &profile))
            .collect();
        self.confirmed.clear();
        self.custom = CustomNameField::default();
        self.profile = Some(profile);
        // Fence anything still in flight for the previous set
        self.next_token += 1;
    }

    // ========================================================================
    // CANDIDATE LIFECYCLE
    // ========================================================================

    /// Put entry `index` in edit mode; every other entry leaves edit mode first
    pub fn begin_edit(&mut self, index: usize) -> Result<(), Conflict> {
        if index >= self.candidates.len() {
            return Err(Conflict::UnknownEntry(index));
        }
        let profile = self.profile()?.clone();

        for i in 0..self.candidates.len() {
            if i != index && self.candidates[i].is_editing {
                let token = self.issue_token();
                self.candidates[i].cancel(&profile, token);
                debug!(entry = i, "left edit mode");
            }
        }

        let token = self.issue_token();
        self.candidates[index].enter_edit(token);
        debug!(entry = index, "entered edit mode");
        Ok(())
    }

    /// Keystroke in the editing entry
    pub fn edit_name(&mut self, index: usize, text: &str) -> Result<EditOutcome, Conflict> {
        let profile = self.profile()?.clone();
        let token = self.issue_token();

        let entry = self.entry_mut(index)?;
        if !entry.is_editing {
            return Err(Conflict::NotEditing(index));
        }
        entry.set_edited_name(text, &profile, token);

        let job = entry.validation.is_pending().then(|| ValidationJob {
            target: ValidationTarget::Candidate(index),
            token,
            request: ValidateNameRequest {
                suggested_name: text.to_string(),
                client_profile: profile.clone(),
            },
        });

        Ok(EditOutcome {
            local_metrics: entry.local_metrics.clone(),
            job,
        })
    }

    pub fn save(&mut self, index: usize) -> Result<CandidateEntry, Conflict> {
        let profile = self.profile()?.clone();
        let token = self.issue_token();

        let entry = self.entry_mut(index)?;
        if !entry.is_editing {
            return Err(Conflict::NotEditing(index));
        }
        if entry.edited_name.trim().is_empty() {
            return Err(Conflict::EmptyName);
        }
        entry.save(&profile, token);

        // Membership follows the committed name
        let confirmed = self.is_confirmed(&self.candidates[index].name);
        let entry = &mut self.candidates[index];
        entry.confirmed = confirmed;

        info!(entry = index, name = %entry.name, valid = entry.is_valid, "saved candidate");
        Ok(entry.clone())
    }

    pub fn cancel(&mut self, index: usize) -> Result<(), Conflict> {
        let profile = self.profile()?.clone();
        let token = self.issue_token();

        let entry = self.entry_mut(index)?;
        if !entry.is_editing {
            return Err(Conflict::NotEditing(index));
        }
        entry.cancel(&profile, token);
        debug!(entry = index, "edit cancelled");
        Ok(())
    }

    /// Snapshot entry `index` into the confirmed list; duplicates by name are refused
    pub fn confirm(&mut self, index: usize) -> Result<ConfirmedName, Conflict> {
        let snapshot = self
            .entry(index)
            .ok_or(Conflict::UnknownEntry(index))?
            .snapshot();

        self.push_confirmed(snapshot.clone())?;
        self.candidates[index].confirmed = true;
        Ok(snapshot)
    }

    fn push_confirmed(&mut self, snapshot: ConfirmedName) -> Result<(), Conflict> {
        if snapshot.name.trim().is_empty() {
            return Err(Conflict::EmptyName);
        }
        if self.is_confirmed(&snapshot.name) {
            return Err(Conflict::DuplicateConfirmation(snapshot.name));
        }

        info!(name = %snapshot.name, expression = snapshot.expression_number, "confirmed name");
        self.confirmed.push(snapshot);
        Ok(())
    }

    // ========================================================================
    // CUSTOM NAME FIELD
    // ========================================================================

    pub fn edit_custom_name(&mut self, text: &str) -> Result<EditOutcome, Conflict> {
        let profile = self.profile()?.clone();
        let token = self.issue_token();

        self.custom.set_name(text, &profile, token);

        let job = self.custom.validation.is_pending().then(|| ValidationJob {
            target: ValidationTarget::Custom,
            token,
            request: ValidateNameRequest {
                suggested_name: text.to_string(),
                client_profile: profile.clone(),
            },
        });

        Ok(EditOutcome {
            local_metrics: profile.numbers_for(text),
            job,
        })
    }

    pub fn confirm_custom(&mut self) -> Result<ConfirmedName, Conflict> {
        let snapshot = self.custom.snapshot();
        self.push_confirmed(snapshot.clone())?;
        Ok(snapshot)
    }

    // ========================================================================
    // VALIDATION RESULTS
    // ========================================================================

    /// Whether `token` is still the latest request for `target`
    pub fn is_current(&self, target: ValidationTarget, token: u64) -> bool {
        match target {
            ValidationTarget::Candidate(i) => self
                .candidates
                .get(i)
                .map_or(false, |e| e.is_editing && e.token == token),
            ValidationTarget::Custom => self.custom.token == token,
        }
    }

    /// Store a service result. Failures become an invalid outcome carrying the error text.
    /// Returns false when the result was stale and dropped.
    pub fn apply_validation(
        &mut self,
        target: ValidationTarget,
        token: u64,
        result: crate::Result<ValidationOutcome>,
    ) -> bool {
        let (outcome, failed) = match result {
            Ok(outcome) => (outcome, false),
            Err(e) => (ValidationOutcome::from_failure(&e), true),
        };

        match target {
            ValidationTarget::Candidate(i) => match self.candidates.get_mut(i) {
                Some(entry) => entry.apply_outcome(token, outcome, failed),
                None => false,
            },
            ValidationTarget::Custom => self.custom.apply_outcome(token, outcome, failed),
        }
    }

    /// Name a chat about `target` would discuss: the working name if editing
    pub fn name_for(&self, target: ValidationTarget) -> Option<String> {
        let name = match target {
            ValidationTarget::Candidate(i) => {
                let entry = self.candidates.get(i)?;
                if entry.is_editing {
                    entry.edited_name.clone()
                } else {
                    entry.name.clone()
                }
            }
            ValidationTarget::Custom => self.custom.name.clone(),
        };
        Some(name).filter(|n| !n.trim().is_empty())
    }

    /// Outgoing chat message in the current mode
    pub fn chat_request(&self, message: &str) -> Result<ChatRequest, Conflict> {
        self.chat.request(message, self.profile.as_ref())
    }

    // ========================================================================
    // REPORT
    // ========================================================================

    pub fn report_request(&self) -> Result<ReportRequest, Conflict> {
        let profile = self.profile()?;
        if self.confirmed.is_empty() {
            return Err(Conflict::NothingConfirmed);
        }

        Ok(ReportRequest {
            client_profile: profile.clone(),
            confirmed_suggestions: self.confirmed.clone(),
        })
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::session::candidate::ValidationState;
    use pretty_assertions::assert_eq;

    fn suggestion(name: &str, expression: u32) -> Suggestion {
        Suggestion {
            name: name.to_string(),
            expression_number: expression,
            rationale: format!("{} fits", name),
        }
    }

    fn loaded() -> SessionState {
        let mut state = SessionState::new();
        state.load(
            ClientProfile::new("John Doe", "1990-05-15"),
            &[
                suggestion("Jon Doe", 11),
                suggestion("Johan Doe", 3),
                suggestion("Jonah Doe", 3),
            ],
        );
        state
    }

    fn ok(valid: bool, rationale: &str) -> crate::Result<ValidationOutcome> {
        Ok(ValidationOutcome {
            is_valid: valid,
            rationale: rationale.to_string(),
        })
    }

    #[test]
    fn test_load_builds_idle_entries() {
        let state = loaded();

        assert_eq!(state.candidates.len(), 3);
        assert!(state.candidates.iter().all(|e| !e.is_editing));
        assert_eq!(state.editing_index(), None);
    }

    #[test]
    fn test_only_one_entry_editing() {
        let mut state = loaded();

        state.begin_edit(0).unwrap();
        state.edit_name(0, "Jonny Doe").unwrap();
        state.begin_edit(2).unwrap();

        assert_eq!(state.editing_index(), Some(2));
        assert_eq!(state.candidates.iter().filter(|e| e.is_editing).count(), 1);
        // Forced-out entry dropped its working copy
        assert_eq!(state.candidates[0].edited_name, "Jon Doe");
    }

    #[test]
    fn test_begin_edit_unknown_entry() {
        let mut state = loaded();
        assert_eq!(state.begin_edit(7), Err(Conflict::UnknownEntry(7)));
    }

    #[test]
    fn test_begin_edit_without_profile() {
        let mut state = SessionState::new();
        assert_eq!(state.begin_edit(0), Err(Conflict::UnknownEntry(0)));
        assert_eq!(state.edit_custom_name("x").unwrap_err(), Conflict::NoProfile);
    }

    #[test]
    fn test_edit_requires_edit_mode() {
        let mut state = loaded();
        assert_eq!(state.edit_name(1, "x").unwrap_err(), Conflict::NotEditing(1));
        assert_eq!(state.save(1).unwrap_err(), Conflict::NotEditing(1));
        assert_eq!(state.cancel(1).unwrap_err(), Conflict::NotEditing(1));
    }

    #[test]
    fn test_edit_returns_local_numbers_and_job() {
        let mut state = loaded();
        state.begin_edit(0).unwrap();

        let outcome = state.edit_name(0, "John Doe").unwrap();
        assert_eq!(outcome.local_metrics.expression_number, 7);

        let job = outcome.job.expect("job scheduled");
        assert_eq!(job.target, ValidationTarget::Candidate(0));
        assert_eq!(job.request.suggested_name, "John Doe");
        assert_eq!(job.request.client_profile.birth_date, "1990-05-15");
        assert!(state.is_current(job.target, job.token));
    }

    #[test]
    fn test_blank_edit_schedules_nothing() {
        let mut state = loaded();
        state.begin_edit(0).unwrap();
        let outcome = state.edit_name(0, "  ").unwrap();

        assert!(outcome.job.is_none());
        assert_eq!(state.save(0).unwrap_err(), Conflict::EmptyName);
    }

    #[test]
    fn test_late_response_is_discarded() {
        let mut state = loaded();
        state.begin_edit(0).unwrap();

        let first = state.edit_name(0, "Jo").unwrap().job.unwrap();
        let second = state.edit_name(0, "John").unwrap().job.unwrap();

        assert!(state.apply_validation(second.target, second.token, ok(true, "second")));
        assert!(!state.apply_validation(first.target, first.token, ok(false, "first")));

        let outcome = state.candidates[0].validation.outcome().unwrap();
        assert_eq!(outcome.rationale, "second");
    }

    #[test]
    fn test_response_after_cancel_is_discarded() {
        let mut state = loaded();
        state.begin_edit(1).unwrap();
        let job = state.edit_name(1, "Johann").unwrap().job.unwrap();
        state.cancel(1).unwrap();

        assert!(!state.apply_validation(job.target, job.token, ok(true, "late")));
        assert_eq!(state.candidates[1].validation, ValidationState::NotRequested);
    }

    #[test]
    fn test_response_after_reload_is_discarded() {
        let mut state = loaded();
        state.begin_edit(0).unwrap();
        let job = state.edit_name(0, "Jon").unwrap().job.unwrap();

        state.load(
            ClientProfile::new("John Doe", "1990-05-15"),
            &[suggestion("Fresh", 1)],
        );
        state.begin_edit(0).unwrap();

        assert!(!state.apply_validation(job.target, job.token, ok(true, "old set")));
    }

    #[test]
    fn test_failure_becomes_invalid_outcome() {
        let mut state = loaded();
        state.begin_edit(0).unwrap();
        let job = state.edit_name(0, "John").unwrap().job.unwrap();

        let applied = state.apply_validation(
            job.target,
            job.token,
            Err(Error::Remote("503 Service Unavailable".to_string())),
        );

        assert!(applied);
        let entry = &state.candidates[0];
        assert!(matches!(entry.validation, ValidationState::Failed { .. }));
        let outcome = entry.validation.outcome().unwrap();
        assert!(!outcome.is_valid);
        assert!(outcome.rationale.contains("503"));
    }

    #[test]
    fn test_edit_then_cancel_leaves_entry_unchanged() {
        let mut state = loaded();
        state.confirm(1).unwrap();
        let before = state.candidates[1].clone();

        state.begin_edit(1).unwrap();
        let job = state.edit_name(1, "Totally New").unwrap().job.unwrap();
        state.apply_validation(job.target, job.token, ok(false, "nope"));
        state.cancel(1).unwrap();

        let after = &state.candidates[1];
        assert_eq!(after.name, before.name);
        assert_eq!(after.expression_number, before.expression_number);
        assert_eq!(after.confirmed, before.confirmed);
        assert_eq!(after.is_valid, before.is_valid);
        assert_eq!(state.confirmed.len(), 1);
    }

    #[test]
    fn test_save_commits_and_recomputes() {
        let mut state = loaded();
        state.begin_edit(0).unwrap();
        let job = state.edit_name(0, "John Doe").unwrap().job.unwrap();
        state.apply_validation(job.target, job.token, ok(true, "strong seven"));

        let saved = state.save(0).unwrap();
        assert_eq!(saved.name, "John Doe");
        assert_eq!(saved.original_name, "Jon Doe");
        assert_eq!(saved.expression_number, 7);
        assert_eq!(saved.rationale, "strong seven");
        assert_eq!(state.editing_index(), None);
    }

    #[test]
    fn test_save_while_pending_adopts_last_verdict() {
        let mut state = loaded();
        state.begin_edit(0).unwrap();
        let job = state.edit_name(0, "Bad Name").unwrap().job.unwrap();
        state.apply_validation(job.target, job.token, ok(false, "clashes"));

        // Next keystroke is still inside the quiet window when saved
        state.edit_name(0, "Bad Names").unwrap();
        assert!(state.candidates[0].validation.is_pending());

        let saved = state.save(0).unwrap();
        assert!(!saved.is_valid);
        assert_eq!(saved.rationale, "clashes");
    }

    #[test]
    fn test_save_under_new_name_clears_confirmed_flag() {
        let mut state = loaded();
        state.confirm(0).unwrap();

        state.begin_edit(0).unwrap();
        state.edit_name(0, "Johnny").unwrap();
        let saved = state.save(0).unwrap();

        assert_eq!(saved.name, "Johnny");
        assert!(!saved.confirmed);
        assert!(!state.is_confirmed("Johnny"));
        // The earlier snapshot stays in the list
        assert!(state.is_confirmed("Jon Doe"));
    }

    #[test]
    fn test_save_back_to_confirmed_name_keeps_flag() {
        let mut state = loaded();
        state.confirm(0).unwrap();

        state.begin_edit(0).unwrap();
        state.edit_name(0, "Jonny").unwrap();
        state.edit_name(0, "Jon Doe").unwrap();
        let saved = state.save(0).unwrap();

        assert!(saved.confirmed);
        assert_eq!(state.confirmed.len(), 1);
    }

    #[test]
    fn test_confirm_twice_conflicts() {
        let mut state = loaded();

        let first = state.confirm(0).unwrap();
        assert_eq!(first.name, "Jon Doe");
        assert_eq!(
            state.confirm(0),
            Err(Conflict::DuplicateConfirmation("Jon Doe".to_string()))
        );
        assert_eq!(state.confirmed.len(), 1);
        assert!(state.candidates[0].confirmed);
    }

    #[test]
    fn test_custom_name_flow() {
        let mut state = loaded();

        let first = state.edit_custom_name("Johnny").unwrap().job.unwrap();
        let second = state.edit_custom_name("John Doe").unwrap().job.unwrap();
        assert_eq!(second.target, ValidationTarget::Custom);
        assert!(!state.is_current(ValidationTarget::Custom, first.token));

        state.apply_validation(second.target, second.token, ok(true, "good"));
        let confirmed = state.confirm_custom().unwrap();
        assert_eq!(confirmed.name, "John Doe");
        assert_eq!(confirmed.expression_number, 7);

        // Same name as a confirmed custom entry is a duplicate too
        assert_eq!(
            state.confirm_custom(),
            Err(Conflict::DuplicateConfirmation("John Doe".to_string()))
        );
    }

    #[test]
    fn test_custom_edits_do_not_touch_candidates() {
        let mut state = loaded();
        state.begin_edit(2).unwrap();
        state.edit_custom_name("Other").unwrap();

        assert_eq!(state.editing_index(), Some(2));
    }

    #[test]
    fn test_name_for_chat() {
        let mut state = loaded();
        assert_eq!(state.name_for(ValidationTarget::Candidate(1)).as_deref(), Some("Johan Doe"));
        assert_eq!(state.name_for(ValidationTarget::Custom), None);

        state.begin_edit(1).unwrap();
        state.edit_name(1, "Johannes").unwrap();
        assert_eq!(state.name_for(ValidationTarget::Candidate(1)).as_deref(), Some("Johannes"));
    }

    #[test]
    fn test_report_request() {
        let mut state = loaded();
        assert_eq!(state.report_request().unwrap_err(), Conflict::NothingConfirmed);

        state.confirm(2).unwrap();
        let request = state.report_request().unwrap();
        assert_eq!(request.confirmed_suggestions.len(), 1);
        assert_eq!(request.confirmed_suggestions[0].name, "Jonah Doe");
    }
}
