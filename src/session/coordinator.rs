// 🎛️ Validation Coordinator - local-then-remote name validation
//
// Shared state lives behind one mutex that is never held across an await.
// Edits return local numbers immediately; the remote check is scheduled after
// the quiet window and only lands if its token is still current.

use super::scheduler::{lock, DebounceScheduler};
use super::state::{SessionState, ValidationJob, ValidationTarget};
use super::{CandidateEntry, Conflict, SessionError};
use crate::config::EngineConfig;
use crate::profile::{ClientProfile, NumericProfile};
use crate::remote::{
    ConfirmedName, NumerologyService, ProfileRequest, ReportFormat, ReportPayload, Suggestion,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct ValidationCoordinator<S: NumerologyService + 'static> {
    service: Arc<S>,
    state: Arc<Mutex<SessionState>>,
    scheduler: DebounceScheduler,
}

impl<S: NumerologyService + 'static> ValidationCoordinator<S> {
    pub fn new(service: Arc<S>, quiet: Duration) -> Self {
        ValidationCoordinator {
            service,
            state: Arc::new(Mutex::new(SessionState::new())),
            scheduler: DebounceScheduler::new(quiet),
        }
    }

    pub fn from_config(service: Arc<S>, config: &EngineConfig) -> Self {
        Self::new(service, config.debounce())
    }

    /// Copy of the current session for display
    pub fn snapshot(&self) -> SessionState {
        lock(&self.state).clone()
    }

    // ========================================================================
    // PROFILE & SUGGESTIONS
    // ========================================================================

    /// Ask the service for a profile and suggestions, then load them.
    /// Returns the locally computed numbers for the client's own name.
    pub async fn analyze(&self, request: &ProfileRequest) -> crate::Result<NumericProfile> {
        let response = self.service.analyze(request).await?;
        let numbers = response.profile.numbers();
        self.load(response.profile, &response.suggestions);
        Ok(numbers)
    }

    pub fn load(&self, profile: ClientProfile, suggestions: &[Suggestion]) {
        lock(&self.state).load(profile, suggestions);
    }

    // ========================================================================
    // CANDIDATES
    // ========================================================================

    pub fn begin_edit(&self, index: usize) -> Result<(), Conflict> {
        lock(&self.state).begin_edit(index)
    }

    /// Keystroke: local numbers now, remote verdict after the quiet window
    pub fn edit_name(&self, index: usize, text: &str) -> Result<NumericProfile, Conflict> {
        let outcome = lock(&self.state).edit_name(index, text)?;
        debug!(entry = index, expression = outcome.local_metrics.expression_number, "edited name");

        if let Some(job) = outcome.job {
            self.schedule(job);
        }
        Ok(outcome.local_metrics)
    }

    pub fn save(&self, index: usize) -> Result<CandidateEntry, Conflict> {
        lock(&self.state).save(index)
    }

    pub fn cancel(&self, index: usize) -> Result<(), Conflict> {
        lock(&self.state).cancel(index)
    }

    pub fn confirm(&self, index: usize) -> Result<ConfirmedName, Conflict> {
        lock(&self.state).confirm(index)
    }

    // ========================================================================
    // CUSTOM NAME
    // ========================================================================

    pub fn edit_custom_name(&self, text: &str) -> Result<NumericProfile, Conflict> {
        let outcome = lock(&self.state).edit_custom_name(text)?;
        if let Some(job) = outcome.job {
            self.schedule(job);
        }
        Ok(outcome.local_metrics)
    }

    pub fn confirm_custom(&self) -> Result<ConfirmedName, Conflict> {
        lock(&self.state).confirm_custom()
    }

    // ========================================================================
    // DEBOUNCED VALIDATION
    // ========================================================================

    fn schedule(&self, job: ValidationJob) {
        let state = Arc::clone(&self.state);
        let service = Arc::clone(&self.service);

        self.scheduler.schedule(async move {
            let current = lock(&state).is_current(job.target, job.token);
            if !current {
                debug!(validation = ?job.target, token = job.token, "superseded before sending");
                return;
            }

            let result = service.validate_name(&job.request).await;
            if let Err(e) = &result {
                warn!(validation = ?job.target, error = %e, "name validation failed");
            }

            let applied = lock(&state).apply_validation(job.target, job.token, result);
            if !applied {
                debug!(validation = ?job.target, token = job.token, "discarded stale validation");
            }
        });
    }

    /// Wait for every scheduled validation to finish
    pub async fn settle(&self) {
        self.scheduler.settle().await;
    }

    // ========================================================================
    // CHAT
    // ========================================================================

    pub fn use_general_chat(&self) {
        lock(&self.state).chat.use_general();
    }

    /// Switch the chat to discuss `target`'s current name
    pub fn use_name_chat(&self, target: ValidationTarget) -> Result<String, Conflict> {
        let mut state = lock(&self.state);
        let name = state.name_for(target);
        state.chat.use_name_context(name.as_deref())?;
        Ok(name.unwrap_or_default())
    }

    /// One exchange. History grows only when the service answers.
    pub async fn send_chat(&self, message: &str) -> Result<String, SessionError> {
        let request = lock(&self.state).chat_request(message)?;

        let reply = self.service.chat(&request).await?;
        lock(&self.state).chat.record(message, &reply.response);
        Ok(reply.response)
    }

    // ========================================================================
    // REPORT
    // ========================================================================

    pub async fn generate_report(&self, format: ReportFormat) -> Result<ReportPayload, SessionError> {
        let request = lock(&self.state).report_request()?;
        info!(names = request.confirmed_suggestions.len(), ?format, "requesting report");

        Ok(self.service.generate_report(&request, format).await?)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::remote::{
        ChatReply, ChatRequest, ProfileResponse, ReportRequest, ValidateNameRequest,
        ValidationOutcome,
    };
    use crate::session::candidate::ValidationState;
    use async_trait::async_trait;

    /// In-memory service: names containing "bad" are invalid, "down" fails,
    /// and every validate call is recorded.
    struct StubService {
        calls: Mutex<Vec<String>>,
    }

    impl StubService {
        fn new() -> Arc<Self> {
            Arc::new(StubService {
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            lock(&self.calls).clone()
        }
    }

    #[async_trait]
    impl NumerologyService for StubService {
        async fn analyze(&self, request: &ProfileRequest) -> crate::Result<ProfileResponse> {
            Ok(ProfileResponse {
                profile: ClientProfile::new(&request.full_name, &request.birth_date),
                suggestions: vec![
                    Suggestion {
                        name: "Jon Doe".to_string(),
                        expression_number: 11,
                        rationale: "master eleven".to_string(),
                    },
                    Suggestion {
                        name: "Johan Doe".to_string(),
                        expression_number: 3,
                        rationale: "creative three".to_string(),
                    },
                ],
            })
        }

        async fn validate_name(&self, request: &ValidateNameRequest) -> crate::Result<ValidationOutcome> {
            lock(&self.calls).push(request.suggested_name.clone());
            if request.suggested_name.contains("down") {
                return Err(Error::Remote("service unavailable".to_string()));
            }
            Ok(ValidationOutcome {
                is_valid: !request.suggested_name.contains("bad"),
                rationale: format!("checked {}", request.suggested_name),
            })
        }

        async fn generate_report(
            &self,
            request: &ReportRequest,
            _format: ReportFormat,
        ) -> crate::Result<ReportPayload> {
            Ok(ReportPayload {
                content_type: "text/plain".to_string(),
                bytes: format!("{} names", request.confirmed_suggestions.len()).into_bytes(),
            })
        }

        async fn chat(&self, request: &ChatRequest) -> crate::Result<ChatReply> {
            Ok(ChatReply {
                response: format!("about {}", request.target_name.clone().unwrap_or_default()),
            })
        }
    }

    async fn coordinator() -> (ValidationCoordinator<StubService>, Arc<StubService>) {
        let service = StubService::new();
        let coordinator = ValidationCoordinator::new(Arc::clone(&service), Duration::from_millis(400));
        let request = ProfileRequest {
            full_name: "John Doe".to_string(),
            birth_date: "1990-05-15".to_string(),
            birth_time: None,
            birth_place: None,
            desired_outcome: "career".to_string(),
        };
        coordinator.analyze(&request).await.unwrap();
        (coordinator, service)
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_loads_suggestions() {
        let (coordinator, _) = coordinator().await;
        let state = coordinator.snapshot();

        assert_eq!(state.candidates.len(), 2);
        assert_eq!(state.profile.unwrap().full_name, "John Doe");
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_sends_one_request() {
        let (coordinator, service) = coordinator().await;
        coordinator.begin_edit(0).unwrap();

        for text in ["J", "Jo", "Joh", "John", "John D", "John Doe"] {
            let local = coordinator.edit_name(0, text).unwrap();
            assert_eq!(local.name, text);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        coordinator.settle().await;

        assert_eq!(service.calls(), vec!["John Doe".to_string()]);
        let entry = coordinator.snapshot().candidates[0].clone();
        let outcome = entry.validation.outcome().unwrap();
        assert!(outcome.is_valid);
        assert_eq!(outcome.rationale, "checked John Doe");
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_after_quiet_window_each_validate() {
        let (coordinator, service) = coordinator().await;
        coordinator.begin_edit(1).unwrap();

        coordinator.edit_name(1, "Johann").unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        coordinator.edit_name(1, "Johanna").unwrap();
        coordinator.settle().await;

        assert_eq!(service.calls(), vec!["Johann".to_string(), "Johanna".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_numbers_are_immediate() {
        let (coordinator, service) = coordinator().await;
        coordinator.begin_edit(0).unwrap();

        let local = coordinator.edit_name(0, "John Doe").unwrap();
        assert_eq!(local.expression_number, 7);
        assert!(service.calls().is_empty());
        assert!(coordinator.snapshot().candidates[0].validation.is_pending());

        coordinator.settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_failure_becomes_invalid_outcome() {
        let (coordinator, _) = coordinator().await;
        coordinator.begin_edit(0).unwrap();
        coordinator.edit_name(0, "down name").unwrap();
        coordinator.settle().await;

        let entry = coordinator.snapshot().candidates[0].clone();
        match &entry.validation {
            ValidationState::Failed { outcome } => {
                assert!(!outcome.is_valid);
                assert!(outcome.rationale.contains("service unavailable"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_quiet_window_sends_nothing() {
        let (coordinator, service) = coordinator().await;
        coordinator.begin_edit(0).unwrap();
        coordinator.edit_name(0, "Jonathan").unwrap();
        coordinator.cancel(0).unwrap();
        coordinator.settle().await;

        assert!(service.calls().is_empty());
        let entry = coordinator.snapshot().candidates[0].clone();
        assert_eq!(entry.name, "Jon Doe");
        assert_eq!(entry.validation, ValidationState::NotRequested);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_adopts_remote_verdict() {
        let (coordinator, _) = coordinator().await;
        coordinator.begin_edit(0).unwrap();
        coordinator.edit_name(0, "bad name").unwrap();
        coordinator.settle().await;

        let saved = coordinator.save(0).unwrap();
        assert_eq!(saved.name, "bad name");
        assert!(!saved.is_valid);
        assert_eq!(saved.rationale, "checked bad name");
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_entries_keeps_single_editor() {
        let (coordinator, _) = coordinator().await;
        coordinator.begin_edit(0).unwrap();
        coordinator.edit_name(0, "Jonny").unwrap();
        coordinator.begin_edit(1).unwrap();
        coordinator.settle().await;

        let state = coordinator.snapshot();
        assert_eq!(state.editing_index(), Some(1));
        // Straggler for entry 0 never lands after it left edit mode
        assert_eq!(state.candidates[0].validation, ValidationState::NotRequested);
        assert_eq!(state.candidates[0].name, "Jon Doe");
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_name_is_independent() {
        let (coordinator, service) = coordinator().await;
        coordinator.begin_edit(0).unwrap();
        coordinator.edit_name(0, "Jon D").unwrap();
        let local = coordinator.edit_custom_name("John Doe").unwrap();
        assert_eq!(local.expression_number, 7);
        coordinator.settle().await;

        let mut calls = service.calls();
        calls.sort();
        assert_eq!(calls, vec!["John Doe".to_string(), "Jon D".to_string()]);

        let confirmed = coordinator.confirm_custom().unwrap();
        assert_eq!(confirmed.rationale, "checked John Doe");
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_requires_name_context() {
        let (coordinator, _) = coordinator().await;

        assert_eq!(
            coordinator.use_name_chat(ValidationTarget::Custom),
            Err(Conflict::MissingNameContext)
        );

        let name = coordinator.use_name_chat(ValidationTarget::Candidate(1)).unwrap();
        assert_eq!(name, "Johan Doe");

        let reply = coordinator.send_chat("is this good?").await.unwrap();
        assert_eq!(reply, "about Johan Doe");
        assert_eq!(coordinator.snapshot().chat.history().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_needs_confirmed_names() {
        let (coordinator, _) = coordinator().await;

        let err = coordinator.generate_report(ReportFormat::Text).await.unwrap_err();
        assert!(matches!(err, SessionError::Conflict(Conflict::NothingConfirmed)));

        coordinator.confirm(0).unwrap();
        coordinator.confirm(1).unwrap();
        let report = coordinator.generate_report(ReportFormat::Pdf).await.unwrap();
        assert_eq!(report.bytes, b"2 names".to_vec());
    }
}
