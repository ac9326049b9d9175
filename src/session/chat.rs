// 💬 Chat Session - mode, target name and an append-only exchange history

use super::Conflict;
use crate::profile::ClientProfile;
use crate::remote::{ChatMode, ChatRequest, ChatRole, ChatTurn};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub mode: ChatMode,
    pub target_name: Option<String>,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        ChatSession {
            mode: ChatMode::General,
            target_name: None,
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn use_general(&mut self) {
        self.mode = ChatMode::General;
        self.target_name = None;
    }

    /// Switch to name-validation mode. Refused (state unchanged) without a name.
    pub fn use_name_context(&mut self, name: Option<&str>) -> Result<(), Conflict> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(Conflict::MissingNameContext)?;

        self.mode = ChatMode::NameValidation;
        self.target_name = Some(name.to_string());
        Ok(())
    }

    /// Build the outgoing request. Name-validation mode ships profile, target and history.
    pub fn request(
        &self,
        message: &str,
        profile: Option<&ClientProfile>,
    ) -> Result<ChatRequest, Conflict> {
        match self.mode {
            ChatMode::General => Ok(ChatRequest {
                mode: ChatMode::General,
                message: message.to_string(),
                client_profile: None,
                target_name: None,
                history: Vec::new(),
            }),
            ChatMode::NameValidation => {
                let profile = profile.ok_or(Conflict::NoProfile)?;
                let target = self
                    .target_name
                    .clone()
                    .ok_or(Conflict::MissingNameContext)?;

                Ok(ChatRequest {
                    mode: ChatMode::NameValidation,
                    message: message.to_string(),
                    client_profile: Some(profile.clone()),
                    target_name: Some(target),
                    history: self.history.clone(),
                })
            }
        }
    }

    /// Append one completed exchange
    pub fn record(&mut self, message: &str, response: &str) {
        self.history.push(ChatTurn {
            role: ChatRole::User,
            content: message.to_string(),
        });
        self.history.push(ChatTurn {
            role: ChatRole::Assistant,
            content: response.to_string(),
        });
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
