use anyhow::Result;
use tracing::{debug, info, warn};

use crate::completion::{CompletionService, TurnRequest};
use crate::config::Config;
use crate::model::Message;

/// Rolling context carried between turns. Only the latest assistant reply is
/// kept; the user's message lives in the outgoing request and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    system_prompt: String,
    assistant_message: String,
}

impl ConversationState {
    pub fn new(system_prompt: impl Into<String>, greeting: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            assistant_message: greeting.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.system_prompt.clone(), cfg.greeting.clone())
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn assistant_message(&self) -> &str {
        &self.assistant_message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Empty input; no request was made.
    UserExit,
    /// The service answered with zero candidates.
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    Replied(String),
    Terminated(Termination),
}

pub fn build_request(state: &ConversationState, user_message: &str) -> TurnRequest {
    TurnRequest {
        messages: vec![
            Message::system(state.system_prompt.clone()),
            Message::assistant(state.assistant_message.clone()),
            Message::user(user_message),
        ],
    }
}

pub struct Conversation<S> {
    state: ConversationState,
    service: S,
}

impl<S: CompletionService> Conversation<S> {
    pub fn new(state: ConversationState, service: S) -> Self {
        Self { state, service }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Runs one round trip. Transport errors are returned untouched; the
    /// state only changes when the service produced at least one candidate.
    pub async fn run_turn(&mut self, user_input: &str) -> Result<Turn> {
        if user_input.is_empty() {
            info!("empty input, ending conversation");
            return Ok(Turn::Terminated(Termination::UserExit));
        }

        let request = build_request(&self.state, user_input);
        debug!(
            user_len = user_input.len(),
            assistant_len = self.state.assistant_message.len(),
            "submitting turn"
        );
        let response = self.service.complete(request).await?;

        let Some(reply) = response.first_candidate() else {
            warn!("completion service returned no candidates");
            return Ok(Turn::Terminated(Termination::EmptyResponse));
        };

        if response.candidates.len() > 1 {
            debug!(
                candidate_count = response.candidates.len(),
                "using first candidate"
            );
        }
        self.state.assistant_message = reply.to_string();
        Ok(Turn::Replied(self.state.assistant_message.clone()))
    }
}
