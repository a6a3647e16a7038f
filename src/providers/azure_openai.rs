use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::Message;
use crate::providers::http_errors::{completion_request_error, completion_status_error};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn chat_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        endpoint.trim_end_matches('/'),
        deployment,
        api_version
    )
}

fn to_chat_messages(messages: &[Message]) -> Vec<ChatMessage<'_>> {
    messages
        .iter()
        .map(|msg| ChatMessage {
            role: msg.role.as_str(),
            content: &msg.content,
        })
        .collect()
}

fn require<'a>(value: Option<&'a str>, var: &str) -> Result<&'a str> {
    value.ok_or_else(|| anyhow!("{var} is not set. Add it to the environment or a .env file."))
}

/// Sends one chat-completions request and returns every candidate's text in
/// the order the service produced them.
pub async fn chat(client: &Client, cfg: &Config, messages: &[Message]) -> Result<Vec<String>> {
    let endpoint = require(cfg.endpoint.as_deref(), "OPENAI_AZURE_ENDPOINT")?;
    let deployment = require(cfg.deployment.as_deref(), "OPENAI_AZURE_DEPLOYMENT")?;
    let api_key = require(cfg.api_key.as_deref(), "OPENAI_AZURE_KEY")?;

    let api_url = chat_url(endpoint, deployment, &cfg.api_version);
    let body = ChatCompletionRequest {
        model: deployment,
        messages: to_chat_messages(messages),
    };
    debug!(
        api_url = %api_url,
        deployment = %deployment,
        message_count = messages.len(),
        "sending chat completion request"
    );

    let response = client
        .post(&api_url)
        .header("api-key", api_key)
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                deployment = %deployment,
                error = %err,
                "chat completion request failed"
            );
            completion_request_error(err, &api_url)
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            deployment = %deployment,
            status = %status,
            response_body_len = response_body.len(),
            "completion endpoint returned non-success status"
        );
        return Err(completion_status_error(status, &response_body));
    }

    let parsed: ChatCompletionResponse = response
        .json()
        .await
        .context("Failed to parse chat completion response")?;
    let candidates: Vec<String> = parsed
        .choices
        .into_iter()
        .map(|choice| choice.message.content.unwrap_or_default())
        .collect();
    debug!(
        deployment = %deployment,
        candidate_count = candidates.len(),
        first_len = candidates.first().map_or(0, String::len),
        "received chat completion response"
    );
    Ok(candidates)
}
