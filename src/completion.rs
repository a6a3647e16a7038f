use anyhow::Result;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

use crate::config::Config;
use crate::model::Message;
use crate::providers;

/// Ordered role/content pairs sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub messages: Vec<Message>,
}

/// Zero or more candidate replies, in the order the service returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnResponse {
    pub candidates: Vec<String>,
}

impl TurnResponse {
    pub fn first_candidate(&self) -> Option<&str> {
        self.candidates.first().map(String::as_str)
    }
}

pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<TurnResponse>> + 'a>>;

pub trait CompletionService {
    fn complete<'a>(&'a self, request: TurnRequest) -> CompletionFuture<'a>;
}

impl<T: CompletionService + ?Sized> CompletionService for &T {
    fn complete<'a>(&'a self, request: TurnRequest) -> CompletionFuture<'a> {
        (**self).complete(request)
    }
}

pub struct AzureCompletionService<'a> {
    client: &'a Client,
    cfg: &'a Config,
}

impl<'a> AzureCompletionService<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }
}

impl<'a> CompletionService for AzureCompletionService<'a> {
    fn complete<'b>(&'b self, request: TurnRequest) -> CompletionFuture<'b> {
        Box::pin(async move {
            let candidates =
                providers::azure_openai::chat(self.client, self.cfg, &request.messages).await?;
            Ok(TurnResponse { candidates })
        })
    }
}
