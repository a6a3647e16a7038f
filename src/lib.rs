pub mod completion;
pub mod config;
pub mod conversation;
pub mod logging;
pub mod model;
pub mod providers;
pub mod repl;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use std::env;
use tracing::info;

use completion::AzureCompletionService;
use config::Config;
use conversation::{Conversation, ConversationState, Termination, Turn};
use repl::run_repl;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let cfg = Config::from_env();
    info!(
        endpoint = cfg.endpoint.as_deref().unwrap_or("<unset>"),
        deployment = cfg.deployment.as_deref().unwrap_or("<unset>"),
        api_version = %cfg.api_version,
        api_key_present = cfg.api_key.is_some(),
        "loaded runtime configuration"
    );
    let client = Client::builder()
        .build()
        .context("Failed to initialize HTTP client")?;

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        run_repl(&client, &cfg).await
    } else {
        let prompt = args.join(" ");
        run_once(&client, &cfg, &prompt).await
    }
}

async fn run_once(client: &Client, cfg: &Config, prompt: &str) -> Result<()> {
    let mut conversation = Conversation::new(
        ConversationState::from_config(cfg),
        AzureCompletionService::new(client, cfg),
    );
    match conversation.run_turn(prompt).await? {
        Turn::Replied(reply) => println!("{}", reply.trim()),
        Turn::Terminated(Termination::UserExit) => {}
        Turn::Terminated(Termination::EmptyResponse) => bail!("no response from the API"),
    }
    Ok(())
}
