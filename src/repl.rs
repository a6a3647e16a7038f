use anyhow::{Context, Result};
use reqwest::Client;
use std::io::{self, BufRead, Write};
use tracing::info;

use crate::completion::{AzureCompletionService, CompletionService};
use crate::config::Config;
use crate::conversation::{Conversation, ConversationState, Termination, Turn};

const USER_PROMPT: &str = "You (just press enter to exit the conversation): ";
const WAITING_INDICATOR: &str = "Thinking...";
const EMPTY_RESPONSE_ERROR: &str = "Error: no response from the API. Exiting...";

pub async fn run_repl(client: &Client, cfg: &Config) -> Result<()> {
    let conversation = Conversation::new(
        ConversationState::from_config(cfg),
        AzureCompletionService::new(client, cfg),
    );
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_repl_with(conversation, stdin.lock(), stdout.lock()).await?;
    Ok(())
}

/// Drives the conversation until the user enters an empty line, input ends,
/// or the service returns nothing. Returns how the loop ended.
pub async fn run_repl_with<S, R, W>(
    mut conversation: Conversation<S>,
    mut input: R,
    mut output: W,
) -> Result<Termination>
where
    S: CompletionService,
    R: BufRead,
    W: Write,
{
    print_assistant(&mut output, conversation.state().assistant_message())?;

    loop {
        write!(output, "\n{USER_PROMPT}").context("Failed to write prompt")?;
        output.flush().context("Failed to flush stdout")?;

        let Some(line) = read_user_line(&mut input)? else {
            info!("input closed, ending conversation");
            writeln!(output).context("Failed to write to stdout")?;
            return Ok(Termination::UserExit);
        };

        if !line.is_empty() {
            write!(output, "\n{WAITING_INDICATOR}").context("Failed to write to stdout")?;
            output.flush().context("Failed to flush stdout")?;
        }

        match conversation.run_turn(&line).await? {
            Turn::Replied(reply) => {
                writeln!(output, "\n").context("Failed to write to stdout")?;
                print_assistant(&mut output, &reply)?;
            }
            Turn::Terminated(Termination::UserExit) => return Ok(Termination::UserExit),
            Turn::Terminated(Termination::EmptyResponse) => {
                writeln!(output, "\n").context("Failed to write to stdout")?;
                writeln!(output, "{EMPTY_RESPONSE_ERROR}").context("Failed to write to stdout")?;
                return Ok(Termination::EmptyResponse);
            }
        }
    }
}

/// Reads one line without its line terminator. `None` means end of input.
fn read_user_line(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read stdin")?;
    if read == 0 {
        return Ok(None);
    }

    let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}

fn print_assistant(output: &mut impl Write, message: &str) -> Result<()> {
    writeln!(output, "🤖: {message}").context("Failed to write to stdout")
}
