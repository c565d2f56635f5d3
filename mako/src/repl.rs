//! Interactive read-eval loop over operator input.

use std::thread;

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument};

use crate::core::conversation::Conversation;
use crate::io::console::Operator;
use crate::turn::{Agent, TurnOutcome, run_turn};

pub const PROMPT: &str = "> ";

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplExit {
    Quit,
    EndOfInput,
}

/// `quit`, `exit` or `q`, ignoring case and surrounding whitespace.
pub fn is_quit(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "quit" | "exit" | "q")
}

/// Drive turns until the operator quits or input ends, then persist goals.
///
/// A failed turn is reported, rolled back by [`run_turn`], and followed by a
/// short pause before the next prompt.
#[instrument(skip_all)]
pub fn run_repl(
    agent: &Agent<'_>,
    conversation: &mut Conversation,
    operator: &mut dyn Operator,
) -> Result<ReplExit> {
    let exit = loop {
        let line = match operator.read_line(PROMPT) {
            Ok(line) => line,
            Err(err) => {
                if let Err(save_err) = agent.goals.save() {
                    error!(error = %format!("{save_err:#}"), "failed to save goals");
                }
                return Err(err).context("read operator input");
            }
        };
        let Some(line) = line else {
            debug!("end of input");
            break ReplExit::EndOfInput;
        };
        if is_quit(&line) {
            break ReplExit::Quit;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match run_turn(agent, conversation, operator, input) {
            Ok(TurnOutcome::Answered { rounds }) => debug!(rounds, "turn answered"),
            Ok(TurnOutcome::RoundLimit { rounds }) => info!(rounds, "turn hit round limit"),
            Err(err) => {
                error!(error = %format!("{err:#}"), "turn failed");
                operator.say(&format!("Critical loop error: {err:#}"));
                thread::sleep(agent.config.error_retry_delay());
            }
        }
    };

    agent
        .goals
        .save()
        .with_context(|| format!("save goals {}", agent.goals.path().display()))?;
    info!(?exit, turns = conversation.turns(), "session ended");
    Ok(exit)
}
