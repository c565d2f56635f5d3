//! One user turn: model calls interleaved with tool rounds until a text answer.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument, warn};

use crate::core::budget::RoundBudget;
use crate::core::conversation::{Conversation, assign_unique_call_ids};
use crate::core::reliability::ReliabilityRecord;
use crate::core::text::{LOG_SNIPPET_CHARS, RESULT_PREVIEW_CHARS, preview};
use crate::core::types::{ChatReply, GoalId, ToolInvocation};
use crate::io::call_log::{
    CallLogEntry, append_jsonl, append_reliability, append_timing, now_rfc3339, round_secs,
};
use crate::io::config::AgentConfig;
use crate::io::console::Operator;
use crate::io::goals::GoalStore;
use crate::io::llm::{ChatClient, ChatRequest};
use crate::io::paths::AgentPaths;
use crate::tools::ToolRegistry;

/// Everything a turn needs besides the conversation and the operator.
pub struct Agent<'a> {
    pub client: &'a dyn ChatClient,
    pub tools: &'a ToolRegistry<'a>,
    pub config: &'a AgentConfig,
    pub paths: &'a AgentPaths,
    pub goals: &'a GoalStore,
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model produced a text answer after `rounds` tool rounds.
    Answered { rounds: u32 },
    /// The model was still requesting tools when the round budget ran out.
    RoundLimit { rounds: u32 },
}

/// Run one turn for `input`.
///
/// On error the unfinished tail of the turn is dropped. Tool rounds that
/// completed stay in the history, since their side effects already happened;
/// a turn that ran no tools is removed entirely.
#[instrument(skip_all, fields(turn = conversation.turns() + 1))]
pub fn run_turn(
    agent: &Agent<'_>,
    conversation: &mut Conversation,
    operator: &mut dyn Operator,
    input: &str,
) -> Result<TurnOutcome> {
    let checkpoint = (conversation.len(), conversation.turns());
    let result = run_rounds(agent, conversation, operator, input);
    if result.is_err() {
        let (len, turns) = checkpoint;
        let kept = conversation.abandon_turn(len, turns);
        debug!(len, kept, "rolled back abandoned turn");
    }
    result
}

fn run_rounds(
    agent: &Agent<'_>,
    conversation: &mut Conversation,
    operator: &mut dyn Operator,
    input: &str,
) -> Result<TurnOutcome> {
    let turn_id = conversation.push_user(input);
    let goal = agent.goals.current_focus()?;
    let mut budget = RoundBudget::new(agent.config.max_tool_rounds);

    loop {
        let mut message = call_model(agent, conversation, turn_id, goal.as_ref())?.message;
        assign_unique_call_ids(&mut message, budget.used());
        let invocations = message.tool_calls.clone();
        conversation.push_assistant(message)?;

        if invocations.is_empty() {
            operator.say(conversation.last_text());
            return Ok(TurnOutcome::Answered {
                rounds: budget.used(),
            });
        }

        for invocation in &invocations {
            let result = run_tool(agent, operator, invocation, goal.as_ref());
            conversation.push_tool_result(invocation, result)?;
        }

        budget.consume();
        if budget.is_exhausted() {
            warn!(rounds = budget.used(), "tool round limit reached");
            operator.say(&format!(
                "[Round limit] Stopped after {} tool rounds without a final answer.",
                budget.used()
            ));
            return Ok(TurnOutcome::RoundLimit {
                rounds: budget.used(),
            });
        }
    }
}

/// Call the model with the full history and record the call either way.
fn call_model(
    agent: &Agent<'_>,
    conversation: &Conversation,
    turn_id: u32,
    goal: Option<&GoalId>,
) -> Result<ChatReply> {
    let config = agent.config;
    let request = ChatRequest {
        model: &config.model,
        messages: conversation.messages(),
        tools: agent.tools.wire_catalog(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };
    let started = Instant::now();
    let result = agent.client.complete(&request);
    let elapsed = started.elapsed();

    let mut entry = CallLogEntry {
        timestamp: now_rfc3339(),
        turn_id,
        model: config.model.clone(),
        endpoint: agent.client.endpoint().to_string(),
        messages_count: conversation.len(),
        input_tokens: None,
        output_tokens: None,
        temperature: config.temperature,
        duration_sec: round_secs(elapsed),
        tool_calls: 0,
        success: result.is_ok(),
        error: None,
        goal_id: goal.cloned(),
        user_prompt_snippet: preview(conversation.last_text(), LOG_SNIPPET_CHARS),
        response_snippet: String::new(),
    };
    match &result {
        Ok(reply) => {
            if let Some(usage) = &reply.usage {
                entry.input_tokens = usage.prompt_tokens;
                entry.output_tokens = usage.completion_tokens;
            }
            entry.tool_calls = reply.message.tool_calls.len();
            entry.response_snippet = preview(reply.message.text(), LOG_SNIPPET_CHARS);
            info!(
                duration_sec = entry.duration_sec,
                tool_calls = entry.tool_calls,
                "model call finished"
            );
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "model call failed");
            entry.error = Some(format!("{err:#}"));
        }
    }
    if let Err(err) = append_jsonl(&agent.paths.call_log_path, &entry) {
        warn!(error = %format!("{err:#}"), "failed to append call log");
    }

    result.with_context(|| format!("chat completion for turn {turn_id}"))
}

/// Execute one invocation and report it. Always yields result text.
fn run_tool(
    agent: &Agent<'_>,
    operator: &mut dyn Operator,
    invocation: &ToolInvocation,
    goal: Option<&GoalId>,
) -> String {
    let name = invocation.name();
    let arguments = invocation.arguments();
    operator.say(&format!("[Tool call] {name}({})", arguments.unwrap_or("{}")));

    let started = Instant::now();
    let result = match agent.tools.execute(name, arguments, goal) {
        Ok(text) => text,
        Err(err) => {
            warn!(tool = name, error = %format!("{err:#}"), "tool execution failed");
            format!("Tool execution failed: {err:#}")
        }
    };
    let elapsed = started.elapsed();
    operator.say(&format!(
        "[Result] {}",
        preview(&result, RESULT_PREVIEW_CHARS)
    ));

    let record = ReliabilityRecord::from_result(name, goal.cloned(), &result);
    operator.say(&record.describe());
    if let Err(err) = append_reliability(&agent.paths.reliability_path, &record) {
        warn!(error = %format!("{err:#}"), "failed to append reliability record");
    }
    if let Err(err) = append_timing(&agent.paths.perf_log_path, &format!("tool:{name}"), elapsed) {
        warn!(error = %format!("{err:#}"), "failed to append timing");
    }
    result
}
