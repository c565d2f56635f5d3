//! Conversation history with the tool-message pairing invariant.

use std::collections::HashSet;

use anyhow::{Result, anyhow};

use super::types::{ChatMessage, Role, ToolInvocation};

/// Ordered message history for one process run.
///
/// Every `tool` message must answer a pending invocation of the most recent
/// assistant message; otherwise the API rejects the conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    turns: u32,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt)],
            turns: 0,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of user turns started so far.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Append a user message and start a new turn. Returns the turn number.
    pub fn push_user(&mut self, content: impl Into<String>) -> u32 {
        self.messages.push(ChatMessage::user(content));
        self.turns += 1;
        self.turns
    }

    pub fn push_assistant(&mut self, message: ChatMessage) -> Result<()> {
        if message.role != Role::Assistant {
            return Err(anyhow!("expected assistant message, got {:?}", message.role));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Append the result for `invocation`, enforcing that it is still pending.
    pub fn push_tool_result(
        &mut self,
        invocation: &ToolInvocation,
        content: impl Into<String>,
    ) -> Result<()> {
        if !self.is_pending(&invocation.id) {
            return Err(anyhow!(
                "tool result for '{}' ({}) has no pending invocation",
                invocation.name(),
                invocation.id
            ));
        }
        self.messages
            .push(ChatMessage::tool_result(invocation, content));
        Ok(())
    }

    /// True if the latest assistant message requested `id` and no tool message
    /// has answered it yet.
    pub fn is_pending(&self, id: &str) -> bool {
        let Some(assistant_idx) = self
            .messages
            .iter()
            .rposition(|m| m.role == Role::Assistant)
        else {
            return false;
        };
        let tail = &self.messages[assistant_idx + 1..];
        if tail.iter().any(|m| m.role != Role::Tool) {
            return false;
        }
        let requested = self.messages[assistant_idx]
            .tool_calls
            .iter()
            .any(|call| call.id == id);
        let answered = tail
            .iter()
            .any(|m| m.tool_call_id.as_deref() == Some(id));
        requested && !answered
    }

    /// Most recent message content, used for log snippets.
    pub fn last_text(&self) -> &str {
        self.messages.last().map(ChatMessage::text).unwrap_or("")
    }

    /// Undo the unfinished tail of a turn that started at `len` messages.
    ///
    /// Completed tool rounds (an assistant message plus a result for each of
    /// its invocations) are kept so the model still knows what already ran.
    /// An assistant message with unanswered invocations is dropped together
    /// with its partial results. If nothing but the user message is left, the
    /// turn is removed entirely and the turn counter restored to `turns`.
    /// Returns how many messages of the turn remain.
    pub fn abandon_turn(&mut self, len: usize, turns: u32) -> usize {
        if let Some(idx) = self
            .messages
            .iter()
            .rposition(|m| m.role == Role::Assistant)
            .filter(|&idx| idx >= len)
            && !self.round_is_complete(idx)
        {
            self.messages.truncate(idx);
        }
        if self.messages.len() <= len + 1 {
            self.messages.truncate(len);
            self.turns = turns;
        }
        self.messages.len().saturating_sub(len)
    }

    /// True if every invocation of the assistant message at `idx` has a result.
    fn round_is_complete(&self, idx: usize) -> bool {
        let answered: HashSet<&str> = self.messages[idx + 1..]
            .iter()
            .filter_map(|m| m.tool_call_id.as_deref())
            .collect();
        self.messages[idx]
            .tool_calls
            .iter()
            .all(|call| answered.contains(call.id.as_str()))
    }
}

/// Give every invocation in `message` a usable id.
///
/// Some OpenAI-compatible servers send empty or repeated ids; results are
/// paired by id, so those are replaced with `call_<round>_<index>`.
pub fn assign_unique_call_ids(message: &mut ChatMessage, round: u32) {
    let mut seen = HashSet::new();
    for (index, call) in message.tool_calls.iter_mut().enumerate() {
        if call.id.trim().is_empty() || !seen.insert(call.id.clone()) {
            call.id = format!("call_{round}_{index}");
            seen.insert(call.id.clone());
        }
    }
}
