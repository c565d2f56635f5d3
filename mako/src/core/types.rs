//! Shared wire types for chat messages and tool invocations.
//!
//! These mirror the OpenAI-compatible chat-completion shapes closely enough to
//! be serialized straight into a request body.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Function name plus its JSON-encoded argument payload, as sent by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Raw argument string; the model is asked for a JSON object but nothing
    /// guarantees it.
    #[serde(default)]
    pub arguments: Option<String>,
}

/// One tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

impl ToolInvocation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: Some(arguments.into()),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn arguments(&self) -> Option<&str> {
        self.function.arguments.as_deref()
    }
}

/// A single message in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolInvocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
            name: None,
        }
    }

    /// Result message answering `invocation`.
    pub fn tool_result(invocation: &ToolInvocation, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(invocation.id.clone()),
            name: Some(invocation.name().to_string()),
        }
    }

    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Token accounting reported by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    #[serde(default)]
    pub completion_tokens: Option<u64>,
}

/// Assistant reply extracted from a chat-completion response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub message: ChatMessage,
    pub usage: Option<Usage>,
}

/// Goal identifier as stored in goal memory (integer or string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GoalId {
    Number(i64),
    Text(String),
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalId::Number(n) => write!(f, "{n}"),
            GoalId::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assistant_reply_with_tool_calls_deserializes() {
        let raw = json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "run_safe_shell", "arguments": "{\"cmd\":\"ls\"}"}
            }]
        });
        let msg: ChatMessage = serde_json::from_value(raw).expect("parse");
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_none());
        assert_eq!(msg.tool_calls[0].name(), "run_safe_shell");
        assert_eq!(msg.tool_calls[0].arguments(), Some("{\"cmd\":\"ls\"}"));
    }

    #[test]
    fn tool_result_serializes_name_and_call_id() {
        let call = ToolInvocation::new("call_9", "github_check_pr_status", "{}");
        let msg = ChatMessage::tool_result(&call, "ok");
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(
            value,
            json!({"role": "tool", "content": "ok", "tool_call_id": "call_9", "name": "github_check_pr_status"})
        );
    }

    #[test]
    fn goal_id_accepts_numbers_and_strings() {
        let ids: Vec<GoalId> = serde_json::from_value(json!([0, "maint"])).expect("parse");
        assert_eq!(ids, vec![GoalId::Number(0), GoalId::Text("maint".to_string())]);
        assert_eq!(ids[0].to_string(), "0");
    }
}
