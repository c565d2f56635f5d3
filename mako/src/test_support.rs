//! Scripted fakes for exercising the agent without a model, `git`, or `gh`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::core::types::{ChatMessage, ChatReply, ToolInvocation, Usage};
use crate::io::config::AgentConfig;
use crate::io::console::{Confirmer, Operator};
use crate::io::llm::{ChatClient, ChatRequest};
use crate::io::paths::AgentPaths;
use crate::io::process::{CommandOutput, CommandRequest, CommandRunner};
use crate::tools::ToolSettings;

/// Records every request; replays scripted outputs, then succeeds with no output.
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<CommandRequest>>,
    outputs: RefCell<VecDeque<Result<CommandOutput>>>,
}

impl RecordingRunner {
    pub fn with_outputs(outputs: Vec<Result<CommandOutput>>) -> Self {
        Self {
            calls: RefCell::default(),
            outputs: RefCell::new(outputs.into()),
        }
    }

    pub fn calls(&self) -> Vec<CommandRequest> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, request: &CommandRequest) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(request.clone());
        self.outputs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(ok_output("")))
    }
}

pub fn ok_output(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
        stdout_truncated: 0,
        stderr_truncated: 0,
        timed_out: false,
    }
}

pub fn failed_output(code: i32, stdout: &str, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
        stdout_truncated: 0,
        stderr_truncated: 0,
        timed_out: false,
    }
}

pub fn timed_out_output() -> CommandOutput {
    CommandOutput {
        exit_code: None,
        stdout: Vec::new(),
        stderr: Vec::new(),
        stdout_truncated: 0,
        stderr_truncated: 0,
        timed_out: true,
    }
}

/// The error a runner reports when `program` is not installed.
pub fn not_found_error(program: &str) -> anyhow::Error {
    anyhow::Error::new(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "No such file or directory (os error 2)",
    ))
    .context(format!("run {program}"))
}

/// Answers confirmations from a script; defaults to yes once exhausted.
#[derive(Default)]
pub struct ScriptedConfirmer {
    answers: RefCell<VecDeque<bool>>,
    questions: RefCell<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn new(answers: Vec<bool>) -> Self {
        Self {
            answers: RefCell::new(answers.into()),
            questions: RefCell::default(),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.borrow().clone()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, question: &str) -> Result<bool> {
        self.questions.borrow_mut().push(question.to_string());
        Ok(self.answers.borrow_mut().pop_front().unwrap_or(true))
    }
}

/// Feeds scripted input lines and captures everything said.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    inputs: VecDeque<String>,
    pub prompts: usize,
    pub output: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            prompts: 0,
            output: Vec::new(),
        }
    }

    pub fn transcript(&self) -> String {
        self.output.join("\n")
    }
}

impl Operator for ScriptedOperator {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        self.prompts += 1;
        Ok(self.inputs.pop_front())
    }

    fn say(&mut self, text: &str) {
        self.output.push(text.to_string());
    }
}

/// Replays scripted replies and snapshots each request's messages.
#[derive(Default)]
pub struct ScriptedChatClient {
    replies: RefCell<VecDeque<Result<ChatReply>>>,
    requests: RefCell<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChatClient {
    pub fn new(replies: Vec<Result<ChatReply>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            requests: RefCell::default(),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.borrow().clone()
    }
}

impl ChatClient for ScriptedChatClient {
    fn complete(&self, request: &ChatRequest<'_>) -> Result<ChatReply> {
        self.requests.borrow_mut().push(request.messages.to_vec());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("scripted chat client has no more replies")))
    }

    fn endpoint(&self) -> &str {
        "scripted://chat"
    }
}

pub fn text_reply(text: &str) -> ChatReply {
    ChatReply {
        message: ChatMessage::assistant(Some(text.to_string()), Vec::new()),
        usage: Some(Usage {
            prompt_tokens: Some(100),
            completion_tokens: Some(20),
        }),
    }
}

/// Reply requesting `(id, tool name, arguments)` invocations.
pub fn tool_reply(calls: &[(&str, &str, &str)]) -> ChatReply {
    let invocations = calls
        .iter()
        .map(|(id, name, args)| ToolInvocation::new(*id, *name, *args))
        .collect();
    ChatReply {
        message: ChatMessage::assistant(None, invocations),
        usage: None,
    }
}

/// Defaults with confirmations off and no retry pause.
pub fn test_config() -> AgentConfig {
    AgentConfig {
        confirm_pr_creation: false,
        error_retry_delay_secs: 0,
        bearer_token_env: "MAKO_TEST_TOKEN_UNSET".to_string(),
        ..AgentConfig::default()
    }
}

pub fn test_settings(workdir: impl Into<PathBuf>) -> ToolSettings {
    ToolSettings::from_config(&test_config(), workdir)
}

/// Scratch working directory with resolved agent paths.
pub struct TestWorkspace {
    pub temp: TempDir,
    pub paths: AgentPaths,
}

impl TestWorkspace {
    pub fn new(config: &AgentConfig) -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = AgentPaths::new(temp.path(), config);
        Self { temp, paths }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }
}
