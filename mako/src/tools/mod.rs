//! Tool registry: the catalog shown to the model and name-based dispatch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::catalog::tool_catalog;
use crate::core::tool_args::{ArgDecoder, ToolArgs};
use crate::core::types::GoalId;
use crate::io::config::AgentConfig;
use crate::io::console::Confirmer;
use crate::io::process::CommandRunner;

pub mod github;
pub mod shell;

/// Per-registry settings handed to every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    pub workdir: PathBuf,
    pub enable_automerge: bool,
    pub confirm_pr_creation: bool,
    pub base_branch: String,
    pub shell_timeout: Duration,
    pub shell_output_limit_bytes: usize,
}

impl ToolSettings {
    pub fn from_config(config: &AgentConfig, workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            enable_automerge: config.enable_automerge,
            confirm_pr_creation: config.confirm_pr_creation,
            base_branch: config.base_branch.clone(),
            shell_timeout: config.shell_timeout(),
            shell_output_limit_bytes: config.shell_output_limit_bytes,
        }
    }
}

/// Shared dependencies for tool handlers.
pub struct ToolContext<'a> {
    pub settings: &'a ToolSettings,
    pub runner: &'a dyn CommandRunner,
    pub confirmer: &'a dyn Confirmer,
}

impl ToolContext<'_> {
    pub fn workdir(&self) -> &Path {
        &self.settings.workdir
    }

    /// Ask the operator when confirmations are enabled; otherwise proceed.
    pub fn confirm(&self, question: &str) -> Result<bool> {
        if !self.settings.confirm_pr_creation {
            return Ok(true);
        }
        self.confirmer.confirm(question)
    }
}

/// Catalog plus handlers, routed by tool name.
pub struct ToolRegistry<'a> {
    decoder: ArgDecoder,
    wire_catalog: Vec<Value>,
    settings: ToolSettings,
    runner: &'a dyn CommandRunner,
    confirmer: &'a dyn Confirmer,
}

impl<'a> ToolRegistry<'a> {
    pub fn new(
        settings: ToolSettings,
        runner: &'a dyn CommandRunner,
        confirmer: &'a dyn Confirmer,
    ) -> Result<Self> {
        let decoder = ArgDecoder::new(tool_catalog())?;
        let wire_catalog = decoder.specs().map(|spec| spec.to_wire()).collect();
        Ok(Self {
            decoder,
            wire_catalog,
            settings,
            runner,
            confirmer,
        })
    }

    /// OpenAI `tools` array sent with every request.
    pub fn wire_catalog(&self) -> &[Value] {
        &self.wire_catalog
    }

    /// Run a tool by name.
    ///
    /// Unknown names and argument problems come back as result text, never as
    /// `Err`. `Err` is reserved for unexpected handler failures.
    #[instrument(skip_all, fields(tool = name, goal = ?current_goal))]
    pub fn execute(
        &self,
        name: &str,
        arguments: Option<&str>,
        current_goal: Option<&GoalId>,
    ) -> Result<String> {
        let args = match self.decoder.decode(name, arguments) {
            Ok(args) => args,
            Err(err) => {
                debug!(error = %err, "tool arguments rejected");
                return Ok(err.to_string());
            }
        };
        let ctx = ToolContext {
            settings: &self.settings,
            runner: self.runner,
            confirmer: self.confirmer,
        };
        match args {
            ToolArgs::GitCreateBranchAndPush(args) => github::create_branch_and_push(&ctx, &args),
            ToolArgs::GithubCreatePr(args) => github::create_pr(&ctx, &args),
            ToolArgs::GithubCheckPrStatus(args) => github::check_pr_status(&ctx, &args),
            ToolArgs::GithubCheckCiStatus(args) => github::check_ci_status(&ctx, &args),
            ToolArgs::RunSafeShell(args) => shell::run_safe_shell(&ctx, &args),
        }
    }
}
