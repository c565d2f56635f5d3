//! System prompt rendering.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use super::config::AgentConfig;
use super::goals::GoalMemory;

const SYSTEM_TEMPLATE: &str = include_str!("prompts/system.md");

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("system", SYSTEM_TEMPLATE)
            .context("system template should be valid")?;
        Ok(Self { env })
    }

    /// Render the system message with the operator's toggles and goal memory.
    pub fn render_system(&self, config: &AgentConfig, goals: &GoalMemory) -> Result<String> {
        let template = self.env.get_template("system")?;
        let rendered = template.render(context! {
            base_branch => config.base_branch.as_str(),
            automerge => config.enable_automerge,
            goals_overview => goals.to_pretty_json()?,
        })?;
        Ok(rendered.trim().to_string())
    }
}
