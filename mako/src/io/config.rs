//! Agent configuration stored in `mako.toml`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Agent configuration (TOML).
///
/// Intended to be edited by humans. Missing fields default to the values the
/// agent ships with; the safety toggles default to the cautious side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// Model identifier sent with every chat request.
    pub model: String,

    /// Sampling temperature (kept low for repeatable code tasks).
    pub temperature: f32,

    /// Maximum output tokens per model call.
    pub max_tokens: u32,

    /// OpenAI-compatible base URL (or full `/chat/completions` URL).
    pub endpoint_url: String,

    /// Bearer token. Prefer `bearer_token_env` so secrets stay out of the file.
    pub bearer_token: Option<String>,

    /// Environment variable holding the bearer token; wins over `bearer_token`.
    pub bearer_token_env: String,

    /// Human toggle: request squash automerge on newly created PRs.
    pub enable_automerge: bool,

    /// Ask the operator before creating branches or PRs.
    pub confirm_pr_creation: bool,

    /// Default target branch for new PRs.
    pub base_branch: String,

    /// Maximum consecutive tool rounds per user turn.
    pub max_tool_rounds: u32,

    pub shell_timeout_secs: u64,

    pub shell_output_limit_bytes: usize,

    /// HTTP timeout for a single model call.
    pub request_timeout_secs: u64,

    /// Pause before re-prompting after a failed turn.
    pub error_retry_delay_secs: u64,

    /// Directory (relative to the working directory) for goals and logs.
    pub memory_dir: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "alibaba-qwen3-32b".to_string(),
            temperature: 0.2,
            max_tokens: 4096,
            endpoint_url: "https://inference.do-ai.run/v1".to_string(),
            bearer_token: None,
            bearer_token_env: "DO_GENAI_TOKEN".to_string(),
            enable_automerge: false,
            confirm_pr_creation: true,
            base_branch: "main".to_string(),
            max_tool_rounds: 25,
            shell_timeout_secs: 10,
            shell_output_limit_bytes: 100_000,
            request_timeout_secs: 300,
            error_retry_delay_secs: 5,
            memory_dir: "memory".to_string(),
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(anyhow!("temperature must be within 0.0..=2.0"));
        }
        if self.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be > 0"));
        }
        if self.endpoint_url.trim().is_empty() {
            return Err(anyhow!("endpoint_url must not be empty"));
        }
        if self.base_branch.trim().is_empty() {
            return Err(anyhow!("base_branch must not be empty"));
        }
        if self.max_tool_rounds == 0 {
            return Err(anyhow!("max_tool_rounds must be > 0"));
        }
        if self.shell_timeout_secs == 0 {
            return Err(anyhow!("shell_timeout_secs must be > 0"));
        }
        if self.shell_output_limit_bytes == 0 {
            return Err(anyhow!("shell_output_limit_bytes must be > 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be > 0"));
        }
        if self.memory_dir.trim().is_empty() {
            return Err(anyhow!("memory_dir must not be empty"));
        }
        Ok(())
    }

    pub fn shell_timeout(&self) -> Duration {
        Duration::from_secs(self.shell_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn error_retry_delay(&self) -> Duration {
        Duration::from_secs(self.error_retry_delay_secs)
    }

    /// Token from `bearer_token_env` if set and non-empty, else `bearer_token`.
    pub fn resolve_bearer_token(&self) -> Option<String> {
        std::env::var(&self.bearer_token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.bearer_token.clone())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AgentConfig::default()`.
pub fn load_config(path: &Path) -> Result<AgentConfig> {
    if !path.exists() {
        let cfg = AgentConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AgentConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &AgentConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, AgentConfig::default());
        assert!(!cfg.enable_automerge);
        assert!(cfg.confirm_pr_creation);
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("mako.toml");
        let cfg = AgentConfig {
            model: "llama3.1:8b".to_string(),
            enable_automerge: true,
            bearer_token: Some("secret".to_string()),
            ..AgentConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("mako.toml");
        fs::write(&path, "max_tool_rounds = 3\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.max_tool_rounds, 3);
        assert_eq!(cfg.model, AgentConfig::default().model);
    }

    #[test]
    fn rejects_zero_round_budget() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("mako.toml");
        fs::write(&path, "max_tool_rounds = 0\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("max_tool_rounds must be > 0"));
    }
}
