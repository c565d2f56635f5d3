//! Canonical file locations for a working directory.

use std::path::PathBuf;

use super::config::AgentConfig;

pub const CONFIG_FILE: &str = "mako.toml";

/// All paths the agent reads or writes, rooted at the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPaths {
    pub memory_dir: PathBuf,
    pub goals_path: PathBuf,
    pub reliability_path: PathBuf,
    pub call_log_path: PathBuf,
    pub perf_log_path: PathBuf,
}

impl AgentPaths {
    pub fn new(root: impl Into<PathBuf>, config: &AgentConfig) -> Self {
        let root = root.into();
        let memory_dir = root.join(&config.memory_dir);
        Self {
            memory_dir: memory_dir.clone(),
            goals_path: memory_dir.join("goals.json"),
            reliability_path: memory_dir.join("tool-reliability.jsonl"),
            call_log_path: memory_dir.join("llm-calls.log.jsonl"),
            perf_log_path: root.join("performance.log"),
        }
    }

    /// Default config location for a working directory.
    pub fn default_config_path(root: impl Into<PathBuf>) -> PathBuf {
        root.into().join(CONFIG_FILE)
    }
}
