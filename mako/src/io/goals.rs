//! Goal memory persisted as `memory/goals.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::types::GoalId;

/// Outstanding goals, completed goals, and the current focus.
///
/// Goal records are free-form JSON objects; only their `id` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalMemory {
    #[serde(default)]
    pub goals: Vec<Value>,
    #[serde(default)]
    pub completed: Vec<Value>,
    #[serde(default)]
    pub current_focus: Option<GoalId>,
}

impl GoalMemory {
    /// True if `current_focus` is unset or names a goal in `goals`.
    pub fn focus_is_known(&self) -> bool {
        let Some(focus) = &self.current_focus else {
            return true;
        };
        self.goals.iter().any(|goal| {
            goal.get("id")
                .and_then(|id| serde_json::from_value::<GoalId>(id.clone()).ok())
                .is_some_and(|id| &id == focus)
        })
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize goal memory")
    }
}

/// Load goal memory. A missing file yields the default empty document.
pub fn load_goals(path: &Path) -> Result<GoalMemory> {
    if !path.exists() {
        debug!(path = %path.display(), "no goal memory yet, using defaults");
        return Ok(GoalMemory::default());
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("read goals {}", path.display()))?;
    let memory: GoalMemory = serde_json::from_str(&contents)
        .with_context(|| format!("parse goals {}", path.display()))?;
    debug!(goals = memory.goals.len(), completed = memory.completed.len(), "goal memory loaded");
    Ok(memory)
}

/// Atomically write goal memory to disk (temp file + rename).
pub fn save_goals(path: &Path, memory: &GoalMemory) -> Result<()> {
    debug!(path = %path.display(), "writing goal memory");
    let mut buf = memory.to_pretty_json()?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}

/// Goal memory shared between the session and the interrupt handler.
#[derive(Debug, Clone)]
pub struct GoalStore {
    path: PathBuf,
    memory: Arc<Mutex<GoalMemory>>,
}

impl GoalStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let memory = load_goals(&path)?;
        if !memory.focus_is_known() {
            warn!(focus = ?memory.current_focus, "current_focus does not match any goal id");
        }
        Ok(Self::with_memory(path, memory))
    }

    pub fn with_memory(path: impl Into<PathBuf>, memory: GoalMemory) -> Self {
        Self {
            path: path.into(),
            memory: Arc::new(Mutex::new(memory)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, GoalMemory>> {
        self.memory
            .lock()
            .map_err(|_| anyhow!("goal memory lock poisoned"))
    }

    pub fn snapshot(&self) -> Result<GoalMemory> {
        Ok(self.lock()?.clone())
    }

    pub fn current_focus(&self) -> Result<Option<GoalId>> {
        Ok(self.lock()?.current_focus.clone())
    }

    pub fn save(&self) -> Result<()> {
        let memory = self.lock()?;
        save_goals(&self.path, &memory)
    }
}
