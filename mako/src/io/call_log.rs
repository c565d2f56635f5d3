//! Append-only session logs under the memory directory.
//!
//! These are product artifacts: always written, never read back by the agent,
//! and independent of `RUST_LOG` (see `logging`).

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::core::reliability::ReliabilityRecord;
use crate::core::types::GoalId;

/// Metadata for one model call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallLogEntry {
    pub timestamp: String,
    pub turn_id: u32,
    pub model: String,
    pub endpoint: String,
    pub messages_count: usize,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub temperature: f32,
    pub duration_sec: f64,
    pub tool_calls: usize,
    pub success: bool,
    pub error: Option<String>,
    pub goal_id: Option<GoalId>,
    pub user_prompt_snippet: String,
    pub response_snippet: String,
}

/// A reliability record stamped with the time it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReliabilityEntry<'a> {
    pub timestamp: String,
    #[serde(flatten)]
    pub record: &'a ReliabilityRecord,
}

/// UTC timestamp in RFC 3339 with a `Z` suffix.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Seconds rounded to millisecond precision.
pub fn round_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}

/// Append `value` as a single JSON line.
pub fn append_jsonl<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut line = serde_json::to_string(value).context("serialize log line")?;
    line.push('\n');
    append_text(path, &line)
}

pub fn append_reliability(path: &Path, record: &ReliabilityRecord) -> Result<()> {
    append_jsonl(
        path,
        &ReliabilityEntry {
            timestamp: now_rfc3339(),
            record,
        },
    )
}

/// Append `<unix seconds>,<label>,<elapsed seconds>` to the performance log.
pub fn append_timing(path: &Path, label: &str, elapsed: Duration) -> Result<()> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    append_text(
        path,
        &format!("{now:.3},{label},{:.3}\n", elapsed.as_secs_f64()),
    )
}

fn append_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log dir {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("append {}", path.display()))
}
