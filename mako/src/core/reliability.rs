//! Per-call reliability scoring for tool results.

use serde::{Deserialize, Serialize};

use super::types::GoalId;

const HELPFUL: f64 = 0.9;
const UNHELPFUL: f64 = 0.3;

/// Success/helpfulness signal for one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityRecord {
    pub tool: String,
    pub goal_id: Option<GoalId>,
    pub success: bool,
    pub helpfulness: f64,
}

impl ReliabilityRecord {
    /// Score a result by its text: anything mentioning "error" counts as a failure.
    pub fn from_result(tool: &str, goal_id: Option<GoalId>, result: &str) -> Self {
        let success = !result.to_lowercase().contains("error");
        Self {
            tool: tool.to_string(),
            goal_id,
            success,
            helpfulness: if success { HELPFUL } else { UNHELPFUL },
        }
    }

    /// One-line operator notice.
    pub fn describe(&self) -> String {
        let goal = self
            .goal_id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "none".to_string());
        format!(
            "[Reliability] {} for goal {}: success={}, helpfulness={}",
            self.tool, goal, self.success, self.helpfulness
        )
    }
}
