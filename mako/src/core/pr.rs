//! Pull request status rendering for `gh pr view --json` output.

use serde::Deserialize;
use serde_json::Value;

/// Fields requested from `gh pr view`.
pub const PR_VIEW_FIELDS: &str =
    "state,title,number,mergedAt,mergeable,baseRefName,headRefName,autoMergeRequest";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrView {
    pub state: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub merged_at: Option<String>,
    #[serde(default)]
    pub mergeable: Option<String>,
    #[serde(default)]
    pub base_ref_name: Option<String>,
    #[serde(default)]
    pub head_ref_name: Option<String>,
    #[serde(default)]
    pub auto_merge_request: Option<Value>,
}

impl PrView {
    pub fn merged(&self) -> bool {
        self.state.eq_ignore_ascii_case("MERGED")
            || self.merged_at.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn auto_merge_requested(&self) -> bool {
        self.auto_merge_request
            .as_ref()
            .is_some_and(|v| !v.is_null())
    }

    pub fn render(&self) -> String {
        let number = self
            .number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());
        format!(
            "PR #{number} - {title}\n\
             State: {state}\n\
             Merged: {merged}\n\
             Mergeable: {mergeable}\n\
             Base ← Head: {base} ← {head}\n\
             Auto-merge requested: {auto}",
            title = self.title.as_deref().unwrap_or(""),
            state = self.state,
            merged = self.merged(),
            mergeable = self.mergeable.as_deref().unwrap_or("unknown"),
            base = self.base_ref_name.as_deref().unwrap_or("?"),
            head = self.head_ref_name.as_deref().unwrap_or("?"),
            auto = self.auto_merge_requested(),
        )
    }
}
