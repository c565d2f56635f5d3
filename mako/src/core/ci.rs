//! CI check classification for `gh pr checks` output.

use serde::Deserialize;

/// One check row as reported by `gh pr checks --json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckRun {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    /// Present on forges that split state from conclusion.
    #[serde(default)]
    pub conclusion: Option<String>,
    /// gh's coarse grouping: pass, fail, pending, skipping, cancel.
    #[serde(default)]
    pub bucket: Option<String>,
}

impl CheckRun {
    /// Conclusion when present, else state, else `UNKNOWN`.
    pub fn effective_state(&self) -> String {
        self.conclusion
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.state.as_deref().filter(|s| !s.trim().is_empty()))
            .map(|s| s.trim().to_ascii_uppercase())
            .unwrap_or_else(|| "UNKNOWN".to_string())
    }

    fn is_pending(&self) -> bool {
        const PENDING: &[&str] = &["PENDING", "QUEUED", "IN_PROGRESS", "WAITING", "REQUESTED"];
        PENDING.contains(&self.effective_state().as_str())
            || self
                .bucket
                .as_deref()
                .is_some_and(|b| b.eq_ignore_ascii_case("pending"))
    }

    fn is_passing(&self) -> bool {
        const PASSING: &[&str] = &["SUCCESS", "SKIPPED", "NEUTRAL"];
        PASSING.contains(&self.effective_state().as_str())
    }
}

/// Overall classification across all checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiVerdict {
    Pending,
    Green,
    Failed,
}

impl CiVerdict {
    pub fn line(self) -> &'static str {
        match self {
            CiVerdict::Pending => "→ Still waiting for checks to complete",
            CiVerdict::Green => "→ All checks GREEN",
            CiVerdict::Failed => "→ Some checks FAILED",
        }
    }
}

/// Pending wins over failure; an empty check list counts as green.
pub fn classify(checks: &[CheckRun]) -> CiVerdict {
    if checks.iter().any(CheckRun::is_pending) {
        CiVerdict::Pending
    } else if checks.iter().all(CheckRun::is_passing) {
        CiVerdict::Green
    } else {
        CiVerdict::Failed
    }
}

/// Multi-line summary ending with the verdict line.
pub fn render_ci_summary(checks: &[CheckRun]) -> String {
    let mut lines = vec!["CI Status:".to_string()];
    for check in checks {
        lines.push(format!("- {}: {}", check.name, check.effective_state()));
    }
    lines.push(String::new());
    lines.push(classify(checks).line().to_string());
    lines.join("\n")
}
