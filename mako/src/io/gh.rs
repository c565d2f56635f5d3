//! GitHub CLI (`gh`) adapter for pull request and CI tools.
//!
//! Assumes `gh auth login` has already been done for the working directory.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, instrument};

use super::process::{CommandOutput, CommandRequest, CommandRunner};
use crate::core::pr::PR_VIEW_FIELDS;

/// Fields requested from `gh pr checks`.
pub const PR_CHECKS_FIELDS: &str = "name,state,bucket";

/// Parameters for `gh pr create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrCreate<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub base: &'a str,
    pub draft: bool,
}

pub struct Gh<'a> {
    runner: &'a dyn CommandRunner,
    workdir: PathBuf,
}

impl<'a> Gh<'a> {
    pub fn new(runner: &'a dyn CommandRunner, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
        }
    }

    #[instrument(skip_all, fields(base = pr.base, draft = pr.draft))]
    pub fn pr_create(&self, pr: &PrCreate<'_>) -> Result<CommandOutput> {
        let mut args = vec![
            "pr", "create", "--title", pr.title, "--body", pr.body, "--base", pr.base,
        ];
        if pr.draft {
            args.push("--draft");
        }
        debug!("creating pull request");
        self.run(&args)
    }

    /// Ask GitHub to squash-merge `pr` once its requirements pass.
    #[instrument(skip_all, fields(pr))]
    pub fn pr_enable_automerge(&self, pr: &str) -> Result<CommandOutput> {
        self.run(&["pr", "merge", pr, "--auto", "--squash"])
    }

    #[instrument(skip_all, fields(pr))]
    pub fn pr_view(&self, pr: &str) -> Result<CommandOutput> {
        self.run(&["pr", "view", pr, "--json", PR_VIEW_FIELDS])
    }

    #[instrument(skip_all, fields(pr))]
    pub fn pr_checks(&self, pr: &str) -> Result<CommandOutput> {
        self.run(&["pr", "checks", pr, "--json", PR_CHECKS_FIELDS])
    }

    /// Block until every check on `pr` settles. `gh` refuses `--watch`
    /// together with `--json`, so results are read with [`Gh::pr_checks`].
    #[instrument(skip_all, fields(pr))]
    pub fn pr_checks_watch(&self, pr: &str) -> Result<CommandOutput> {
        debug!("watching checks");
        self.run(&["pr", "checks", pr, "--watch"])
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let request = CommandRequest::new("gh", args.iter().copied(), &self.workdir);
        self.runner.run(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingRunner;

    #[test]
    fn pr_create_marks_draft_only_when_requested() {
        let runner = RecordingRunner::default();
        let gh = Gh::new(&runner, "/repo");
        let mut pr = PrCreate {
            title: "feat: x",
            body: "body text",
            base: "main",
            draft: true,
        };
        gh.pr_create(&pr).expect("create");
        pr.draft = false;
        gh.pr_create(&pr).expect("create");

        let calls = runner.calls();
        assert_eq!(
            calls[0].args,
            vec!["pr", "create", "--title", "feat: x", "--body", "body text", "--base", "main", "--draft"]
        );
        assert!(!calls[1].args.contains(&"--draft".to_string()));
    }

    #[test]
    fn watch_and_json_are_separate_invocations() {
        let runner = RecordingRunner::default();
        let gh = Gh::new(&runner, "/repo");
        gh.pr_checks_watch("17").expect("watch");
        gh.pr_checks("17").expect("checks");
        let calls = runner.calls();
        assert_eq!(calls[0].display(), "gh pr checks 17 --watch");
        assert_eq!(calls[1].display(), "gh pr checks 17 --json name,state,bucket");
    }
}
