//! Git adapter for the branch tool.
//!
//! We keep a small, explicit wrapper around `git` subprocess calls so the
//! argument vectors live in one place and go through a [`CommandRunner`].

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, instrument};

use super::process::{CommandOutput, CommandRequest, CommandRunner};

/// Wrapper for executing git commands in a working directory.
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
    workdir: PathBuf,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
        }
    }

    /// Create and checkout a new branch at current HEAD.
    #[instrument(skip_all, fields(branch))]
    pub fn checkout_new_branch(&self, branch: &str) -> Result<CommandOutput> {
        debug!(branch, "creating and checking out new branch");
        self.run(&["checkout", "-b", branch])
    }

    /// Push `branch` to origin and set it as upstream.
    #[instrument(skip_all, fields(branch))]
    pub fn push_set_upstream(&self, branch: &str) -> Result<CommandOutput> {
        debug!(branch, "pushing branch with upstream tracking");
        self.run(&["push", "--set-upstream", "origin", branch])
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let request = CommandRequest::new("git", args.iter().copied(), &self.workdir);
        self.runner.run(&request)
    }
}
