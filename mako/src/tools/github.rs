//! Git and GitHub CLI tool handlers.
//!
//! Every outcome the model should see (declines, failed commands, missing
//! executables) is returned as result text. `Err` only escapes for failures of
//! the operator prompt itself.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::{debug, info, warn};

use super::ToolContext;
use crate::core::ci::{CheckRun, render_ci_summary};
use crate::core::pr::PrView;
use crate::core::tool_args::{BranchArgs, CiStatusArgs, CreatePrArgs, PrStatusArgs};
use crate::io::gh::{Gh, PrCreate};
use crate::io::git::Git;
use crate::io::process::{CommandOutput, is_not_found};

const GH_NOT_FOUND: &str = "Error: GitHub CLI 'gh' not found. Please install it.";

static PR_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+/pull/\d+").expect("valid PR URL regex"));

/// The PR URL printed by `gh pr create`, or the whole trimmed stdout.
pub fn extract_pr_url(stdout: &str) -> String {
    PR_URL_RE
        .find(stdout)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| stdout.trim().to_string())
}

fn unexpected(err: &anyhow::Error) -> String {
    format!("Unexpected error: {err:#}")
}

fn gh_spawn_error(err: &anyhow::Error) -> String {
    if is_not_found(err) {
        GH_NOT_FOUND.to_string()
    } else {
        unexpected(err)
    }
}

pub fn create_branch_and_push(ctx: &ToolContext<'_>, args: &BranchArgs) -> Result<String> {
    let branch = args.branch_name.trim();
    if !ctx.confirm(&format!("Create & push branch '{branch}'?"))? {
        info!(branch, "branch creation declined");
        return Ok("Branch creation aborted by user.".to_string());
    }

    let git = Git::new(ctx.runner, ctx.workdir());
    let checkout = match git.checkout_new_branch(branch) {
        Ok(out) => out,
        Err(err) => return Ok(git_spawn_error(&err)),
    };
    if !checkout.success() {
        return Ok(git_failed(&checkout));
    }
    let push = match git.push_set_upstream(branch) {
        Ok(out) => out,
        Err(err) => return Ok(git_spawn_error(&err)),
    };
    if !push.success() {
        return Ok(git_failed(&push));
    }
    // git reports push progress on stderr.
    let mut details = push.stdout_text();
    if details.is_empty() {
        details = push.stderr_text();
    }
    Ok(format!(
        "Branch '{branch}' created and pushed successfully.\n{details}"
    ))
}

fn git_failed(output: &CommandOutput) -> String {
    warn!(exit_code = ?output.exit_code, "git command failed");
    format!("Git command failed:\n{}", output.failure_text())
}

fn git_spawn_error(err: &anyhow::Error) -> String {
    if is_not_found(err) {
        "Error: git not found. Please install it.".to_string()
    } else {
        unexpected(err)
    }
}

pub fn create_pr(ctx: &ToolContext<'_>, args: &CreatePrArgs) -> Result<String> {
    let base = args
        .base
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .unwrap_or(&ctx.settings.base_branch);
    if !ctx.confirm(&format!(
        "Create PR '{}' (draft={})?",
        args.title, args.draft
    ))? {
        info!(title = %args.title, "PR creation declined");
        return Ok("PR creation aborted by user.".to_string());
    }

    let gh = Gh::new(ctx.runner, ctx.workdir());
    let output = match gh.pr_create(&PrCreate {
        title: &args.title,
        body: &args.body,
        base,
        draft: args.draft,
    }) {
        Ok(out) => out,
        Err(err) => return Ok(gh_spawn_error(&err)),
    };
    if !output.success() {
        warn!(exit_code = ?output.exit_code, "gh pr create failed");
        return Ok(format!("gh pr create failed:\n{}", output.failure_text()));
    }

    let url = extract_pr_url(&output.stdout_text());
    let mut result = format!("PR created successfully!\nURL: {url}");
    if ctx.settings.enable_automerge {
        result.push('\n');
        result.push_str(&request_automerge(&gh, &url));
    }
    Ok(result)
}

fn request_automerge(gh: &Gh<'_>, url: &str) -> String {
    debug!(url, "requesting squash automerge");
    match gh.pr_enable_automerge(url) {
        Ok(out) if out.success() => "Automerge requested (squash).".to_string(),
        Ok(out) => format!("Automerge request failed:\n{}", out.failure_text()),
        Err(err) => format!("Automerge request failed: {err:#}"),
    }
}

pub fn check_pr_status(ctx: &ToolContext<'_>, args: &PrStatusArgs) -> Result<String> {
    let gh = Gh::new(ctx.runner, ctx.workdir());
    let output = match gh.pr_view(args.pr_number_or_url.as_str()) {
        Ok(out) => out,
        Err(err) => return Ok(gh_spawn_error(&err)),
    };
    if !output.success() {
        return Ok(format!(
            "Failed to fetch PR status:\n{}",
            output.failure_text()
        ));
    }
    match serde_json::from_slice::<PrView>(&output.stdout) {
        Ok(view) => Ok(view.render()),
        Err(err) => {
            warn!(error = %err, "unparseable gh pr view output");
            Ok("Failed to parse gh output".to_string())
        }
    }
}

pub fn check_ci_status(ctx: &ToolContext<'_>, args: &CiStatusArgs) -> Result<String> {
    let gh = Gh::new(ctx.runner, ctx.workdir());
    let pr = args.pr_number_or_url.as_str();
    if args.watch {
        // Non-zero here only means some check failed; the JSON query below reports it.
        match gh.pr_checks_watch(pr) {
            Ok(out) => debug!(exit_code = ?out.exit_code, "checks settled"),
            Err(err) => return Ok(gh_spawn_error(&err)),
        }
    }
    let output = match gh.pr_checks(pr) {
        Ok(out) => out,
        Err(err) => return Ok(gh_spawn_error(&err)),
    };
    // gh exits non-zero while checks are pending or failing but still prints JSON.
    match serde_json::from_slice::<Vec<CheckRun>>(&output.stdout) {
        Ok(checks) => Ok(render_ci_summary(&checks)),
        Err(_) if !output.success() => {
            Ok(format!("CI check failed:\n{}", output.failure_text()))
        }
        Err(err) => {
            warn!(error = %err, "unparseable gh pr checks output");
            Ok("Failed to parse gh output".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tool_args::PrRef;
    use crate::test_support::{
        RecordingRunner, ScriptedConfirmer, failed_output, not_found_error, ok_output,
        test_settings,
    };
    use crate::tools::ToolSettings;

    fn ctx<'a>(
        settings: &'a ToolSettings,
        runner: &'a RecordingRunner,
        confirmer: &'a ScriptedConfirmer,
    ) -> ToolContext<'a> {
        ToolContext {
            settings,
            runner,
            confirmer,
        }
    }

    fn pr_args(draft: bool) -> CreatePrArgs {
        CreatePrArgs {
            title: "feat: login".to_string(),
            body: "Adds login".to_string(),
            base: None,
            draft,
        }
    }

    #[test]
    fn branch_runs_checkout_then_push() {
        let runner = RecordingRunner::with_outputs(vec![
            Ok(ok_output("")),
            Ok(ok_output("branch 'feat/x' set up to track 'origin/feat/x'.")),
        ]);
        let confirmer = ScriptedConfirmer::default();
        let settings = test_settings("/repo");
        let result = create_branch_and_push(
            &ctx(&settings, &runner, &confirmer),
            &BranchArgs {
                branch_name: "feat/x".to_string(),
            },
        )
        .expect("branch");

        assert_eq!(
            result,
            "Branch 'feat/x' created and pushed successfully.\nbranch 'feat/x' set up to track 'origin/feat/x'."
        );
        let displays: Vec<_> = runner.calls().iter().map(|c| c.display()).collect();
        assert_eq!(
            displays,
            vec![
                "git checkout -b feat/x",
                "git push --set-upstream origin feat/x"
            ]
        );
    }

    #[test]
    fn branch_failure_reports_stderr_and_skips_push() {
        let runner = RecordingRunner::with_outputs(vec![Ok(failed_output(
            128,
            "",
            "fatal: a branch named 'feat/x' already exists",
        ))]);
        let confirmer = ScriptedConfirmer::default();
        let settings = test_settings("/repo");
        let result = create_branch_and_push(
            &ctx(&settings, &runner, &confirmer),
            &BranchArgs {
                branch_name: "feat/x".to_string(),
            },
        )
        .expect("branch");
        assert_eq!(
            result,
            "Git command failed:\nfatal: a branch named 'feat/x' already exists"
        );
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn declined_branch_spawns_nothing() {
        let runner = RecordingRunner::default();
        let confirmer = ScriptedConfirmer::new(vec![false]);
        let mut settings = test_settings("/repo");
        settings.confirm_pr_creation = true;
        let result = create_branch_and_push(
            &ctx(&settings, &runner, &confirmer),
            &BranchArgs {
                branch_name: "feat/x".to_string(),
            },
        )
        .expect("branch");
        assert_eq!(result, "Branch creation aborted by user.");
        assert!(runner.calls().is_empty());
        assert_eq!(confirmer.questions(), vec!["Create & push branch 'feat/x'?"]);
    }

    #[test]
    fn pr_without_automerge_never_passes_auto() {
        let runner = RecordingRunner::with_outputs(vec![Ok(ok_output(
            "https://github.com/acme/app/pull/42\n",
        ))]);
        let confirmer = ScriptedConfirmer::default();
        let settings = test_settings("/repo");
        let result =
            create_pr(&ctx(&settings, &runner, &confirmer), &pr_args(true)).expect("pr");

        assert_eq!(
            result,
            "PR created successfully!\nURL: https://github.com/acme/app/pull/42"
        );
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].args.contains(&"--draft".to_string()));
        assert!(calls[0].args.iter().all(|a| a != "--auto" && a != "--squash"));
        assert!(calls[0].args.windows(2).any(|w| w == ["--base", "main"]));
    }

    #[test]
    fn pr_with_automerge_requests_squash_merge() {
        let runner = RecordingRunner::with_outputs(vec![
            Ok(ok_output(
                "Creating draft pull request for feat/x into main\n\nhttps://github.com/acme/app/pull/7\n",
            )),
            Ok(ok_output("")),
        ]);
        let confirmer = ScriptedConfirmer::default();
        let mut settings = test_settings("/repo");
        settings.enable_automerge = true;
        let result =
            create_pr(&ctx(&settings, &runner, &confirmer), &pr_args(false)).expect("pr");

        assert!(result.starts_with("PR created successfully!\nURL: https://github.com/acme/app/pull/7"));
        assert!(result.ends_with("Automerge requested (squash)."));
        assert_eq!(
            runner.calls()[1].display(),
            "gh pr merge https://github.com/acme/app/pull/7 --auto --squash"
        );
    }

    #[test]
    fn missing_gh_is_reported() {
        let runner = RecordingRunner::with_outputs(vec![Err(not_found_error("gh"))]);
        let confirmer = ScriptedConfirmer::default();
        let settings = test_settings("/repo");
        let result =
            create_pr(&ctx(&settings, &runner, &confirmer), &pr_args(true)).expect("pr");
        assert_eq!(result, GH_NOT_FOUND);
    }

    #[test]
    fn pr_status_renders_view() {
        let runner = RecordingRunner::with_outputs(vec![Ok(ok_output(
            r#"{"state":"OPEN","title":"feat: login","number":42,"mergedAt":null,"mergeable":"MERGEABLE","baseRefName":"main","headRefName":"feat/login","autoMergeRequest":null}"#,
        ))]);
        let confirmer = ScriptedConfirmer::default();
        let settings = test_settings("/repo");
        let result = check_pr_status(
            &ctx(&settings, &runner, &confirmer),
            &PrStatusArgs {
                pr_number_or_url: PrRef("42".to_string()),
            },
        )
        .expect("status");
        assert!(result.starts_with("PR #42 - feat: login\nState: OPEN\nMerged: false"));
        assert!(result.contains("Base ← Head: main ← feat/login"));
    }

    #[test]
    fn pr_status_garbage_is_a_parse_failure() {
        let runner = RecordingRunner::with_outputs(vec![Ok(ok_output("not json"))]);
        let confirmer = ScriptedConfirmer::default();
        let settings = test_settings("/repo");
        let result = check_pr_status(
            &ctx(&settings, &runner, &confirmer),
            &PrStatusArgs {
                pr_number_or_url: PrRef("42".to_string()),
            },
        )
        .expect("status");
        assert_eq!(result, "Failed to parse gh output");
    }

    #[test]
    fn ci_output_is_parsed_despite_nonzero_exit() {
        let runner = RecordingRunner::with_outputs(vec![Ok(failed_output(
            8,
            r#"[{"name":"build","state":"IN_PROGRESS","bucket":"pending"},{"name":"lint","state":"SUCCESS","bucket":"pass"}]"#,
            "",
        ))]);
        let confirmer = ScriptedConfirmer::default();
        let settings = test_settings("/repo");
        let result = check_ci_status(
            &ctx(&settings, &runner, &confirmer),
            &CiStatusArgs {
                pr_number_or_url: PrRef("5".to_string()),
                watch: false,
            },
        )
        .expect("ci");
        assert_eq!(
            result,
            "CI Status:\n- build: IN_PROGRESS\n- lint: SUCCESS\n\n→ Still waiting for checks to complete"
        );
    }

    #[test]
    fn ci_failure_without_json_reports_text() {
        let runner = RecordingRunner::with_outputs(vec![Ok(failed_output(
            1,
            "",
            "no pull requests found for branch \"main\"",
        ))]);
        let confirmer = ScriptedConfirmer::default();
        let settings = test_settings("/repo");
        let result = check_ci_status(
            &ctx(&settings, &runner, &confirmer),
            &CiStatusArgs {
                pr_number_or_url: PrRef("main".to_string()),
                watch: false,
            },
        )
        .expect("ci");
        assert_eq!(
            result,
            "CI check failed:\nno pull requests found for branch \"main\""
        );
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn ci_watch_waits_then_queries_json() {
        let runner = RecordingRunner::with_outputs(vec![
            Ok(failed_output(1, "build\tfail\t2m\n", "")),
            Ok(failed_output(
                8,
                r#"[{"name":"build","state":"FAILURE","bucket":"fail"}]"#,
                "",
            )),
        ]);
        let confirmer = ScriptedConfirmer::default();
        let settings = test_settings("/repo");
        let result = check_ci_status(
            &ctx(&settings, &runner, &confirmer),
            &CiStatusArgs {
                pr_number_or_url: PrRef("9".to_string()),
                watch: true,
            },
        )
        .expect("ci");

        let argv: Vec<String> = runner.calls().iter().map(|c| c.display()).collect();
        assert_eq!(
            argv,
            vec![
                "gh pr checks 9 --watch",
                "gh pr checks 9 --json name,state,bucket",
            ]
        );
        assert_eq!(
            result,
            "CI Status:\n- build: FAILURE\n\n→ Some checks FAILED"
        );
    }

    #[test]
    fn ci_watch_without_gh_stops_early() {
        let runner = RecordingRunner::with_outputs(vec![Err(not_found_error("gh"))]);
        let confirmer = ScriptedConfirmer::default();
        let settings = test_settings("/repo");
        let result = check_ci_status(
            &ctx(&settings, &runner, &confirmer),
            &CiStatusArgs {
                pr_number_or_url: PrRef("9".to_string()),
                watch: true,
            },
        )
        .expect("ci");
        assert_eq!(result, GH_NOT_FOUND);
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn pr_url_is_extracted_from_chatter() {
        assert_eq!(
            extract_pr_url("Warning: 1 uncommitted change\nhttps://github.com/a/b/pull/3\n"),
            "https://github.com/a/b/pull/3"
        );
        assert_eq!(extract_pr_url("  something else \n"), "something else");
    }
}
