//! Read-only shell tool restricted to an allow-list of inspection commands.

use anyhow::Result;
use tracing::{info, warn};

use super::ToolContext;
use crate::core::allowlist::{SAFE_PREFIXES, allowed_prefix};
use crate::core::tool_args::ShellArgs;
use crate::io::process::{CommandOutput, CommandRequest, is_not_found};

/// Refusal text listing what would have been accepted.
pub fn refusal(cmd: &str) -> String {
    format!(
        "Error: Command not allowed for safety reasons.\nAllowed prefixes: {}\nAttempted: {cmd}",
        SAFE_PREFIXES.join(", ")
    )
}

pub fn run_safe_shell(ctx: &ToolContext<'_>, args: &ShellArgs) -> Result<String> {
    let cmd = args.cmd.trim();
    let Some(prefix) = allowed_prefix(cmd) else {
        warn!(cmd, "refusing shell command outside the allow-list");
        return Ok(refusal(&args.cmd));
    };

    let argv = match shell_words::split(cmd) {
        Ok(argv) => argv,
        Err(err) => return Ok(format!("Error: could not parse command: {err}")),
    };
    let Some((program, rest)) = argv.split_first() else {
        return Ok(refusal(&args.cmd));
    };
    info!(prefix, cmd, "running shell command");

    let timeout = ctx.settings.shell_timeout;
    let request = CommandRequest::new(program, rest.iter().cloned(), ctx.workdir())
        .with_timeout(timeout)
        .with_output_limit(ctx.settings.shell_output_limit_bytes);
    let output = match ctx.runner.run(&request) {
        Ok(output) => output,
        Err(err) if is_not_found(&err) => return Ok(format!("Command not found: {program}")),
        Err(err) => return Ok(format!("Unexpected shell error: {err:#}")),
    };
    if output.timed_out {
        return Ok(format!(
            "Command timed out after {} seconds: {cmd}",
            timeout.as_secs_f64()
        ));
    }
    Ok(render_output(&output))
}

fn render_output(output: &CommandOutput) -> String {
    let code = output.exit_code.unwrap_or(-1);
    let mut text = format!("stdout:\n{}\n", output.stdout_text());
    let stderr = output.stderr_text();
    if !stderr.is_empty() {
        text.push_str(&format!("stderr:\n{stderr}\n"));
    }
    text.push_str(&format!("return code: {code}"));
    text.push_str(&output.truncated_notice());
    if code != 0 {
        return format!("Command failed (rc={code}):\n{text}");
    }
    text
}
