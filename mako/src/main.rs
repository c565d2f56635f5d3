//! Interactive coding agent for git/GitHub workflows.
//!
//! `mako chat` starts the REPL; `mako tools` and `mako goals` print the tool
//! catalog and the persisted goal memory.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, error};

use mako::core::conversation::Conversation;
use mako::exit_codes;
use mako::io::config::{AgentConfig, load_config, write_config};
use mako::io::console::StdConsole;
use mako::io::goals::{GoalStore, load_goals};
use mako::io::llm::HttpChatClient;
use mako::io::paths::AgentPaths;
use mako::io::process::SystemRunner;
use mako::io::prompt::PromptEngine;
use mako::logging;
use mako::repl::run_repl;
use mako::tools::{ToolRegistry, ToolSettings};
use mako::turn::Agent;

#[derive(Parser)]
#[command(
    name = "mako",
    version,
    about = "Interactive coding agent that drives git, gh and a read-only shell"
)]
struct Cli {
    /// Repository to operate in. Defaults to the current directory.
    #[arg(long, global = true)]
    workdir: Option<PathBuf>,

    /// Config file. Defaults to `<workdir>/mako.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level tracing for mako on stderr (unless `RUST_LOG` is set).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive session.
    Chat,
    /// Print the tool catalog sent to the model as JSON.
    Tools,
    /// Print the persisted goal memory as JSON.
    Goals,
    /// Write a default config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            error!(error = %format!("{err:#}"), "command failed");
            eprintln!("{err:#}");
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let workdir = match cli.workdir {
        Some(dir) => dir,
        None => env::current_dir().context("resolve current directory")?,
    };
    if !workdir.is_dir() {
        bail!("workdir {} is not a directory", workdir.display());
    }
    let config_path = cli
        .config
        .unwrap_or_else(|| AgentPaths::default_config_path(&workdir));

    match cli.command {
        Command::Init { force } => cmd_init(&config_path, force),
        Command::Tools => cmd_tools(&workdir, &config_path),
        Command::Goals => cmd_goals(&workdir, &config_path),
        Command::Chat => cmd_chat(&workdir, &config_path),
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if config_path.exists() && !force {
        println!("{} already exists (use --force to overwrite)", config_path.display());
        return Ok(exit_codes::OK);
    }
    write_config(config_path, &AgentConfig::default())?;
    println!("wrote {}", config_path.display());
    Ok(exit_codes::OK)
}

fn cmd_tools(workdir: &Path, config_path: &Path) -> Result<i32> {
    let config = load_config(config_path)?;
    let registry = ToolRegistry::new(
        ToolSettings::from_config(&config, workdir),
        &SystemRunner,
        &StdConsole,
    )?;
    let catalog = serde_json::to_string_pretty(registry.wire_catalog())
        .context("serialize tool catalog")?;
    println!("{catalog}");
    Ok(exit_codes::OK)
}

fn cmd_goals(workdir: &Path, config_path: &Path) -> Result<i32> {
    let config = load_config(config_path)?;
    let paths = AgentPaths::new(workdir, &config);
    let memory = load_goals(&paths.goals_path)?;
    println!("{}", memory.to_pretty_json()?);
    Ok(exit_codes::OK)
}

fn cmd_chat(workdir: &Path, config_path: &Path) -> Result<i32> {
    match dotenvy::from_path(workdir.join(".env")) {
        Ok(()) => debug!("loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => return Err(err).context("load .env"),
    }
    let config = load_config(config_path)?;
    let paths = AgentPaths::new(workdir, &config);
    let goals = GoalStore::open(&paths.goals_path)?;

    let interrupted = goals.clone();
    ctrlc::set_handler(move || {
        if let Err(err) = interrupted.save() {
            eprintln!("failed to save goals: {err:#}");
        }
        std::process::exit(exit_codes::INTERRUPTED);
    })
    .context("install Ctrl-C handler")?;

    let system_prompt = PromptEngine::new()?.render_system(&config, &goals.snapshot()?)?;
    let client = HttpChatClient::new(&config)?;
    let mut console = StdConsole;
    let confirmer = StdConsole;
    let registry = ToolRegistry::new(
        ToolSettings::from_config(&config, workdir),
        &SystemRunner,
        &confirmer,
    )?;
    let agent = Agent {
        client: &client,
        tools: &registry,
        config: &config,
        paths: &paths,
        goals: &goals,
    };

    println!(
        "mako ready in {} (model: {}, automerge: {}). Type 'quit' to exit.",
        workdir.display(),
        config.model,
        if config.enable_automerge { "on" } else { "off" }
    );
    let mut conversation = Conversation::new(system_prompt);
    run_repl(&agent, &mut conversation, &mut console)?;
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_chat_with_workdir() {
        let cli = Cli::parse_from(["mako", "--workdir", "/tmp/repo", "chat"]);
        assert!(matches!(cli.command, Command::Chat));
        assert_eq!(cli.workdir, Some(PathBuf::from("/tmp/repo")));
        assert!(cli.config.is_none());
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["mako", "tools", "--config", "alt.toml", "-v"]);
        assert!(matches!(cli.command, Command::Tools));
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["mako", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
    }
}
