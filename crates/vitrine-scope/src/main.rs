//! vitrine-scope - keep each branch inside its part of the monorepo
//!
//! # Examples
//!
//! ```bash
//! # .husky/pre-commit
//! vitrine-scope pre-commit
//!
//! # CI job, diffing against the merge base with origin/main
//! vitrine-scope ci --base main
//!
//! # Which scope does a branch belong to?
//! vitrine-scope resolve --branch admin/seo-form
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vitrine_scope::config::DEFAULT_CONFIG_PATH;
use vitrine_scope::env::{base_branch_from_env, branch_from_env, process_env};
use vitrine_scope::{
    ChangeSource, CommandRunner, GitCli, Outcome, ScopeCheck, ScopeConfig, ScopeSummary, Vcs,
};

/// vitrine-scope - branch-scoped change gate
#[derive(Parser, Debug)]
#[command(name = "vitrine-scope")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path, relative to the repository
    #[arg(short, long, env = "VITRINE_SCOPE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Repository root (defaults to the current directory)
    #[arg(long, env = "VITRINE_SCOPE_REPO")]
    repo: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check staged files against the current branch's scope
    PreCommit,

    /// Check the branch's changes since its merge base
    Ci {
        /// Base branch (default: from CI environment, else "main")
        #[arg(long)]
        base: Option<String>,

        /// Remote holding the base branch (default: from config)
        #[arg(long)]
        remote: Option<String>,
    },

    /// Print the scope a branch resolves to as JSON
    Resolve {
        /// Branch name (default: from CI environment, else git)
        #[arg(long)]
        branch: Option<String>,
    },

    /// List configured scopes
    Scopes,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("vitrine_scope=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = match &cli.repo {
        Some(repo) if cli.config.is_relative() => repo.join(&cli.config),
        _ => cli.config.clone(),
    };
    let config = ScopeConfig::load(&config_path)?;
    debug!(path = %config_path.display(), "configuration loaded");
    let scopes = config.scope_table()?;

    let git = match &cli.repo {
        Some(repo) => GitCli::in_dir(repo),
        None => GitCli::new(),
    };

    match cli.command {
        Commands::PreCommit => {
            let branch = git.current_branch()?;
            let runner = task_runner(&config, cli.repo.as_ref())?;
            let outcome =
                ScopeCheck::new(&scopes, &git, &runner).run(&branch, &ChangeSource::Staged)?;
            print_outcome(&outcome);
        }
        Commands::Ci { base, remote } => {
            let branch = detect_branch(&git)?;
            let source = ChangeSource::MergeBase {
                remote: remote.unwrap_or_else(|| config.git.remote.clone()),
                base: base.unwrap_or_else(|| base_branch_from_env(process_env)),
            };
            let runner = task_runner(&config, cli.repo.as_ref())?;
            let outcome = ScopeCheck::new(&scopes, &git, &runner).run(&branch, &source)?;
            print_outcome(&outcome);
        }
        Commands::Resolve { branch } => {
            let branch = match branch {
                Some(branch) => branch,
                None => detect_branch(&git)?,
            };
            let scope = scopes.resolve(&branch)?;
            let summary = ScopeSummary::new(&branch, scope);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Scopes => {
            for scope in scopes.scopes() {
                let patterns: Vec<String> = scope
                    .allowed_patterns()
                    .iter()
                    .map(|p| p.to_string())
                    .collect();
                println!(
                    "{:<12} target={:<12} {}",
                    scope.name(),
                    scope.target().unwrap_or("-"),
                    patterns.join(" ")
                );
            }
        }
    }

    Ok(())
}

fn detect_branch(git: &GitCli) -> Result<String> {
    match branch_from_env(process_env) {
        Some(branch) => {
            debug!(%branch, "branch from environment");
            Ok(branch)
        }
        None => git.current_branch().context("failed to detect branch"),
    }
}

fn task_runner(config: &ScopeConfig, repo: Option<&PathBuf>) -> Result<CommandRunner> {
    let runner = config.task_runner()?;
    Ok(match repo {
        Some(repo) => runner.with_workdir(repo),
        None => runner,
    })
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::NoChanges => println!("Nothing to do."),
        Outcome::InfraOnly { files } => println!("Scope check passed ({files} file(s))."),
        Outcome::Passed { files, target } => {
            println!("Scope check passed ({files} file(s)), '{target}' lint succeeded.")
        }
    }
}
