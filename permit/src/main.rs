//! permit - installs the claude-approve hooks into Claude Code.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use permit::commands::{self, CommandContext, InstallCommand, UninstallCommand, helpers};
use permit_common::{EnvConfig, LogConfig, PermitError, WriteOptions, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "permit")]
#[command(author, version, about = "Install Claude Code approval hooks")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Install root (defaults to ~/.claude)
    #[arg(long, global = true)]
    claude_dir: Option<PathBuf>,

    /// Installer profile (TOML) replacing the built-in one
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Same as the `uninstall` subcommand
    #[arg(long = "uninstall", hide = true)]
    uninstall_flag: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Place hook files and merge their settings entries (default)
    Install(InstallArgs),

    /// Remove hook files and their settings entries
    Uninstall(WriteArgs),

    /// Show what is installed
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Default)]
struct InstallArgs {
    /// Directory containing a local `hooks/` checkout
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Always recompile native hooks
    #[arg(long, conflicts_with = "no_build")]
    build: bool,

    /// Never recompile native hooks
    #[arg(long)]
    no_build: bool,

    #[command(flatten)]
    write: WriteArgs,
}

#[derive(Args, Default)]
struct WriteArgs {
    /// Back up settings.json before changing it
    #[arg(long)]
    backup: bool,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,
}

impl WriteArgs {
    fn options(&self) -> WriteOptions {
        WriteOptions {
            dry_run: self.dry_run,
            backup: self.backup,
        }
    }
}

impl InstallArgs {
    fn command(&self) -> InstallCommand {
        let force_build = match (self.build, self.no_build) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        InstallCommand {
            source_dir: self.source_dir.clone(),
            force_build,
            write: self.write.options(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.uninstall_flag && cli.command.is_some() {
        Cli::command()
            .error(
                ErrorKind::ArgumentConflict,
                "--uninstall cannot be combined with a subcommand; use `permit uninstall`",
            )
            .exit();
    }

    let mut log_config = LogConfig::from_env("warn").with_stderr();
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    if let Err(e) = init_logging(&log_config) {
        eprintln!("warning: logging disabled: {e}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<PermitError>() {
                Some(permit_err) => eprint!("{}", helpers::format_error(permit_err)),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let env = EnvConfig::from_env().map_err(|errors| {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        PermitError::Env(joined)
    })?;
    let ctx = CommandContext::resolve(cli.claude_dir, cli.profile, env)?;
    debug!(root = %ctx.layout.root().display(), "resolved install root");

    let command = match cli.command {
        Some(command) => command,
        None if cli.uninstall_flag => Commands::Uninstall(WriteArgs::default()),
        None => Commands::Install(InstallArgs::default()),
    };

    match command {
        Commands::Install(args) => commands::install(&ctx, &args.command())?,
        Commands::Uninstall(args) => commands::uninstall(
            &ctx,
            &UninstallCommand {
                write: args.options(),
            },
        )?,
        Commands::Status { json } => commands::show_status(&ctx, json)?,
    }
    Ok(())
}
