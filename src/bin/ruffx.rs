// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use ruffx::{
    command::Outcome,
    path::{base_dir, current_taskfile, read_taskfile},
    Registry, SystemExecutor, TaskSet, Taskfile,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::{
    env, io,
    path::{Path, PathBuf},
    process::exit,
};
use tracing::{debug, error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "ruffx [options] [COMMAND]",
    disable_help_flag = true,
    version
)]
struct Cli {
    /// Path to task file to use instead of the nearest ruffx.toml.
    #[arg(short, long, env = "RUFFX_FILE", value_name = "path")]
    pub file: Option<PathBuf>,

    /// Show debug output.
    #[arg(short, long)]
    pub verbose: bool,

    /// List available commands.
    #[arg(
        short = 'h',
        long = "help",
        visible_short_alias = 'l',
        visible_alias = "list",
        short_alias = '?',
        action = ArgAction::Count
    )]
    pub help: u8,

    /// Command to run, or the default command if omitted.
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,

    /// Anything after the command.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub rest: Vec<String>,
}

impl Cli {
    fn run(self, args: &[String]) -> Result<bool> {
        let registry = match load_registry(self.file.as_deref()) {
            Ok(registry) => registry,
            Err(error) if self.help > 0 => {
                warn!("{error:#}");
                Registry::new()
            }
            Err(error) => return Err(error),
        };

        if registry.show_help(args, &mut io::stdout().lock())? {
            return Ok(true);
        }

        if !self.rest.is_empty() {
            warn!("ignoring extra arguments: {}", self.rest.join(" "));
        }

        match registry.dispatch(self.command.as_deref())? {
            Outcome::NotFound { .. } => Ok(false),
            Outcome::Executed { .. } | Outcome::Help => Ok(true),
        }
    }
}

fn main() {
    let args = env::args().collect::<Vec<_>>();
    let cli = Cli::parse_from(&args);

    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(io::stderr);
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    match cli.run(&args) {
        Ok(true) => exit(0),
        Ok(false) => exit(1),
        Err(error) => {
            error!("{error:?}");
            exit(1);
        }
    }
}

fn load_registry(file: Option<&Path>) -> Result<Registry> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => current_taskfile()?,
    };

    debug!("load task file {:?}", path.display());
    let taskfile: Taskfile = read_taskfile(&path)?
        .parse()
        .with_context(|| format!("invalid task file {:?}", path.display()))?;

    Ok(TaskSet::new(taskfile, base_dir(&path), SystemExecutor)?.into_registry())
}
