// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Command registry and dispatch.
//!
//! A __registry__ maps command names to the actions they invoke. Ruffx reads
//! the first positional argument given on the command line, looks it up in the
//! registry, and runs exactly one action for it.
//!
//! # Default Command
//!
//! The reserved name "default" never holds an action of its own. Instead, it
//! holds an __alias__ naming some other registered command, which is what gets
//! run when no command is given on the command line at all:
//!
//! ```text
//! registry.register_action("build", build_stuff);
//! registry.register_default("build");
//! ```
//!
//! Alias resolution is exactly one level deep. The default alias cannot point
//! at another alias, including itself. A dangling default alias is only caught
//! when it is resolved, not when it is registered.
//!
//! # Help Flags
//!
//! Any of `-h`, `-l`, `--help`, `--list`, or `-?` anywhere on the command
//! line lists the registered commands instead of running anything.

use indexmap::IndexMap;
use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    io::Write,
};
use tracing::{debug, info, instrument, warn};

/// Reserved registry key for the default command alias.
pub const DEFAULT_COMMAND: &str = "default";

/// Flags that request help output instead of dispatch.
pub const HELP_FLAGS: [&str; 5] = ["-h", "-l", "--help", "--list", "-?"];

/// Zero-argument callback bound to a command name.
pub type Action = Box<dyn Fn() -> anyhow::Result<()>>;

/// Value stored for a command name in the registry.
pub enum Entry {
    /// Invocable callback.
    Action(Action),

    /// Name of another registered command.
    Alias(String),
}

impl Entry {
    /// Construct new action entry from a callback.
    pub fn action<F>(callback: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        Self::Action(Box::new(callback))
    }

    /// Construct new alias entry pointing at target command.
    pub fn alias(target: impl Into<String>) -> Self {
        Self::Alias(target.into())
    }
}

impl Debug for Entry {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Action(_) => fmt.write_str("Action(..)"),
            Self::Alias(target) => fmt.debug_tuple("Alias").field(target).finish(),
        }
    }
}

/// Successful lookup of a command.
pub struct Resolution<'r> {
    /// Callback to invoke.
    pub action: &'r Action,

    /// Name of the command that owns the callback.
    pub command: &'r str,

    /// Whether the default alias was followed to get here.
    pub used_default: bool,
}

/// What happened during a single invocation of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Help was requested and printed. Nothing was dispatched.
    Help,

    /// Command was resolved and its action ran to completion.
    Executed { command: String, used_default: bool },

    /// Command could not be resolved. Nothing was invoked.
    NotFound {
        requested: Option<String>,
        available: Vec<String>,
    },
}

/// Registry of named commands.
///
/// Construct one per process, register everything during setup, then hand it
/// to [`Registry::run`] or [`Registry::dispatch`]. Names keep the order of
/// their first registration.
#[derive(Debug, Default)]
pub struct Registry {
    entries: IndexMap<String, Entry>,
}

impl Registry {
    /// Construct new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register entry under given name.
    ///
    /// Registering an existing name overwrites its previous entry. Alias
    /// targets are not checked here.
    #[instrument(skip(self, entry), level = "debug")]
    pub fn register(&mut self, name: impl Into<String> + Debug, entry: Entry) {
        let name = name.into();
        if let Some(previous) = self.entries.insert(name.clone(), entry) {
            debug!("overwrite command {name:?}, was {previous:?}");
        }
    }

    /// Register callback under given name.
    pub fn register_action<F>(&mut self, name: impl Into<String> + Debug, callback: F)
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        self.register(name, Entry::action(callback));
    }

    /// Point the default alias at target command.
    pub fn register_default(&mut self, target: impl Into<String>) {
        self.register(DEFAULT_COMMAND, Entry::alias(target));
    }

    /// Names of all registered commands, excluding the default alias itself.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|name| *name != DEFAULT_COMMAND)
    }

    /// Command name the default alias points at, if any.
    pub fn default_target(&self) -> Option<&str> {
        match self.entries.get(DEFAULT_COMMAND) {
            Some(Entry::Alias(target)) => Some(target.as_str()),
            _ => None,
        }
    }

    /// Resolve requested command name to its action.
    ///
    /// No name at all means "default". The default alias is followed once,
    /// and whatever it names must be a registered action.
    ///
    /// Return `None` if the command cannot be resolved.
    pub fn resolve(&self, requested: Option<&str>) -> Option<Resolution<'_>> {
        let mut name = requested.unwrap_or(DEFAULT_COMMAND);
        let mut used_default = false;

        if name == DEFAULT_COMMAND {
            name = self.default_target()?;
            used_default = true;
        }

        // INVARIANT: Only actions are invocable, so an alias chain stops here.
        match self.entries.get_key_value(name) {
            Some((command, Entry::Action(action))) => Some(Resolution {
                action,
                command: command.as_str(),
                used_default,
            }),
            _ => None,
        }
    }

    /// Resolve and invoke requested command.
    ///
    /// Runs the resolved action exactly once. An unresolvable command is not
    /// an error. It is reported with the list of valid commands, and nothing
    /// runs.
    ///
    /// # Errors
    ///
    /// - Return [`CommandError::Action`] if the invoked action fails.
    pub fn dispatch(&self, requested: Option<&str>) -> Result<Outcome> {
        let Some(resolution) = self.resolve(requested) else {
            let available = self.names().map(ToString::to_string).collect::<Vec<_>>();
            warn!("invalid command, try one of: {}", available.join(", "));
            return Ok(Outcome::NotFound {
                requested: requested.map(ToString::to_string),
                available,
            });
        };

        if resolution.used_default {
            info!("loading default task: {}", resolution.command);
        }
        info!("executing task: {}", resolution.command);

        (resolution.action)().map_err(|source| CommandError::Action {
            command: resolution.command.to_string(),
            source,
        })?;

        Ok(Outcome::Executed {
            command: resolution.command.to_string(),
            used_default: resolution.used_default,
        })
    }

    /// Print command listing if any help flag is present.
    ///
    /// The first argument is treated as the program name for the usage line.
    /// Help flags are searched for in every position.
    ///
    /// # Errors
    ///
    /// - Return [`CommandError::Output`] if help text cannot be written.
    pub fn show_help(&self, args: &[impl AsRef<str>], out: &mut impl Write) -> Result<bool> {
        let requested = args
            .iter()
            .any(|arg| HELP_FLAGS.contains(&arg.as_ref()));
        if !requested {
            return Ok(false);
        }

        let program = args.first().map(AsRef::as_ref).unwrap_or("ruffx");
        writeln!(out, "   usage: {program} [COMMAND]")?;
        writeln!(out, "commands: {}", self.names().collect::<Vec<_>>().join(", "))?;
        if let Some(target) = self.default_target() {
            writeln!(out, " default: {target}")?;
        }

        Ok(true)
    }

    /// Handle full command line.
    ///
    /// Help takes priority. Otherwise, the first argument after the program
    /// name is dispatched, or the default command if there is none.
    ///
    /// # Errors
    ///
    /// - Return [`CommandError::Output`] if help text cannot be written.
    /// - Return [`CommandError::Action`] if the invoked action fails.
    pub fn run(&self, args: &[impl AsRef<str>], out: &mut impl Write) -> Result<Outcome> {
        if self.show_help(args, out)? {
            return Ok(Outcome::Help);
        }

        self.dispatch(args.get(1).map(AsRef::as_ref))
    }
}

/// Command dispatch error types.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Invoked action failed.
    #[error("task {command:?} failed")]
    Action {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    /// Help text could not be written.
    #[error(transparent)]
    Output(#[from] std::io::Error),
}

/// Friendly result alias :3
type Result<T, E = CommandError> = std::result::Result<T, E>;
