// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Task file layout.
//!
//! Specify the layout of the `ruffx.toml` task file to simplify the process
//! of deserialization. File I/O is left to the caller to figure out.
//!
//! # General Layout
//!
//! A task file is a list of named tasks, plus an optional pointer to the task
//! that runs when no command is given:
//!
//! ```toml
//! default = "build"
//!
//! [task.styles]
//! notice = "Sass"
//! chdir = "client/public/styles"
//! run = [["sass", "styles.scss", "styles.css"]]
//!
//! [task.build]
//! needs = ["styles"]
//! run = [["node", "node_modules/typescript/bin/tsc.js", "--out", "app.js"]]
//! ```
//!
//! Environment variables and `~` are expanded in `chdir` and in every command
//! argument when the task file is parsed.

use crate::command::DEFAULT_COMMAND;

use indexmap::IndexMap;
use serde::Deserialize;
use std::{borrow::Cow, collections::HashSet, path::PathBuf, str::FromStr};

/// Task file layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Taskfile {
    /// Task to run when no command is given.
    pub default: Option<String>,

    /// Task definitions in declaration order.
    #[serde(rename = "task", default)]
    pub tasks: IndexMap<String, TaskDefinition>,
}

impl FromStr for Taskfile {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut taskfile: Taskfile = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on working directories and commands.
        for definition in taskfile.tasks.values_mut() {
            if let Some(chdir) = definition.chdir.take() {
                definition.chdir = Some(PathBuf::from(expand(&chdir.to_string_lossy())?));
            }

            for command in &mut definition.run {
                for arg in command.iter_mut() {
                    *arg = expand(arg)?;
                }
            }
        }

        taskfile.validate()?;

        Ok(taskfile)
    }
}

impl Taskfile {
    /// Check references and shape of every task.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ReservedName`] if a task is named "default".
    /// - Return [`ConfigError::EmptyCommand`] if a task lists an empty command.
    /// - Return [`ConfigError::UnknownTask`] if `default` or `needs` refer to
    ///   a task that does not exist.
    /// - Return [`ConfigError::Cycle`] if `needs` form a cycle.
    pub fn validate(&self) -> Result<()> {
        if self.tasks.contains_key(DEFAULT_COMMAND) {
            return Err(ConfigError::ReservedName);
        }

        if let Some(default) = &self.default {
            if !self.tasks.contains_key(default) {
                return Err(ConfigError::UnknownTask {
                    task: default.clone(),
                    referrer: "default".into(),
                });
            }
        }

        for (name, definition) in &self.tasks {
            if let Some(index) = definition.run.iter().position(Vec::is_empty) {
                return Err(ConfigError::EmptyCommand {
                    task: name.clone(),
                    index,
                });
            }

            if let Some(need) = definition
                .needs
                .iter()
                .find(|need| !self.tasks.contains_key(need.as_str()))
            {
                return Err(ConfigError::UnknownTask {
                    task: need.clone(),
                    referrer: name.clone(),
                });
            }
        }

        let mut done = HashSet::new();
        for name in self.tasks.keys() {
            let mut trail = Vec::new();
            self.visit(name, &mut trail, &mut done)?;
        }

        Ok(())
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        trail: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }

        if let Some(start) = trail.iter().position(|seen| *seen == name) {
            let mut cycle = trail[start..]
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            cycle.push(name.to_string());
            return Err(ConfigError::Cycle { cycle });
        }

        trail.push(name);
        if let Some(definition) = self.tasks.get(name) {
            for need in &definition.needs {
                self.visit(need, trail, done)?;
            }
        }
        trail.pop();
        done.insert(name);

        Ok(())
    }
}

/// Single task definition.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDefinition {
    /// Message to log before the task runs.
    pub notice: Option<String>,

    /// Working directory relative to the task file.
    pub chdir: Option<PathBuf>,

    /// Commands to run in order, each as program followed by arguments.
    #[serde(default)]
    pub run: Vec<Vec<String>>,

    /// Tasks to run before this one.
    #[serde(default)]
    pub needs: Vec<String>,
}

fn expand(input: &str) -> Result<String> {
    shellexpand::full(input)
        .map(Cow::into_owned)
        .map_err(ConfigError::ShellExpansion)
}

/// Task file error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize task file.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to perform shell expansion on task file.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Task uses name reserved for the default alias.
    #[error("task name \"default\" is reserved, use the top-level `default` key instead")]
    ReservedName,

    /// Reference to task that does not exist.
    #[error("{referrer:?} refers to unknown task {task:?}")]
    UnknownTask { task: String, referrer: String },

    /// Task has a command with no program.
    #[error("task {task:?} has an empty command at position {index}")]
    EmptyCommand { task: String, index: usize },

    /// Tasks depend on each other in a loop.
    #[error("task dependency cycle: {}", .cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
