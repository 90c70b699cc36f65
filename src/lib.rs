// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Small build-task runner.
//!
//! Ruffx maps command names given on the command line to build tasks. Tasks
//! are declared in a `ruffx.toml` task file, and each one runs an ordered list
//! of external commands, e.g., `npm install`, `sass`, `tsc`, etc. The
//! [`command`] module holds the registry that dispatches a command line to
//! exactly one task.

pub mod command;
pub mod config;
pub mod path;
pub mod task;

pub use command::{CommandError, Entry, Outcome, Registry};
pub use config::{ConfigError, TaskDefinition, Taskfile};
pub use task::{Executor, SystemExecutor, TaskError, TaskSet};
