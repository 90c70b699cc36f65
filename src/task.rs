// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Task execution.
//!
//! A __task__ is an ordered list of external commands that run inside one
//! working directory, e.g., `npm install`, or `sass styles.scss styles.css`.
//! Tasks may list other tasks that must run before them. Each task becomes one
//! command in the [`Registry`], so running `ruffx styles` runs the "styles"
//! task along with everything it needs.
//!
//! Commands are handed off to an [`Executor`]. The [`SystemExecutor`] spawns
//! them as child processes that share the terminal with ruffx.

use crate::{
    command::Registry,
    config::{ConfigError, TaskDefinition, Taskfile},
    path,
};

use indexmap::IndexMap;
use std::{
    collections::HashSet,
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
    rc::Rc,
};
use tracing::{debug, info, instrument};

/// Single external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub program: String,
    pub args: Vec<String>,
}

impl Step {
    /// Construct new step from program and arguments.
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl Display for Step {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(&self.program)?;
        for arg in &self.args {
            write!(fmt, " {arg}")?;
        }

        Ok(())
    }
}

/// Task ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub notice: Option<String>,
    pub workdir: PathBuf,
    pub steps: Vec<Step>,
    pub needs: Vec<String>,
}

impl Task {
    /// Construct task from a validated definition.
    ///
    /// Working directory is resolved against base directory of task file.
    fn from_definition(definition: TaskDefinition, base: &Path) -> Self {
        let workdir = match definition.chdir {
            Some(chdir) => path::resolve(base, chdir),
            None => base.to_path_buf(),
        };

        // INVARIANT: Every command holds a program, see `Taskfile::validate`.
        let steps = definition
            .run
            .into_iter()
            .map(|mut command| {
                let program = command.remove(0);
                Step::new(program, command)
            })
            .collect();

        Self {
            notice: definition.notice,
            workdir,
            steps,
            needs: definition.needs,
        }
    }
}

/// Layer of indirection for running external commands.
pub trait Executor {
    /// Run step inside working directory, blocking until it finishes.
    fn execute(&self, step: &Step, workdir: &Path) -> Result<()>;
}

/// Run steps as child processes with inherited standard I/O.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&self, step: &Step, workdir: &Path) -> Result<()> {
        let status = Command::new(&step.program)
            .args(&step.args)
            .current_dir(workdir)
            .spawn()
            .and_then(|mut child| child.wait())
            .map_err(|err| TaskError::Spawn {
                source: err,
                command: step.to_string(),
            })?;

        if !status.success() {
            return Err(TaskError::Failed {
                command: step.to_string(),
                status,
            });
        }

        Ok(())
    }
}

/// Collection of runnable tasks.
#[derive(Debug)]
pub struct TaskSet<E = SystemExecutor>
where
    E: Executor,
{
    tasks: IndexMap<String, Task>,
    default: Option<String>,
    executor: E,
}

impl<E> TaskSet<E>
where
    E: Executor,
{
    /// Construct new task set from task file.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError`] if the task file fails
    ///   [`Taskfile::validate`].
    pub fn new(
        taskfile: Taskfile,
        base: impl AsRef<Path>,
        executor: E,
    ) -> std::result::Result<Self, ConfigError> {
        taskfile.validate()?;

        let tasks = taskfile
            .tasks
            .into_iter()
            .map(|(name, definition)| (name, Task::from_definition(definition, base.as_ref())))
            .collect();

        Ok(Self {
            tasks,
            default: taskfile.default,
            executor,
        })
    }

    /// Look up task by name.
    pub fn get(&self, name: impl AsRef<str>) -> Option<&Task> {
        self.tasks.get(name.as_ref())
    }

    /// Run task after everything it needs.
    ///
    /// Needed tasks run depth-first in declaration order. Every task runs at
    /// most once per call, even if several tasks need it. The first failing
    /// step stops everything.
    ///
    /// # Errors
    ///
    /// - Return [`TaskError::UnknownTask`] if task does not exist.
    /// - Return [`TaskError::Spawn`] or [`TaskError::Failed`] if a step fails.
    #[instrument(skip(self), level = "debug")]
    pub fn run(&self, name: &str) -> Result<()> {
        let mut done = HashSet::new();
        self.run_once(name, &mut done)
    }

    fn run_once<'a>(&'a self, name: &'a str, done: &mut HashSet<&'a str>) -> Result<()> {
        // INVARIANT: Mark before recursing, shared needs run once.
        if !done.insert(name) {
            debug!("task {name:?} already ran");
            return Ok(());
        }

        let task = self
            .tasks
            .get(name)
            .ok_or_else(|| TaskError::UnknownTask(name.to_string()))?;

        for need in &task.needs {
            self.run_once(need, done)?;
        }

        if let Some(notice) = &task.notice {
            info!("{notice}");
        }

        for step in &task.steps {
            debug!("run {step:?} in {:?}", task.workdir.display());
            self.executor.execute(step, &task.workdir)?;
        }

        Ok(())
    }
}

impl<E> TaskSet<E>
where
    E: Executor + 'static,
{
    /// Register every task as a command.
    ///
    /// The task file's `default` becomes the registry's default alias.
    pub fn into_registry(self) -> Registry {
        let names = self.tasks.keys().cloned().collect::<Vec<_>>();
        let default = self.default.clone();
        let tasks = Rc::new(self);

        let mut registry = Registry::new();
        for name in names {
            let tasks = Rc::clone(&tasks);
            let target = name.clone();
            registry.register_action(name, move || Ok(tasks.run(&target)?));
        }

        if let Some(default) = default {
            registry.register_default(default);
        }

        registry
    }
}

/// Task execution error types.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Task is not part of the task set.
    #[error("unknown task {0:?}")]
    UnknownTask(String),

    /// Command could not be started or waited on.
    #[error("cannot run command {command:?}")]
    Spawn {
        #[source]
        source: std::io::Error,
        command: String,
    },

    /// Command exited unsuccessfully.
    #[error("command {command:?} failed with {status}")]
    Failed { command: String, status: ExitStatus },
}

/// Friendly result alias :3
pub type Result<T, E = TaskError> = std::result::Result<T, E>;
