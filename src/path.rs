// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Locate the task file, and resolve paths mentioned inside of it. Every
//! relative path in a task file is relative to the directory holding that
//! task file, which is called the __base__ directory.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Name of task file searched for by default.
pub const TASKFILE_NAME: &str = "ruffx.toml";

/// Find nearest task file starting from current working directory.
///
/// # Errors
///
/// - Return [`PathError::CurrentDir`] if current working directory cannot be
///   determined.
/// - Return [`PathError::NotFound`] if no task file exists in the current
///   directory or any of its ancestors.
pub fn current_taskfile() -> Result<PathBuf> {
    let cwd = env::current_dir().map_err(PathError::CurrentDir)?;
    find_taskfile(cwd)
}

/// Find nearest task file at or above a starting directory.
///
/// # Errors
///
/// - Return [`PathError::NotFound`] if no task file exists in the starting
///   directory or any of its ancestors.
pub fn find_taskfile(start: impl AsRef<Path>) -> Result<PathBuf> {
    start
        .as_ref()
        .ancestors()
        .map(|dir| dir.join(TASKFILE_NAME))
        .find(|path| path.is_file())
        .ok_or_else(|| PathError::NotFound {
            start: start.as_ref().to_path_buf(),
        })
}

/// Read contents of task file.
///
/// # Errors
///
/// - Return [`PathError::Read`] if the file cannot be read.
pub fn read_taskfile(path: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(path.as_ref()).map_err(|err| PathError::Read {
        source: err,
        path: path.as_ref().to_path_buf(),
    })
}

/// Determine base directory of a task file.
///
/// A bare file name yields the current directory `.`.
pub fn base_dir(taskfile: impl AsRef<Path>) -> PathBuf {
    match taskfile.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Resolve path against base directory.
///
/// Absolute paths are returned as-is.
pub fn resolve(base: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    if path.as_ref().is_absolute() {
        path.as_ref().to_path_buf()
    } else {
        base.as_ref().join(path.as_ref())
    }
}

/// Path error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Current working directory is unavailable.
    #[error("cannot determine current working directory")]
    CurrentDir(#[source] std::io::Error),

    /// No task file could be found.
    #[error("no ruffx.toml found in {start:?} or any parent directory")]
    NotFound { start: PathBuf },

    /// Task file could not be read.
    #[error("cannot read task file {path:?}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test]
    fn find_taskfile_walks_up_ancestors() -> anyhow::Result<()> {
        let root = env::current_dir()?;
        let nested = root.join("client").join("public");
        fs::create_dir_all(&nested)?;
        fs::write(root.join(TASKFILE_NAME), "")?;

        assert_eq!(find_taskfile(&nested)?, root.join(TASKFILE_NAME));
        assert_eq!(current_taskfile()?, root.join(TASKFILE_NAME));

        Ok(())
    }

    #[sealed_test]
    fn find_taskfile_prefers_nearest() -> anyhow::Result<()> {
        let root = env::current_dir()?;
        let nested = root.join("client");
        fs::create_dir_all(&nested)?;
        fs::write(root.join(TASKFILE_NAME), "")?;
        fs::write(nested.join(TASKFILE_NAME), "")?;

        assert_eq!(find_taskfile(&nested)?, nested.join(TASKFILE_NAME));

        Ok(())
    }

    #[sealed_test]
    fn find_taskfile_ignores_directories_with_same_name() -> anyhow::Result<()> {
        let root = env::current_dir()?;
        let nested = root.join("server");
        fs::create_dir_all(nested.join(TASKFILE_NAME))?;
        fs::write(root.join(TASKFILE_NAME), "")?;

        assert_eq!(find_taskfile(&nested)?, root.join(TASKFILE_NAME));

        Ok(())
    }

    #[test]
    fn base_dir_of_bare_file_name_is_current_dir() {
        assert_eq!(base_dir("ruffx.toml"), PathBuf::from("."));
        assert_eq!(base_dir("project/ruffx.toml"), PathBuf::from("project"));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let base = PathBuf::from("project");
        assert_eq!(resolve(&base, "styles"), PathBuf::from("project/styles"));

        let absolute = env::temp_dir().join("styles");
        assert_eq!(resolve(&base, &absolute), absolute);
    }
}
