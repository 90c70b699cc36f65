// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use anyhow::Result;
use ruffx::path::TASKFILE_NAME;
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

pub(crate) struct ProjectFixture {
    root: PathBuf,
}

impl ProjectFixture {
    pub(crate) fn new(root: impl Into<PathBuf>, taskfile: impl AsRef<str>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        fs::write(root.join(TASKFILE_NAME), taskfile.as_ref())?;

        Ok(Self { root })
    }

    pub(crate) fn root(&self) -> &Path {
        self.root.as_path()
    }

    pub(crate) fn taskfile(&self) -> PathBuf {
        self.root.join(TASKFILE_NAME)
    }

    pub(crate) fn mkdir(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.root.join(path);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub(crate) fn read(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(fs::read_to_string(self.root.join(path))?)
    }

    pub(crate) fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.root.join(path).exists()
    }

    /// Run ruffx binary from given directory.
    pub(crate) fn ruffx_in(
        &self,
        dir: impl AsRef<Path>,
        args: impl IntoIterator<Item = impl AsRef<OsStr>>,
    ) -> Result<Output> {
        Ok(Command::new(env!("CARGO_BIN_EXE_ruffx"))
            .args(args)
            .current_dir(dir)
            .env_remove("RUFFX_FILE")
            .env("RUST_LOG", "info")
            .output()?)
    }

    /// Run ruffx binary from project root.
    pub(crate) fn ruffx(&self, args: impl IntoIterator<Item = impl AsRef<OsStr>>) -> Result<Output> {
        self.ruffx_in(&self.root, args)
    }
}
