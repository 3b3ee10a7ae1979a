//! Child-process execution.
//!
//! [`Cmd::run`] forwards the child's output live and fails on any non-zero
//! exit. [`Cmd::capture`] buffers the output and always hands back a
//! [`ProcessOutput`], leaving the caller to decide what a non-zero exit means.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{BuildError, Result};

#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

/// What a captured child left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub command_line: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Runs through the platform shell, the way rule-file commands are run.
    pub fn shell(line: &str) -> Self {
        #[cfg(windows)]
        {
            Cmd::new("cmd").arg("/C").arg(line)
        }

        #[cfg(not(windows))]
        {
            Cmd::new("sh").arg("-c").arg(line)
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).stdin(Stdio::null());
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }

    fn spawn_error(&self, source: std::io::Error) -> BuildError {
        BuildError::ProcessSpawn {
            command: self.program.clone(),
            source,
        }
    }

    pub async fn run(&self) -> Result<()> {
        debug!(cmd = %self.command_line(), "spawning process");

        let status = self
            .command()
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        debug!(cmd = %self.command_line(), code = ?status.code(), "process exited");

        if status.code() == Some(0) {
            Ok(())
        } else {
            Err(BuildError::ProcessExit {
                command: self.program.clone(),
                args: self.args.clone(),
                code: status.code(),
            })
        }
    }

    pub async fn capture(&self) -> Result<ProcessOutput> {
        debug!(cmd = %self.command_line(), "spawning process (captured)");

        let output = self
            .command()
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        debug!(cmd = %self.command_line(), code = ?output.status.code(), "process exited");

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            command_line: self.command_line(),
        })
    }
}

pub async fn run(program: &str, args: &[&str]) -> Result<()> {
    Cmd::new(program).args(args.iter().copied()).run().await
}

pub async fn run_capture(program: &str, args: &[&str]) -> Result<ProcessOutput> {
    Cmd::new(program).args(args.iter().copied()).capture().await
}
