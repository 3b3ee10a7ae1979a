//! Turns a parsed [`Buildfile`] into an ordered run of tasks.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{BuildError, Result};
use crate::parser::{Buildfile, Command, Rule};
use crate::process::Cmd;
use crate::staleness;
use crate::task::Task;

#[derive(Debug)]
pub struct Pipeline {
    buildfile: Buildfile,
    root: PathBuf,
}

/// Outcome of one rule in a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Ran(String),
    Skipped(String),
}

impl Pipeline {
    pub fn new(buildfile: Buildfile, root: impl Into<PathBuf>) -> Self {
        Self {
            buildfile,
            root: root.into(),
        }
    }

    /// The rule names to run for `requested`, dependencies first.
    pub fn plan<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<String>> {
        let requested: Vec<&str> = if requested.is_empty() {
            let default = self.buildfile.default_target().ok_or_else(|| {
                BuildError::Configuration("no targets given and no rules defined".to_string())
            })?;
            vec![default]
        } else {
            requested
                .iter()
                .map(|target| self.resolve(target.as_ref()))
                .collect::<Result<_>>()?
        };

        self.buildfile.dependency_map()?.build_order(&requested)
    }

    /// Runs every planned rule in order, stopping at the first failure.
    pub async fn execute<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<Step>> {
        let mut steps = Vec::new();
        for name in self.plan(requested)? {
            let rule = self.rule(&name)?;
            let ran = self.task(&name, rule).run().await?;
            steps.push(if ran {
                Step::Ran(name)
            } else {
                Step::Skipped(name)
            });
        }
        Ok(steps)
    }

    /// Reports staleness for every planned rule without running anything.
    ///
    /// Each rule is judged against the filesystem as it is now, so a rule
    /// downstream of a stale one may be reported fresh.
    pub fn dry_run<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<(String, bool)>> {
        let mut report = Vec::new();
        for name in self.plan(requested)? {
            let rule = self.rule(&name)?;
            let stale = staleness::is_stale(
                &self.paths(&rule.targets),
                &self.paths(&rule.prerequisites),
            )?;
            info!("{}: {}", name, if stale { "would run" } else { "up to date" });
            report.push((name, stale));
        }
        Ok(report)
    }

    // A requested target may be any output of a rule, not only its name.
    fn resolve(&self, target: &str) -> Result<&str> {
        self.buildfile
            .owner_of(target)
            .and_then(Rule::name)
            .ok_or_else(|| no_rule(target))
    }

    fn rule(&self, name: &str) -> Result<&Rule> {
        self.buildfile.rule(name).ok_or_else(|| no_rule(name))
    }

    fn paths(&self, names: &[String]) -> Vec<PathBuf> {
        names.iter().map(|n| self.root.join(n)).collect()
    }

    fn task<'a>(&'a self, name: &str, rule: &'a Rule) -> Task<'a> {
        let root = self.root.as_path();
        Task::new(
            format!("building {}", name),
            "up to date",
            move || run_commands(root, &rule.commands),
        )
        .targets(self.paths(&rule.targets))
        .sources(self.paths(&rule.prerequisites))
    }
}

fn no_rule(target: &str) -> BuildError {
    BuildError::Configuration(format!("no rule to make target '{}'", target))
}

async fn run_commands(root: &Path, commands: &[Command]) -> Result<()> {
    for command in commands {
        if !command.silent {
            info!("{}", command.line);
        }

        let cmd = Cmd::shell(&command.line).current_dir(root);
        if !command.ignore_errors {
            cmd.run().await?;
            continue;
        }

        let output = cmd.capture().await?;
        if !output.stdout.is_empty() {
            print!("{}", output.stdout);
        }
        if output.success() {
            eprint!("{}", output.stderr);
        } else {
            warn!(
                code = ?output.code,
                stderr = %output.stderr.trim(),
                "'{}' failed, ignored",
                output.command_line
            );
        }
    }
    Ok(())
}
