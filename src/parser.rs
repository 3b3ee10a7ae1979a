use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};
use crate::graph::node::Node;
use crate::graph::DependencyMap;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Rule file to read
    #[arg(short, long, default_value = "Buildfile")]
    pub file: PathBuf,

    /// Directory that rule paths and commands are relative to
    #[arg(short = 'C', long, default_value = ".")]
    pub directory: PathBuf,

    /// Report which rules are stale without running anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Targets to build (default: the first rule)
    pub targets: Vec<String>,
}

/// A recipe line and the prefixes that modify how it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub line: String,
    /// `-` prefix: a non-zero exit is reported and ignored.
    pub ignore_errors: bool,
    /// `@` prefix: the line is not echoed before running.
    pub silent: bool,
}

impl Command {
    pub fn parse(raw: &str) -> Command {
        let mut line = raw.trim();
        let mut ignore_errors = false;
        let mut silent = false;
        loop {
            if let Some(rest) = line.strip_prefix('-') {
                ignore_errors = true;
                line = rest.trim_start();
            } else if let Some(rest) = line.strip_prefix('@') {
                silent = true;
                line = rest.trim_start();
            } else {
                break;
            }
        }
        Command {
            line: line.to_string(),
            ignore_errors,
            silent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub targets: Vec<String>,
    pub prerequisites: Vec<String>,
    pub commands: Vec<Command>,
    pub line: usize,
}

impl Rule {
    /// A rule is known by its first target.
    pub fn name(&self) -> Option<&str> {
        self.targets.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Buildfile {
    pub rules: Vec<Rule>,
}

impl Buildfile {
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name() == Some(name))
    }

    pub fn default_target(&self) -> Option<&str> {
        self.rules.first().and_then(Rule::name)
    }

    /// The rule that lists `target` among its outputs.
    pub fn owner_of(&self, target: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.targets.iter().any(|t| t == target))
    }

    /// Maps each rule to the rules that produce its prerequisites.
    pub fn dependency_map(&self) -> Result<DependencyMap> {
        let mut map = DependencyMap::new();
        for rule in &self.rules {
            let name = rule.name().ok_or_else(|| {
                BuildError::Configuration(format!("rule at line {} has no targets", rule.line))
            })?;
            let mut deps: Vec<String> = Vec::new();
            for prereq in &rule.prerequisites {
                if let Some(owner) = self.owner_of(prereq).and_then(Rule::name) {
                    if !deps.iter().any(|d| d == owner) {
                        deps.push(owner.to_string());
                    }
                }
            }
            map.insert(Node::new(name).with_dependencies(deps))?;
        }
        Ok(map)
    }
}

pub fn parse_buildfile(path: &Path) -> Result<Buildfile> {
    let contents = fs::read_to_string(path).map_err(|e| BuildError::from_io(path, e))?;
    parse_str(&contents)
}

pub fn parse_str(contents: &str) -> Result<Buildfile> {
    let lines: Vec<&str> = contents.lines().collect();
    let mut buildfile = Buildfile::default();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            i += 1;
            continue;
        }

        if line.starts_with('\t') || line.starts_with(' ') {
            return Err(BuildError::Syntax {
                line: i + 1,
                message: "Command listed before target".to_string(),
            });
        }

        let (rule, lines_consumed) = parse_rule(&lines, i)?;
        for target in &rule.targets {
            if let Some(existing) = buildfile.owner_of(target) {
                return Err(BuildError::Syntax {
                    line: i + 1,
                    message: format!(
                        "target '{}' already declared at line {}",
                        target, existing.line
                    ),
                });
            }
        }
        buildfile.rules.push(rule);

        i += 1 + lines_consumed;
    }

    Ok(buildfile)
}

fn parse_rule(lines: &[&str], line_idx: usize) -> Result<(Rule, usize)> {
    let rule_line = lines[line_idx].trim();

    let colon_pos = rule_line.find(':').ok_or_else(|| BuildError::Syntax {
        line: line_idx + 1,
        message: "Rule missing colon".to_string(),
    })?;

    let targets: Vec<String> = rule_line[..colon_pos]
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();
    if targets.is_empty() {
        return Err(BuildError::Syntax {
            line: line_idx + 1,
            message: "Rule missing target".to_string(),
        });
    }

    let prerequisites: Vec<String> = rule_line[colon_pos + 1..]
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();

    let mut commands = Vec::new();
    let mut lines_consumed = 0;
    for line in &lines[line_idx + 1..] {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            lines_consumed += 1;
        } else if line.starts_with('\t') || line.starts_with(' ') {
            commands.push(Command::parse(line));
            lines_consumed += 1;
        } else {
            break;
        }
    }

    let rule = Rule {
        targets,
        prerequisites,
        commands,
        line: line_idx + 1,
    };

    Ok((rule, lines_consumed))
}
