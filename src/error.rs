use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("'{}' does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not start '{command}': {source}")]
    ProcessSpawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("command '{command} {}' failed with exit code {}", join_args(.args), exit_code(.code))]
    ProcessExit {
        command: String,
        args: Vec<String>,
        code: Option<i32>,
    },

    #[error("Invalid buildfile syntax at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl BuildError {
    /// Classifies an IO failure on `path`, keeping `NotFound` distinct so
    /// callers can treat a missing target as a staleness signal.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            BuildError::NotFound { path }
        } else {
            BuildError::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BuildError::NotFound { .. })
    }
}

fn join_args(args: &[String]) -> String {
    args.join(" ")
}

fn exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}
