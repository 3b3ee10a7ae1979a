use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tracing::info;

use crate::error::Result;
use crate::staleness;

type BoxFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a>>;
type Body<'a> = Box<dyn FnOnce() -> BoxFuture<'a> + 'a>;

/// One build step: the paths it produces, the paths it reads, and the work
/// that turns one into the other.
///
/// A task is built, run once and dropped.
pub struct Task<'a> {
    pub run_message: String,
    pub skip_message: String,
    pub targets: Vec<PathBuf>,
    pub sources: Vec<PathBuf>,
    body: Body<'a>,
}

impl<'a> Task<'a> {
    pub fn new<F, Fut>(
        run_message: impl Into<String>,
        skip_message: impl Into<String>,
        body: F,
    ) -> Self
    where
        F: FnOnce() -> Fut + 'a,
        Fut: Future<Output = Result<()>> + 'a,
    {
        Self {
            run_message: run_message.into(),
            skip_message: skip_message.into(),
            targets: Vec::new(),
            sources: Vec::new(),
            body: Box::new(move || -> BoxFuture<'a> { Box::pin(body()) }),
        }
    }

    pub fn target(mut self, path: impl Into<PathBuf>) -> Self {
        self.targets.push(path.into());
        self
    }

    pub fn targets<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.targets.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(path.into());
        self
    }

    pub fn sources<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.sources.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Checks staleness off the async thread.
    pub async fn is_stale(&self) -> Result<bool> {
        let targets = self.targets.clone();
        let sources = self.sources.clone();
        blocking(move || staleness::is_stale(&targets, &sources)).await
    }

    /// Runs the body if the targets are stale. Returns whether it ran.
    ///
    /// Errors from the body are passed through untouched.
    pub async fn run(self) -> Result<bool> {
        if !self.is_stale().await? {
            info!("{}: {}", self.joined_targets(), self.skip_message);
            return Ok(false);
        }

        info!("{}", self.run_message);
        (self.body)().await?;
        Ok(true)
    }

    fn joined_targets(&self) -> String {
        self.targets
            .iter()
            .map(|t| t.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub async fn run_task(task: Task<'_>) -> Result<bool> {
    task.run().await
}

/// Runs `f` on the blocking pool. A panic inside `f` resumes on the caller.
async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => value,
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    }
}
