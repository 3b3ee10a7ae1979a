//! A sequential, timestamp-driven make.
//!
//! A [`Task`] runs only when one of its targets is missing or older than one
//! of its sources. Rule files are parsed into a [`Pipeline`], which orders
//! rules so that dependencies are built before the rules that need them.

pub mod error;
pub mod graph;
pub mod mtime;
pub mod parser;
pub mod pipeline;
pub mod process;
pub mod staleness;
pub mod task;

pub use error::{BuildError, Result};
pub use graph::{all_dependencies, DependencyMap};
pub use pipeline::{Pipeline, Step};
pub use process::{run, run_capture, Cmd, ProcessOutput};
pub use staleness::is_stale;
pub use task::{run_task, Task};
