mod common;

use std::cell::Cell;
use std::fs;

use stalemake::{run_task, BuildError, Task};
use tempfile::TempDir;
use tracing_test::traced_test;

use common::touch;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_run_is_skipped() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("in.txt");
        let out = dir.path().join("out.txt");
        touch(&src, 0);
        let runs = Cell::new(0);

        let build = || {
            let (runs, out) = (&runs, &out);
            Task::new("writing", "nothing to do", move || async move {
                runs.set(runs.get() + 1);
                fs::write(out, "built").map_err(|e| BuildError::from_io(out, e))?;
                Ok(())
            })
            .target(out)
            .source(&src)
        };

        assert!(build().run().await.unwrap());
        assert!(!build().run().await.unwrap());
        assert_eq!(runs.get(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn logs_run_line_then_skip_line() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("in.txt");
        let out = dir.path().join("out.txt");
        let map = dir.path().join("out.map");
        touch(&src, 0);

        let build = || {
            let (out, map) = (&out, &map);
            Task::new("bundling component", "nothing to do", move || async move {
                fs::write(out, "built").map_err(|e| BuildError::from_io(out, e))?;
                fs::write(map, "built").map_err(|e| BuildError::from_io(map, e))?;
                Ok(())
            })
            .targets([out, map])
            .source(&src)
        };

        assert!(build().run().await.unwrap());
        assert!(logs_contain("bundling component"));
        assert!(!logs_contain("nothing to do"));

        assert!(!build().run().await.unwrap());
        assert!(logs_contain(&format!(
            "{}, {}: nothing to do",
            out.display(),
            map.display()
        )));
    }

    #[tokio::test]
    async fn task_without_targets_always_runs() {
        let runs = Cell::new(0);

        for _ in 0..3 {
            let runs = &runs;
            let task = Task::new("checking", "skipped", move || async move {
                runs.set(runs.get() + 1);
                Ok(())
            });
            assert!(run_task(task).await.unwrap());
        }

        assert_eq!(runs.get(), 3);
    }

    #[tokio::test]
    async fn body_error_propagates_unchanged() {
        let dir = TempDir::new().unwrap();
        let task = Task::new("failing", "skipped", || async {
            Err(BuildError::Configuration("missing WASI SDK path".to_string()))
        })
        .target(dir.path().join("never.txt"));

        match task.run().await {
            Err(BuildError::Configuration(msg)) => assert_eq!(msg, "missing WASI SDK path"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn up_to_date_task_does_not_run_body() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let out = dir.path().join("out");
        touch(&src.join("lib.rs"), 1);
        touch(&out.join("lib.wasm"), 2);
        let ran = Cell::new(false);
        let flag = &ran;

        let task = Task::new("building", "up to date", move || async move {
            flag.set(true);
            Ok(())
        })
        .targets([&out])
        .sources([&src]);

        assert!(!task.run().await.unwrap());
        assert!(!ran.get());
    }

    #[tokio::test]
    async fn missing_source_fails_before_body() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.txt");
        touch(&out, 1);
        let ran = Cell::new(false);
        let flag = &ran;

        let task = Task::new("building", "up to date", move || async move {
            flag.set(true);
            Ok(())
        })
        .target(&out)
        .source(dir.path().join("gone.txt"));

        assert!(task.run().await.unwrap_err().is_not_found());
        assert!(!ran.get());
    }
}
