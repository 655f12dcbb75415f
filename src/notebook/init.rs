//! Background repository attach for freshly created or opened notebooks.
//!
//! Creating or opening a notebook has two phases. Everything structural
//! (config, root path, collection tree) is done synchronously by the caller.
//! Only the repository init/open runs on a worker thread, and its single
//! visible effect is flipping the task from pending to completed with either
//! a repository handle or an error.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::notebook::error::{NotebookError, NotebookResult};
use crate::storage::GitRepository;

enum InitState {
    Pending,
    Completed(NotebookResult<GitRepository>),
    /// The result has been handed to the caller.
    Taken,
}

struct InitShared {
    state: Mutex<InitState>,
    completed: Condvar,
}

impl InitShared {
    fn complete(&self, result: NotebookResult<GitRepository>) {
        let mut state = self.state.lock();
        *state = InitState::Completed(result);
        self.completed.notify_all();
    }
}

/// Handle on the worker attaching a notebook's repository.
pub(crate) struct InitTask {
    shared: Arc<InitShared>,
    worker: Option<JoinHandle<()>>,
}

impl InitTask {
    /// Run `attach` on a new worker thread.
    pub(crate) fn spawn<F>(label: &str, attach: F) -> NotebookResult<Self>
    where
        F: FnOnce() -> NotebookResult<GitRepository> + Send + 'static,
    {
        let shared = Arc::new(InitShared {
            state: Mutex::new(InitState::Pending),
            completed: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(format!("notebook-init-{}", label))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(attach)).unwrap_or_else(|_| {
                    Err(NotebookError::Internal(
                        "repository initialization panicked".to_string(),
                    ))
                });
                worker_shared.complete(result);
            })?;

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Whether the worker has finished.
    pub(crate) fn is_completed(&self) -> bool {
        !matches!(*self.shared.state.lock(), InitState::Pending)
    }

    /// The recorded error, if the worker finished and failed.
    pub(crate) fn error_message(&self) -> Option<String> {
        match &*self.shared.state.lock() {
            InitState::Completed(Err(e)) => Some(e.to_string()),
            _ => None,
        }
    }

    /// Block until the worker finishes or `timeout` passes.
    ///
    /// On timeout the worker keeps running to completion on its own; its
    /// result is dropped.
    pub(crate) fn wait(mut self, timeout: Duration) -> NotebookResult<GitRepository> {
        let deadline = Instant::now().checked_add(timeout);

        let result = {
            let mut state = self.shared.state.lock();
            while matches!(*state, InitState::Pending) {
                match deadline {
                    Some(deadline) => {
                        let timed_out = self.shared.completed.wait_until(&mut state, deadline).timed_out();
                        if timed_out && matches!(*state, InitState::Pending) {
                            return Err(NotebookError::InitTimeout(timeout));
                        }
                    }
                    None => self.shared.completed.wait(&mut state),
                }
            }

            match std::mem::replace(&mut *state, InitState::Taken) {
                InitState::Completed(result) => result,
                _ => Err(NotebookError::Internal(
                    "initialization result already taken".to_string(),
                )),
            }
        };

        if let Some(worker) = self.worker.take() {
            // the worker already published its result; a join error is not
            // possible after catch_unwind
            let _ = worker.join();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::GitSignature;
    use std::sync::mpsc;
    use tempfile::TempDir;

    #[test]
    fn test_wait_returns_repository() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        std::fs::write(path.join("config.yml"), "name: a\nuuid: b\n").unwrap();

        let task = InitTask::spawn("ok", move || {
            Ok(GitRepository::init_and_commit_all(&path, "Created notebook a", &GitSignature::gitnotes())?)
        })
        .unwrap();

        let repo = task.wait(Duration::from_secs(10)).unwrap();
        assert!(repo.is_clean().unwrap());
    }

    #[test]
    fn test_error_is_recorded_then_returned() {
        let task = InitTask::spawn("err", || Err(NotebookError::NotImplemented("test"))).unwrap();

        while !task.is_completed() {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(task.error_message().unwrap().contains("not implemented"));
        assert!(matches!(
            task.wait(Duration::from_secs(1)),
            Err(NotebookError::NotImplemented("test"))
        ));
    }

    #[test]
    fn test_timeout() {
        let (release, gate) = mpsc::channel::<()>();
        let task = InitTask::spawn("slow", move || {
            let _ = gate.recv();
            Err(NotebookError::NotImplemented("slow"))
        })
        .unwrap();

        assert!(!task.is_completed());
        let result = task.wait(Duration::from_millis(20));
        assert!(matches!(result, Err(NotebookError::InitTimeout(_))));
        release.send(()).unwrap();
    }

    #[test]
    fn test_panic_becomes_error() {
        let task = InitTask::spawn("panic", || panic!("boom")).unwrap();
        let result = task.wait(Duration::from_secs(10));
        assert!(matches!(result, Err(NotebookError::Internal(_))));
    }
}
