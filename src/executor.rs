//! The completion executor: where caller-visible continuations run.
//!
//! Every completion the session engine hands back is resolved through a
//! `CompletionExecutor`, never directly on the session's event-loop task.
//! This keeps a slow or panicking user callback from stalling network I/O.

use std::future::Future;
use std::pin::Pin;

/// A work queue to which the engine submits zero-argument tasks.
///
/// Implementors must not run the submitted future inline on the caller's
/// thread; `spawn` is expected to return before the future has necessarily
/// completed.
pub trait CompletionExecutor: Send + Sync {
    /// Submits `future` for execution on this executor.
    fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>);
}

/// Runs completions on the active Tokio runtime.
#[cfg(feature = "runtime-tokio")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioExecutor;

#[cfg(feature = "runtime-tokio")]
impl CompletionExecutor for TokioExecutor {
    fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>) {
        tokio::task::spawn(future);
    }
}

/// Runs completions on the active async-std runtime.
#[cfg(feature = "runtime-async-std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct AsyncStdExecutor;

#[cfg(feature = "runtime-async-std")]
impl CompletionExecutor for AsyncStdExecutor {
    fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>) {
        async_std::task::spawn(future);
    }
}

/// Runs each completion on a dedicated OS thread, blocking that thread on
/// the future via a local executor.
///
/// Usable under either runtime feature; its threads are named
/// `smtp-completion-executor`, which is what makes "caller callbacks run on
/// the supplied executor, not the event loop" directly observable in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPoolExecutor;

impl CompletionExecutor for ThreadPoolExecutor {
    fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>) {
        let builder = std::thread::Builder::new().name("smtp-completion-executor".to_string());
        let _ = builder.spawn(move || futures::executor::block_on(future));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use futures::channel::oneshot;

    #[test]
    fn test_thread_pool_executor_runs_off_calling_thread() {
        let (tx, rx) = oneshot::channel();
        let executor = ThreadPoolExecutor;
        executor.spawn(Box::pin(async move {
            let name = std::thread::current().name().unwrap_or_default().to_string();
            let _ = tx.send(name);
        }));
        let name = futures::executor::block_on(rx).unwrap();
        assert_eq!(name, "smtp-completion-executor");
    }
}
