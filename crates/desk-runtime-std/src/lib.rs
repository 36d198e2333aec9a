//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides a concrete [`RuntimeScheduler`] for `desk-core`.
//! Hosts construct a [`StdRuntime`], poll [`StdRuntime::take_pass_request`]
//! from their event loop and drain the runtime when it returns true.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use desk_core::{Runtime, RuntimeHandle, RuntimeScheduler};

type PassWaker = Arc<dyn Fn() + Send + Sync + 'static>;

/// Scheduler that records pass requests in an atomic flag.
pub struct StdScheduler {
    pass_requested: AtomicBool,
    pass_waker: RwLock<Option<PassWaker>>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            pass_requested: AtomicBool::new(false),
            pass_waker: RwLock::new(None),
        }
    }

    /// Returns whether a pass has been requested since the last call.
    pub fn take_pass_request(&self) -> bool {
        self.pass_requested.swap(false, Ordering::SeqCst)
    }

    /// Registers a waker that will be invoked whenever a pass is requested.
    pub fn set_pass_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        let mut slot = self
            .pass_waker
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(Arc::new(waker));
    }

    /// Clears any registered pass waker.
    pub fn clear_pass_waker(&self) {
        let mut slot = self
            .pass_waker
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = None;
    }

    fn wake(&self) {
        let waker = self
            .pass_waker
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdScheduler")
            .field(
                "pass_requested",
                &self.pass_requested.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_pass(&self) {
        self.pass_requested.store(true, Ordering::SeqCst);
        self.wake();
    }
}

/// Convenience container bundling the standard scheduler and a runtime.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdScheduler>,
    runtime: Runtime,
}

impl StdRuntime {
    /// Creates a new standard runtime instance.
    pub fn new() -> Self {
        let scheduler = Arc::new(StdScheduler::default());
        let runtime = Runtime::new(scheduler.clone());
        Self { scheduler, runtime }
    }

    /// Returns a [`desk_core::Runtime`] driven by the standard scheduler.
    pub fn runtime(&self) -> Runtime {
        self.runtime.clone()
    }

    /// Returns a handle to the runtime.
    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    /// Returns the scheduler implementation.
    pub fn scheduler(&self) -> Arc<StdScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// Returns whether a pass was requested since the last poll.
    pub fn take_pass_request(&self) -> bool {
        self.scheduler.take_pass_request()
    }

    /// Registers a waker to be called when the runtime requests a pass.
    pub fn set_pass_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.scheduler.set_pass_waker(waker);
    }

    /// Clears any previously registered pass waker.
    pub fn clear_pass_waker(&self) {
        self.scheduler.clear_pass_waker();
    }

    /// Runs one queued task.
    pub fn run_next(&self) -> bool {
        self.runtime.run_next()
    }

    /// Runs queued tasks until none remain.
    pub fn run_until_idle(&self) -> usize {
        self.runtime.run_until_idle()
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn spawning_a_task_requests_a_pass_and_wakes_the_host() {
        let runtime = StdRuntime::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        {
            let wakes = Arc::clone(&wakes);
            runtime.set_pass_waker(move || {
                wakes.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert!(!runtime.take_pass_request());
        runtime.runtime_handle().spawn_task(|| {});
        runtime.runtime_handle().spawn_when_idle(|| {});

        assert!(runtime.take_pass_request());
        assert!(!runtime.take_pass_request(), "request is consumed");
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
        assert_eq!(runtime.run_until_idle(), 2);

        runtime.clear_pass_waker();
        runtime.runtime_handle().spawn_task(|| {});
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }
}
