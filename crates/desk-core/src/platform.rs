//! Platform abstraction for the binding runtime.
//!
//! The runtime never drives itself. It asks the host to schedule a pass of
//! its execution loop, and the host calls back into
//! [`Runtime::run_next`](crate::Runtime::run_next) or
//! [`Runtime::run_until_idle`](crate::Runtime::run_until_idle) on the thread
//! that owns the desk.

/// Schedules passes of the runtime's execution loop.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host run the runtime's queued tasks soon.
    fn schedule_pass(&self);
}
