use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::platform::RuntimeScheduler;

type Task = Box<dyn FnOnce() + 'static>;

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_pass: Cell<bool>,
    pending_tasks: RefCell<VecDeque<Task>>,
    idle_tasks: RefCell<VecDeque<Task>>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            needs_pass: Cell::new(false),
            pending_tasks: RefCell::new(VecDeque::new()),
            idle_tasks: RefCell::new(VecDeque::new()),
        }
    }

    fn schedule(&self) {
        self.needs_pass.set(true);
        self.scheduler.schedule_pass();
    }

    fn enqueue_task(&self, task: Task) {
        self.pending_tasks.borrow_mut().push_back(task);
        self.schedule();
    }

    fn enqueue_idle_task(&self, task: Task) {
        self.idle_tasks.borrow_mut().push_back(task);
        self.schedule();
    }

    fn next_task(&self) -> Option<Task> {
        let task = self.pending_tasks.borrow_mut().pop_front();
        task.or_else(|| self.idle_tasks.borrow_mut().pop_front())
    }

    fn run_next(&self) -> bool {
        // Borrows are released before the task runs; tasks re-enqueue themselves.
        match self.next_task() {
            Some(task) => {
                task();
                true
            }
            None => {
                self.needs_pass.set(false);
                false
            }
        }
    }

    fn has_tasks(&self) -> bool {
        !self.pending_tasks.borrow().is_empty() || !self.idle_tasks.borrow().is_empty()
    }

    fn has_pending_tasks(&self) -> bool {
        !self.pending_tasks.borrow().is_empty()
    }
}

/// Single-threaded cooperative task queue.
///
/// Two lanes: ordinary tasks run in the order they were posted, and idle
/// tasks run only when no ordinary task is waiting. An idle task therefore
/// always yields to every ordinary task posted before it is picked.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    /// Runs one task. Returns false once both lanes are empty.
    pub fn run_next(&self) -> bool {
        self.inner.run_next()
    }

    /// Runs tasks until both lanes are empty and returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.inner.run_next() {
            ran += 1;
        }
        ran
    }

    pub fn has_tasks(&self) -> bool {
        self.inner.has_tasks()
    }

    pub fn needs_pass(&self) -> bool {
        self.inner.needs_pass.get()
    }

    pub fn set_needs_pass(&self, value: bool) {
        self.inner.needs_pass.set(value);
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_pass(&self) {}
}

#[cfg(test)]
#[derive(Default)]
pub struct TestScheduler;

#[cfg(test)]
impl RuntimeScheduler for TestScheduler {
    fn schedule_pass(&self) {}
}

#[derive(Clone)]
pub struct RuntimeHandle(pub(crate) Weak<RuntimeInner>);

impl RuntimeHandle {
    /// Posts a task behind everything already queued. Returns false, and
    /// drops the task, if the runtime is gone.
    pub fn spawn_task(&self, task: impl FnOnce() + 'static) -> bool {
        match self.0.upgrade() {
            Some(inner) => {
                inner.enqueue_task(Box::new(task));
                true
            }
            None => false,
        }
    }

    /// Posts a task that waits until no ordinary task is queued.
    pub fn spawn_when_idle(&self, task: impl FnOnce() + 'static) -> bool {
        match self.0.upgrade() {
            Some(inner) => {
                inner.enqueue_idle_task(Box::new(task));
                true
            }
            None => false,
        }
    }

    pub fn run_next(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.run_next())
            .unwrap_or(false)
    }

    pub fn has_tasks(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.has_tasks())
            .unwrap_or(false)
    }

    /// True if ordinary (non-idle) work is waiting.
    pub fn has_pending_tasks(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.has_pending_tasks())
            .unwrap_or(false)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}
