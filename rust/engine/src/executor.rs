// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UI thread continuations.
//!
//! Deferred update passes run as tasks posted on the thread that owns the
//! model. A task runs after the handler that posted it has returned, never
//! inside it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Work queued for later execution on the UI thread
pub type Task = Box<dyn FnOnce()>;

/// Queue of continuations on the UI thread.
pub trait UiExecutor {
    /// Queues `task` to run once the current event handler has returned
    fn invoke_later(&self, task: Task);
}

/// Single-threaded executor driven explicitly by the embedding event loop.
///
/// Clones share one queue.
#[derive(Clone, Default)]
pub struct LocalExecutor {
    queue: Rc<RefCell<VecDeque<Task>>>,
}

impl LocalExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Runs the tasks queued so far and returns how many ran.
    ///
    /// Tasks posted while running wait for the next call.
    pub fn run_pending(&self) -> usize {
        let batch: Vec<Task> = self.queue.borrow_mut().drain(..).collect();
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }

    /// Runs tasks until the queue stays empty.
    ///
    /// Tasks may post follow-ups, so this only returns once they stop doing
    /// so. View passes waiting for a borrowed home give up after a bounded
    /// number of turns.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.run_pending();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }
}

impl UiExecutor for LocalExecutor {
    fn invoke_later(&self, task: Task) {
        self.queue.borrow_mut().push_back(task);
    }
}

impl std::fmt::Debug for LocalExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalExecutor")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn tasks_posted_while_running_wait_for_next_run() {
        let executor = LocalExecutor::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let (inner_exec, inner_log) = (executor.clone(), log.clone());
        executor.invoke_later(Box::new(move || {
            inner_log.borrow_mut().push("first");
            let nested_log = inner_log.clone();
            inner_exec.invoke_later(Box::new(move || nested_log.borrow_mut().push("second")));
        }));

        assert_eq!(executor.run_pending(), 1);
        assert_eq!(*log.borrow(), vec!["first"]);
        assert_eq!(executor.pending(), 1);

        assert_eq!(executor.run_pending(), 1);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn run_until_idle_drains_chains() {
        let executor = LocalExecutor::new();
        let counter = Rc::new(Cell::new(0));

        fn chain(executor: LocalExecutor, counter: Rc<Cell<u32>>) {
            counter.set(counter.get() + 1);
            if counter.get() < 3 {
                let next = executor.clone();
                executor.invoke_later(Box::new(move || chain(next, counter)));
            }
        }

        let (e, c) = (executor.clone(), counter.clone());
        executor.invoke_later(Box::new(move || chain(e, c)));
        assert_eq!(executor.run_until_idle(), 3);
        assert_eq!(counter.get(), 3);
    }
}
