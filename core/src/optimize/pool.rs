//! Hand-rolled thread pool: workers dynamically claim the next task index off a shared counter,
//! results land at their task index regardless of completion order. Used by the grid-search
//! optimizer to fan a parameter sweep out across cores without pulling in a work-stealing crate —
//! the claim-by-index contract here is simple enough to implement directly with `std::thread`
//! and a mutex/condvar pair.

use std::sync::{Arc, Condvar, Mutex};
use std::thread;

struct Shared<T> {
    next_index: Mutex<usize>,
    completed: Mutex<usize>,
    condvar: Condvar,
    results: Mutex<Vec<Option<T>>>,
}

/// A pool sized at construction time, reused across however many [`Self::execute`] calls the
/// caller makes. `num_threads` defaults to the machine's logical core count.
pub struct ThreadPool {
    num_threads: usize,
}

impl ThreadPool {
    pub fn new(num_threads: usize) -> Self {
        Self { num_threads: num_threads.max(1) }
    }

    pub fn with_default_threads() -> Self {
        Self::new(num_cpus::get())
    }

    /// Runs `task_fn(ctx, index)` once per index in `0..num_tasks`, returning results in index
    /// order. Falls back to running serially on the calling thread when parallelism wouldn't pay
    /// off (`num_tasks <= num_threads` or the pool has one thread).
    pub fn execute<T, Ctx, F>(&self, task_fn: F, ctx: Ctx, num_tasks: usize) -> Vec<T>
    where
        T: Send + 'static,
        Ctx: Sync,
        F: Fn(&Ctx, usize) -> T + Sync,
    {
        if num_tasks == 0 {
            return Vec::new();
        }
        if num_tasks <= self.num_threads || self.num_threads == 1 {
            return (0..num_tasks).map(|i| task_fn(&ctx, i)).collect();
        }

        let shared = Arc::new(Shared {
            next_index: Mutex::new(0),
            completed: Mutex::new(0),
            condvar: Condvar::new(),
            results: Mutex::new((0..num_tasks).map(|_| None).collect()),
        });

        thread::scope(|scope| {
            for _ in 0..self.num_threads {
                let shared = Arc::clone(&shared);
                let task_fn = &task_fn;
                let ctx = &ctx;
                scope.spawn(move || loop {
                    let index = {
                        let mut next = shared.next_index.lock().unwrap();
                        if *next >= num_tasks {
                            break;
                        }
                        let claimed = *next;
                        *next += 1;
                        claimed
                    };

                    let result = task_fn(ctx, index);

                    shared.results.lock().unwrap()[index] = Some(result);
                    let mut completed = shared.completed.lock().unwrap();
                    *completed += 1;
                    if *completed == num_tasks {
                        shared.condvar.notify_all();
                    }
                });
            }

            let mut completed = shared.completed.lock().unwrap();
            while *completed < num_tasks {
                completed = shared.condvar.wait(completed).unwrap();
            }
        });

        Arc::try_unwrap(shared)
            .unwrap_or_else(|_| unreachable!("all worker threads have joined by this point"))
            .results
            .into_inner()
            .unwrap()
            .into_iter()
            .map(|slot| slot.expect("every index was claimed exactly once"))
            .collect()
    }
}
