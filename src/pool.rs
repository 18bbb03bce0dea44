//! Bounded task pool shared by batch processing and per-page extraction.
//!
//! Work items are submitted to a dedicated `rayon` pool and their results
//! are delivered back over a `crossbeam-channel` tagged with the submission
//! index, so callers always see results in submission order regardless of
//! completion order.

use crossbeam_channel::bounded;

/// Upper bound on the default worker count.
pub const MAX_DEFAULT_WORKERS: usize = 8;

/// Default worker count: available cores, capped at [`MAX_DEFAULT_WORKERS`].
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_WORKERS)
}

/// A bounded pool of worker threads.
pub struct TaskPool {
    pool: Option<rayon::ThreadPool>,
    workers: usize,
}

impl TaskPool {
    /// Create a pool with `workers` threads (0 selects the default size).
    ///
    /// A single worker, or a pool that cannot be built, runs tasks on the
    /// calling thread.
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 {
            default_workers()
        } else {
            workers
        };
        if workers <= 1 {
            return Self::sequential();
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pdf-outline-{}", i))
            .build()
        {
            Ok(pool) => Self {
                pool: Some(pool),
                workers,
            },
            Err(e) => {
                log::warn!("Could not start {} workers ({}); running sequentially", workers, e);
                Self::sequential()
            }
        }
    }

    /// A pool that runs every task on the calling thread.
    pub fn sequential() -> Self {
        Self {
            pool: None,
            workers: 1,
        }
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Whether tasks run on the calling thread.
    pub fn is_sequential(&self) -> bool {
        self.pool.is_none()
    }

    /// Run `f` over every item and return the results in item order.
    ///
    /// Safe to call from inside another task of the same pool: the waiting
    /// worker keeps executing queued tasks.
    pub fn run_indexed<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        let Some(pool) = &self.pool else {
            return items.into_iter().map(f).collect();
        };

        let count = items.len();
        let (tx, rx) = bounded(count.max(1));
        let f = &f;

        pool.scope(|scope| {
            for (index, item) in items.into_iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    // Capacity covers every result, so this never blocks
                    let _ = tx.send((index, f(item)));
                });
            }
        });
        drop(tx);

        reorder(count, rx.try_iter())
    }

    /// Like [`run_indexed`](Self::run_indexed), calling `on_done` on the
    /// calling thread as each result arrives (in completion order).
    ///
    /// Must not be called from inside a task of the same pool.
    pub fn run_indexed_with<T, R, F, P>(&self, items: Vec<T>, f: F, mut on_done: P) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
        P: FnMut(usize, &R),
    {
        let Some(pool) = &self.pool else {
            return items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    let result = f(item);
                    on_done(index, &result);
                    result
                })
                .collect();
        };

        let count = items.len();
        let (tx, rx) = bounded(count.max(1));
        let f = &f;

        pool.in_place_scope(|scope| {
            for (index, item) in items.into_iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let _ = tx.send((index, f(item)));
                });
            }
            drop(tx);

            reorder(
                count,
                rx.iter().inspect(|(index, result)| on_done(*index, result)),
            )
        })
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool")
            .field("workers", &self.workers)
            .finish()
    }
}

fn reorder<R>(count: usize, results: impl Iterator<Item = (usize, R)>) -> Vec<R> {
    let mut slots: Vec<Option<R>> = (0..count).map(|_| None).collect();
    for (index, result) in results {
        slots[index] = Some(result);
    }
    slots.into_iter().flatten().collect()
}
