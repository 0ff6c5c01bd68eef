// src/scrape/pool.rs
//
// Fixed-size thread pool over a slice of work items.
//
// Workers pull the next index from a shared cursor and send `(index, result)`
// back over a channel; the caller drops each result into a pre-sized buffer
// at its index. Output order is submission order, whatever order workers
// finish in.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

#[derive(Clone, Copy, Debug)]
pub struct Pool {
    workers: usize,
}

impl Pool {
    pub fn new(workers: usize) -> Self {
        Self { workers: workers.max(1) }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `job` over every item. `results[i]` belongs to `items[i]`.
    pub fn run<T, R, F>(&self, items: &[T], job: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync,
    {
        self.run_until(items, job, |_| false)
            .into_iter()
            .flatten()
            .collect()
    }

    /// Like [`Pool::run`], but once a result satisfies `halt` no further items
    /// are handed out. Items already running finish; the rest stay `None`.
    pub fn run_until<T, R, F, H>(&self, items: &[T], job: F, halt: H) -> Vec<Option<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync,
        H: Fn(&R) -> bool + Sync,
    {
        if items.is_empty() {
            return Vec::new();
        }
        let workers = self.workers.min(items.len());
        let cursor = AtomicUsize::new(0);
        let halted = AtomicBool::new(false);

        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel::<(usize, R)>();

            for _ in 0..workers {
                let tx = tx.clone();
                let (cursor, halted, job, halt) = (&cursor, &halted, &job, &halt);

                scope.spawn(move || {
                    loop {
                        if halted.load(Ordering::Acquire) {
                            break;
                        }
                        let i = cursor.fetch_add(1, Ordering::Relaxed);
                        if i >= items.len() {
                            break;
                        }
                        let result = job(i, &items[i]);
                        if halt(&result) {
                            halted.store(true, Ordering::Release);
                        }
                        if tx.send((i, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx); // receiver sees the end once every worker is done

            gather(items.len(), rx)
        })
    }
}

/// Index-stable gather: place each `(index, result)` at its slot.
/// Slots never filled stay `None`; out-of-range indices are ignored.
pub fn gather<R>(total: usize, results: impl IntoIterator<Item = (usize, R)>) -> Vec<Option<R>> {
    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
    for (i, r) in results {
        if let Some(slot) = slots.get_mut(i) {
            *slot = Some(r);
        }
    }
    slots
}
