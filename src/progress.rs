// src/progress.rs
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::data::EntityDescriptor;
use crate::error::ScrapeError;

/// Lightweight progress reporting used by the long-running phases.
/// Detail workers call into it from their own threads, hence `Sync` and `&self`.
pub trait Progress: Sync {
    /// Called at the start of the detail phase with the queue length.
    fn begin(&self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&self, _msg: &str) {}

    /// A detail unit is about to be fetched.
    fn item_started(&self, _index: usize, _total: usize, _entity: &EntityDescriptor) {}

    /// A detail unit produced its record.
    fn item_done(&self, _index: usize) {}

    /// A detail unit gave up after its retries.
    fn item_failed(&self, _index: usize, _entity: &EntityDescriptor, _err: &ScrapeError) {}

    /// Called at the end of the detail phase, successful or not.
    fn finish(&self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// `(index/total) Scraping <region> - <name>...`
pub fn scraping_line(index: usize, total: usize, entity: &EntityDescriptor) -> String {
    format!("({index}/{total}) Scraping {} - {}...", entity.region, entity.name)
}

/// Prints to stdout; counts outcomes for the closing line.
#[derive(Default)]
pub struct ConsoleProgress {
    total: AtomicUsize,
    done: AtomicUsize,
    failed: AtomicUsize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}

impl Progress for ConsoleProgress {
    fn begin(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    fn log(&self, msg: &str) {
        println!("{msg}");
    }

    fn item_started(&self, index: usize, total: usize, entity: &EntityDescriptor) {
        println!("{}", scraping_line(index, total, entity));
    }

    fn item_done(&self, _index: usize) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }

    fn item_failed(&self, index: usize, entity: &EntityDescriptor, err: &ScrapeError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        eprintln!("[WARN] ({index}) {} - {}: {err}", entity.region, entity.name);
    }

    fn finish(&self) {
        let total = self.total.load(Ordering::Relaxed);
        let done = self.done.load(Ordering::Relaxed);
        let failed = self.failed();
        if failed == 0 {
            println!("Fetched {done}/{total}");
        } else {
            println!("Fetched {done}/{total}, {failed} failed");
        }
    }
}
