// src/scrape/mod.rs
mod climate;
pub mod pool;

pub use climate::{build_work_queue, collect_climate, WorkItem};
pub use pool::{gather, Pool};
