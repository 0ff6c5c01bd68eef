// src/scrape/climate.rs
use std::thread;

use crate::config::options::{FailurePolicy, ScrapeOptions};
use crate::core::browser::{with_session, SessionFactory};
use crate::data::{ClimateRecord, Discovered, EntityDescriptor, Limit};
use crate::error::{Result, ScrapeError};
use crate::progress::Progress;
use crate::specs;

use super::pool::Pool;

/// One queued unit. `index` is 1-based and stable for the whole run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkItem {
    pub index: usize,
    pub entity: EntityDescriptor,
}

/// Entities in name order, cut to the effective limit.
pub fn build_work_queue(discovered: &Discovered, limit: Limit) -> Vec<WorkItem> {
    let take = limit.effective(discovered.len());
    discovered
        .values()
        .take(take)
        .enumerate()
        .map(|(i, entity)| WorkItem { index: i + 1, entity: entity.clone() })
        .collect()
}

/// Detail phase: fetch every queued city in parallel, one browser session per
/// unit, and return the records in queue order.
pub fn collect_climate(
    discovered: &Discovered,
    opts: &ScrapeOptions,
    factory: &dyn SessionFactory,
    progress: &dyn Progress,
) -> Result<Vec<ClimateRecord>> {
    let queue = build_work_queue(discovered, opts.limit);
    let total = queue.len();

    progress.begin(total);
    if total == 0 {
        progress.finish();
        return Ok(Vec::new());
    }

    let pool = Pool::new(opts.workers);
    logf!(
        "Scrape: {total} cities (limit {}) on {} workers, policy={:?}",
        opts.limit, pool.workers().min(total), opts.on_error
    );

    let fail_fast = opts.on_error == FailurePolicy::FailFast;
    let results = pool.run_until(
        &queue,
        |_, item| fetch_unit(item, total, opts, factory, progress),
        |res| fail_fast && res.is_err(),
    );

    progress.finish();
    assemble(&queue, results, opts.on_error)
}

/// One unit with its retries. Each attempt gets a fresh session.
fn fetch_unit(
    item: &WorkItem,
    total: usize,
    opts: &ScrapeOptions,
    factory: &dyn SessionFactory,
    progress: &dyn Progress,
) -> Result<ClimateRecord> {
    let attempts = opts.wait.detail_attempts.max(1);
    let mut attempt = 1;
    // The progress line goes out once per unit, not per attempt.
    let mut announced = false;

    loop {
        let res = with_session(factory, |page| {
            if announced {
                specs::climate::fetch_record(page, &opts.site, &item.entity)
            } else {
                announced = true;
                specs::climate::fetch(page, &opts.site, &item.entity, item.index, total, progress)
            }
        });

        match res {
            Ok(record) => {
                progress.item_done(item.index);
                return Ok(record);
            }
            Err(e) if e.is_transient() && attempt < attempts => {
                let delay = opts.wait.backoff.delay(attempt, item.index as u64);
                logw!(
                    "({}) {}: attempt {attempt}/{attempts} failed: {e}; retrying in {delay:?}",
                    item.index, item.entity.name
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => {
                loge!("({}) {}: {e}", item.index, item.entity.name);
                progress.item_failed(item.index, &item.entity, &e);
                return Err(e);
            }
        }
    }
}

/// Turn gathered slots into output rows according to the failure policy.
fn assemble(
    queue: &[WorkItem],
    results: Vec<Option<Result<ClimateRecord>>>,
    policy: FailurePolicy,
) -> Result<Vec<ClimateRecord>> {
    let mut records = Vec::with_capacity(queue.len());

    for (item, slot) in queue.iter().zip(results) {
        match slot {
            Some(Ok(record)) => records.push(record),
            Some(Err(e)) if policy == FailurePolicy::FailFast => {
                return Err(ScrapeError::Unit {
                    index: item.index,
                    name: item.entity.name.clone(),
                    source: Box::new(e),
                });
            }
            // Undispatched slots only ever trail a fail-fast failure.
            Some(Err(_)) | None => records.push(ClimateRecord::partial(&item.entity)),
        }
    }

    Ok(records)
}
