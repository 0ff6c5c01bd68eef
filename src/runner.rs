// src/runner.rs
use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;

use crate::{
    config::options::AppOptions,
    core::browser::{with_session, SessionFactory},
    data::Limit,
    error::Result,
    file::write_export,
    log::fmt_elapsed,
    progress::Progress,
    scrape::collect_climate,
    specs,
};

/// Summary of what was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub records: usize,
    /// Rows written without extracted fields.
    pub failed: usize,
    pub path: PathBuf,
}

fn took(since: Instant) -> String {
    fmt_elapsed(since.elapsed().as_millis())
}

/// Top-level runner: discovery, detail fetch, export.
pub fn run(opts: &AppOptions, factory: &dyn SessionFactory, progress: &dyn Progress) -> Result<RunSummary> {
    let started = Instant::now();
    let scrape = &opts.scrape;
    let out_path = &opts.export.out_path;

    progress.log(&format!("Started at {}", Local::now().format("%Y-%m-%d %H:%M:%S")));
    progress.log(&match scrape.limit {
        Limit::Unlimited => s!("Running in unlimited mode (fetches all available cities)"),
        Limit::Max(n) => format!("Climate fetch requests limit: {n}"),
    });
    progress.log(&format!("Output data to '{}'", out_path.display()));

    // ---------- DISCOVERY ----------
    progress.log("Retrieving available cities...");
    let discovery_started = Instant::now();
    let discovered = with_session(factory, |page| specs::cities::fetch(page, &scrape.site, &scrape.wait))?;
    progress.log(&format!("Found {} cities", discovered.len()));
    progress.log(&format!("Done. ({})", took(discovery_started)));

    // ---------- DETAIL ----------
    progress.log("Retrieving weather data...");
    let detail_started = Instant::now();
    let records = collect_climate(&discovered, scrape, factory, progress)?;
    progress.log(&format!("Done. ({})", took(detail_started)));

    // ---------- EXPORT ----------
    progress.log("Writing data to disk in csv format...");
    let export_started = Instant::now();
    let outcome = write_export(&records, out_path)?;
    progress.log(&format!("Done. ({})", took(export_started)));

    progress.log(&format!("Total time: {}", took(started)));
    logf!("Run finished in {:?}", started.elapsed());

    Ok(RunSummary {
        discovered: discovered.len(),
        records: records.len(),
        failed: records.iter().filter(|r| r.is_partial()).count(),
        path: outcome.path,
    })
}
