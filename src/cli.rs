// src/cli.rs
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{self, WrapErr};

use crate::config::consts::*;
use crate::config::options::{default_workers, AppOptions, FailurePolicy};
use crate::core::chrome::ChromeFactory;
use crate::data::Limit;
use crate::error::ScrapeError;
use crate::progress::ConsoleProgress;
use crate::runner;

#[derive(Parser, Debug)]
#[command(name = "climate_scrape", version, about = "Scrape today's weather for every listed city into a CSV file")]
pub struct Args {
    #[arg(short, long, default_value = "unlimited", help = "Number of cities to fetch, or 'unlimited'")]
    pub limit: Limit,

    #[arg(short, long, help = "Output file [default: ./export.csv]")]
    pub output: Option<PathBuf>,

    #[arg(short, long, help = "Parallel detail workers [default: cores - 1]")]
    pub workers: Option<usize>,

    #[arg(long, value_enum, default_value_t = OnError::Partial, help = "What a failed city does to the run")]
    pub on_error: OnError,

    #[arg(long, default_value_t = DETAIL_ATTEMPTS, help = "Attempts per city, first try included")]
    pub retries: u32,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, help = "Wait and navigation timeout in seconds")]
    pub timeout: u64,

    #[arg(long, help = "Chrome/Chromium binary (else $CLIMATE_SCRAPE_BROWSER, then PATH)")]
    pub browser: Option<PathBuf>,

    #[arg(long, help = "Override the city list page")]
    pub discovery_url: Option<String>,

    #[arg(long, help = "Override the detail page prefix; the city id is appended")]
    pub detail_url: Option<String>,

    #[arg(long, help = "Show the browser window")]
    pub headful: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "More logging (-v info, -vv debug)")]
    pub verbose: u8,

    #[arg(long, help = "Append logs to this file instead of stderr")]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnError {
    Partial,
    FailFast,
}

impl From<OnError> for FailurePolicy {
    fn from(v: OnError) -> Self {
        match v {
            OnError::Partial => FailurePolicy::Partial,
            OnError::FailFast => FailurePolicy::FailFast,
        }
    }
}

impl Args {
    /// Map flags onto the option tree; anything not given keeps its default.
    pub fn to_options(&self) -> AppOptions {
        let mut opts = AppOptions::default();

        let scrape = &mut opts.scrape;
        scrape.limit = self.limit;
        scrape.workers = self.workers.unwrap_or_else(default_workers).max(1);
        scrape.on_error = self.on_error.into();
        scrape.wait.timeout = Duration::from_secs(self.timeout);
        scrape.wait.detail_attempts = self.retries.max(1);
        scrape.browser.executable = self.browser.clone();
        scrape.browser.headless = !self.headful;
        if let Some(url) = &self.discovery_url {
            scrape.site.discovery_url = url.clone();
        }
        if let Some(url) = &self.detail_url {
            scrape.site.detail_url = url.clone();
        }

        if let Some(out) = &self.output {
            opts.export.out_path = out.clone();
        }
        opts
    }
}

pub fn run() -> eyre::Result<()> {
    let args = Args::parse();
    crate::log::init(args.verbose, args.log_file.as_deref())
        .wrap_err("Couldn't open the log file")?;

    let opts = args.to_options();
    let factory = ChromeFactory::new(&opts.scrape.browser, opts.scrape.wait.timeout)?;
    let progress = ConsoleProgress::new();

    let summary = match runner::run(&opts, &factory, &progress) {
        Err(ScrapeError::Io { path, source }) => {
            return Err(eyre::Report::new(source).wrap_err(format!("Couldn't write to {}", path.display())));
        }
        other => other?,
    };

    if summary.failed > 0 {
        logw!("{} of {} cities written without data", summary.failed, summary.records);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("climate_scrape").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_map_to_default_options() {
        let opts = parse(&[]).to_options();
        let default = AppOptions::default();
        assert_eq!(opts.scrape.limit, Limit::Unlimited);
        assert_eq!(opts.scrape.on_error, FailurePolicy::Partial);
        assert_eq!(opts.scrape.wait, default.scrape.wait);
        assert_eq!(opts.scrape.site, default.scrape.site);
        assert!(opts.scrape.browser.headless);
        assert_eq!(opts.export.out_path, default.export.out_path);
    }

    #[test]
    fn flags_override_options() {
        let opts = parse(&[
            "-l", "5", "-o", "out/x.csv", "-w", "3", "--on-error", "fail-fast",
            "--retries", "0", "--timeout", "7", "--headful",
            "--detail-url", "http://localhost/c/",
        ])
        .to_options();

        assert_eq!(opts.scrape.limit, Limit::Max(5));
        assert_eq!(opts.export.out_path, PathBuf::from("out/x.csv"));
        assert_eq!(opts.scrape.workers, 3);
        assert_eq!(opts.scrape.on_error, FailurePolicy::FailFast);
        assert_eq!(opts.scrape.wait.detail_attempts, 1);
        assert_eq!(opts.scrape.wait.timeout, Duration::from_secs(7));
        assert!(!opts.scrape.browser.headless);
        assert_eq!(opts.scrape.site.detail_url, "http://localhost/c/");
        assert_eq!(opts.scrape.site.discovery_url, DISCOVERY_URL);
    }

    #[test]
    fn bad_limit_is_rejected() {
        let argv = ["climate_scrape", "--limit", "lots"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn verbosity_counts() {
        assert_eq!(parse(&["-vv"]).verbose, 2);
    }
}
