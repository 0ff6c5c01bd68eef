// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use super::consts::*;
use crate::data::Limit;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AppOptions {
    pub scrape: ScrapeOptions,
    pub export: ExportOptions,
}

/// What to do when one detail unit fails after its retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep going; the failed slot gets an empty-field record.
    #[default]
    Partial,
    /// Stop dispatching and fail the run with the unit's error.
    FailFast,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub limit: Limit,
    pub workers: usize,
    pub on_error: FailurePolicy,
    pub site: SiteOptions,
    pub wait: WaitOptions,
    pub browser: BrowserOptions,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            limit: Limit::Unlimited,
            workers: default_workers(),
            on_error: FailurePolicy::default(),
            site: SiteOptions::default(),
            wait: WaitOptions::default(),
            browser: BrowserOptions::default(),
        }
    }
}

/// All cores but one, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteOptions {
    pub discovery_url: String,
    /// Prefix; the entity's remote id is appended.
    pub detail_url: String,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            discovery_url: s!(DISCOVERY_URL),
            detail_url: s!(DETAIL_URL),
        }
    }
}

impl SiteOptions {
    pub fn detail_url_for(&self, remote_id: &str) -> String {
        join!(self.detail_url.as_str(), remote_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaitOptions {
    /// Element waits and navigation.
    pub timeout: Duration,
    /// How long a clicked overlay gets to go away before re-clicking.
    pub overlay_hide_timeout: Duration,
    pub poll_interval: Duration,
    /// Entity-list population polls per region.
    pub max_polls: u32,
    pub overlay_attempts: u32,
    /// Attempts per detail unit, first try included.
    pub detail_attempts: u32,
    pub backoff: Backoff,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            overlay_hide_timeout: Duration::from_secs(OVERLAY_HIDE_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            max_polls: MAX_POLLS,
            overlay_attempts: OVERLAY_ATTEMPTS,
            detail_attempts: DETAIL_ATTEMPTS,
            backoff: Backoff::default(),
        }
    }
}

/// Exponential backoff: `base * 2^(attempt-1)`, capped at `max`, plus jitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
    pub jitter_ms: u64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(BACKOFF_BASE_MS),
            max: Duration::from_millis(BACKOFF_MAX_MS),
            jitter_ms: JITTER_MS,
        }
    }
}

impl Backoff {
    /// No waiting at all. Used by tests.
    pub fn none() -> Self {
        Self { base: Duration::ZERO, max: Duration::ZERO, jitter_ms: 0 }
    }

    /// Delay before retry number `attempt` (1-based). `salt` spreads workers apart.
    pub fn delay(&self, attempt: u32, salt: u64) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let exp = self.base.saturating_mul(factor).min(self.max);
        let jitter = if self.jitter_ms == 0 { 0 } else { salt % self.jitter_ms };
        exp + Duration::from_millis(jitter)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserOptions {
    /// Explicit binary; otherwise resolved from the environment and PATH.
    pub executable: Option<PathBuf>,
    pub headless: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self { executable: None, headless: true }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub out_path: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        let dir = std::env::current_dir().unwrap_or_default();
        Self { out_path: dir.join(DEFAULT_FILE) }
    }
}
