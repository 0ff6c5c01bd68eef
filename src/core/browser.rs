// src/core/browser.rs
//! Rendering-client seam.
//!
//! Everything that touches a live page goes through [`RenderedPage`], so the
//! discovery and detail flows can run against a headless browser
//! (`core::chrome`) or a scripted fake in tests. Sessions are not shared:
//! a [`SessionFactory`] hands every unit of work its own.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Result, ScrapeError};

/// A single browser tab's worth of capabilities. Selectors are CSS.
pub trait RenderedPage: Send {
    /// Load `url` and wait for the document to settle.
    fn goto(&mut self, url: &str) -> Result<()>;

    /// `false` when the element is absent or not rendered.
    fn is_visible(&mut self, selector: &str) -> Result<bool>;

    /// Absent element is a `Navigation` error.
    fn click(&mut self, selector: &str) -> Result<()>;

    /// Pick the option whose visible text equals `text`, firing `change`.
    fn select_by_text(&mut self, selector: &str, text: &str) -> Result<()>;

    /// `None` when the element is absent.
    fn inner_html(&mut self, selector: &str) -> Result<Option<String>>;

    /// Release the session. Safe to call more than once.
    fn close(&mut self) -> Result<()>;
}

/// Opens independent sessions, one per unit of work.
pub trait SessionFactory: Sync {
    fn open(&self) -> Result<Box<dyn RenderedPage>>;
}

/// Run `f` against a fresh session and close it afterwards, whatever `f` returned.
pub fn with_session<T>(
    factory: &dyn SessionFactory,
    f: impl FnOnce(&mut dyn RenderedPage) -> Result<T>,
) -> Result<T> {
    let mut page = factory.open()?;
    let out = f(page.as_mut());
    if let Err(e) = page.close() {
        logw!("Session: close failed: {e}");
    }
    out
}

/// Poll `cond` every `every` until it holds or `timeout` passes.
/// Errors from `cond` end the wait immediately.
pub fn wait_until(
    page: &mut dyn RenderedPage,
    timeout: Duration,
    every: Duration,
    what: &str,
    mut cond: impl FnMut(&mut dyn RenderedPage) -> Result<bool>,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if cond(&mut *page)? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ScrapeError::Timeout(format!("{what} after {timeout:?}")));
        }
        thread::sleep(every);
    }
}

pub fn wait_visible(page: &mut dyn RenderedPage, selector: &str, timeout: Duration, every: Duration) -> Result<()> {
    wait_until(page, timeout, every, &format!("waiting for {selector} to show"), |p| {
        p.is_visible(selector)
    })
}

pub fn wait_hidden(page: &mut dyn RenderedPage, selector: &str, timeout: Duration, every: Duration) -> Result<()> {
    wait_until(page, timeout, every, &format!("waiting for {selector} to hide"), |p| {
        p.is_visible(selector).map(|v| !v)
    })
}
