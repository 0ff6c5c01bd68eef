// src/core/chrome.rs
//! Headless Chrome sessions behind [`RenderedPage`].
//!
//! `chromiumoxide` is async; each session owns a private current-thread
//! tokio runtime and blocks on it, so a session lives entirely on the worker
//! thread that opened it. Every session also gets its own throwaway profile
//! directory, which lets several browsers run side by side.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tempfile::TempDir;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

use crate::config::consts::{BROWSER_ENV, BROWSER_NAMES, DEV_CHANNEL_SUFFIX};
use crate::config::options::BrowserOptions;
use crate::error::{Result, ScrapeError};
use super::browser::{RenderedPage, SessionFactory};

/// Launches one browser per session.
#[derive(Clone, Debug)]
pub struct ChromeFactory {
    executable: PathBuf,
    headless: bool,
    timeout: Duration,
}

impl ChromeFactory {
    pub fn new(opts: &BrowserOptions, timeout: Duration) -> Result<Self> {
        let executable = match &opts.executable {
            Some(p) => p.clone(),
            None => resolve_browser().ok_or_else(|| {
                ScrapeError::Launch(format!(
                    "no Chrome/Chromium binary found on PATH (set {BROWSER_ENV} or pass --browser)"
                ))
            })?,
        };
        logf!("Browser: using {}", executable.display());
        Ok(Self { executable, headless: opts.headless, timeout })
    }
}

impl SessionFactory for ChromeFactory {
    fn open(&self) -> Result<Box<dyn RenderedPage>> {
        Ok(Box::new(ChromeSession::launch(self)?))
    }
}

pub struct ChromeSession {
    rt: Runtime,
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    timeout: Duration,
    // Dropped last, after the browser is gone.
    _profile: TempDir,
}

impl ChromeSession {
    fn launch(factory: &ChromeFactory) -> Result<Self> {
        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ScrapeError::Launch(format!("runtime: {e}")))?;

        let profile = tempfile::Builder::new()
            .prefix("climate_scrape-")
            .tempdir()
            .map_err(|e| ScrapeError::Launch(format!("profile dir: {e}")))?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&factory.executable)
            .user_data_dir(profile.path())
            .request_timeout(factory.timeout);
        if !factory.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ScrapeError::Launch)?;

        let (browser, page, handler) = rt.block_on(async {
            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| ScrapeError::Launch(e.to_string()))?;

            // The CDP connection only makes progress while this task is polled.
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    match event {
                        Ok(()) => {}
                        Err(e) if connection_lost(&e) => {
                            logw!("Browser: connection lost: {e}");
                            break;
                        }
                        Err(e) => logd!("Browser: handler error: {e}"),
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ScrapeError::Launch(format!("new tab: {e}")))?;
            Ok::<_, ScrapeError>((browser, page, handler))
        })?;

        logd!("Browser: session opened ({})", profile.path().display());
        Ok(Self {
            rt,
            browser: Some(browser),
            page: Some(page),
            handler: Some(handler),
            timeout: factory.timeout,
            _profile: profile,
        })
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| ScrapeError::Navigation(s!("session already closed")))
    }

    fn eval<T: serde::de::DeserializeOwned>(&self, js: &str) -> Result<T> {
        let page = self.page()?;
        let value = self.rt.block_on(async {
            tokio::time::timeout(self.timeout, page.evaluate(js)).await
        });
        value
            .map_err(|_| ScrapeError::Timeout(s!("script evaluation")))?
            .map_err(|e| ScrapeError::Navigation(format!("script evaluation: {e}")))?
            .into_value::<T>()
            .map_err(|e| ScrapeError::Navigation(format!("script result: {e}")))
    }
}

/// JSON-quote for embedding in a script.
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

fn visible_js(selector: &str) -> String {
    format!(
        "(() => {{
            const el = document.querySelector({sel});
            if (!el) return false;
            const st = window.getComputedStyle(el);
            const r = el.getBoundingClientRect();
            return st.display !== 'none' && st.visibility !== 'hidden'
                && st.opacity !== '0' && r.width > 0 && r.height > 0;
        }})()",
        sel = js_str(selector)
    )
}

fn select_js(selector: &str, text: &str) -> String {
    format!(
        "(() => {{
            const s = document.querySelector({sel});
            if (!s) return 'absent';
            const o = Array.from(s.options).find(o => o.text.replace(/\\s+/g, ' ').trim() === {want});
            if (!o) return 'missing';
            s.value = o.value;
            s.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return 'ok';
        }})()",
        sel = js_str(selector),
        want = js_str(text)
    )
}

fn inner_html_js(selector: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({sel}); return el ? [el.innerHTML] : []; }})()",
        sel = js_str(selector)
    )
}

impl RenderedPage for ChromeSession {
    fn goto(&mut self, url: &str) -> Result<()> {
        let page = self.page()?;
        let loaded = self.rt.block_on(async {
            tokio::time::timeout(self.timeout, page.goto(url)).await
        });
        loaded
            .map_err(|_| ScrapeError::Timeout(format!("loading {url}")))?
            .map_err(|e| ScrapeError::Navigation(format!("{url}: {e}")))?;
        Ok(())
    }

    fn is_visible(&mut self, selector: &str) -> Result<bool> {
        self.eval(&visible_js(selector))
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        let page = self.page()?;
        self.rt.block_on(async {
            let el = page
                .find_element(selector)
                .await
                .map_err(|e| ScrapeError::Navigation(format!("{selector} absent: {e}")))?;
            el.click()
                .await
                .map_err(|e| ScrapeError::Navigation(format!("click {selector}: {e}")))?;
            Ok(())
        })
    }

    fn select_by_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let outcome: String = self.eval(&select_js(selector, text))?;
        match outcome.as_str() {
            "ok" => Ok(()),
            "absent" => Err(ScrapeError::Navigation(format!("{selector} absent"))),
            _ => Err(ScrapeError::Navigation(format!("{selector} has no option {text:?}"))),
        }
    }

    fn inner_html(&mut self, selector: &str) -> Result<Option<String>> {
        // A bare null comes back without a value, hence the array.
        let found: Vec<String> = self.eval(&inner_html_js(selector))?;
        Ok(found.into_iter().next())
    }

    fn close(&mut self) -> Result<()> {
        self.page.take();
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        let limit = self.timeout;
        let closed = self.rt.block_on(async {
            let res = match bounded(limit, "close", browser.close()).await {
                Some(Ok(_)) => Ok(()),
                Some(Err(e)) => Err(ScrapeError::Navigation(format!("closing browser: {e}"))),
                None => Err(ScrapeError::Timeout(s!("closing browser"))),
            };

            // A browser that didn't take the close command is still running.
            if res.is_err() {
                if let Some(Some(Err(e))) = bounded(limit, "kill", browser.kill()).await {
                    logw!("Browser: kill failed: {e}");
                }
            }

            match bounded(limit, "exit", browser.wait()).await {
                Some(Ok(status)) => logd!("Browser: exited {status:?}"),
                Some(Err(e)) => logw!("Browser: waiting for exit: {e}"),
                None => {}
            }
            res
        });
        if let Some(h) = self.handler.take() {
            h.abort();
        }
        logd!("Browser: session closed");
        closed
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            logw!("Browser: {e}");
        }
    }
}

/// Await `fut` for at most `limit`. `None` when it ran out.
async fn bounded<F: Future>(limit: Duration, what: &str, fut: F) -> Option<F::Output> {
    match tokio::time::timeout(limit, fut).await {
        Ok(out) => Some(out),
        Err(_) => {
            logw!("Browser: {what} still pending after {limit:?}");
            None
        }
    }
}

/// The CDP socket is gone; nothing further will arrive on the handler.
fn connection_lost(e: &CdpError) -> bool {
    matches!(e, CdpError::Ws(_) | CdpError::Io(_))
}

/* ---------------- Binary lookup ---------------- */

/// Names to look for, every "-dev" channel before any stable one.
pub fn candidate_names() -> Vec<String> {
    let dev = BROWSER_NAMES.iter().map(|n| join!(*n, DEV_CHANNEL_SUFFIX));
    let stable = BROWSER_NAMES.iter().map(|n| s!(*n));
    dev.chain(stable).collect()
}

/// `$CLIMATE_SCRAPE_BROWSER`, else the first candidate found on PATH.
pub fn resolve_browser() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(BROWSER_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(p));
    }
    let path = std::env::var_os("PATH")?;
    let dirs: Vec<PathBuf> = std::env::split_paths(&path).collect();
    resolve_in(&dirs)
}

pub fn resolve_in(dirs: &[PathBuf]) -> Option<PathBuf> {
    candidate_names().iter().find_map(|name| {
        let file = join!(name.as_str(), std::env::consts::EXE_SUFFIX);
        dirs.iter().map(|d| d.join(&file)).find(|p| p.is_file())
    })
}
