// tests/common/mod.rs
//
// A scripted stand-in for the weather site. `FakeSite` describes what the
// pages contain and how they misbehave; `FakeFactory` hands out `FakePage`
// sessions over it and counts opens/closes.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use climate_scrape::config::consts::*;
use climate_scrape::config::options::{Backoff, SiteOptions, WaitOptions};
use climate_scrape::core::{RenderedPage, SessionFactory};
use climate_scrape::error::{Result, ScrapeError};

pub const DISCOVERY: &str = "http://fake.test/brasil";
pub const DETAIL: &str = "http://fake.test/cidade/";

pub fn site_options() -> SiteOptions {
    SiteOptions { discovery_url: DISCOVERY.to_string(), detail_url: DETAIL.to_string() }
}

/// Short waits, no backoff.
pub fn fast_wait() -> WaitOptions {
    WaitOptions {
        timeout: Duration::from_millis(200),
        overlay_hide_timeout: Duration::from_millis(5),
        poll_interval: Duration::from_millis(1),
        max_polls: 20,
        overlay_attempts: 5,
        detail_attempts: 3,
        backoff: Backoff::none(),
    }
}

/// Main container HTML the way the detail page renders it.
pub fn container(min: &str, max: &str, precipitation: &str, day_month: &str) -> String {
    format!(
        r#"<h1>PREVISÃO DE HOJE - Cidade {day_month}</h1>
           <span id="tempMin0">{min}</span><span id="tempMax0">{max}</span>
           <p arial-label="ícone do tempo Manhã">{precipitation}
Manhã</p>"#
    )
}

#[derive(Clone, Default)]
pub struct Detail {
    /// `None`: the page has no main container.
    pub html: Option<String>,
    pub delay: Duration,
    /// Navigation fails this many times before the page loads.
    pub fail_first: usize,
}

#[derive(Default)]
pub struct FakeSite {
    /// Clicks on the close link before the overlay goes away; `None` = no overlay.
    pub overlay_clicks_needed: Option<usize>,
    pub states: Vec<(String, Vec<(String, String)>)>,
    /// City-select reads before the selected state's list appears.
    pub polls_before_cities: usize,
    /// While loading, the city select still shows the previous state's list.
    pub stale_cities: bool,
    pub details: HashMap<String, Detail>,

    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub overlay_clicks: AtomicUsize,
    attempts: Mutex<HashMap<String, usize>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self { overlay_clicks_needed: Some(1), ..Self::default() }
    }

    pub fn state(mut self, name: &str, cities: &[(&str, &str)]) -> Self {
        let cities = cities.iter().map(|(n, id)| (n.to_string(), id.to_string())).collect();
        self.states.push((name.to_string(), cities));
        self
    }

    pub fn detail(mut self, id: &str, html: Option<String>) -> Self {
        self.details.entry(id.to_string()).or_default().html = html;
        self
    }

    pub fn delay(mut self, id: &str, ms: u64) -> Self {
        self.details.entry(id.to_string()).or_default().delay = Duration::from_millis(ms);
        self
    }

    pub fn failing(mut self, id: &str, times: usize) -> Self {
        self.details.entry(id.to_string()).or_default().fail_first = times;
        self
    }

    pub fn attempts(&self, id: &str) -> usize {
        self.attempts.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn bump_attempt(&self, id: &str) -> usize {
        let mut map = self.attempts.lock().unwrap();
        let n = map.entry(id.to_string()).or_insert(0);
        *n += 1;
        *n
    }
}

fn options_html(cities: &[(String, String)]) -> String {
    let mut html = String::from(r#"<option value="">Selecione</option>"#);
    for (name, id) in cities {
        html.push_str(&format!(r#"<option value="{id}">{name}</option>"#));
    }
    html
}

enum Location {
    Blank,
    Discovery,
    Detail(String),
}

pub struct FakePage {
    site: Arc<FakeSite>,
    at: Location,
    overlay_open: bool,
    clicks: usize,
    geo_open: bool,
    selected: Option<usize>,
    previous: Option<usize>,
    polls: usize,
    closed: bool,
}

impl FakePage {
    fn new(site: Arc<FakeSite>) -> Self {
        Self {
            site,
            at: Location::Blank,
            overlay_open: false,
            clicks: 0,
            geo_open: false,
            selected: None,
            previous: None,
            polls: 0,
            closed: false,
        }
    }

    fn city_select(&mut self) -> String {
        let Some(sel) = self.selected else {
            return options_html(&[]);
        };
        let ready = self.polls >= self.site.polls_before_cities;
        self.polls += 1;

        if ready {
            options_html(&self.site.states[sel].1)
        } else {
            match self.previous {
                Some(prev) if self.site.stale_cities => options_html(&self.site.states[prev].1),
                _ => options_html(&[]),
            }
        }
    }
}

impl RenderedPage for FakePage {
    fn goto(&mut self, url: &str) -> Result<()> {
        if url == DISCOVERY {
            self.at = Location::Discovery;
            self.overlay_open = self.site.overlay_clicks_needed.is_some();
            return Ok(());
        }
        let Some(id) = url.strip_prefix(DETAIL) else {
            return Err(ScrapeError::Navigation(format!("no such page {url}")));
        };
        let attempt = self.site.bump_attempt(id);
        let detail = self.site.details.get(id).cloned().unwrap_or_default();
        thread::sleep(detail.delay);
        if attempt <= detail.fail_first {
            return Err(ScrapeError::Navigation(format!("{url}: connection reset")));
        }
        self.at = Location::Detail(id.to_string());
        Ok(())
    }

    fn is_visible(&mut self, selector: &str) -> Result<bool> {
        Ok(match selector {
            SUBSCRIPTION_MODAL | SUBSCRIPTION_CLOSE => self.overlay_open,
            GEOLOCATION_MODAL => self.geo_open,
            _ => false,
        })
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        match selector {
            SUBSCRIPTION_CLOSE if self.overlay_open => {
                self.site.overlay_clicks.fetch_add(1, Ordering::SeqCst);
                self.clicks += 1;
                if Some(self.clicks) >= self.site.overlay_clicks_needed {
                    self.overlay_open = false;
                }
                Ok(())
            }
            GEOLOCATION_BUTTON if !self.overlay_open => {
                self.geo_open = true;
                Ok(())
            }
            other => Err(ScrapeError::Navigation(format!("{other} not clickable"))),
        }
    }

    fn select_by_text(&mut self, selector: &str, text: &str) -> Result<()> {
        if selector != STATE_SELECT || !self.geo_open {
            return Err(ScrapeError::Navigation(format!("{selector} not selectable")));
        }
        let idx = self
            .site
            .states
            .iter()
            .position(|(name, _)| name == text)
            .ok_or_else(|| ScrapeError::Navigation(format!("no option {text}")))?;
        self.previous = self.selected.replace(idx);
        self.polls = 0;
        Ok(())
    }

    fn inner_html(&mut self, selector: &str) -> Result<Option<String>> {
        if matches!(self.at, Location::Discovery) {
            return Ok(match selector {
                STATE_SELECT => {
                    let states: Vec<(String, String)> =
                        self.site.states.iter().map(|(n, _)| (n.clone(), n.clone())).collect();
                    Some(options_html(&states))
                }
                CITY_SELECT => Some(self.city_select()),
                _ => None,
            });
        }
        Ok(match &self.at {
            Location::Detail(id) if selector == MAIN_CONTAINER => {
                self.site.details.get(id).and_then(|d| d.html.clone())
            }
            _ => None,
        })
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.site.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

pub struct FakeFactory {
    pub site: Arc<FakeSite>,
}

impl FakeFactory {
    pub fn new(site: FakeSite) -> Self {
        Self { site: Arc::new(site) }
    }

    /// A bare session, for driving discovery directly.
    pub fn page(&self) -> FakePage {
        self.site.opened.fetch_add(1, Ordering::SeqCst);
        FakePage::new(self.site.clone())
    }
}

impl SessionFactory for FakeFactory {
    fn open(&self) -> Result<Box<dyn RenderedPage>> {
        Ok(Box::new(self.page()))
    }
}
