// src/specs/cities.rs
//
// Discovery: walk the geolocation modal of the discovery page and list every
// (state, city) pair with the site's city id.
//
// Page flow:
//   1. a subscription overlay grabs focus right after load; close it
//   2. the per-state city list hides behind a button that opens a modal
//   3. selecting a state fills the city <select> asynchronously
//
// No shared state: the map is built locally and returned.

use std::thread;

use crate::config::consts::*;
use crate::config::options::{SiteOptions, WaitOptions};
use crate::core::browser::{wait_hidden, wait_visible, RenderedPage};
use crate::core::html::{parse_options, populated_options, SelectOption};
use crate::data::{Discovered, EntityDescriptor};
use crate::error::{Result, ScrapeError};

/// Enumerate all cities. The caller owns (and closes) the session.
pub fn fetch(page: &mut dyn RenderedPage, site: &SiteOptions, wait: &WaitOptions) -> Result<Discovered> {
    page.goto(&site.discovery_url)?;

    close_subscription_overlay(page, wait)?;
    open_geolocation_modal(page, wait)?;

    // Both selects are visible from here on.
    parse_states(page, wait)
}

fn close_subscription_overlay(page: &mut dyn RenderedPage, wait: &WaitOptions) -> Result<()> {
    match wait_visible(page, SUBSCRIPTION_MODAL, wait.timeout, wait.poll_interval) {
        Ok(()) => {}
        Err(ScrapeError::Timeout(_)) => {
            logw!("Discovery: subscription overlay never showed up; continuing");
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    // Another layer sometimes sits over the close link right after load.
    wait_visible(page, SUBSCRIPTION_CLOSE, wait.timeout, wait.poll_interval)?;

    let attempts = wait.overlay_attempts;
    for attempt in 1..=attempts {
        let outcome = match page.click(SUBSCRIPTION_CLOSE) {
            Ok(()) => wait_hidden(page, SUBSCRIPTION_MODAL, wait.overlay_hide_timeout, wait.poll_interval),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                logd!("Discovery: overlay closed on attempt {attempt}");
                return Ok(());
            }
            Err(e) if e.is_transient() => {
                logw!("Discovery: overlay close attempt {attempt}/{attempts}: {e}");
                if attempt < attempts {
                    thread::sleep(wait.backoff.delay(attempt, u64::from(attempt)));
                }
            }
            Err(e) => return Err(e),
        }
    }

    Err(ScrapeError::Timeout(format!(
        "subscription overlay still open after {attempts} attempts"
    )))
}

fn open_geolocation_modal(page: &mut dyn RenderedPage, wait: &WaitOptions) -> Result<()> {
    page.click(GEOLOCATION_BUTTON)?;
    wait_visible(page, GEOLOCATION_MODAL, wait.timeout, wait.poll_interval)
}

fn parse_states(page: &mut dyn RenderedPage, wait: &WaitOptions) -> Result<Discovered> {
    let states_html = page
        .inner_html(STATE_SELECT)?
        .ok_or_else(|| ScrapeError::Navigation(format!("{STATE_SELECT} absent")))?;

    let states = populated_options(&states_html);
    if states.is_empty() {
        return Err(ScrapeError::Navigation(s!("state list is empty")));
    }
    logd!("Discovery: {} states", states.len());

    let mut found = Discovered::new();
    let mut previous: Vec<SelectOption> = Vec::new();

    for state in &states {
        page.select_by_text(STATE_SELECT, &state.text)?;
        let cities = wait_for_cities(page, wait, &state.text, &previous)?;
        logd!("Discovery: {} → {} cities", state.text, cities.len());
        add_cities(&mut found, &state.text, &cities);
        previous = cities;
    }

    Ok(found)
}

/// Poll the city select until it holds more than a placeholder and no longer
/// shows the previous state's list. There is no DOM event to wait on.
fn wait_for_cities(
    page: &mut dyn RenderedPage,
    wait: &WaitOptions,
    state: &str,
    previous: &[SelectOption],
) -> Result<Vec<SelectOption>> {
    for _ in 0..wait.max_polls {
        let inner = page.inner_html(CITY_SELECT)?.unwrap_or_default();
        let options = parse_options(&inner);

        if options.len() > 1 {
            let cities: Vec<SelectOption> = options.into_iter().filter(|o| !o.is_placeholder()).collect();
            if !cities.is_empty() && cities.as_slice() != previous {
                return Ok(cities);
            }
        }
        thread::sleep(wait.poll_interval);
    }

    Err(ScrapeError::Timeout(format!(
        "cities of {state} not populated after {} polls",
        wait.max_polls
    )))
}

/// Insert one state's cities, keyed by name. A name seen under another state is replaced.
fn add_cities(found: &mut Discovered, state: &str, cities: &[SelectOption]) {
    for city in cities {
        let entity = EntityDescriptor::new(city.text.as_str(), state, city.value.as_str());
        if let Some(prev) = found.insert(city.text.clone(), entity) {
            if prev.region != state {
                logw!(
                    "Discovery: \"{}\" listed under {} and {}; keeping {}",
                    city.text, prev.region, state, state
                );
            }
        }
    }
}
