// tests/discovery.rs
mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use climate_scrape::core::browser::with_session;
use climate_scrape::data::EntityDescriptor;
use climate_scrape::error::ScrapeError;
use climate_scrape::specs::cities;

use common::{fast_wait, site_options, FakeFactory, FakeSite};

fn brazil() -> FakeSite {
    FakeSite::new()
        .state("SP", &[("Campinas", "321"), ("Santos", "541")])
        .state("RJ", &[("Niterói", "317")])
}

#[test]
fn lists_every_city_keyed_by_name() {
    let mut site = brazil();
    site.overlay_clicks_needed = Some(2);
    site.polls_before_cities = 3;
    site.stale_cities = true;
    let factory = FakeFactory::new(site);

    let found = with_session(&factory, |page| cities::fetch(page, &site_options(), &fast_wait())).unwrap();

    let names: Vec<&str> = found.keys().map(String::as_str).collect();
    assert_eq!(names, ["Campinas", "Niterói", "Santos"]);
    assert_eq!(found["Niterói"], EntityDescriptor::new("Niterói", "RJ", "317"));
    assert_eq!(found["Santos"].region, "SP");

    assert_eq!(factory.site.overlay_clicks.load(Ordering::SeqCst), 2);
    assert_eq!(factory.site.opened(), 1);
    assert_eq!(factory.site.closed(), 1);
}

#[test]
fn missing_overlay_is_not_an_error() {
    let mut site = brazil();
    site.overlay_clicks_needed = None;
    let factory = FakeFactory::new(site);

    let mut wait = fast_wait();
    wait.timeout = Duration::from_millis(20);

    let found = with_session(&factory, |page| cities::fetch(page, &site_options(), &wait)).unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(factory.site.overlay_clicks.load(Ordering::SeqCst), 0);
}

#[test]
fn overlay_retries_are_bounded() {
    let mut site = brazil();
    site.overlay_clicks_needed = Some(100);
    let factory = FakeFactory::new(site);

    let err = with_session(&factory, |page| cities::fetch(page, &site_options(), &fast_wait())).unwrap_err();

    assert!(matches!(err, ScrapeError::Timeout(_)), "{err:?}");
    assert_eq!(factory.site.overlay_clicks.load(Ordering::SeqCst), 5);
    // The session is released even though discovery failed.
    assert_eq!(factory.site.closed(), 1);
}

#[test]
fn city_polling_is_bounded() {
    let mut site = brazil();
    site.polls_before_cities = 1_000;
    let factory = FakeFactory::new(site);

    let err = with_session(&factory, |page| cities::fetch(page, &site_options(), &fast_wait())).unwrap_err();
    match err {
        ScrapeError::Timeout(msg) => assert!(msg.contains("SP"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn stale_list_is_never_taken_for_the_next_state() {
    let mut site = brazil();
    site.stale_cities = true;
    site.polls_before_cities = 5;
    let factory = FakeFactory::new(site);

    let found = with_session(&factory, |page| cities::fetch(page, &site_options(), &fast_wait())).unwrap();
    let rj: Vec<&str> = found.values().filter(|e| e.region == "RJ").map(|e| e.name.as_str()).collect();
    assert_eq!(rj, ["Niterói"]);
}

#[test]
fn no_states_is_a_navigation_error() {
    let factory = FakeFactory::new(FakeSite::new());
    let err = with_session(&factory, |page| cities::fetch(page, &site_options(), &fast_wait())).unwrap_err();
    assert!(matches!(err, ScrapeError::Navigation(_)), "{err:?}");
}
