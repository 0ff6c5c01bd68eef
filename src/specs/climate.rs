// src/specs/climate.rs
//
// Detail page: today's forecast for one city.
// Columns produced: city_id, state, min_temp, max_temp, precipitation, month

use chrono::NaiveDate;
use scraper::Html;

use crate::config::consts::*;
use crate::config::options::SiteOptions;
use crate::core::browser::RenderedPage;
use crate::core::html::{first_text, text_by_id, text_of_tag_containing};
use crate::core::sanitize::{first_line, last_chars};
use crate::data::{ClimateRecord, EntityDescriptor};
use crate::error::{Result, ScrapeError};
use crate::progress::{scraping_line, Progress};

/// Locale-independent month tokens.
pub const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Announce and fetch one city's record. Not retried here; the scheduler
/// decides, and repeats go through [`fetch_record`] so the line shows once.
pub fn fetch(
    page: &mut dyn RenderedPage,
    site: &SiteOptions,
    entity: &EntityDescriptor,
    index: usize,
    total: usize,
    progress: &dyn Progress,
) -> Result<ClimateRecord> {
    progress.item_started(index, total, entity);
    logd!("{}", scraping_line(index, total, entity));
    fetch_record(page, site, entity)
}

/// Load the detail page and parse it, without progress reporting.
pub fn fetch_record(
    page: &mut dyn RenderedPage,
    site: &SiteOptions,
    entity: &EntityDescriptor,
) -> Result<ClimateRecord> {
    let url = site.detail_url_for(&entity.remote_id);
    page.goto(&url)?;

    let container = page
        .inner_html(MAIN_CONTAINER)?
        .ok_or_else(|| ScrapeError::Extraction(format!("{MAIN_CONTAINER} missing on {url}")))?;

    parse_detail(&container, entity)
}

/// Pull the record fields out of the main container's inner HTML.
pub fn parse_detail(container_html: &str, entity: &EntityDescriptor) -> Result<ClimateRecord> {
    let doc = Html::parse_fragment(container_html);

    let min_temp = text_by_id(&doc, TEMP_MIN_ID).ok_or_else(|| missing(TEMP_MIN_ID))?;
    let max_temp = text_by_id(&doc, TEMP_MAX_ID).ok_or_else(|| missing(TEMP_MAX_ID))?;

    let raw_precipitation = first_text(&doc, MORNING_ICON_CAPTION)?
        .ok_or_else(|| missing("morning icon caption"))?;

    // The site's own date, in case it runs on a different offset than we do.
    let raw_date = text_of_tag_containing(&doc, TODAY_HEADING_TAG, TODAY_HEADING_TEXT)?
        .ok_or_else(|| missing("today's forecast heading"))?;

    Ok(ClimateRecord {
        entity_id: entity.remote_id.clone(),
        region: entity.region.clone(),
        min_temp,
        max_temp,
        precipitation: parse_precipitation(&raw_precipitation),
        month: parse_month(&raw_date)?,
    })
}

fn missing(what: &str) -> ScrapeError {
    ScrapeError::Extraction(format!("{what} not found"))
}

/// First line of the caption with the unit appended.
/// "12 mm\nManhã" → "12 mm", "5" → "5 mm"
pub fn parse_precipitation(raw: &str) -> String {
    let line = first_line(raw);
    if line.ends_with(PRECIPITATION_UNIT) {
        s!(line)
    } else {
        format!("{line} {PRECIPITATION_UNIT}")
    }
}

/// Trailing `dd/mm` of the heading → abbreviated month name.
/// "PREVISÃO DE HOJE 25/03" → "Mar"
pub fn parse_month(raw: &str) -> Result<String> {
    let segment = last_chars(raw, 5);
    let bad = || ScrapeError::Extraction(format!("no dd/mm date in {raw:?}"));

    let (d, m) = segment.split_once('/').ok_or_else(bad)?;
    let day: u32 = d.trim().parse().map_err(|_| bad())?;
    let month: u32 = m.trim().parse().map_err(|_| bad())?;

    // Leap year, so 29/02 passes.
    NaiveDate::from_ymd_opt(2000, month, day).ok_or_else(bad)?;
    Ok(s!(MONTH_ABBR[(month - 1) as usize]))
}
