// src/config/consts.rs

// Site
pub const DISCOVERY_URL: &str = "https://www.climatempo.com.br/brasil";
pub const DETAIL_URL: &str = "https://www.climatempo.com.br/previsao-do-tempo/cidade/";

// Discovery page selectors
pub const SUBSCRIPTION_MODAL: &str = r#"div#modal-subscribe[role="dialog"]"#;
pub const SUBSCRIPTION_CLOSE: &str = "a#closeButton.modal-color-climatempo";
pub const GEOLOCATION_BUTTON: &str = "h1#momento-localidade";
pub const GEOLOCATION_MODAL: &str = "div#geolocation.modal.modal-geo.open";
pub const STATE_SELECT: &str = "select#sel-state-geo.slt-geo";
pub const CITY_SELECT: &str = "select#sel-city-geo.slt-geo";

// Detail page selectors
pub const MAIN_CONTAINER: &str = "div#mainContent";
pub const TEMP_MIN_ID: &str = "tempMin0";
pub const TEMP_MAX_ID: &str = "tempMax0";
pub const MORNING_ICON_CAPTION: &str = r#"p[arial-label="ícone do tempo Manhã"]"#;
pub const TODAY_HEADING_TAG: &str = "h1";
pub const TODAY_HEADING_TEXT: &str = "PREVISÃO DE HOJE";
pub const PRECIPITATION_UNIT: &str = "mm";

// Waits
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const POLL_INTERVAL_MS: u64 = 300;
pub const MAX_POLLS: u32 = 100;
pub const OVERLAY_ATTEMPTS: u32 = 5;
pub const OVERLAY_HIDE_TIMEOUT_SECS: u64 = 5;

// Retry (detail units)
pub const DETAIL_ATTEMPTS: u32 = 3;
pub const BACKOFF_BASE_MS: u64 = 500;
pub const BACKOFF_MAX_MS: u64 = 8_000;
pub const JITTER_MS: u64 = 50;

// Browser lookup, "-dev" channels first
pub const BROWSER_ENV: &str = "CLIMATE_SCRAPE_BROWSER";
pub const BROWSER_NAMES: &[&str] = &["google-chrome", "chromium", "chromium-browser", "chrome"];
pub const DEV_CHANNEL_SUFFIX: &str = "-dev";

// Export
pub const DEFAULT_FILE: &str = "export.csv";
pub const COLUMNS: &[&str] = &["city_id", "state", "min_temp", "max_temp", "precipitation", "month"];
