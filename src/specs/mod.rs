// src/specs/mod.rs
//! # Page specs
//!
//! Each spec knows how to read one remote page through a [`RenderedPage`]:
//! where the ground truth lives in the rendered DOM and how to extract it.
//!
//! ## What lives here
//! - **UI sequencing** for stateful pages (`cities`: overlay, geolocation
//!   modal, dependent selects).
//! - **Scoped extraction** of rendered fragments with `core::html`, plus the
//!   small pure parsers that normalize scraped text (`climate`).
//!
//! ## What does **not** live here
//! - Scheduling, retries and ordering: `scrape`.
//! - Session lifetime: callers open and close sessions (`core::browser::with_session`).
//! - Output formatting: `file` / `csv`.
//!
//! ## Typical call chain
//! ```text
//! runner → specs::cities::fetch()            (one session, sequential)
//!        → scrape::collect_climate()
//!              ↘ worker → specs::climate::fetch()   (one session per unit)
//!        → file::write_export()
//! ```
//!
//! Parsers are testable offline against captured fragments.
//!
//! [`RenderedPage`]: crate::core::RenderedPage
pub mod cities;
pub mod climate;
