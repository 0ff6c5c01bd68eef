// src/core/mod.rs

pub mod browser;
pub mod chrome;
pub mod html;
pub mod sanitize;

pub use browser::{RenderedPage, SessionFactory};
