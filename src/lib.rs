//! Bold East Africa reader library
//!
//! The fetch cache layer, persistent cache, revalidating screens and content
//! transform behind the `boldeast` terminal reader.

pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod content;
pub mod data;
pub mod logging;
pub mod screens;
pub mod ui;
