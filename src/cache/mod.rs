//! Cache module for persisting normalized API data to disk
//!
//! The disk tier of the reader's two-tier cache: it survives restarts and is
//! read synchronously when a screen mounts. The in-memory request cache lives
//! in [`crate::api`].

mod manager;

pub use manager::{LocalCache, LocalRecord, DEFAULT_NAMESPACE};
