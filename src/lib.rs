//! Incremental capture pipeline for PLACSP public tender announcements.
//!
//! The pipeline fetches a feed payload (Atom or JSON), normalizes every
//! entry into one canonical [`models::TenderRecord`], persists records
//! exactly-once by `(external_id, source)` into SQLite, and tracks progress
//! with a named checkpoint so later runs fetch only new data.

pub mod capture;
pub mod error;
pub mod feed;
pub mod models;
pub mod normalize;
pub mod store;
