//! # Yearbook Common Library
//!
//! Shared code for the yearbook roster service and the photo matcher:
//! - Roster data model (person records, display records, image assets)
//! - Normalizer (raw JSON → display-ready records)
//! - QueryEngine (search, sort, pagination) and its debounced session
//! - Event types (RosterEvent) and EventBus
//! - Configuration loading and validation
//! - Image URL helpers

pub mod config;
pub mod error;
pub mod events;
pub mod image_url;
pub mod model;
pub mod normalizer;
pub mod query;
pub mod sse;

pub use error::{Error, Result};
pub use model::{DisplayRecord, ImageAsset, PersonRecord, PhotoInfo, ProfileField, SortField};
pub use normalizer::normalize;
pub use query::session::QuerySession;
pub use query::{QueryEngine, SortDirection};
