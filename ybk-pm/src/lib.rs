//! ybk-pm library - photo matcher
//!
//! Offline batch job: lists profile photos on the image host, pairs them with
//! roster entries by student id, and rewrites the roster JSON after backing
//! it up.

pub mod batch;
pub mod error;
pub mod image_host;
pub mod listing;
pub mod mapping;
pub mod matcher;
pub mod report;
pub mod roster_file;

pub use batch::{run_apply_mapping, run_update, MappingOptions, RunOutcome, UpdateOptions};
pub use error::{BatchError, Result};
pub use image_host::{AssetListing, CloudinaryClient};
pub use matcher::match_photos;
pub use report::{MatchOutcome, MatchReport, PersonOutcome, PhotoTotals};
