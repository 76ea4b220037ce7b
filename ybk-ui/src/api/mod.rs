//! HTTP API handlers for ybk-ui

pub mod config;
pub mod gallery;
pub mod health;
pub mod profiles;
pub mod sse;

pub use config::get_config;
pub use gallery::{get_gallery_photo, list_gallery};
pub use health::health_routes;
pub use profiles::{
    clear_search, get_profile, get_profiles, go_to_page, load_profiles, next_page, prev_page,
    set_search, set_sorting, toggle_sort,
};
pub use sse::event_stream;
