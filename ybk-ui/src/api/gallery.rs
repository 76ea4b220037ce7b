//! Class photo gallery endpoints

use axum::{
    extract::{Path, Query},
    Json,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::gallery::{photo_by_id, photos_by_category, ClassPhoto};

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    pub category: Option<String>,
}

/// GET /api/gallery?category=event
pub async fn list_gallery(Query(query): Query<GalleryQuery>) -> Json<Vec<&'static ClassPhoto>> {
    Json(photos_by_category(query.category.as_deref()))
}

/// GET /api/gallery/:id
pub async fn get_gallery_photo(Path(id): Path<String>) -> ApiResult<Json<&'static ClassPhoto>> {
    photo_by_id(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Class photo {}", id)))
}
