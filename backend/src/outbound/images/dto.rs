//! Wire DTOs for the Unsplash search payload.

use serde::Deserialize;

use crate::domain::{ImageSearchPage, PhotoRecord};

/// Top-level search response.
#[derive(Debug, Deserialize)]
pub(crate) struct UnsplashSearchDto {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub total_pages: i64,
    #[serde(default)]
    pub results: Vec<UnsplashPhotoDto>,
}

/// One photo entry; the payload carries many more fields than this slice.
#[derive(Debug, Deserialize)]
pub(crate) struct UnsplashPhotoDto {
    pub id: String,
    pub urls: UnsplashUrlsDto,
    pub description: Option<String>,
    pub alt_description: Option<String>,
    #[serde(default)]
    pub likes: i64,
    pub downloads: Option<i64>,
}

/// Size-keyed image URLs.
#[derive(Debug, Deserialize)]
pub(crate) struct UnsplashUrlsDto {
    pub regular: String,
}

impl From<UnsplashSearchDto> for ImageSearchPage {
    fn from(dto: UnsplashSearchDto) -> Self {
        Self {
            total: dto.total,
            total_pages: dto.total_pages,
            results: dto.results.into_iter().map(PhotoRecord::from).collect(),
        }
    }
}

impl From<UnsplashPhotoDto> for PhotoRecord {
    fn from(dto: UnsplashPhotoDto) -> Self {
        Self {
            id: dto.id,
            url: dto.urls.regular,
            // The curated caption is often null; the accessibility text is
            // the usual stand-in.
            description: dto.description.or(dto.alt_description),
            likes: dto.likes,
            downloads: dto.downloads,
        }
    }
}
