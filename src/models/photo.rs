//! Represents remote photo metadata and the photo service payloads.

use serde::Deserialize;

/// One entry from `GET /api/photos/{petId}/photos`.
///
/// The list is ordered; the first element is the pet's canonical photo.
#[derive(Deserialize, Debug, Clone)]
pub struct PhotoMeta {
    #[serde(rename = "_id")]
    pub id: String,
    pub filename: String,
}

/// `POST /api/photos/upload` response: download URLs and the stored
/// filenames, index-aligned with the uploaded files.
#[derive(Deserialize, Debug)]
pub struct UploadResponse {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub filenames: Vec<String>,
}

/// `GET /api/photos/generate-urls/{petId}` — time-limited signed download
/// URLs, expected (but not guaranteed) to align with the metadata list.
#[derive(Deserialize, Debug)]
pub struct SignedUrls {
    #[serde(default)]
    pub image_urls: Vec<String>,
}
