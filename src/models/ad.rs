//! Represents the AI ad-generation payloads. Transient — the server keeps
//! the last generated ad per pet; nothing is mirrored locally.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/gpt/analyze`.
#[derive(Serialize, Debug, Clone)]
pub struct AnalyzeRequest {
    /// Stored filename of the photo to analyze.
    pub filename: String,
    /// Free-text instruction for the ad writer.
    pub prompt: String,
}

/// `POST /api/gpt/analyze` response.
#[derive(Deserialize, Debug)]
pub struct AnalyzeResponse {
    pub analysis: String,
}

/// `GET /api/gpt/interaction?petId=` — the last ad generated for a pet.
#[derive(Deserialize, Debug)]
pub struct AdInteraction {
    #[serde(default)]
    pub response: Option<String>,
}

/// Body for `PUT /api/gpt/interaction?petId=` (saving an edited ad).
#[derive(Serialize, Debug, Clone)]
pub struct AdUpdate {
    pub response: String,
}
