//! Reqwest-based client for the remote Pet Store.
//!
//! The backend is split across two hosts: the auth host also owns the pet
//! CRUD and photo upload endpoints, while the api host serves listings,
//! photo metadata/URLs, matching, classification, and ad generation. The
//! client takes both base URLs and routes each call to the right one.
//!
//! Idempotent GETs are retried a bounded number of times when the failure
//! is retryable; mutating calls are sent exactly once.

use crate::api::error::{ApiError, ApiResult};
use crate::models::{
    ad::{AdInteraction, AdUpdate, AnalyzeRequest, AnalyzeResponse},
    matching::MatchResponse,
    pet::{
        BreedClassification, CreatedPet, LostPetReport, NewPetRequest, Pet, PetCoordinates,
        PetUpdate,
    },
    photo::{PhotoMeta, SignedUrls, UploadResponse},
    user::{LoginResponse, MessageResponse, ProfileUpdate, RegisterRequest, UserInfo,
        UserInfoResponse},
};
use bytes::Bytes;
use futures::Stream;
use reqwest::{Client, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// Default request timeout. The original app set none and hung forever on
/// dead connections; 30s is the ceiling here.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra attempts for retryable GET failures.
const GET_RETRIES: u32 = 2;

/// Fixed pause between retry attempts.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// HTTP client for the Pet Store backend.
#[derive(Debug, Clone)]
pub struct PetStoreClient {
    http: Client,
    api_base: String,
    auth_base: String,
}

/// Builder for configuring a [`PetStoreClient`].
#[derive(Debug)]
pub struct PetStoreClientBuilder {
    api_base: String,
    auth_base: String,
    timeout: Duration,
    http: Option<Client>,
}

impl PetStoreClientBuilder {
    /// Create a builder with the two backend base URLs.
    pub fn new(api_base: impl Into<String>, auth_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            auth_base: auth_base.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            http: None,
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a preconfigured reqwest client (proxies, TLS, ...).
    pub fn http_client(mut self, client: Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> ApiResult<PetStoreClient> {
        let http = match self.http {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|err| ApiError::Connection(err.to_string()))?,
        };
        Ok(PetStoreClient {
            http,
            api_base: self.api_base,
            auth_base: self.auth_base,
        })
    }
}

impl PetStoreClient {
    /// Create a builder for the two backend hosts.
    pub fn builder(
        api_base: impl Into<String>,
        auth_base: impl Into<String>,
    ) -> PetStoreClientBuilder {
        PetStoreClientBuilder::new(api_base, auth_base)
    }

    // --- auth ---

    /// `POST /auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let url = format!("{}/auth/login", self.auth_base);
        self.post_json(&url, &json!({ "email": email, "password": password }))
            .await
    }

    /// `POST /auth/register`.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<MessageResponse> {
        let url = format!("{}/auth/register", self.auth_base);
        self.post_json(&url, request).await
    }

    /// `GET /auth/user/{userId}`.
    pub async fn fetch_user(&self, user_id: &str) -> ApiResult<UserInfo> {
        let url = format!("{}/auth/user/{}", self.auth_base, user_id);
        let envelope: UserInfoResponse = self.get_json_with_retry(&url).await?;
        Ok(envelope.user_info)
    }

    /// `PUT /auth/update/{userId}` — profile edits and password changes.
    pub async fn update_user(&self, user_id: &str, update: &ProfileUpdate) -> ApiResult<()> {
        let url = format!("{}/auth/update/{}", self.auth_base, user_id);
        let response = self.send(self.http.put(&url).json(update)).await?;
        Self::check(response).await?;
        Ok(())
    }

    // --- pets ---

    /// `POST /api/pets/new` (owned-pet create).
    pub async fn create_pet(&self, request: &NewPetRequest) -> ApiResult<Pet> {
        let url = format!("{}/api/pets/new", self.auth_base);
        let created: CreatedPet = self.post_json(&url, request).await?;
        Ok(created.pet)
    }

    /// `POST /api/pets/new` with the lost-pet report shape.
    pub async fn report_lost_pet(&self, report: &LostPetReport) -> ApiResult<Pet> {
        let url = format!("{}/api/pets/new", self.auth_base);
        let created: CreatedPet = self.post_json(&url, report).await?;
        Ok(created.pet)
    }

    /// `GET /api/pets/user/{userId}/AllpetsById` — the full remote pet list.
    pub async fn fetch_pets_by_user(&self, user_id: &str) -> ApiResult<Vec<Pet>> {
        let url = format!("{}/api/pets/user/{}/AllpetsById", self.api_base, user_id);
        self.get_json_with_retry(&url).await
    }

    /// `PUT /api/pets/{petId}` — full-record update.
    pub async fn update_pet(&self, pet_id: &str, update: &PetUpdate) -> ApiResult<()> {
        let url = format!("{}/api/pets/{}", self.auth_base, pet_id);
        let response = self.send(self.http.put(&url).json(update)).await?;
        Self::check(response).await?;
        Ok(())
    }

    /// `DELETE /api/pets/delete` — the body carries pet id and owner id.
    pub async fn delete_pet(&self, pet_id: &str, owner_id: &str) -> ApiResult<()> {
        let url = format!("{}/api/pets/delete", self.auth_base);
        let body = json!({ "petId": pet_id, "ownerId": owner_id });
        let response = self.send(self.http.delete(&url).json(&body)).await?;
        Self::check(response).await?;
        Ok(())
    }

    /// `GET /api/pets/breed-prediction?petId=` — warms the server-side
    /// classifier after a create. The body is ignored.
    pub async fn warm_breed_prediction(&self, pet_id: &str) -> ApiResult<()> {
        let url = format!(
            "{}/api/pets/breed-prediction?petId={}",
            self.auth_base, pet_id
        );
        let response = self.send(self.http.get(&url)).await?;
        Self::check(response).await?;
        Ok(())
    }

    /// `POST /api/pets/classify/{petId}` — ranked breed predictions.
    pub async fn classify_breed(&self, pet_id: &str) -> ApiResult<BreedClassification> {
        let url = format!("{}/api/pets/classify/{}", self.api_base, pet_id);
        let response = self.send(self.http.post(&url)).await?;
        Self::read_json(Self::check(response).await?).await
    }

    /// `GET /api/pets/coordinates/{petId}` — where a lost pet was reported.
    pub async fn fetch_coordinates(&self, pet_id: &str) -> ApiResult<PetCoordinates> {
        let url = format!("{}/api/pets/coordinates/{}", self.api_base, pet_id);
        self.get_json_with_retry(&url).await
    }

    /// `POST /api/pets/findMatch/{petId}` — run the matcher for a freshly
    /// reported lost pet.
    pub async fn find_matches(&self, pet_id: &str) -> ApiResult<MatchResponse> {
        let url = format!("{}/api/pets/findMatch/{}", self.api_base, pet_id);
        let response = self.send(self.http.post(&url)).await?;
        Self::read_json(Self::check(response).await?).await
    }

    // --- photos ---

    /// `POST /api/photos/upload` — multipart upload of one or more photos
    /// for a pet. `files` pairs an upload filename with the image bytes.
    pub async fn upload_photos(
        &self,
        pet_id: &str,
        files: Vec<(String, Vec<u8>)>,
    ) -> ApiResult<UploadResponse> {
        let url = format!("{}/api/photos/upload", self.auth_base);
        let mut form = multipart::Form::new().text("petId", pet_id.to_string());
        for (filename, bytes) in files {
            let part = multipart::Part::bytes(bytes)
                .file_name(filename)
                .mime_str("image/jpeg")
                .map_err(|err| ApiError::Decode(err.to_string()))?;
            form = form.part("files", part);
        }
        let response = self.send(self.http.post(&url).multipart(form)).await?;
        Self::read_json(Self::check(response).await?).await
    }

    /// `GET /api/photos/{petId}/photos` — ordered photo metadata.
    pub async fn fetch_photo_metadata(&self, pet_id: &str) -> ApiResult<Vec<PhotoMeta>> {
        let url = format!("{}/api/photos/{}/photos", self.api_base, pet_id);
        self.get_json_with_retry(&url).await
    }

    /// `GET /api/photos/generate-urls/{petId}` — signed download URLs.
    pub async fn fetch_photo_urls(&self, pet_id: &str) -> ApiResult<SignedUrls> {
        let url = format!("{}/api/photos/generate-urls/{}", self.api_base, pet_id);
        self.get_json_with_retry(&url).await
    }

    /// `DELETE /api/photos/delete`.
    pub async fn delete_photo(&self, photo_id: &str) -> ApiResult<()> {
        let url = format!("{}/api/photos/delete", self.auth_base);
        let body = json!({ "photoId": photo_id });
        let response = self.send(self.http.delete(&url).json(&body)).await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Open a byte stream for a signed download URL.
    pub async fn download_stream(
        &self,
        url: &str,
    ) -> ApiResult<impl Stream<Item = reqwest::Result<Bytes>> + Send + use<>> {
        let response = self.send(self.http.get(url)).await?;
        Ok(Self::check(response).await?.bytes_stream())
    }

    /// Open a byte stream for `GET /api/photos/{photoId}/download`.
    pub async fn download_photo_by_id(
        &self,
        photo_id: &str,
    ) -> ApiResult<impl Stream<Item = reqwest::Result<Bytes>> + Send + use<>> {
        let url = format!("{}/api/photos/{}/download", self.auth_base, photo_id);
        self.download_stream(&url).await
    }

    // --- ads ---

    /// `POST /api/gpt/analyze` — generate ad text from a stored photo.
    pub async fn generate_ad(&self, request: &AnalyzeRequest) -> ApiResult<AnalyzeResponse> {
        let url = format!("{}/api/gpt/analyze", self.api_base);
        self.post_json(&url, request).await
    }

    /// `GET /api/gpt/interaction?petId=` — the last generated ad.
    pub async fn last_ad(&self, pet_id: &str) -> ApiResult<AdInteraction> {
        let url = format!("{}/api/gpt/interaction?petId={}", self.api_base, pet_id);
        self.get_json_with_retry(&url).await
    }

    /// `PUT /api/gpt/interaction?petId=` — persist an edited ad.
    pub async fn save_ad(&self, pet_id: &str, text: &str) -> ApiResult<()> {
        let url = format!("{}/api/gpt/interaction?petId={}", self.api_base, pet_id);
        let body = AdUpdate {
            response: text.to_string(),
        };
        let response = self.send(self.http.put(&url).json(&body)).await?;
        Self::check(response).await?;
        Ok(())
    }

    // --- plumbing ---

    async fn send(&self, request: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        request
            .send()
            .await
            .map_err(|err| ApiError::Connection(err.to_string()))
    }

    /// Turn non-2xx responses into [`ApiError::Status`].
    async fn check(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.http.post(url).json(body)).await?;
        Self::read_json(Self::check(response).await?).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self.send(self.http.get(url)).await?;
        Self::read_json(Self::check(response).await?).await
    }

    /// GET with a small bounded retry for retryable failures.
    async fn get_json_with_retry<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let mut attempt = 0;
        loop {
            match self.get_json(url).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < GET_RETRIES => {
                    attempt += 1;
                    tracing::debug!("GET {} failed ({}), retry {}", url, err, attempt);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
