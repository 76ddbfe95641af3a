//! HTTP client for the remote Pet Store API.

mod client;
mod error;

pub use client::{PetStoreClient, PetStoreClientBuilder};
pub use error::{ApiError, ApiResult};
