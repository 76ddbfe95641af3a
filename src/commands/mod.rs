//! Command handlers — one per user-facing flow.
//!
//! Each handler is thin orchestration: remote call(s), a mirror write to
//! keep the local cache in sync, and printed output. No handler owns
//! algorithmic logic.

pub mod ads;
pub mod auth;
pub mod matching;
pub mod pets;
pub mod photos;
pub mod profile;

use crate::api::PetStoreClient;
use crate::models::user::Session;
use crate::services::{
    materializer::PhotoMaterializer, mirror_store::MirrorStore, session_store::SessionStore,
};
use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

/// Everything a handler needs, built once in `main`.
pub struct AppContext {
    pub api: PetStoreClient,
    pub store: MirrorStore,
    pub sessions: SessionStore,
    pub materializer: PhotoMaterializer,
    /// Cancelled on Ctrl-C; long photo loops stop writing once it fires.
    pub cancel: CancellationToken,
}

/// The persisted session, or a friendly error when nobody is signed in.
pub async fn require_session(ctx: &AppContext) -> Result<Session> {
    ctx.sessions
        .load_session()
        .await?
        .context("not signed in — run `pawtrail login` first")
}
