//! src/services/materializer.rs
//!
//! PhotoMaterializer — makes remote pet photos available as local files.
//! Downloads go to `photo_dir/{shard}/{shard}/{filename}` (two-level md5
//! sharding keeps per-directory file counts down) via a temp file and an
//! atomic rename, and the resulting path is recorded on the mirrored pet.
//!
//! Materialization is best-effort by contract: a listing must render even
//! when a photo cannot be fetched, so the public entry points swallow
//! failures after logging them. Nothing is recorded on failure, which makes
//! the next call retry the whole sequence.

use crate::api::{ApiError, PetStoreClient};
use crate::models::{pet::Pet, photo::PhotoMeta};
use crate::services::mirror_store::{MirrorStore, StoreError};
use bytes::Bytes;
use futures::{Stream, StreamExt, pin_mut};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

const MAX_FILENAME_LEN: usize = 255;

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("unsafe photo filename `{0}`")]
    InvalidFilename(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type MaterializeResult<T> = Result<T, MaterializeError>;

/// Downloads remote photos into the local cache and records their paths on
/// the mirrored pet records.
#[derive(Clone)]
pub struct PhotoMaterializer {
    api: PetStoreClient,
    store: MirrorStore,
    /// Root directory of the photo cache.
    photo_dir: PathBuf,
}

impl PhotoMaterializer {
    pub fn new(api: PetStoreClient, store: MirrorStore, photo_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            store,
            photo_dir: photo_dir.into(),
        }
    }

    /// Ensure the pet's first photo exists locally; best-effort.
    ///
    /// Returns the cached path without touching the network when the
    /// mirrored record already points at a file on disk. On any failure the
    /// error is logged and `None` is returned — the caller renders without
    /// an image and a later call retries from scratch.
    pub async fn materialize_first_photo(
        &self,
        pet_id: &str,
        cancel: &CancellationToken,
    ) -> Option<PathBuf> {
        match self.try_materialize_first(pet_id, cancel).await {
            Ok(path) => path,
            Err(err) => {
                warn!("could not materialize photo for pet {}: {}", pet_id, err);
                None
            }
        }
    }

    /// Ensure every photo of the pet exists locally; best-effort.
    ///
    /// Used by the detail view. Photos are fetched sequentially; the first
    /// failure stops the loop and whatever was downloaded is recorded.
    pub async fn materialize_all_photos(
        &self,
        pet_id: &str,
        cancel: &CancellationToken,
    ) -> Vec<PathBuf> {
        match self.try_materialize_all(pet_id, cancel).await {
            Ok(paths) => paths,
            Err(err) => {
                warn!("could not materialize photos for pet {}: {}", pet_id, err);
                Vec::new()
            }
        }
    }

    /// Materialize the first photo of each pet, strictly sequentially.
    /// Returns how many pets ended up with a local photo. Checks `cancel`
    /// before starting each pet so an abandoned flow stops writing.
    pub async fn materialize_batch(&self, pets: &[Pet], cancel: &CancellationToken) -> usize {
        let mut materialized = 0;
        for pet in pets {
            if cancel.is_cancelled() {
                debug!("batch materialization cancelled after {} pets", materialized);
                break;
            }
            if self.materialize_first_photo(&pet.id, cancel).await.is_some() {
                materialized += 1;
            }
        }
        materialized
    }

    /// Download one specific photo by its remote id into the cache.
    ///
    /// Unlike the listing paths this is not best-effort: the ad flow needs
    /// the photo and reports the failure to the user.
    pub async fn download_by_photo_id(
        &self,
        pet_id: &str,
        photo: &PhotoMeta,
    ) -> MaterializeResult<PathBuf> {
        ensure_filename_safe(&photo.filename)?;
        let dest = self.photo_path(pet_id, &photo.filename);
        if fs::try_exists(&dest).await.unwrap_or(false) {
            return Ok(dest);
        }
        let stream = self.api.download_photo_by_id(&photo.id).await?;
        self.write_stream_to(stream, &dest).await?;
        Ok(dest)
    }

    /// Cache photos that were just uploaded. The upload response pairs
    /// signed URLs with the filenames the server stored; download each pair
    /// and append the local paths to the mirrored record.
    pub async fn cache_uploaded_photos(
        &self,
        pet_id: &str,
        filenames: &[String],
        urls: &[String],
    ) -> MaterializeResult<Vec<PathBuf>> {
        if filenames.len() != urls.len() {
            warn!(
                "pet {}: upload returned {} filenames but {} URLs, pairing up to the shorter list",
                pet_id,
                filenames.len(),
                urls.len()
            );
        }
        let mut paths = Vec::new();
        for (filename, url) in filenames.iter().zip(urls) {
            ensure_filename_safe(filename)?;
            let dest = self.photo_path(pet_id, filename);
            let stream = self.api.download_stream(url).await?;
            self.write_stream_to(stream, &dest).await?;
            paths.push(dest);
        }
        if !paths.is_empty() {
            let recorded: Vec<String> = paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            self.store
                .update_one(pet_id, |pet| pet.local_image_uris.extend(recorded))
                .await?;
        }
        Ok(paths)
    }

    async fn try_materialize_first(
        &self,
        pet_id: &str,
        cancel: &CancellationToken,
    ) -> MaterializeResult<Option<PathBuf>> {
        // Not mirrored -> nothing to hang a local path on.
        let Some(pet) = self.store.get(pet_id).await? else {
            debug!("pet {} is not mirrored, skipping materialization", pet_id);
            return Ok(None);
        };

        if let Some(existing) = self.cached_first_path(&pet).await {
            debug!("photo for pet {} already cached at {}", pet_id, existing.display());
            return Ok(Some(existing));
        }

        let metadata = self.api.fetch_photo_metadata(pet_id).await?;
        let urls = self.api.fetch_photo_urls(pet_id).await?;
        let pairs = pair_photos(&metadata, &urls.image_urls, pet_id);
        let Some((meta, url)) = pairs.into_iter().next() else {
            return Ok(None);
        };

        ensure_filename_safe(&meta.filename)?;
        let dest = self.photo_path(pet_id, &meta.filename);
        let stream = self.api.download_stream(url).await?;
        self.write_stream_to(stream, &dest).await?;

        if cancel.is_cancelled() {
            debug!("flow abandoned, not recording photo for pet {}", pet_id);
            return Ok(None);
        }

        let recorded = dest.to_string_lossy().into_owned();
        self.store
            .update_one(pet_id, |pet| {
                if pet.local_image_uris.is_empty() {
                    pet.local_image_uris.push(recorded.clone());
                } else {
                    pet.local_image_uris[0] = recorded.clone();
                }
            })
            .await?;
        Ok(Some(dest))
    }

    async fn try_materialize_all(
        &self,
        pet_id: &str,
        cancel: &CancellationToken,
    ) -> MaterializeResult<Vec<PathBuf>> {
        if self.store.get(pet_id).await?.is_none() {
            return Ok(Vec::new());
        }

        let metadata = self.api.fetch_photo_metadata(pet_id).await?;
        let urls = self.api.fetch_photo_urls(pet_id).await?;

        let mut paths = Vec::new();
        for (meta, url) in pair_photos(&metadata, &urls.image_urls, pet_id) {
            if cancel.is_cancelled() {
                break;
            }
            ensure_filename_safe(&meta.filename)?;
            let dest = self.photo_path(pet_id, &meta.filename);
            if !fs::try_exists(&dest).await.unwrap_or(false) {
                let stream = self.api.download_stream(url).await?;
                self.write_stream_to(stream, &dest).await?;
            }
            paths.push(dest);
        }

        if !paths.is_empty() && !cancel.is_cancelled() {
            let recorded: Vec<String> = paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            self.store
                .update_one(pet_id, |pet| pet.local_image_uris = recorded)
                .await?;
        }
        Ok(paths)
    }

    /// The first recorded local path, but only if the file is still there.
    async fn cached_first_path(&self, pet: &Pet) -> Option<PathBuf> {
        let first = pet.local_image_uris.first()?;
        let path = PathBuf::from(first);
        match fs::try_exists(&path).await {
            Ok(true) => Some(path),
            _ => None,
        }
    }

    /// `photo_dir/{shard}/{shard}/{filename}`, shards from md5 of
    /// `pet_id/filename`.
    fn photo_path(&self, pet_id: &str, filename: &str) -> PathBuf {
        let digest = md5::compute(format!("{}/{}", pet_id, filename));
        let mut path = self.photo_dir.clone();
        path.push(format!("{:02x}", digest[0]));
        path.push(format!("{:02x}", digest[1]));
        path.push(filename);
        path
    }

    /// Stream bytes to a temp file next to `dest`, fsync, then rename into
    /// place. Cleans up the temp file on any failure.
    async fn write_stream_to<S>(&self, stream: S, dest: &Path) -> MaterializeResult<()>
    where
        S: Stream<Item = reqwest::Result<Bytes>>,
    {
        let parent = dest.parent().map(Path::to_path_buf).ok_or_else(|| {
            MaterializeError::Io(io::Error::new(
                ErrorKind::Other,
                "photo path missing parent directory",
            ))
        })?;
        fs::create_dir_all(&parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;

        pin_mut!(stream);
        while let Some(chunk_res) = stream.next().await {
            let chunk = match chunk_res {
                Ok(chunk) => chunk,
                Err(err) => {
                    let _ = fs::remove_file(&tmp_path).await;
                    return Err(ApiError::Connection(err.to_string()).into());
                }
            };
            if let Err(err) = file.write_all(&chunk).await {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(err.into());
            }
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }

        if let Err(err) = fs::rename(&tmp_path, dest).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(dest).await?;
                fs::rename(&tmp_path, dest).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(err.into());
            }
        }
        Ok(())
    }
}

/// Pair photo metadata with signed URLs by index.
///
/// The two lists come from separate endpoints and the backend gives no
/// guarantee they agree; pair up to the shorter one and say so when they
/// disagree.
fn pair_photos<'a>(
    metadata: &'a [PhotoMeta],
    urls: &'a [String],
    pet_id: &str,
) -> Vec<(&'a PhotoMeta, &'a str)> {
    if metadata.len() != urls.len() {
        warn!(
            "pet {}: {} photo metadata entries but {} signed URLs, pairing up to the shorter list",
            pet_id,
            metadata.len(),
            urls.len()
        );
    }
    metadata
        .iter()
        .zip(urls.iter().map(String::as_str))
        .collect()
}

/// Reject filenames that would escape the cache directory. Signed filenames
/// come from the server, but they still end up in local paths.
fn ensure_filename_safe(filename: &str) -> MaterializeResult<()> {
    if filename.is_empty()
        || filename.len() > MAX_FILENAME_LEN
        || filename.starts_with('/')
        || filename.contains("..")
        || filename
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
    {
        return Err(MaterializeError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: &str, filename: &str) -> PhotoMeta {
        PhotoMeta {
            id: id.to_string(),
            filename: filename.to_string(),
        }
    }

    #[test]
    fn pairing_uses_shorter_list() {
        let metadata = vec![meta("a", "a.jpg"), meta("b", "b.jpg")];
        let urls = vec!["https://cdn/a".to_string()];
        let pairs = pair_photos(&metadata, &urls, "pet-1");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.filename, "a.jpg");
        assert_eq!(pairs[0].1, "https://cdn/a");

        let pairs = pair_photos(&metadata[..0], &urls, "pet-1");
        assert!(pairs.is_empty());
    }

    #[test]
    fn rejects_traversal_filenames() {
        assert!(ensure_filename_safe("photo.jpg").is_ok());
        assert!(ensure_filename_safe("pet_0.jpg").is_ok());
        assert!(ensure_filename_safe("").is_err());
        assert!(ensure_filename_safe("../etc/passwd").is_err());
        assert!(ensure_filename_safe("/abs.jpg").is_err());
        assert!(ensure_filename_safe("a\\b.jpg").is_err());
    }
}
