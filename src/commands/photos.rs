//! Photo upload and deletion flows.

use crate::commands::AppContext;
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tokio::fs;
use tracing::warn;

/// Upload image files for a pet, then pull the stored copies into the
/// local cache so the listing can render them offline.
pub async fn add(ctx: &AppContext, pet_id: String, files: Vec<PathBuf>) -> Result<()> {
    let mut uploads = Vec::with_capacity(files.len());
    for (index, path) in files.iter().enumerate() {
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("reading photo file {}", path.display()))?;
        // Uploads get sequential names, as the app named camera captures.
        uploads.push((format!("pet_{}.jpg", index), bytes));
    }

    let response = ctx.api.upload_photos(&pet_id, uploads).await?;
    println!(
        "Uploaded {} photo(s) for pet {}.",
        response.filenames.len(),
        pet_id
    );

    match ctx
        .materializer
        .cache_uploaded_photos(&pet_id, &response.filenames, &response.urls)
        .await
    {
        Ok(paths) => {
            for path in paths {
                println!("  cached: {}", path.display());
            }
        }
        // The upload succeeded; a failed local cache fill is not fatal.
        Err(err) => warn!("could not cache uploaded photos for pet {}: {}", pet_id, err),
    }
    Ok(())
}

/// Delete one photo remotely and drop its mirror bookkeeping.
pub async fn rm(ctx: &AppContext, pet_id: String, photo_id: String) -> Result<()> {
    let Some(pet) = ctx.store.get(&pet_id).await? else {
        bail!(
            "pet {} is not in the local mirror — run `pawtrail home` first",
            pet_id
        );
    };
    if !pet.photos.iter().any(|id| id == &photo_id) {
        warn!("photo {} is not recorded on mirrored pet {}", photo_id, pet_id);
    }

    ctx.api.delete_photo(&photo_id).await?;

    ctx.store
        .update_one(&pet_id, |pet| {
            if let Some(index) = pet.photos.iter().position(|id| id == &photo_id) {
                pet.photos.remove(index);
                if index < pet.local_image_uris.len() {
                    pet.local_image_uris.remove(index);
                }
            }
        })
        .await?;
    println!("Photo {} deleted.", photo_id);
    Ok(())
}
