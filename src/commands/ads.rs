//! AI ad flows: generate ad text from a pet's photo, recall the last
//! generated ad, and save user edits back.

use crate::commands::{AppContext, require_session};
use crate::models::ad::AnalyzeRequest;
use anyhow::{Result, bail};
use tracing::warn;

pub async fn generate(ctx: &AppContext, pet_id: String) -> Result<()> {
    let session = require_session(ctx).await?;

    let pet_name = match ctx.store.get(&pet_id).await? {
        Some(pet) => pet.name,
        None => pet_id.clone(),
    };

    let metadata = ctx.api.fetch_photo_metadata(&pet_id).await?;
    let Some(photo) = metadata.first() else {
        bail!("pet {} has no photos to build an ad from", pet_id);
    };

    // Pull the analyzed photo into the cache so the user can pair it with
    // the ad; the ad itself does not depend on this.
    match ctx.materializer.download_by_photo_id(&pet_id, photo).await {
        Ok(path) => println!("Photo: {}", path.display()),
        Err(err) => warn!("could not fetch photo {} locally: {}", photo.id, err),
    }

    let request = AnalyzeRequest {
        filename: photo.filename.clone(),
        prompt: format!(
            "Given the photo of a lost pet named {} belonging to {}, please write an ad \
             for the lost pet. The ad should be no more than 4 lines and include a big title.",
            pet_name, session.email
        ),
    };
    let response = ctx.api.generate_ad(&request).await?;
    println!("{}", response.analysis);
    Ok(())
}

pub async fn last(ctx: &AppContext, pet_id: String) -> Result<()> {
    let interaction = ctx.api.last_ad(&pet_id).await?;
    match interaction.response {
        Some(text) => println!("{}", text),
        None => println!("No ad has been generated for this pet yet."),
    }
    Ok(())
}

pub async fn save(ctx: &AppContext, pet_id: String, text: String) -> Result<()> {
    ctx.api.save_ad(&pet_id, &text).await?;
    println!("Ad saved.");
    Ok(())
}
