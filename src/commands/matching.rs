//! The find-lost-pet flow: report a found pet with a photo and a location,
//! then ask the matcher which registered pets it resembles.

use crate::commands::{AppContext, require_session};
use crate::models::pet::LostPetReport;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;

pub async fn find_lost(
    ctx: &AppContext,
    photo: PathBuf,
    latitude: f64,
    longitude: f64,
) -> Result<()> {
    let session = require_session(ctx).await?;

    let bytes = fs::read(&photo)
        .await
        .with_context(|| format!("reading photo file {}", photo.display()))?;

    // Step 1: create the placeholder lost-pet record (server assigns the id).
    let report = LostPetReport::new(&session.email, latitude, longitude);
    let pet = ctx.api.report_lost_pet(&report).await?;

    // Step 2: attach the photo the matcher will work from.
    ctx.api
        .upload_photos(&pet.id, vec![("photo.jpg".to_string(), bytes)])
        .await?;

    // Step 3: run the matcher.
    let response = ctx.api.find_matches(&pet.id).await?;

    // Mirror the new report so it shows up under "Pets I Found".
    let mirrored = response.new_pet.unwrap_or(pet);
    ctx.store.upsert_one(&mirrored).await?;

    if response.matches.is_empty() {
        println!("No matches found. The pet is now listed under \"Pets I Found\".");
        return Ok(());
    }

    println!("The best matches:");
    for (rank, m) in response.matches.iter().enumerate() {
        println!(
            "  {}. {} [{}] in {}",
            rank + 1,
            m.pet.name,
            m.pet.breed,
            m.pet.city
        );
        println!(
            "     owner: {}  phone: {}  email: {}",
            m.owner.name,
            m.owner.phone.as_deref().unwrap_or("-"),
            m.owner.email.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}
