//! Pet list and record flows: home listing, refresh, create, details,
//! edit, lost-status toggle, delete, breed classification.

use crate::commands::{AppContext, photos, require_session};
use crate::models::pet::{NewPetRequest, Pet, PetUpdate};
use anyhow::{Result, bail};
use std::path::PathBuf;
use tracing::warn;

/// The home listing: mirror-first, full remote refresh only when the
/// mirror is empty, then opportunistic photo materialization.
pub async fn home(ctx: &AppContext) -> Result<()> {
    let session = require_session(ctx).await?;

    let mut pets = ctx.store.load().await?;
    if pets.is_empty() {
        pets = ctx.api.fetch_pets_by_user(&session.user_id).await?;
        ctx.store.replace_all(&pets).await?;
    }

    ctx.materializer.materialize_batch(&pets, &ctx.cancel).await;
    // Re-read so freshly recorded photo paths show up.
    let pets = ctx.store.load().await?;

    print_section("My Pets", pets.iter().filter(|p| p.is_pet_mine));
    print_section("Pets I Found", pets.iter().filter(|p| !p.is_pet_mine));
    Ok(())
}

/// Unconditional full re-fetch; the mirror is wholly replaced.
pub async fn refresh(ctx: &AppContext) -> Result<()> {
    let session = require_session(ctx).await?;
    let pets = ctx.api.fetch_pets_by_user(&session.user_id).await?;
    ctx.store.replace_all(&pets).await?;
    println!("Mirror refreshed: {} pets.", pets.len());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn add(
    ctx: &AppContext,
    name: String,
    age: i64,
    breed: String,
    species: String,
    gender: String,
    description: String,
    city: String,
    photo_files: Vec<PathBuf>,
) -> Result<()> {
    let session = require_session(ctx).await?;
    let request = NewPetRequest {
        name,
        age,
        breed,
        species,
        gender,
        description,
        is_lost: false,
        city: city.clone(),
        owner_email: session.email.clone(),
        full_address: city,
    };

    let pet = ctx.api.create_pet(&request).await?;
    println!("Created pet {} ({})", pet.name, pet.id);

    // Warm the server-side classifier; the create flow does not depend on it.
    if let Err(err) = ctx.api.warm_breed_prediction(&pet.id).await {
        warn!("breed prediction warm-up failed for pet {}: {}", pet.id, err);
    }

    // Mirror immediately, without photos.
    ctx.store.upsert_one(&pet).await?;

    if !photo_files.is_empty() {
        photos::add(ctx, pet.id.clone(), photo_files).await?;
    }
    Ok(())
}

pub async fn show(ctx: &AppContext, pet_id: String) -> Result<()> {
    let pet = mirrored_pet(ctx, &pet_id).await?;

    ctx.materializer
        .materialize_all_photos(&pet_id, &ctx.cancel)
        .await;
    let pet = mirrored_pet(ctx, &pet_id).await.unwrap_or(pet);

    println!("{} ({})", pet.name, pet.id);
    println!("  species:     {}", pet.species);
    println!("  breed:       {}", pet.breed);
    println!("  age:         {}", pet.age);
    println!("  gender:      {}", pet.gender);
    println!("  city:        {}", pet.city);
    println!("  description: {}", pet.description);
    println!("  status:      {}", status_label(&pet));
    println!(
        "  mine:        {}",
        if pet.is_pet_mine { "yes" } else { "found by me" }
    );
    for uri in &pet.local_image_uris {
        println!("  photo:       {}", uri);
    }

    // Found pets carry the spot they were reported at.
    if !pet.is_pet_mine {
        match ctx.api.fetch_coordinates(&pet_id).await {
            Ok(coords) => {
                if let Some((lat, lon)) = coords.lat_lon() {
                    println!("  last seen:   {}, {}", lat, lon);
                }
            }
            Err(err) => warn!("could not fetch coordinates for pet {}: {}", pet_id, err),
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn edit(
    ctx: &AppContext,
    pet_id: String,
    name: Option<String>,
    age: Option<i64>,
    breed: Option<String>,
    species: Option<String>,
    gender: Option<String>,
    description: Option<String>,
    city: Option<String>,
) -> Result<()> {
    let pet = mirrored_pet(ctx, &pet_id).await?;

    let mut update = PetUpdate::from_pet(&pet);
    if let Some(name) = name {
        update.name = name;
    }
    if let Some(age) = age {
        update.age = age;
    }
    if let Some(breed) = breed {
        update.breed = breed;
    }
    if let Some(species) = species {
        update.species = species;
    }
    if let Some(gender) = gender {
        update.gender = gender;
    }
    if let Some(description) = description {
        update.description = description;
    }
    if let Some(city) = city {
        update.city = city;
    }

    ctx.api.update_pet(&pet_id, &update).await?;
    ctx.store
        .update_one(&pet_id, |pet| {
            pet.name = update.name.clone();
            pet.age = update.age;
            pet.breed = update.breed.clone();
            pet.species = update.species.clone();
            pet.gender = update.gender.clone();
            pet.description = update.description.clone();
            pet.city = update.city.clone();
        })
        .await?;
    println!("Pet {} updated.", pet_id);
    Ok(())
}

/// Flip the lost flag. The server takes a full-record update here; the
/// mirror is only touched after the remote call succeeds.
pub async fn toggle_lost(ctx: &AppContext, pet_id: String) -> Result<()> {
    let pet = mirrored_pet(ctx, &pet_id).await?;
    let new_status = !pet.is_lost;

    let mut update = PetUpdate::from_pet(&pet);
    update.is_lost = new_status;
    ctx.api.update_pet(&pet_id, &update).await?;

    let updated = ctx
        .store
        .update_one(&pet_id, |pet| pet.is_lost = new_status)
        .await?;
    let pet = updated.unwrap_or(pet);
    println!("{} is now marked {}", pet.name, status_label(&pet));
    Ok(())
}

pub async fn delete(ctx: &AppContext, pet_id: String) -> Result<()> {
    let session = require_session(ctx).await?;
    ctx.api.delete_pet(&pet_id, &session.user_id).await?;
    ctx.store.remove_one(&pet_id).await?;
    println!("Pet {} deleted.", pet_id);
    Ok(())
}

/// "What are my pet's roots" — ranked breed predictions.
pub async fn roots(ctx: &AppContext, pet_id: String) -> Result<()> {
    let classification = ctx.api.classify_breed(&pet_id).await?;
    let predictions = classification.breed_prediction.predictions;
    if predictions.is_empty() {
        println!("No breed prediction available.");
        return Ok(());
    }
    println!("Best guess: {}", predictions[0].breed);
    for guess in &predictions {
        match guess.confidence {
            Some(confidence) => println!("  {} ({:.1}%)", guess.breed, confidence * 100.0),
            None => println!("  {}", guess.breed),
        }
    }
    Ok(())
}

/// Fetch a pet from the mirror, with the app's "not in local storage" error.
async fn mirrored_pet(ctx: &AppContext, pet_id: &str) -> Result<Pet> {
    match ctx.store.get(pet_id).await? {
        Some(pet) => Ok(pet),
        None => bail!(
            "pet {} is not in the local mirror — run `pawtrail home` first",
            pet_id
        ),
    }
}

fn status_label(pet: &Pet) -> &'static str {
    if pet.is_lost { "Lost" } else { "Not Lost" }
}

fn print_section<'a>(title: &str, pets: impl Iterator<Item = &'a Pet>) {
    println!("== {} ==", title);
    let mut empty = true;
    for pet in pets {
        empty = false;
        let photo = pet
            .local_image_uris
            .first()
            .map(String::as_str)
            .unwrap_or("-");
        println!(
            "  {}  {} [{}] {}  photo: {}",
            pet.id,
            pet.name,
            pet.species,
            status_label(pet),
            photo
        );
    }
    if empty {
        println!("  No pets found");
    }
    println!();
}
