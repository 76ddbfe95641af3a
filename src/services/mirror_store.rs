//! src/services/mirror_store.rs
//!
//! MirrorStore — the local mirror of the user's pet list, backed by SQLite.
//! The remote Pet Store owns the data; this store is a disposable cache that
//! may be stale or incomplete. Records are keyed by pet id and mutated
//! row-by-row, so two in-flight flows can each touch their own pet without
//! clobbering the whole list.

use crate::models::pet::Pet;
use chrono::Utc;
use sqlx::{
    FromRow, Sqlite, SqlitePool,
    query::Query,
    sqlite::SqliteArguments,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Columns selected for every pet read, in `PetRow` order.
const PET_COLUMNS: &str = "id, name, age, breed, species, gender, description, city, \
     is_lost, is_pet_mine, photos, local_image_uris";

/// Insert-or-replace keyed by pet id. Last write wins per row.
const UPSERT_SQL: &str = "\
    INSERT INTO pets (id, name, age, breed, species, gender, description, city, \
                      is_lost, is_pet_mine, photos, local_image_uris, synced_at) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
    ON CONFLICT(id) DO UPDATE SET \
        name = excluded.name, \
        age = excluded.age, \
        breed = excluded.breed, \
        species = excluded.species, \
        gender = excluded.gender, \
        description = excluded.description, \
        city = excluded.city, \
        is_lost = excluded.is_lost, \
        is_pet_mine = excluded.is_pet_mine, \
        photos = excluded.photos, \
        local_image_uris = excluded.local_image_uris, \
        synced_at = excluded.synced_at";

/// Raw row shape: the two list fields live in JSON-encoded TEXT columns.
#[derive(FromRow)]
struct PetRow {
    id: String,
    name: String,
    age: i64,
    breed: String,
    species: String,
    gender: String,
    description: String,
    city: String,
    is_lost: bool,
    is_pet_mine: bool,
    photos: String,
    local_image_uris: String,
}

impl PetRow {
    fn into_pet(self) -> StoreResult<Pet> {
        Ok(Pet {
            photos: serde_json::from_str(&self.photos)?,
            local_image_uris: serde_json::from_str(&self.local_image_uris)?,
            id: self.id,
            name: self.name,
            age: self.age,
            breed: self.breed,
            species: self.species,
            gender: self.gender,
            description: self.description,
            city: self.city,
            is_lost: self.is_lost,
            is_pet_mine: self.is_pet_mine,
        })
    }
}

/// Local mirror of the user's pets.
#[derive(Clone)]
pub struct MirrorStore {
    /// Shared SQLite connection pool.
    db: Arc<SqlitePool>,
}

impl MirrorStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// All mirrored pets, in insertion order. Empty when the mirror has
    /// never been populated — callers treat that as "full refresh needed".
    pub async fn load(&self) -> StoreResult<Vec<Pet>> {
        let rows: Vec<PetRow> =
            sqlx::query_as(&format!("SELECT {} FROM pets ORDER BY rowid", PET_COLUMNS))
                .fetch_all(&*self.db)
                .await?;
        rows.into_iter().map(PetRow::into_pet).collect()
    }

    /// A single mirrored pet, or `None` when the id is not cached locally.
    pub async fn get(&self, pet_id: &str) -> StoreResult<Option<Pet>> {
        let row: Option<PetRow> =
            sqlx::query_as(&format!("SELECT {} FROM pets WHERE id = ?", PET_COLUMNS))
                .bind(pet_id)
                .fetch_optional(&*self.db)
                .await?;
        row.map(PetRow::into_pet).transpose()
    }

    /// Replace the entire mirror with `pets` (full remote re-fetch).
    /// Runs in one transaction so readers never observe a half-swapped list.
    pub async fn replace_all(&self, pets: &[Pet]) -> StoreResult<()> {
        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM pets").execute(&mut *tx).await?;
        for pet in pets {
            upsert_query(pet)?.execute(&mut *tx).await?;
        }
        tx.commit().await?;
        debug!("mirror replaced with {} pets", pets.len());
        Ok(())
    }

    /// Insert `pet`, or overwrite the record with the same id.
    pub async fn upsert_one(&self, pet: &Pet) -> StoreResult<()> {
        upsert_query(pet)?.execute(&*self.db).await?;
        Ok(())
    }

    /// Drop the record with `pet_id`. Removing an absent id is a no-op.
    pub async fn remove_one(&self, pet_id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM pets WHERE id = ?")
            .bind(pet_id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            debug!("remove_one: pet {} was not mirrored", pet_id);
        }
        Ok(())
    }

    /// Transactional read-modify-write of a single record.
    ///
    /// `apply` sees the current mirrored state and mutates it in place; the
    /// result is written back before the transaction commits. Returns the
    /// updated record, or `None` when the id is not mirrored.
    pub async fn update_one<F>(&self, pet_id: &str, apply: F) -> StoreResult<Option<Pet>>
    where
        F: FnOnce(&mut Pet),
    {
        let mut tx = self.db.begin().await?;
        let row: Option<PetRow> =
            sqlx::query_as(&format!("SELECT {} FROM pets WHERE id = ?", PET_COLUMNS))
                .bind(pet_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut pet = row.into_pet()?;
        apply(&mut pet);
        upsert_query(&pet)?.execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(Some(pet))
    }

    /// Wipe the mirror (logout).
    pub async fn clear(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM pets").execute(&*self.db).await?;
        Ok(())
    }
}

/// Build the upsert with all fields bound. List fields are serialized to
/// JSON text here; `synced_at` is stamped with the current time.
fn upsert_query(pet: &Pet) -> StoreResult<Query<'static, Sqlite, SqliteArguments<'static>>> {
    let photos = serde_json::to_string(&pet.photos)?;
    let local_image_uris = serde_json::to_string(&pet.local_image_uris)?;
    Ok(sqlx::query(UPSERT_SQL)
        .bind(pet.id.clone())
        .bind(pet.name.clone())
        .bind(pet.age)
        .bind(pet.breed.clone())
        .bind(pet.species.clone())
        .bind(pet.gender.clone())
        .bind(pet.description.clone())
        .bind(pet.city.clone())
        .bind(pet.is_lost)
        .bind(pet.is_pet_mine)
        .bind(photos)
        .bind(local_image_uris)
        .bind(Utc::now()))
}
