//! Represents a pet record — the unit of data this client mirrors locally.

use serde::{Deserialize, Serialize};

/// A pet record as the remote Pet Store returns it.
///
/// The server assigns `_id`; the client never mints identifiers. The
/// `local_image_uris` list is client-side only: paths of photos that have
/// been downloaded into the local cache. An empty list means "not
/// materialized yet", not "no remote photo exists".
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Pet {
    /// Server-assigned identifier, globally unique.
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name (lost-pet reports use a placeholder name).
    pub name: String,

    /// Age in years.
    #[serde(default)]
    pub age: i64,

    /// Breed as entered by the owner (free text).
    #[serde(default)]
    pub breed: String,

    /// Species ("Dog", "Cat", ...).
    #[serde(rename = "type", default)]
    pub species: String,

    #[serde(default)]
    pub gender: String,

    /// Free-text description.
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub city: String,

    /// Whether the pet is currently reported lost.
    #[serde(rename = "isLost", default)]
    pub is_lost: bool,

    /// Owned by the current user (`true`) vs. found/reported by them.
    #[serde(rename = "isPetMine", default = "default_mine")]
    pub is_pet_mine: bool,

    /// Remote photo identifiers, in server order.
    #[serde(default)]
    pub photos: Vec<String>,

    /// Locally materialized image paths. First entry is the canonical photo.
    #[serde(rename = "localImageUris", default)]
    pub local_image_uris: Vec<String>,
}

/// The server omits `isPetMine` for pets created through the plain create
/// flow and treats them as owned.
fn default_mine() -> bool {
    true
}

/// Request body for `POST /api/pets/new` (owned-pet create flow).
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewPetRequest {
    pub name: String,
    pub age: i64,
    pub breed: String,
    #[serde(rename = "type")]
    pub species: String,
    pub gender: String,
    pub description: String,
    pub is_lost: bool,
    pub city: String,
    pub owner_email: String,
    /// The original client sends the city again as the full address.
    pub full_address: String,
}

/// Request body for `POST /api/pets/new` when reporting a found lost pet.
///
/// The server expects coordinates as strings here.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LostPetReport {
    pub name: String,
    pub owner_email: String,
    pub latitude: String,
    pub longitude: String,
    pub is_pet_mine: bool,
    pub is_lost: bool,
}

impl LostPetReport {
    /// Build the fixed-shape report the matching flow submits.
    pub fn new(owner_email: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: "lost Pet".to_string(),
            owner_email: owner_email.into(),
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
            is_pet_mine: false,
            is_lost: true,
        }
    }
}

/// Request body for `PUT /api/pets/{petId}` — a full-record update.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PetUpdate {
    pub name: String,
    pub age: i64,
    pub breed: String,
    #[serde(rename = "type")]
    pub species: String,
    pub gender: String,
    pub description: String,
    pub is_lost: bool,
    pub city: String,
}

impl PetUpdate {
    /// Snapshot the updatable fields of a mirrored record.
    pub fn from_pet(pet: &Pet) -> Self {
        Self {
            name: pet.name.clone(),
            age: pet.age,
            breed: pet.breed.clone(),
            species: pet.species.clone(),
            gender: pet.gender.clone(),
            description: pet.description.clone(),
            is_lost: pet.is_lost,
            city: pet.city.clone(),
        }
    }
}

/// Envelope for create responses: `{ "pet": { ... } }`.
#[derive(Deserialize, Debug)]
pub struct CreatedPet {
    pub pet: Pet,
}

/// `GET /api/pets/coordinates/{petId}` — GeoJSON-style `[longitude, latitude]`.
#[derive(Deserialize, Debug)]
pub struct PetCoordinates {
    #[serde(default, deserialize_with = "lenient_coords")]
    pub coordinates: Vec<f64>,
}

impl PetCoordinates {
    /// Returns `(latitude, longitude)` when the server sent a usable pair.
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        match self.coordinates.as_slice() {
            [lon, lat, ..] => Some((*lat, *lon)),
            _ => None,
        }
    }
}

/// The server has been observed returning coordinates both as numbers and
/// as strings. Accept either.
fn lenient_coords<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    let raw = Vec::<NumberOrString>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|value| match value {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s.parse::<f64>().map_err(serde::de::Error::custom),
        })
        .collect()
}

/// One ranked guess from the breed classifier.
#[derive(Deserialize, Debug, Clone)]
pub struct BreedGuess {
    pub breed: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Payload of `POST /api/pets/classify/{petId}`.
#[derive(Deserialize, Debug)]
pub struct BreedClassification {
    #[serde(rename = "breedPrediction")]
    pub breed_prediction: BreedPrediction,
}

#[derive(Deserialize, Debug)]
pub struct BreedPrediction {
    #[serde(default)]
    pub predictions: Vec<BreedGuess>,
}
