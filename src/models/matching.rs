//! Represents lost-pet match results. Transient — never mirrored.

use crate::models::pet::Pet;
use serde::Deserialize;

/// Contact details of a candidate pet's owner.
#[derive(Deserialize, Debug, Clone)]
pub struct OwnerContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One ranked candidate: a registered pet plus how to reach its owner.
#[derive(Deserialize, Debug, Clone)]
pub struct PetMatch {
    pub pet: Pet,
    pub owner: OwnerContact,
}

/// `POST /api/pets/findMatch/{petId}` response.
///
/// `new_pet` echoes the freshly created lost-pet record so the caller can
/// mirror it without a second fetch.
#[derive(Deserialize, Debug)]
pub struct MatchResponse {
    #[serde(default)]
    pub matches: Vec<PetMatch>,
    #[serde(rename = "newPet", default)]
    pub new_pet: Option<Pet>,
}
