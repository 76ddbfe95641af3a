//! Represents the signed-in user: session, profile, and avatar selector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Profile fields the auth service stores for a user.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Envelope for `GET /auth/user/{userId}`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub user_info: UserInfo,
}

/// `POST /auth/login` response: session id plus the profile snapshot.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: String,
    pub user_info: UserInfo,
}

/// Request body for `POST /auth/register`.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub city: String,
}

/// `{ "message": ... }` acknowledgements from the auth service.
#[derive(Deserialize, Debug)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Partial update for `PUT /auth/update/{userId}`.
///
/// The same endpoint takes profile edits and password changes; absent
/// fields are left untouched server-side.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// The locally persisted session: who is signed in on this device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

/// Avatar selector — one of the six bundled profile pictures.
///
/// Stored as the original app's numeric ids ("1".."6") so a mirror written
/// by an older install stays readable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Avatar {
    WomanBrownHair,
    WomanDarkSkin,
    Neutral,
    ManLongHair,
    WomanBlonde,
    ManDarkSkin,
}

impl Avatar {
    pub const DEFAULT: Avatar = Avatar::Neutral;

    /// Storage id, matching the original asset numbering.
    pub fn id(self) -> &'static str {
        match self {
            Avatar::WomanBrownHair => "1",
            Avatar::WomanDarkSkin => "2",
            Avatar::Neutral => "3",
            Avatar::ManLongHair => "4",
            Avatar::WomanBlonde => "5",
            Avatar::ManDarkSkin => "6",
        }
    }
}

impl FromStr for Avatar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Avatar::WomanBrownHair),
            "2" => Ok(Avatar::WomanDarkSkin),
            "3" => Ok(Avatar::Neutral),
            "4" => Ok(Avatar::ManLongHair),
            "5" => Ok(Avatar::WomanBlonde),
            "6" => Ok(Avatar::ManDarkSkin),
            other => Err(format!("unknown avatar id `{}` (expected 1-6)", other)),
        }
    }
}

impl fmt::Display for Avatar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Avatar::WomanBrownHair => "woman, brown hair",
            Avatar::WomanDarkSkin => "woman, dark skin",
            Avatar::Neutral => "default",
            Avatar::ManLongHair => "man, long hair",
            Avatar::WomanBlonde => "woman, blonde",
            Avatar::ManDarkSkin => "man, dark skin",
        };
        write!(f, "{} ({})", self.id(), label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_ids_round_trip() {
        for id in ["1", "2", "3", "4", "5", "6"] {
            let avatar: Avatar = id.parse().unwrap();
            assert_eq!(avatar.id(), id);
        }
        assert!("7".parse::<Avatar>().is_err());
        assert!("".parse::<Avatar>().is_err());
    }
}
