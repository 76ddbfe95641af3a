//! Core data models for the pet service client.
//!
//! Wire types mirror the JSON the remote Pet Store API speaks (camelCase
//! field names, Mongo-style `_id`). The same `Pet` struct is what the local
//! mirror persists, so a record round-trips between the API, SQLite, and the
//! command layer without translation.

pub mod ad;
pub mod matching;
pub mod pet;
pub mod photo;
pub mod user;
