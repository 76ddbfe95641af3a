//! Local-side services: the SQLite pet mirror, the session/avatar store,
//! and the photo materializer that fills the on-disk photo cache.

pub mod materializer;
pub mod mirror_store;
pub mod session_store;
