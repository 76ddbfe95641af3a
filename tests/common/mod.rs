//! Shared fixtures for the integration tests: an in-memory mirror database
//! and a canned pet record.

#![allow(dead_code)]

use pawtrail::models::pet::Pet;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

/// Fresh in-memory SQLite with the schema applied.
///
/// A single connection is required: every connection to `sqlite::memory:`
/// gets its own database.
pub async fn memory_db() -> Arc<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should connect");

    let sql = include_str!("../../migrations/0001_init.sql");
    for stmt in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(stmt)
            .execute(&pool)
            .await
            .expect("schema statement should apply");
    }
    Arc::new(pool)
}

pub fn sample_pet(id: &str, name: &str) -> Pet {
    Pet {
        id: id.to_string(),
        name: name.to_string(),
        age: 3,
        breed: "Labrador".to_string(),
        species: "Dog".to_string(),
        gender: "Male".to_string(),
        description: "friendly".to_string(),
        city: "Haifa".to_string(),
        is_lost: false,
        is_pet_mine: true,
        photos: Vec::new(),
        local_image_uris: Vec::new(),
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_server(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port should bind");
    let addr = listener.local_addr().expect("listener should have an addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    format!("http://{}", addr)
}
