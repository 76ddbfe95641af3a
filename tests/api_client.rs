//! PetStoreClient behavior against in-process mock servers: host routing,
//! multipart uploads, and the bounded retry for idempotent GETs.

mod common;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use common::spawn_server;
use pawtrail::api::{ApiError, PetStoreClient};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn client(api_base: &str, auth_base: &str) -> PetStoreClient {
    PetStoreClient::builder(api_base, auth_base)
        .build()
        .expect("client should build")
}

// -- Host routing ----------------------------------------------------------

#[tokio::test]
async fn calls_are_routed_to_the_right_host() {
    // The auth host knows /auth/login and nothing else; the api host knows
    // the listing endpoint and nothing else. Both calls succeeding proves
    // each went to its own host.
    let auth_app = Router::new().route(
        "/auth/login",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["email"], "alice@example.com");
            Json(json!({
                "userId": "u1",
                "userInfo": {
                    "email": "alice@example.com",
                    "firstName": "Alice",
                    "lastName": "Cohen"
                }
            }))
        }),
    );
    let api_app = Router::new().route(
        "/api/pets/user/{user_id}/AllpetsById",
        get(|Path(user_id): Path<String>| async move {
            assert_eq!(user_id, "u1");
            Json(json!([{ "_id": "p1", "name": "Rex" }]))
        }),
    );
    let auth_base = spawn_server(auth_app).await;
    let api_base = spawn_server(api_app).await;
    let client = client(&api_base, &auth_base);

    let login = client.login("alice@example.com", "secret").await.unwrap();
    assert_eq!(login.user_id, "u1");
    assert_eq!(login.user_info.first_name, "Alice");

    let pets = client.fetch_pets_by_user("u1").await.unwrap();
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].name, "Rex");
    // isPetMine omitted on the wire means owned.
    assert!(pets[0].is_pet_mine);
}

// -- Retry policy ----------------------------------------------------------

async fn flaky_pets(State(hits): State<Arc<AtomicUsize>>) -> Response {
    let attempt = hits.fetch_add(1, Ordering::SeqCst) + 1;
    if attempt < 3 {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
    } else {
        Json(json!([{ "_id": "p1", "name": "Rex" }])).into_response()
    }
}

#[tokio::test]
async fn retryable_get_failures_are_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/pets/user/{user_id}/AllpetsById", get(flaky_pets))
        .with_state(hits.clone());
    let base = spawn_server(app).await;
    let client = client(&base, &base);

    // Two 500s, then success on the final allowed attempt.
    let pets = client.fetch_pets_by_user("u1").await.unwrap();
    assert_eq!(pets.len(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().route(
        "/api/pets/user/{user_id}/AllpetsById",
        get(
            |State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (StatusCode::NOT_FOUND, "no such user")
            },
        ),
    )
    .with_state(hits.clone());
    let base = spawn_server(app).await;
    let client = client(&base, &base);

    let err = client.fetch_pets_by_user("ghost").await.unwrap_err();
    match err {
        ApiError::Status { status, .. } => assert_eq!(status, 404),
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn mutating_calls_are_sent_exactly_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().route(
        "/api/pets/findMatch/{pet_id}",
        post(
            |State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (StatusCode::INTERNAL_SERVER_ERROR, "matcher down")
            },
        ),
    )
    .with_state(hits.clone());
    let base = spawn_server(app).await;
    let client = client(&base, &base);

    // Retryable failure class, but POSTs must not be replayed.
    let err = client.find_matches("p1").await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// -- Uploads ---------------------------------------------------------------

async fn upload_handler(mut multipart: Multipart) -> Json<Value> {
    let mut pet_id = String::new();
    let mut filenames = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("well-formed multipart") {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("petId") => pet_id = field.text().await.expect("text field"),
            Some("files") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.expect("file bytes");
                assert!(!bytes.is_empty());
                filenames.push(filename);
            }
            other => panic!("unexpected multipart field {other:?}"),
        }
    }
    assert_eq!(pet_id, "p1");
    let urls: Vec<String> = filenames
        .iter()
        .map(|f| format!("https://cdn.example/{pet_id}/{f}"))
        .collect();
    Json(json!({ "urls": urls, "filenames": filenames }))
}

#[tokio::test]
async fn upload_sends_pet_id_and_all_files() {
    let app = Router::new().route("/api/photos/upload", post(upload_handler));
    let base = spawn_server(app).await;
    let client = client(&base, &base);

    let files = vec![
        ("pet_0.jpg".to_string(), b"front".to_vec()),
        ("pet_1.jpg".to_string(), b"side".to_vec()),
    ];
    let response = client.upload_photos("p1", files).await.unwrap();
    assert_eq!(response.filenames, ["pet_0.jpg", "pet_1.jpg"]);
    assert_eq!(response.urls.len(), 2);
}

// -- Error bodies ----------------------------------------------------------

#[tokio::test]
async fn status_errors_carry_the_server_message() {
    let app = Router::new().route(
        "/auth/login",
        post(|| async { (StatusCode::UNAUTHORIZED, "wrong password") }),
    );
    let base = spawn_server(app).await;
    let client = client(&base, &base);

    let err = client.login("alice@example.com", "nope").await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "wrong password");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}
