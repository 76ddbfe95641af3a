//! PhotoMaterializer behavior end to end: a mock backend serves photo
//! metadata, signed URLs, and blobs; downloads land in a temp cache and the
//! mirrored records pick up the local paths.

mod common;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use common::{memory_db, sample_pet};
use pawtrail::api::PetStoreClient;
use pawtrail::services::{materializer::PhotoMaterializer, mirror_store::MirrorStore};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// Canned backend: a fixed photo list for every pet, signed URLs that point
/// back at this server, and a counter of blob downloads.
#[derive(Clone)]
struct Backend {
    base: String,
    photos: Vec<(String, String)>,
    url_count: usize,
    downloads: Arc<AtomicUsize>,
}

async fn photo_metadata(State(b): State<Backend>) -> Json<Value> {
    let entries: Vec<Value> = b
        .photos
        .iter()
        .map(|(id, filename)| json!({ "_id": id, "filename": filename }))
        .collect();
    Json(Value::Array(entries))
}

async fn signed_urls(State(b): State<Backend>) -> Json<Value> {
    let urls: Vec<String> = (0..b.url_count)
        .map(|i| format!("{}/blob/{}", b.base, i))
        .collect();
    Json(json!({ "image_urls": urls }))
}

async fn blob(State(b): State<Backend>) -> Vec<u8> {
    b.downloads.fetch_add(1, Ordering::SeqCst);
    b"jpeg-bytes".to_vec()
}

/// `photos` pairs `_id` with filename; `url_count` signed URLs are served.
async fn spawn_backend(
    photos: Vec<(&str, &str)>,
    url_count: usize,
) -> (String, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port should bind");
    let base = format!("http://{}", listener.local_addr().expect("addr"));
    let downloads = Arc::new(AtomicUsize::new(0));
    let state = Backend {
        base: base.clone(),
        photos: photos
            .into_iter()
            .map(|(id, f)| (id.to_string(), f.to_string()))
            .collect(),
        url_count,
        downloads: downloads.clone(),
    };
    let app = Router::new()
        .route("/api/photos/{pet_id}/photos", get(photo_metadata))
        .route("/api/photos/generate-urls/{pet_id}", get(signed_urls))
        .route("/blob/{index}", get(blob))
        .with_state(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    (base, downloads)
}

async fn setup(base: &str) -> (PhotoMaterializer, MirrorStore, tempfile::TempDir) {
    let store = MirrorStore::new(memory_db().await);
    let api = PetStoreClient::builder(base, base)
        .build()
        .expect("client should build");
    let dir = tempfile::tempdir().expect("temp photo dir");
    let materializer = PhotoMaterializer::new(api, store.clone(), dir.path());
    (materializer, store, dir)
}

#[tokio::test]
async fn first_photo_downloads_once_then_serves_from_cache() {
    let (base, downloads) = spawn_backend(vec![("ph1", "rex.jpg")], 1).await;
    let (materializer, store, _dir) = setup(&base).await;
    store.upsert_one(&sample_pet("p1", "Rex")).await.unwrap();
    let cancel = CancellationToken::new();

    let path = materializer
        .materialize_first_photo("p1", &cancel)
        .await
        .expect("photo should materialize");
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"jpeg-bytes");
    assert_eq!(downloads.load(Ordering::SeqCst), 1);

    // The mirrored record now carries the local path.
    let pet = store.get("p1").await.unwrap().unwrap();
    assert_eq!(pet.local_image_uris, [path.to_string_lossy().into_owned()]);

    // Second call short-circuits on the cached file: no new download.
    let again = materializer
        .materialize_first_photo("p1", &cancel)
        .await
        .expect("cached photo should resolve");
    assert_eq!(again, path);
    assert_eq!(downloads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unmirrored_pet_downloads_nothing() {
    let (base, downloads) = spawn_backend(vec![("ph1", "rex.jpg")], 1).await;
    let (materializer, _store, _dir) = setup(&base).await;
    let cancel = CancellationToken::new();

    let result = materializer.materialize_first_photo("ghost", &cancel).await;
    assert!(result.is_none());
    assert_eq!(downloads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancelled_flow_never_touches_the_mirror() {
    let (base, _downloads) = spawn_backend(vec![("ph1", "rex.jpg")], 1).await;
    let (materializer, store, _dir) = setup(&base).await;
    store.upsert_one(&sample_pet("p1", "Rex")).await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = materializer.materialize_first_photo("p1", &cancel).await;
    assert!(result.is_none());
    let pet = store.get("p1").await.unwrap().unwrap();
    assert!(pet.local_image_uris.is_empty());
}

#[tokio::test]
async fn cancelled_batch_stops_before_the_first_download() {
    let (base, downloads) = spawn_backend(vec![("ph1", "rex.jpg")], 1).await;
    let (materializer, store, _dir) = setup(&base).await;
    let pets = vec![sample_pet("p1", "Rex"), sample_pet("p2", "Luna")];
    store.replace_all(&pets).await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let materialized = materializer.materialize_batch(&pets, &cancel).await;
    assert_eq!(materialized, 0);
    assert_eq!(downloads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn batch_counts_pets_with_local_photos() {
    let (base, downloads) = spawn_backend(vec![("ph1", "a.jpg")], 1).await;
    let (materializer, store, _dir) = setup(&base).await;
    let pets = vec![sample_pet("p1", "Rex"), sample_pet("p2", "Luna")];
    store.replace_all(&pets).await.unwrap();

    let cancel = CancellationToken::new();
    let materialized = materializer.materialize_batch(&pets, &cancel).await;
    assert_eq!(materialized, 2);
    assert_eq!(downloads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn metadata_and_urls_pair_to_the_shorter_list() {
    // Two metadata entries, one signed URL: only the first photo lands.
    let (base, downloads) =
        spawn_backend(vec![("ph1", "front.jpg"), ("ph2", "side.jpg")], 1).await;
    let (materializer, store, _dir) = setup(&base).await;
    store.upsert_one(&sample_pet("p1", "Rex")).await.unwrap();
    let cancel = CancellationToken::new();

    let paths = materializer.materialize_all_photos("p1", &cancel).await;
    assert_eq!(paths.len(), 1);
    assert!(paths[0].ends_with("front.jpg"));
    assert_eq!(downloads.load(Ordering::SeqCst), 1);

    let pet = store.get("p1").await.unwrap().unwrap();
    assert_eq!(pet.local_image_uris.len(), 1);
}

#[tokio::test]
async fn unsafe_server_filenames_are_rejected_before_download() {
    let (base, downloads) = spawn_backend(vec![("ph1", "../evil.jpg")], 1).await;
    let (materializer, store, _dir) = setup(&base).await;
    store.upsert_one(&sample_pet("p1", "Rex")).await.unwrap();
    let cancel = CancellationToken::new();

    let result = materializer.materialize_first_photo("p1", &cancel).await;
    assert!(result.is_none());
    assert_eq!(downloads.load(Ordering::SeqCst), 0);
    let pet = store.get("p1").await.unwrap().unwrap();
    assert!(pet.local_image_uris.is_empty());
}

#[tokio::test]
async fn uploaded_photos_are_cached_and_recorded() {
    let (base, downloads) = spawn_backend(vec![], 0).await;
    let (materializer, store, _dir) = setup(&base).await;
    store.upsert_one(&sample_pet("p1", "Rex")).await.unwrap();

    let filenames = vec!["pet_0.jpg".to_string()];
    let urls = vec![format!("{}/blob/0", base)];
    let paths = materializer
        .cache_uploaded_photos("p1", &filenames, &urls)
        .await
        .unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(tokio::fs::read(&paths[0]).await.unwrap(), b"jpeg-bytes");
    assert_eq!(downloads.load(Ordering::SeqCst), 1);

    let pet = store.get("p1").await.unwrap().unwrap();
    assert_eq!(
        pet.local_image_uris,
        [paths[0].to_string_lossy().into_owned()]
    );
}
