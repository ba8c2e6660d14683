//! Batch delete integration tests.
//!
//! Run with: `cargo test -p tourmedia-api --test delete_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use serde_json::{json, Value};

use helpers::fixtures::create_test_png;
use helpers::{api_path, setup_test_app, setup_test_app_with, TestApp};

async fn upload_images(app: &TestApp, domain: &str, count: usize) -> Vec<String> {
    let mut form = MultipartForm::new();
    for i in 0..count {
        form = form.add_part(
            "images",
            Part::bytes(create_test_png(32, 32))
                .file_name(format!("room-{}.png", i))
                .mime_type("image/png"),
        );
    }
    let response = app
        .client()
        .post(&api_path(&format!("/media/{}/multi-image", domain)))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    body["data"]["fields"]["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_round_trip_delete_then_repeat() {
    let app = setup_test_app().await;
    let filenames = upload_images(&app, "posts", 3).await;
    assert_eq!(app.stored_files("images", "posts").len(), 3);

    let request = json!({ "identifiers": filenames, "contentDomain": "posts" });

    let response = app.client().delete(&api_path("/media")).json(&request).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["deletedCount"], 3);
    assert_eq!(body["data"]["failedCount"], 0);
    assert!(app.stored_files("images", "posts").is_empty());

    let response = app.client().delete(&api_path("/media")).json(&request).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["deletedCount"], 0);
    assert_eq!(body["data"]["failedCount"], 3);
}

#[tokio::test]
async fn test_one_invalid_identifier_in_batch() {
    let app = setup_test_app().await;
    let mut identifiers = upload_images(&app, "restaurants", 2).await;
    identifiers.insert(1, "never-uploaded-1700000000000.png".to_string());

    let response = app
        .client()
        .delete(&api_path("/media"))
        .json(&json!({ "identifiers": identifiers, "contentDomain": "restaurants" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let data = &body["data"];
    assert_eq!(data["totalFiles"], 3);
    assert_eq!(data["deletedCount"], 2);
    assert_eq!(data["failedCount"], 1);
    assert_eq!(data["results"][1]["success"], false);
    assert_eq!(data["results"][1]["identifier"], "never-uploaded-1700000000000.png");
}

#[tokio::test]
async fn test_delete_by_url_without_domain() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(create_test_png(8, 8))
            .file_name("guide.png")
            .mime_type("image/png"),
    );
    let response = app
        .client()
        .post(&api_path("/media/tour-guides/single-image"))
        .multipart(form)
        .await;
    let url = response.json::<Value>()["data"]["files"][0]["url"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .client()
        .delete(&api_path("/media"))
        .json(&json!({ "identifiers": [url] }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["deletedCount"], 1);
    assert!(app.stored_files("images", "tour-guides").is_empty());
}

#[tokio::test]
async fn test_traversal_and_unsupported_identifiers_fail_per_item() {
    let app = setup_test_app().await;
    std::fs::create_dir_all(app.uploads_root.join("images")).unwrap();
    let outside = app.uploads_root.parent().unwrap().join("secret.png");
    std::fs::write(&outside, b"keep").unwrap();

    let response = app
        .client()
        .delete(&api_path("/media"))
        .json(&json!({
            "identifiers": ["uploads/images/../../secret.png", "notes.txt"],
            "contentDomain": "posts"
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["data"]["failedCount"], 2);
    assert!(outside.exists());
}

#[tokio::test]
async fn test_empty_and_oversized_batches_are_rejected() {
    let app = setup_test_app_with(|config| config.max_batch_delete = 2).await;

    let response = app
        .client()
        .delete(&api_path("/media"))
        .json(&json!({ "identifiers": [] }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .client()
        .delete(&api_path("/media"))
        .json(&json!({ "identifiers": ["a.png", "b.png", "c.png"] }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "BAD_REQUEST");

    let response = app
        .client()
        .delete(&api_path("/media"))
        .json(&json!({ "identifiers": ["a.png"], "contentDomain": "no/slashes" }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 200);

    let response = app.client().get("/health/ready").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["storage"], "healthy");
    assert_eq!(body["video_encoder"], "unavailable");

    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
}
