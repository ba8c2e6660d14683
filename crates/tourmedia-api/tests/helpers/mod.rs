//! Test helpers: build the router over a temporary uploads root.
//!
//! The encoder path points at a binary that does not exist, so video uploads
//! always take the copy-through path.

pub mod fixtures;

use std::path::{Path, PathBuf};

use axum_test::TestServer;
use tempfile::TempDir;
use tourmedia_api::constants;
use tourmedia_api::setup::{routes, services};
use tourmedia_core::{Config, MediaPipelineConfig};

pub const MISSING_FFMPEG: &str = "/nonexistent/ffmpeg";

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus the temp dir that owns the uploads root.
pub struct TestApp {
    pub server: TestServer,
    pub uploads_root: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Files currently stored under `{root}/{kind_dir}/{domain}`.
    pub fn stored_files(&self, kind_dir: &str, domain: &str) -> Vec<String> {
        list_files(&self.uploads_root.join(kind_dir).join(domain))
    }
}

pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app with a tweakable configuration.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut MediaPipelineConfig)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let uploads_root = temp_dir.path().join("uploads");

    let mut media = MediaPipelineConfig {
        uploads_root: uploads_root.clone(),
        public_base_url: "http://localhost:3000".to_string(),
        ffmpeg_path: MISSING_FFMPEG.to_string(),
        ..MediaPipelineConfig::default()
    };
    configure(&mut media);
    let config = Config::new(media);

    let state = services::initialize_services(&config)
        .await
        .expect("Failed to initialize services");
    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        uploads_root,
        _temp_dir: temp_dir,
    }
}
