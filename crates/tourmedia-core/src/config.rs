//! Configuration module
//!
//! Environment-driven settings for the media pipeline: listen port, uploads
//! root, per-kind size limits, encoder location and request deadlines.

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::WINDOWS_FFMPEG_PATH;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPLOADS_ROOT: &str = "uploads";
const MAX_IMAGE_SIZE_MB: u64 = 10;
const MAX_VIDEO_SIZE_MB: u64 = 100;
const REQUEST_TIMEOUT_SECS: u64 = 300;
const MAX_BATCH_DELETE: usize = 100;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Base configuration shared by every surface of the service
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub request_timeout_secs: u64,
}

/// Media pipeline configuration
#[derive(Clone, Debug)]
pub struct MediaPipelineConfig {
    pub base: BaseConfig,
    pub uploads_root: PathBuf,
    /// Prefix for public file URLs, without trailing slash.
    pub public_base_url: String,
    pub max_image_size_bytes: u64,
    pub max_video_size_bytes: u64,
    pub ffmpeg_path: String,
    pub encoder_probe_cache: bool,
    pub max_batch_delete: usize,
}

impl Default for MediaPipelineConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig {
                server_port: DEFAULT_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                request_timeout_secs: REQUEST_TIMEOUT_SECS,
            },
            uploads_root: PathBuf::from(DEFAULT_UPLOADS_ROOT),
            public_base_url: format!("http://localhost:{}", DEFAULT_PORT),
            max_image_size_bytes: MAX_IMAGE_SIZE_MB * BYTES_PER_MB,
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * BYTES_PER_MB,
            ffmpeg_path: default_ffmpeg_path().to_string(),
            encoder_probe_cache: false,
            max_batch_delete: MAX_BATCH_DELETE,
        }
    }
}

fn default_ffmpeg_path() -> &'static str {
    if cfg!(windows) {
        WINDOWS_FFMPEG_PATH
    } else {
        "ffmpeg"
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<MediaPipelineConfig>);

impl Config {
    pub fn new(config: MediaPipelineConfig) -> Self {
        Config(Box::new(config))
    }

    fn as_media(&self) -> &MediaPipelineConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        self.as_media().is_production()
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = MediaPipelineConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_media().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_media().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_media().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_media().base.environment
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.as_media().base.request_timeout_secs
    }

    pub fn uploads_root(&self) -> &Path {
        &self.as_media().uploads_root
    }

    pub fn public_base_url(&self) -> &str {
        &self.as_media().public_base_url
    }

    pub fn max_image_size_bytes(&self) -> u64 {
        self.as_media().max_image_size_bytes
    }

    pub fn max_video_size_bytes(&self) -> u64 {
        self.as_media().max_video_size_bytes
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_media().ffmpeg_path
    }

    pub fn encoder_probe_cache(&self) -> bool {
        self.as_media().encoder_probe_cache
    }

    pub fn max_batch_delete(&self) -> usize {
        self.as_media().max_batch_delete
    }
}

impl MediaPipelineConfig {
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_image_size_mb = env::var("MAX_IMAGE_SIZE_MB")
            .unwrap_or_else(|_| MAX_IMAGE_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_IMAGE_SIZE_MB);

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", server_port))
            .trim_end_matches('/')
            .to_string();

        let config = MediaPipelineConfig {
            base: BaseConfig {
                server_port,
                cors_origins,
                environment,
                request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| REQUEST_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(REQUEST_TIMEOUT_SECS),
            },
            uploads_root: PathBuf::from(
                env::var("UPLOADS_ROOT").unwrap_or_else(|_| DEFAULT_UPLOADS_ROOT.to_string()),
            ),
            public_base_url,
            max_image_size_bytes: mb_to_bytes("MAX_IMAGE_SIZE_MB", max_image_size_mb)?,
            max_video_size_bytes: mb_to_bytes("MAX_VIDEO_SIZE_MB", max_video_size_mb)?,
            ffmpeg_path: env::var("FFMPEG_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| default_ffmpeg_path().to_string()),
            encoder_probe_cache: env_bool("ENCODER_PROBE_CACHE", false),
            max_batch_delete: env::var("MAX_BATCH_DELETE")
                .unwrap_or_else(|_| MAX_BATCH_DELETE.to_string())
                .parse()
                .unwrap_or(MAX_BATCH_DELETE),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.uploads_root.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOADS_ROOT must not be empty"));
        }

        if self.max_image_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_SIZE_MB must be greater than 0"));
        }

        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than 0"));
        }

        if self.max_batch_delete == 0 {
            return Err(anyhow::anyhow!("MAX_BATCH_DELETE must be greater than 0"));
        }

        if self.base.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "REQUEST_TIMEOUT_SECS must be greater than 0"
            ));
        }

        Ok(())
    }
}

fn mb_to_bytes(var: &str, mb: u64) -> Result<u64, anyhow::Error> {
    mb.checked_mul(BYTES_PER_MB)
        .ok_or_else(|| anyhow::anyhow!("{} is too large: {} MB", var, mb))
}
