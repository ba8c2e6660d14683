//! Tourmedia API Library
//!
//! HTTP surface of the media pipeline: upload and batch-delete routes, the
//! static uploads mount, health checks and application setup.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
mod telemetry;
mod utils;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::{AppState, MediaState};
