//! API constants
//!
//! Route prefixes shared by the router, the OpenAPI document and the
//! integration tests.

/// Versioned prefix for every JSON route.
pub const API_PREFIX: &str = "/api/v1";

/// Where the uploads root is served from.
pub const PUBLIC_UPLOADS_ROUTE: &str = tourmedia_core::constants::PUBLIC_UPLOADS_PREFIX;

/// Stored files never change under a given name.
pub const STATIC_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Headroom for multipart boundaries and part headers on top of file bytes.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;
