//! Tourmedia Storage Library
//!
//! Filesystem side of the media pipeline: where uploads live, how stored
//! files are named, and how a caller-supplied identifier is mapped back to
//! exactly one file for deletion.
//!
//! # Layout
//!
//! - **Current**: `{root}/{images|videos}/{content_domain}/{filename}`
//! - **Legacy**: `{root}/{images|videos}/{filename}` (read and delete only)
//!
//! Only bare filenames are handed back to callers; the absolute path is always
//! re-derivable from `(filename, content_domain, media_kind)`.

pub mod layout;
pub mod local;
pub mod resolver;
pub mod traits;

// Re-export commonly used types
pub use layout::{generate_filename, public_url, sanitize_base_name, UploadLayout};
pub use local::LocalMediaStore;
pub use resolver::{DeletionResolver, ResolveError};
pub use traits::{MediaStore, StorageError, StorageResult};
