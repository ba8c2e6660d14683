//! Upload pipeline: intake → store → compress → finalize.

pub mod finalize;
pub mod intake;
pub mod pipeline;
pub mod types;

pub use finalize::{finalize, normalize};
pub use intake::UploadIntake;
pub use pipeline::UploadPipeline;
pub use types::{CompressionSummary, FinalizedFile, UploadOutcome, UploadShape};
