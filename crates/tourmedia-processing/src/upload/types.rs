//! Types for the upload pipeline.

use std::collections::BTreeMap;

use serde::Serialize;
use tourmedia_core::{CompressionResult, UploadedAsset};
use utoipa::ToSchema;

/// Files received for one request, in the shape the upload mode produces.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadShape {
    /// `single-image` / `single-video`.
    Single(UploadedAsset),
    /// `multi-image` / `multi-video`: one field, many values.
    Multiple(Vec<UploadedAsset>),
    /// `mixed`: field name to the files received under it.
    FieldMap(BTreeMap<String, Vec<UploadedAsset>>),
}

impl UploadShape {
    pub fn len(&self) -> usize {
        match self {
            UploadShape::Single(_) => 1,
            UploadShape::Multiple(files) => files.len(),
            UploadShape::FieldMap(map) => map.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A stored file after compression, stamped with its canonical bare filename.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedFile {
    pub field_name: String,
    /// Bare filename, the only value a caller persists.
    pub filename: String,
    pub asset: UploadedAsset,
    pub compression: Option<CompressionResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompressionSummary {
    pub attempted: usize,
    pub succeeded: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub files: Vec<FinalizedFile>,
    /// Present when compression was requested.
    pub compression: Option<CompressionSummary>,
}

impl UploadOutcome {
    /// Bare filenames keyed back by field name.
    pub fn fields(&self) -> BTreeMap<String, Vec<String>> {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for file in &self.files {
            fields
                .entry(file.field_name.clone())
                .or_default()
                .push(file.filename.clone());
        }
        fields
    }

    pub fn filenames(&self) -> Vec<String> {
        self.files.iter().map(|f| f.filename.clone()).collect()
    }
}
