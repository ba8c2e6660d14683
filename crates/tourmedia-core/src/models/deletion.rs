use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-identifier result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletionOutcome {
    pub identifier: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeletionOutcome {
    pub fn deleted(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(identifier: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregated outcome of a multi-identifier delete.
///
/// `deleted_count + failed_count == total_files` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeletionReport {
    pub total_files: usize,
    pub deleted_count: usize,
    pub failed_count: usize,
    pub results: Vec<DeletionOutcome>,
}

impl BatchDeletionReport {
    pub fn from_outcomes(results: Vec<DeletionOutcome>) -> Self {
        let deleted_count = results.iter().filter(|r| r.success).count();
        Self {
            total_files: results.len(),
            deleted_count,
            failed_count: results.len() - deleted_count,
            results,
        }
    }
}
