//! Wire format types for the two backend protocols
//!
//! Pure serde structs matching each protocol's JSON. They are only used at
//! the boundary and never leak into the orchestrator.

pub mod completions;
pub mod responses;

use serde::{Deserialize, Serialize};

/// Error body returned by both protocols on a failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error message
    pub message: String,
    /// Error type
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}
