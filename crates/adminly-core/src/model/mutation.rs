// ── Mutation results ──

use serde::Serialize;

use crate::error::{CoreError, ErrorKind};

/// What happened to a create/update/delete.
///
/// Failures are also recorded on the controller's published error; this is
/// the per-call answer the caller branches on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationOutcome<T> {
    pub success: bool,
    /// The normalized record the server returned, when it returned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> MutationOutcome<T> {
    pub fn succeeded(record: Option<T>) -> Self {
        Self {
            success: true,
            record,
            error_kind: None,
            message: None,
        }
    }

    pub fn failed(err: &CoreError) -> Self {
        Self {
            success: false,
            record: None,
            error_kind: Some(err.kind()),
            message: Some(err.to_string()),
        }
    }
}

/// An operation applied to every id in a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkAction<D> {
    Delete,
    Update(D),
}

impl<D> BulkAction<D> {
    /// Verb for logs and summaries.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Update(_) => "update",
        }
    }
}

/// Per-id tally of a bulk action.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkReport {
    pub succeeded: Vec<super::ResourceId>,
    pub failed: Vec<(super::ResourceId, String)>,
}

impl BulkReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}
