// Wire shapes shared by every endpoint.
//
// The backend wraps all responses as `{ success, data, message? }`. List
// endpoints put a page object in `data`, whose field names vary between
// resource families (`items` / `resultItems`, `limit` / `pageSize`).

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// The `{ success, data, message? }` wrapper around every response body.
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One page of a list response, before normalization.
///
/// Every metadata field is optional on the wire; `adminly-core` fills gaps
/// from the request that produced the page.
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct WirePage<T> {
    #[serde(alias = "resultItems", alias = "result_items", alias = "results")]
    pub items: Vec<T>,
    #[serde(default, alias = "currentPage", alias = "current_page")]
    pub page: Option<u32>,
    #[serde(default, alias = "pageSize", alias = "page_size", alias = "perPage")]
    pub limit: Option<u32>,
    #[serde(
        default,
        alias = "totalCount",
        alias = "total_count",
        alias = "totalItems"
    )]
    pub total: Option<u64>,
}

/// Error body returned alongside non-2xx statuses. Both `message` and
/// `error` are seen in the wild.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}
