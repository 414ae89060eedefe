// ── Pagination ──

use serde::{Deserialize, Serialize};

/// Server-reported position within a result set.
///
/// Always derived from the server's totals via [`from_totals`](Self::from_totals);
/// `total_pages` is `ceil(total / limit)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    page: u32,
    limit: u32,
    total: u64,
    total_pages: u32,
}

impl PaginationMeta {
    pub fn from_totals(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);
        Self {
            page: page.max(1),
            limit,
            total,
            total_pages,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// `0` for an empty result set.
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Highest page a view may navigate to. An empty result still has page 1.
    pub fn last_page(&self) -> u32 {
        self.total_pages.max(1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}
