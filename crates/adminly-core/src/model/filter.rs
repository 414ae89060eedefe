// ── Filter criteria ──
//
// The query a collection view is currently showing. Every filter field is
// optional (absent = no constraint); `page` and `limit` are always present.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PAGE_LIMIT;

/// The active query for one collection view.
///
/// Invariant: any change to a non-pagination field resets `page` to 1
/// (enforced by [`apply`](Self::apply)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    /// 1-based.
    pub page: u32,
    pub limit: u32,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}

impl FilterCriteria {
    /// Unfiltered first page with the given page size.
    pub fn new(limit: u32) -> Self {
        Self {
            search: None,
            status: None,
            category: None,
            date_from: None,
            date_to: None,
            min_amount: None,
            max_amount: None,
            page: 1,
            limit: limit.max(1),
        }
    }

    /// `true` if any non-pagination field constrains the result.
    pub fn is_filtered(&self) -> bool {
        self.search.is_some()
            || self.status.is_some()
            || self.category.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
            || self.min_amount.is_some()
            || self.max_amount.is_some()
    }

    /// Same query apart from the page number.
    pub fn same_query(&self, other: &Self) -> bool {
        let mut paged = other.clone();
        paged.page = self.page;
        *self == paged
    }

    /// Merge a patch. Returns `true` if anything changed.
    ///
    /// A change to any non-pagination field forces `page = 1`, overriding
    /// a page carried in the same patch.
    pub fn apply(&mut self, patch: &FilterPatch) -> bool {
        let mut filters_changed = false;
        filters_changed |= merge(&mut self.search, patch.search.as_ref());
        filters_changed |= merge(&mut self.status, patch.status.as_ref());
        filters_changed |= merge(&mut self.category, patch.category.as_ref());
        filters_changed |= merge(&mut self.date_from, patch.date_from.as_ref());
        filters_changed |= merge(&mut self.date_to, patch.date_to.as_ref());
        filters_changed |= merge(&mut self.min_amount, patch.min_amount.as_ref());
        filters_changed |= merge(&mut self.max_amount, patch.max_amount.as_ref());

        let mut paging_changed = false;
        if let Some(limit) = patch.limit.filter(|l| *l >= 1) {
            paging_changed |= self.limit != limit;
            self.limit = limit;
        }

        let target_page = if filters_changed {
            Some(1)
        } else {
            patch.page.filter(|p| *p >= 1)
        };
        if let Some(page) = target_page {
            paging_changed |= self.page != page;
            self.page = page;
        }

        filters_changed || paging_changed
    }

    /// Query parameters for a list request. `category_param` is the
    /// resource-specific name of the category filter (`type`, `league`, ...).
    pub fn to_query(&self, category_param: &'static str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        params.extend(self.filter_params(category_param));
        params
    }

    /// Query parameters for an export: the active filters, without paging.
    pub fn to_export_query(&self, category_param: &'static str) -> Vec<(&'static str, String)> {
        self.filter_params(category_param)
    }

    /// Stable key identifying this exact query (used by the response cache).
    pub fn cache_key(&self) -> String {
        self.to_query("category")
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn filter_params(&self, category_param: &'static str) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref search) = self.search {
            params.push(("search", search.clone()));
        }
        if let Some(ref status) = self.status {
            params.push(("status", status.clone()));
        }
        if let Some(ref category) = self.category {
            params.push((category_param, category.clone()));
        }
        if let Some(from) = self.date_from {
            params.push(("startDate", from.to_string()));
        }
        if let Some(to) = self.date_to {
            params.push(("endDate", to.to_string()));
        }
        if let Some(min) = self.min_amount {
            params.push(("minAmount", min.to_string()));
        }
        if let Some(max) = self.max_amount {
            params.push(("maxAmount", max.to_string()));
        }
        params
    }
}

/// Replace `slot` with `update` if one is given; report whether it changed.
fn merge<T: Clone + PartialEq>(slot: &mut Option<T>, update: Option<&Option<T>>) -> bool {
    match update {
        Some(value) if slot != value => {
            slot.clone_from(value);
            true
        }
        _ => false,
    }
}

/// A partial update to [`FilterCriteria`].
///
/// Outer `None` leaves a field alone; `Some(None)` clears it;
/// `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPatch {
    pub search: Option<Option<String>>,
    pub status: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub date_from: Option<Option<NaiveDate>>,
    pub date_to: Option<Option<NaiveDate>>,
    pub min_amount: Option<Option<f64>>,
    pub max_amount: Option<Option<f64>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text search; blank text clears it.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(non_blank(text.into()));
        self
    }

    pub fn clear_search(mut self) -> Self {
        self.search = Some(None);
        self
    }

    /// Set the status filter; blank clears it.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(non_blank(status.into()));
        self
    }

    pub fn clear_status(mut self) -> Self {
        self.status = Some(None);
        self
    }

    /// Set the category filter; blank clears it.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(non_blank(category.into()));
        self
    }

    pub fn clear_category(mut self) -> Self {
        self.category = Some(None);
        self
    }

    /// Set both ends of the date range (`None` = open-ended).
    pub fn date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    /// Set both ends of the amount range (`None` = open-ended).
    pub fn amount_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_amount = Some(min);
        self.max_amount = Some(max);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// `true` if this patch names any non-pagination field.
    pub fn touches_filters(&self) -> bool {
        self.search.is_some()
            || self.status.is_some()
            || self.category.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
            || self.min_amount.is_some()
            || self.max_amount.is_some()
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_owned())
    }
}
