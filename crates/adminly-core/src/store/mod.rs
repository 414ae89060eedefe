// ── Collection state ──
//
// `CollectionStore` is the per-view reducer the controller publishes;
// `ResponseCache` is shared across views of the same resource type.

mod cache;
mod state;

pub use cache::{CachedPage, ResponseCache};
pub use state::CollectionStore;
