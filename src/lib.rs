//! Normalized entity cache with per-query fetch deduplication.
//!
//! Applications that read many resource types from a remote API keep asking
//! the same questions: is this list loading, what did the last fetch return,
//! did it fail, which page am I on. This crate answers them once, generically:
//! - a normalized [`Store`] per resource type (`by_id` content map plus a
//!   per-filter-key query registry with id references only)
//! - a pure [`reduce`] transition function as the store's single writer
//! - an [`EntityCache`] orchestrator that deduplicates concurrent fetches per
//!   key and translates [`Fetcher`] settlements into events
//! - selector reads for lists, counts, pagination, loading flags and errors
//!
//! The cache is specialized per resource type solely by supplying a
//! [`Fetcher`]; entity content stays opaque behind the [`Entity`] id bound.
//!
//! # Example
//!
//! ```ignore
//! let tasks: EntityCache<TaskFetcher> = EntityCache::new(TaskFetcher::new(transport));
//! let filter = Filter::parse("status=open rows=10 first=1")?;
//!
//! tasks.ensure_collection_loaded(Some(&filter)).await;
//! if let Some(open) = tasks.entities(Some(&filter)) {
//!   render(open, tasks.pagination_first(Some(&filter)));
//! }
//! if let Some(err) = tasks.collection_error(Some(&filter)) {
//!   flag(err); // the last good page above is still shown
//! }
//! ```

mod cache;
mod entity;
mod error;
mod fetcher;
mod filter;
mod reducer;
mod selector;
mod store;

pub use cache::{EntityCache, FetchOutcome};
pub use entity::Entity;
pub use error::{FetchError, FilterError};
pub use fetcher::{CollectionPage, Counts, FetchResult, Fetcher};
pub use filter::{Filter, FilterKey, QueryFilter, Sort, SortOrder};
pub use reducer::{reduce, CacheEvent};
pub use store::{QueryResult, Store};
