//! Fetch orchestration over the store.
//!
//! [`EntityCache`] bridges "ensure X loaded" intents to the store via the
//! injected [`Fetcher`]. It guards against duplicate concurrent fetches per
//! key, translates settlements into events, and exposes the selector views
//! as an owned-value facade. Handles are cheap clones over shared state, so
//! many consumers can read and trigger loads on the same cache.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::FetchError;
use crate::fetcher::{Counts, Fetcher};
use crate::filter::FilterKey;
use crate::reducer::{reduce, CacheEvent};
use crate::store::Store;

/// How an `ensure`/`load` call settled.
///
/// The future always resolves with one of these; fetch failures are recorded
/// in the store and read back through the selectors, never surfaced as `Err`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
  /// A fetch ran and committed its result.
  Fetched,
  /// A fetch ran and failed; the error is recorded for the key.
  Failed,
  /// A fetch ran and was cancelled; nothing was recorded.
  Aborted,
  /// Another fetch for the same key was already in flight; nothing ran.
  InFlight,
  /// The store already held a committed result; nothing ran.
  Cached,
}

struct CacheInner<X: Fetcher> {
  state: Mutex<Store<X::Entity, X::Filter>>,
  fetcher: X,
}

/// Shared entity cache for one resource type.
///
/// One instance per entity type, created once at startup. All writes funnel
/// through the reducer under a single lock; the lock is never held across an
/// await, and the in-flight guard's check-then-set happens inside one
/// acquisition, so concurrent callers cannot start duplicate fetches.
pub struct EntityCache<X: Fetcher> {
  inner: Arc<CacheInner<X>>,
}

impl<X: Fetcher> EntityCache<X> {
  /// Create a cache over the given fetcher, starting from the empty store.
  pub fn new(fetcher: X) -> Self {
    Self {
      inner: Arc::new(CacheInner {
        state: Mutex::new(Store::new()),
        fetcher,
      }),
    }
  }

  /// Fetch the collection for `filter` unless one is already in flight.
  ///
  /// Emits exactly one terminal event per accepted request; emits nothing
  /// when the guard short-circuits. No retry is performed; a failure is
  /// recorded for the key and the previous committed result, if any, is left
  /// untouched.
  pub async fn ensure_collection_loaded(&self, filter: Option<&X::Filter>) -> FetchOutcome {
    let key = FilterKey::for_filter(filter);
    {
      let mut store = self.lock();
      if store.loading_collections.contains(&key) {
        debug!(%key, "collection fetch already in flight");
        return FetchOutcome::InFlight;
      }
      *store = reduce(Some(&*store), CacheEvent::CollectionRequested { key: key.clone() });
    }

    match self.inner.fetcher.fetch_collection(filter).await {
      Ok(page) => {
        debug!(%key, rows = page.data.len(), "collection fetch settled");
        self.dispatch(CacheEvent::collection_loaded(key, page));
        FetchOutcome::Fetched
      }
      Err(error) if error.is_cancellation() => {
        debug!(%key, "collection fetch aborted");
        self.dispatch(CacheEvent::CollectionAborted { key });
        FetchOutcome::Aborted
      }
      Err(error) => {
        debug!(%key, %error, "collection fetch failed");
        self.dispatch(CacheEvent::CollectionFailed { key, error });
        FetchOutcome::Failed
      }
    }
  }

  /// Fetch the entity for `id` unless one is already in flight.
  pub async fn ensure_entity_loaded(&self, id: &str) -> FetchOutcome {
    {
      let mut store = self.lock();
      if store.loading_entities.contains(id) {
        debug!(id, "entity fetch already in flight");
        return FetchOutcome::InFlight;
      }
      *store = reduce(
        Some(&*store),
        CacheEvent::EntityRequested { id: id.to_string() },
      );
    }

    match self.inner.fetcher.fetch_entity(id).await {
      Ok(entity) => {
        self.dispatch(CacheEvent::EntityLoaded {
          id: id.to_string(),
          entity,
        });
        FetchOutcome::Fetched
      }
      Err(error) if error.is_cancellation() => {
        debug!(id, "entity fetch aborted");
        self.dispatch(CacheEvent::EntityAborted { id: id.to_string() });
        FetchOutcome::Aborted
      }
      Err(error) => {
        debug!(id, %error, "entity fetch failed");
        self.dispatch(CacheEvent::EntityFailed {
          id: id.to_string(),
          error,
        });
        FetchOutcome::Failed
      }
    }
  }

  /// Fetch the collection for `filter` only if no result is committed yet.
  pub async fn load_collection_if_needed(&self, filter: Option<&X::Filter>) -> FetchOutcome {
    let key = FilterKey::for_filter(filter);
    if self.lock().query(&key).is_some() {
      return FetchOutcome::Cached;
    }
    self.ensure_collection_loaded(filter).await
  }

  /// Fetch the entity for `id` only if it is not cached yet.
  pub async fn load_entity_if_needed(&self, id: &str) -> FetchOutcome {
    if self.lock().entity(id).is_some() {
      return FetchOutcome::Cached;
    }
    self.ensure_entity_loaded(id).await
  }

  /// Record a caller-confirmed remote delete.
  ///
  /// Removes the entity from the content map only; query results that still
  /// reference it stay stale until their filter is re-fetched.
  pub fn mark_deleted(&self, id: &str) {
    self.dispatch(CacheEvent::EntityDeleted { id: id.to_string() });
  }

  /// Run a closure against the current store for zero-copy reads.
  pub fn with_store<R>(&self, f: impl FnOnce(&Store<X::Entity, X::Filter>) -> R) -> R {
    f(&*self.lock())
  }

  // ==========================================================================
  // Owned-value selector facade
  // ==========================================================================

  pub fn is_collection_loading(&self, filter: Option<&X::Filter>) -> bool {
    self.lock().is_collection_loading(filter)
  }

  pub fn is_entity_loading(&self, id: &str) -> bool {
    self.lock().is_entity_loading(id)
  }

  pub fn is_any_collection_loading(&self) -> bool {
    self.lock().is_any_collection_loading()
  }

  pub fn entity(&self, id: &str) -> Option<X::Entity> {
    self.lock().entity(id).cloned()
  }

  pub fn entities(&self, filter: Option<&X::Filter>) -> Option<Vec<X::Entity>> {
    self
      .lock()
      .entities(filter)
      .map(|entities| entities.into_iter().cloned().collect())
  }

  pub fn all_entities(&self, filter: Option<&X::Filter>) -> Option<Vec<X::Entity>> {
    self
      .lock()
      .all_entities(filter)
      .map(|entities| entities.into_iter().cloned().collect())
  }

  pub fn counts(&self, filter: Option<&X::Filter>) -> Option<Counts> {
    self.lock().counts(filter)
  }

  pub fn loaded_filter(&self, filter: Option<&X::Filter>) -> Option<X::Filter> {
    self.lock().loaded_filter(filter).cloned()
  }

  pub fn pagination_first(&self, filter: Option<&X::Filter>) -> Option<u64> {
    self.lock().pagination_first(filter)
  }

  pub fn collection_error(&self, filter: Option<&X::Filter>) -> Option<FetchError> {
    self.lock().collection_error(filter).cloned()
  }

  pub fn entity_error(&self, id: &str) -> Option<FetchError> {
    self.lock().entity_error(id).cloned()
  }

  fn dispatch(&self, event: CacheEvent<X::Entity, X::Filter>) {
    let mut store = self.lock();
    *store = reduce(Some(&*store), event);
  }

  fn lock(&self) -> MutexGuard<'_, Store<X::Entity, X::Filter>> {
    // The store is only ever replaced by whole-value assignment, so a
    // poisoned lock still holds the previous consistent snapshot.
    self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<X: Fetcher> Clone for EntityCache<X> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}
