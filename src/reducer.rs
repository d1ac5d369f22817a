//! Store transition function and the events that drive it.
//!
//! [`reduce`] is the only writer of a [`Store`]: a pure
//! `(state, event) -> state` function. Everything else either produces
//! events (the orchestrator) or reads (the selectors). Trackers are fully
//! keyed; an event for one filter key or entity id never disturbs another
//! key's flags.

use std::collections::HashSet;

use crate::entity::Entity;
use crate::error::FetchError;
use crate::fetcher::{CollectionPage, Counts};
use crate::filter::{FilterKey, QueryFilter};
use crate::store::{QueryResult, Store};

/// State transition events for one resource type's store.
#[derive(Clone, Debug)]
pub enum CacheEvent<E, F> {
  /// A collection fetch for this key was accepted and is now in flight.
  CollectionRequested { key: FilterKey },
  /// A collection fetch settled successfully.
  CollectionLoaded {
    key: FilterKey,
    entities: Vec<E>,
    loaded_filter: F,
    counts: Counts,
  },
  /// A collection fetch settled with a genuine failure.
  CollectionFailed { key: FilterKey, error: FetchError },
  /// A collection fetch was cancelled; clears loading, records nothing.
  CollectionAborted { key: FilterKey },
  /// A single-entity fetch for this id was accepted and is now in flight.
  EntityRequested { id: String },
  /// A single-entity fetch settled successfully.
  EntityLoaded { id: String, entity: E },
  /// A single-entity fetch settled with a genuine failure.
  EntityFailed { id: String, error: FetchError },
  /// A single-entity fetch was cancelled; clears loading, records nothing.
  EntityAborted { id: String },
  /// The caller confirmed a remote delete; removes the entity from `by_id`
  /// only, leaving query results referencing it stale until re-fetched.
  EntityDeleted { id: String },
}

impl<E: Entity, F: QueryFilter> CacheEvent<E, F> {
  /// Success event for a fetched collection page.
  pub fn collection_loaded(key: FilterKey, page: CollectionPage<E, F>) -> Self {
    Self::CollectionLoaded {
      key,
      entities: page.data,
      loaded_filter: page.filter,
      counts: page.counts,
    }
  }
}

/// Apply one event to the store, producing the next store.
///
/// Pure and total: the inputs are not mutated and `None` state is treated as
/// the empty store. Loading always transitions to absent on settlement; a
/// success clears the error recorded for its key.
pub fn reduce<E: Entity, F: QueryFilter>(
  state: Option<&Store<E, F>>,
  event: CacheEvent<E, F>,
) -> Store<E, F> {
  let mut next = state.cloned().unwrap_or_default();

  match event {
    CacheEvent::CollectionRequested { key } => {
      next.loading_collections.insert(key);
    }

    CacheEvent::CollectionLoaded {
      key,
      entities,
      loaded_filter,
      counts,
    } => {
      let mut ids = Vec::with_capacity(entities.len());
      let mut seen = HashSet::with_capacity(entities.len());
      for entity in entities {
        let id = entity.id().to_string();
        if seen.insert(id.clone()) {
          ids.push(id.clone());
        }
        // Last write wins; entities are replaced wholesale, never patched.
        next.by_id.insert(id, entity);
      }
      next.queries.insert(
        key.clone(),
        QueryResult {
          ids,
          counts,
          loaded_filter,
        },
      );
      next.loading_collections.remove(&key);
      next.collection_errors.remove(&key);
    }

    CacheEvent::CollectionFailed { key, error } => {
      // The previous committed result for the key is left untouched, so a
      // consumer keeps its last good page while flagging the failure.
      next.loading_collections.remove(&key);
      next.collection_errors.insert(key, error);
    }

    CacheEvent::CollectionAborted { key } => {
      next.loading_collections.remove(&key);
    }

    CacheEvent::EntityRequested { id } => {
      next.loading_entities.insert(id);
    }

    CacheEvent::EntityLoaded { id, entity } => {
      next.by_id.insert(entity.id().to_string(), entity);
      next.loading_entities.remove(&id);
      next.entity_errors.remove(&id);
    }

    CacheEvent::EntityFailed { id, error } => {
      next.loading_entities.remove(&id);
      next.entity_errors.insert(id, error);
    }

    CacheEvent::EntityAborted { id } => {
      next.loading_entities.remove(&id);
    }

    CacheEvent::EntityDeleted { id } => {
      // No sweep of `queries`: results referencing the id stay stale until
      // their filter is re-fetched, and selectors drop the dangling id.
      next.by_id.remove(&id);
    }
  }

  next
}
