//! Read-only query facade over the store.
//!
//! Every method is pure and side-effect-free, O(1) or O(size of one result).
//! Collection reads take `Option<&F>`; `None` reads the default-filter entry.

use crate::entity::Entity;
use crate::error::FetchError;
use crate::fetcher::Counts;
use crate::filter::{FilterKey, QueryFilter};
use crate::store::Store;

impl<E: Entity, F: QueryFilter> Store<E, F> {
  /// True while a single-entity fetch for `id` is in flight.
  pub fn is_entity_loading(&self, id: &str) -> bool {
    self.loading_entities.contains(id)
  }

  /// True while a collection fetch for this filter is in flight.
  pub fn is_collection_loading(&self, filter: Option<&F>) -> bool {
    self.loading_collections.contains(&FilterKey::for_filter(filter))
  }

  /// True if any tracked filter key currently has a fetch in flight.
  pub fn is_any_collection_loading(&self) -> bool {
    !self.loading_collections.is_empty()
  }

  /// Cached content for `id`.
  pub fn entity(&self, id: &str) -> Option<&E> {
    self.by_id.get(id)
  }

  /// Last failure recorded for a single-entity fetch of `id`.
  pub fn entity_error(&self, id: &str) -> Option<&FetchError> {
    self.entity_errors.get(id)
  }

  /// Last failure recorded for a collection fetch of this filter.
  pub fn collection_error(&self, filter: Option<&F>) -> Option<&FetchError> {
    self.collection_errors.get(&FilterKey::for_filter(filter))
  }

  /// Entities of the committed result for this filter, in server order.
  ///
  /// Ids that no longer resolve (deleted since the result was committed) are
  /// silently dropped. `None` if the filter was never successfully loaded.
  pub fn entities(&self, filter: Option<&F>) -> Option<Vec<&E>> {
    let result = self.queries.get(&FilterKey::for_filter(filter))?;
    Some(
      result
        .ids
        .iter()
        .filter_map(|id| self.by_id.get(id))
        .collect(),
    )
  }

  /// Entities under the unbounded variant of this filter.
  ///
  /// Normalizes the filter through [`QueryFilter::all`] before reading, so a
  /// paged filter and its all-rows variant resolve to the same entry.
  pub fn all_entities(&self, filter: Option<&F>) -> Option<Vec<&E>> {
    let all = filter.map(QueryFilter::all);
    self.entities(all.as_ref())
  }

  /// Server-reported counts of the committed result for this filter.
  pub fn counts(&self, filter: Option<&F>) -> Option<Counts> {
    self
      .queries
      .get(&FilterKey::for_filter(filter))
      .map(|result| result.counts)
  }

  /// The filter the server actually satisfied for this entry, which may
  /// differ from the request when the server clamps paging.
  pub fn loaded_filter(&self, filter: Option<&F>) -> Option<&F> {
    self
      .queries
      .get(&FilterKey::for_filter(filter))
      .map(|result| &result.loaded_filter)
  }

  /// 1-based index of the first row of the committed page (`offset + 1`).
  pub fn pagination_first(&self, filter: Option<&F>) -> Option<u64> {
    self.counts(filter).map(|counts| counts.first())
  }
}
