//! The injected collaborator that performs remote reads.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::FetchError;
use crate::filter::QueryFilter;

/// Result type for fetcher settlements.
pub type FetchResult<T> = Result<T, FetchError>;

/// Server-reported pagination arithmetic for one collection page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
  /// Rows of this resource type that exist at all.
  pub total: u64,
  /// Rows matching the filter criteria, across all pages.
  pub filtered: u64,
  /// 0-based offset of this page within the filtered rows.
  pub offset: u64,
  /// Page size the server applied (may be clamped from the request).
  pub limit: u64,
  /// Rows actually delivered on this page.
  pub length: u64,
}

impl Counts {
  /// 1-based index of the first row on this page. Pagination displays are
  /// built on this re-basing: `offset=0` is row 1.
  pub fn first(&self) -> u64 {
    self.offset + 1
  }

  /// 1-based index of the last row on this page.
  pub fn last(&self) -> u64 {
    self.offset + self.length
  }
}

/// One successfully fetched collection page.
///
/// `filter` is the filter the server actually satisfied, which may differ
/// from the request when the server clamps paging.
#[derive(Clone, Debug)]
pub struct CollectionPage<E, F> {
  pub data: Vec<E>,
  pub counts: Counts,
  pub filter: F,
}

/// Remote read collaborator for one resource type.
///
/// Implementations wrap whatever transport the application uses; this crate
/// only consumes the settled futures. Rejections carry a [`FetchError`]:
/// genuine failures are recorded in the store, the cancellation signal is
/// not. Timeouts and retries are the implementation's concern.
pub trait Fetcher: Send + Sync + 'static {
  type Entity: Entity;
  type Filter: QueryFilter;

  /// Fetch a collection page for the given filter (`None` for the server
  /// default view).
  fn fetch_collection(
    &self,
    filter: Option<&Self::Filter>,
  ) -> BoxFuture<'_, FetchResult<CollectionPage<Self::Entity, Self::Filter>>>;

  /// Fetch a single entity by id.
  fn fetch_entity(&self, id: &str) -> BoxFuture<'_, FetchResult<Self::Entity>>;
}
