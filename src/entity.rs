//! The contract cached records satisfy.

/// A record of one resource type, identified by a stable string id.
///
/// Content is opaque to the cache: the store keys records by `id()` and
/// replaces them wholesale on refresh, nothing more. The cache logic is
/// written once and specialized per resource type solely by supplying a
/// [`Fetcher`](crate::Fetcher) for that type.
pub trait Entity: Clone + Send + Sync + 'static {
  /// Stable identifier for this record.
  fn id(&self) -> &str;
}
