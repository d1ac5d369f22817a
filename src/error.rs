//! Error types for fetch settlement and filter construction.

use thiserror::Error;

/// Outcome of a failed or cancelled remote read.
///
/// `Transport` and `Remote` are genuine failures and are recorded in the
/// store's error tracker until the next success for the same key.
/// `Cancelled` is a settle signal, not a failure: it must never be recorded,
/// otherwise an intentional navigate-away abort would surface as an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
  #[error("transport error: {0}")]
  Transport(String),

  #[error("remote rejected request: {status} {message}")]
  Remote { status: u16, message: String },

  #[error("request cancelled")]
  Cancelled,
}

impl FetchError {
  /// True for the cancellation signal, false for genuine failures.
  pub fn is_cancellation(&self) -> bool {
    matches!(self, FetchError::Cancelled)
  }
}

/// A filter string that cannot be canonicalized.
///
/// Raised synchronously when constructing a [`Filter`](crate::Filter); an
/// invalid filter is never representable, so downstream code has no misuse
/// path to handle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
  #[error("invalid value for {keyword}: {value:?}")]
  InvalidNumber { keyword: &'static str, value: String },

  #[error("{keyword} has no value")]
  MissingValue { keyword: &'static str },

  #[error("filter contains control characters")]
  ControlCharacter,
}
