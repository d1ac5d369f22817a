//! Filter values and their canonical cache identity.
//!
//! A query is cached under a [`FilterKey`]: a deterministic string derived
//! from the filter so that semantically equal filters (any construction
//! order, any whitespace) land on the same cache entry. The derivation is a
//! seam: the shipped [`Filter`] covers the common keyword-string grammar, and
//! hosts with a richer filter language implement [`QueryFilter`] themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

/// Canonical string identity of a filter, used as a cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterKey(String);

/// Key that the absent/default filter maps to.
const DEFAULT_KEY: &str = "-default-";

impl FilterKey {
  /// Wrap an already-canonical string.
  pub fn new(key: impl Into<String>) -> Self {
    Self(key.into())
  }

  /// The fixed sentinel key for the absent/default filter.
  pub fn default_key() -> Self {
    Self(DEFAULT_KEY.to_string())
  }

  /// Key for an optional filter: the sentinel when absent.
  pub fn for_filter<F: QueryFilter>(filter: Option<&F>) -> Self {
    filter.map_or_else(Self::default_key, QueryFilter::cache_key)
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for FilterKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A filter value the cache can key queries by.
///
/// Implementations must be deterministic: two semantically equal filters must
/// return equal keys for the lifetime of the process.
pub trait QueryFilter: Clone + Send + Sync + 'static {
  /// Canonical cache identity for this filter.
  fn cache_key(&self) -> FilterKey;

  /// Variant of this filter with the pagination window opened to all rows.
  fn all(&self) -> Self;
}

// ============================================================================
// Shipped filter grammar
// ============================================================================

/// Sort direction for a [`Sort`] term.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  #[default]
  Ascending,
  Descending,
}

/// Sort term of a filter: a field name and a direction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
  pub field: String,
  pub order: SortOrder,
}

/// Caller-supplied query specification: criteria, sort, pagination window.
///
/// The string form is a whitespace-separated sequence of terms; `first=N`
/// (1-based window start), `rows=N` (page size, `-1` for all rows),
/// `sort=FIELD` and `sort-reverse=FIELD` are recognized keywords, everything
/// else is free criteria passed through to the server.
///
/// ```
/// use entq::{Filter, QueryFilter};
///
/// let a = Filter::parse("name~foo rows=10 first=1").unwrap();
/// let b = Filter::parse("  name~foo   first=1 rows=10 ").unwrap();
/// assert_eq!(a.cache_key(), b.cache_key());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
  criteria: Option<String>,
  sort: Option<Sort>,
  first: Option<u64>,
  rows: Option<i64>,
}

/// `rows` value that requests every row.
const ROWS_ALL: i64 = -1;

impl Filter {
  /// Empty filter: no criteria, no sort, server-default paging.
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse the keyword string form.
  ///
  /// Rejects malformed keyword values and control characters synchronously;
  /// a successfully constructed filter always canonicalizes.
  pub fn parse(input: &str) -> Result<Self, FilterError> {
    let mut filter = Filter::new();
    let mut criteria: Vec<&str> = Vec::new();

    for term in input.split_whitespace() {
      if term.chars().any(char::is_control) {
        return Err(FilterError::ControlCharacter);
      }

      if let Some(value) = term.strip_prefix("first=") {
        filter.first = Some(parse_count("first", value)?);
      } else if let Some(value) = term.strip_prefix("rows=") {
        filter.rows = Some(parse_rows(value)?);
      } else if let Some(field) = term.strip_prefix("sort-reverse=") {
        filter.sort = Some(sort_term("sort-reverse", field, SortOrder::Descending)?);
      } else if let Some(field) = term.strip_prefix("sort=") {
        filter.sort = Some(sort_term("sort", field, SortOrder::Ascending)?);
      } else {
        criteria.push(term);
      }
    }

    if !criteria.is_empty() {
      filter.criteria = Some(criteria.join(" "));
    }

    Ok(filter)
  }

  /// Set the 1-based start of the pagination window.
  pub fn with_first(mut self, first: u64) -> Self {
    self.first = Some(first.max(1));
    self
  }

  /// Set the page size.
  pub fn with_rows(mut self, rows: u64) -> Self {
    self.rows = Some(rows as i64);
    self
  }

  /// Set the sort term.
  pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
    self.sort = Some(Sort {
      field: field.into(),
      order,
    });
    self
  }

  pub fn criteria(&self) -> Option<&str> {
    self.criteria.as_deref()
  }

  pub fn sort(&self) -> Option<&Sort> {
    self.sort.as_ref()
  }

  /// 1-based start of the pagination window, if constrained.
  pub fn first(&self) -> Option<u64> {
    self.first
  }

  /// Page size; `Some(-1)` requests every row.
  pub fn rows(&self) -> Option<i64> {
    self.rows
  }

  /// Canonical term order: criteria, sort, first, rows.
  fn canonical(&self) -> String {
    let mut terms: Vec<String> = Vec::new();
    if let Some(criteria) = &self.criteria {
      terms.push(criteria.clone());
    }
    if let Some(sort) = &self.sort {
      match sort.order {
        SortOrder::Ascending => terms.push(format!("sort={}", sort.field)),
        SortOrder::Descending => terms.push(format!("sort-reverse={}", sort.field)),
      }
    }
    if let Some(first) = self.first {
      terms.push(format!("first={}", first));
    }
    if let Some(rows) = self.rows {
      terms.push(format!("rows={}", rows));
    }
    terms.join(" ")
  }
}

impl QueryFilter for Filter {
  fn cache_key(&self) -> FilterKey {
    let canonical = self.canonical();
    if canonical.is_empty() {
      // An unconstrained filter asks for the same thing as no filter at all.
      FilterKey::default_key()
    } else {
      FilterKey(canonical)
    }
  }

  fn all(&self) -> Self {
    Self {
      first: Some(1),
      rows: Some(ROWS_ALL),
      ..self.clone()
    }
  }
}

impl fmt::Display for Filter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.canonical())
  }
}

impl FromStr for Filter {
  type Err = FilterError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Filter::parse(s)
  }
}

fn parse_count(keyword: &'static str, value: &str) -> Result<u64, FilterError> {
  if value.is_empty() {
    return Err(FilterError::MissingValue { keyword });
  }
  match value.parse::<u64>() {
    Ok(n) if n >= 1 => Ok(n),
    _ => Err(FilterError::InvalidNumber {
      keyword,
      value: value.to_string(),
    }),
  }
}

fn parse_rows(value: &str) -> Result<i64, FilterError> {
  if value.is_empty() {
    return Err(FilterError::MissingValue { keyword: "rows" });
  }
  match value.parse::<i64>() {
    Ok(n) if n >= 1 || n == ROWS_ALL => Ok(n),
    _ => Err(FilterError::InvalidNumber {
      keyword: "rows",
      value: value.to_string(),
    }),
  }
}

fn sort_term(
  keyword: &'static str,
  field: &str,
  order: SortOrder,
) -> Result<Sort, FilterError> {
  if field.is_empty() {
    return Err(FilterError::MissingValue { keyword });
  }
  Ok(Sort {
    field: field.to_string(),
    order,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn equal_filters_share_a_key() {
    let a = Filter::parse("name~foo rows=10 first=1").unwrap();
    let b = Filter::parse("  name~foo   first=1  rows=10 ").unwrap();
    assert_eq!(a.cache_key(), b.cache_key());

    let built = Filter::new().with_first(1).with_rows(10);
    let parsed = Filter::parse("first=1 rows=10").unwrap();
    assert_eq!(built.cache_key(), parsed.cache_key());
  }

  #[test]
  fn canonical_string_round_trips() {
    let filter = Filter::parse("rows=10 severity>5 sort-reverse=created first=11").unwrap();
    let canonical = filter.to_string();
    assert_eq!(canonical, "severity>5 sort-reverse=created first=11 rows=10");
    assert_eq!(Filter::parse(&canonical).unwrap(), filter);
  }

  #[test]
  fn absent_and_empty_filters_map_to_the_sentinel() {
    assert_eq!(FilterKey::for_filter::<Filter>(None), FilterKey::default_key());
    assert_eq!(Filter::new().cache_key(), FilterKey::default_key());
    assert_eq!(Filter::parse("   ").unwrap().cache_key(), FilterKey::default_key());
  }

  #[test]
  fn all_opens_the_window() {
    let filter = Filter::parse("name~foo first=21 rows=10").unwrap();
    let all = filter.all();
    assert_eq!(all.criteria(), Some("name~foo"));
    assert_eq!(all.first(), Some(1));
    assert_eq!(all.rows(), Some(-1));
    assert_eq!(all.cache_key().as_str(), "name~foo first=1 rows=-1");
  }

  #[test]
  fn criteria_term_order_is_preserved() {
    let filter = Filter::parse("name~foo severity>5").unwrap();
    assert_eq!(filter.criteria(), Some("name~foo severity>5"));
    let swapped = Filter::parse("severity>5 name~foo").unwrap();
    assert_ne!(filter.cache_key(), swapped.cache_key());
  }

  #[test]
  fn malformed_terms_are_rejected() {
    assert_eq!(
      Filter::parse("rows=ten"),
      Err(FilterError::InvalidNumber {
        keyword: "rows",
        value: "ten".to_string()
      })
    );
    assert_eq!(
      Filter::parse("first=0"),
      Err(FilterError::InvalidNumber {
        keyword: "first",
        value: "0".to_string()
      })
    );
    assert_eq!(
      Filter::parse("sort="),
      Err(FilterError::MissingValue { keyword: "sort" })
    );
    assert_eq!(Filter::parse("name~\u{7}bell"), Err(FilterError::ControlCharacter));
  }

  #[test]
  fn rows_all_is_accepted() {
    let filter = Filter::parse("rows=-1").unwrap();
    assert_eq!(filter.rows(), Some(-1));
    assert_eq!(Filter::parse("rows=-2"), Err(FilterError::InvalidNumber {
      keyword: "rows",
      value: "-2".to_string()
    }));
  }
}
