//! Per-call query types for listing and sampling.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::item::{Item, ItemId, compare_fields};
use crate::CatalogError;

/// Ordering direction for sorted listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl SortDirection {
    /// Applies this direction to an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Sort field plus direction.
///
/// Parsed from `field`, `+field` or `-field`; a leading `-` means descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Creates a sort specification.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Compares two items by the sort field, breaking ties by ascending id.
    ///
    /// The tie-break ignores `direction` so that equal sort values always
    /// come back in the same order.
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        self.direction
            .apply(compare_fields(a.field(&self.field), b.field(&self.field)))
            .then_with(|| a.id.cmp(&b.id))
    }
}

impl FromStr for SortSpec {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (direction, field) = match s.strip_prefix('-') {
            Some(rest) => (SortDirection::Desc, rest),
            None => (SortDirection::Asc, s.strip_prefix('+').unwrap_or(s)),
        };
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(CatalogError::invalid(
                "sort",
                format!("'{s}' is not a valid sort expression"),
            ));
        }
        Ok(Self::new(field, direction))
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Asc => write!(f, "{}", self.field),
            SortDirection::Desc => write!(f, "-{}", self.field),
        }
    }
}

/// Identifiers already delivered to a client during one browsing session.
///
/// Immutable once built in practice; clones share the underlying set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    ids: Arc<HashSet<ItemId>>,
}

impl ExclusionSet {
    /// Creates an empty exclusion set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.ids.contains(id)
    }

    /// Adds an identifier, returning `false` if it was already present.
    pub fn insert(&mut self, id: ItemId) -> bool {
        Arc::make_mut(&mut self.ids).insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.ids.iter()
    }
}

impl FromIterator<ItemId> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = ItemId>>(iter: I) -> Self {
        Self {
            ids: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl Extend<ItemId> for ExclusionSet {
    fn extend<I: IntoIterator<Item = ItemId>>(&mut self, iter: I) {
        Arc::make_mut(&mut self.ids).extend(iter);
    }
}

/// Offset pagination request for the Range Lister.
///
/// `exact_id` and `keyword` are alternative filter modes; when both are set
/// the identifier lookup wins and the keyword is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u64,
    pub limit: u64,
    pub sort: Option<SortSpec>,
    pub keyword: Option<String>,
    pub exact_id: Option<ItemId>,
    pub category: Option<String>,
}

impl ListQuery {
    /// Creates a query for one page with the descriptor's default sort.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page,
            limit,
            sort: None,
            keyword: None,
            exact_id: None,
            category: None,
        }
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the search keyword; blank keywords clear it.
    pub fn with_keyword(mut self, keyword: impl AsRef<str>) -> Self {
        let trimmed = keyword.as_ref().trim();
        self.keyword = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_exact_id(mut self, id: ItemId) -> Self {
        self.exact_id = Some(id);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Checks page and limit bounds.
    ///
    /// # Errors
    /// - `CatalogError::InvalidArgument` - page or limit is zero
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.page == 0 {
            return Err(CatalogError::invalid("page", "must be at least 1"));
        }
        if self.limit == 0 {
            return Err(CatalogError::invalid("limit", "must be at least 1"));
        }
        Ok(())
    }
}

/// Randomized batch request for the Exclusion Sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRequest {
    pub category: Option<String>,
    pub batch_size: u64,
    pub exclude: ExclusionSet,
}

impl SampleRequest {
    /// Creates a first-call request with an empty exclusion set.
    pub fn new(batch_size: u64) -> Self {
        Self {
            category: None,
            batch_size,
            exclude: ExclusionSet::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Replaces the exclusion set.
    pub fn excluding(mut self, exclude: ExclusionSet) -> Self {
        self.exclude = exclude;
        self
    }

    /// Checks the batch size bound.
    ///
    /// # Errors
    /// - `CatalogError::InvalidArgument` - batch size is zero
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.batch_size == 0 {
            return Err(CatalogError::invalid("batchSize", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> ItemId {
        ItemId::from_bytes([n; 12])
    }

    #[test]
    fn test_sort_spec_parsing() {
        let desc: SortSpec = "-createdAt".parse().unwrap();
        assert_eq!(desc, SortSpec::new("createdAt", SortDirection::Desc));
        let asc: SortSpec = "+title".parse().unwrap();
        assert_eq!(asc, SortSpec::new("title", SortDirection::Asc));
        assert_eq!(desc.to_string(), "-createdAt");

        assert!("".parse::<SortSpec>().is_err());
        assert!("-".parse::<SortSpec>().is_err());
        assert!("title; drop".parse::<SortSpec>().is_err());
    }

    #[test]
    fn test_sort_ties_break_by_id_in_both_directions() {
        let a = Item::new(id(1)).with_field("rank", 5i64);
        let b = Item::new(id(2)).with_field("rank", 5i64);

        let asc = SortSpec::new("rank", SortDirection::Asc);
        let desc = SortSpec::new("rank", SortDirection::Desc);
        assert_eq!(asc.compare(&a, &b), Ordering::Less);
        assert_eq!(desc.compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_blank_keyword_is_cleared() {
        let query = ListQuery::new(1, 10).with_keyword("   ");
        assert_eq!(query.keyword, None);
        let query = ListQuery::new(1, 10).with_keyword("  abc ");
        assert_eq!(query.keyword.as_deref(), Some("abc"));
    }

    #[test]
    fn test_validation_rejects_zero_bounds() {
        assert!(ListQuery::new(0, 10).validate().is_err());
        assert!(ListQuery::new(1, 0).validate().is_err());
        assert!(ListQuery::new(1, 1).validate().is_ok());
        assert!(SampleRequest::new(0).validate().is_err());
    }

    #[test]
    fn test_exclusion_set_clones_share_until_written() {
        let mut first: ExclusionSet = [id(1), id(2)].into_iter().collect();
        let snapshot = first.clone();
        assert!(first.insert(id(3)));
        assert!(!first.insert(id(3)));
        assert_eq!(first.len(), 3);
        assert_eq!(snapshot.len(), 2);
    }
}
