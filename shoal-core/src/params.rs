//! Raw request parameters and their normalization into typed queries.
//!
//! Transports hand over loosely typed values (query strings, JSON bodies,
//! CLI flags). Everything is validated here against [`QueryConfig`] so the
//! lister and sampler only ever see well-formed queries.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::QueryConfig;
use crate::domain::{ExclusionSet, ItemId, ListQuery, SampleRequest, SortSpec};
use crate::{CatalogError, Result};

/// Listing parameters as received, e.g. from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub keyword: Option<String>,
    pub id: Option<String>,
    pub category: Option<String>,
}

impl ListParams {
    /// Validates and converts into a [`ListQuery`], applying defaults and
    /// clamping the page size.
    ///
    /// # Errors
    /// - `CatalogError::InvalidArgument` - non-integer or non-positive page or
    ///   limit, malformed sort expression, malformed identifier
    pub fn into_query(self, limits: &QueryConfig) -> Result<ListQuery> {
        let page = match non_blank(self.page) {
            Some(raw) => parse_positive("page", &raw)?,
            None => 1,
        };
        let requested = match non_blank(self.limit) {
            Some(raw) => parse_positive("limit", &raw)?,
            None => limits.default_limit,
        };
        let limit = requested.min(limits.max_limit);
        if limit < requested {
            debug!(requested, limit, "Clamped page size");
        }

        let mut query = ListQuery::new(page, limit);
        if let Some(sort) = non_blank(self.sort) {
            query = query.with_sort(sort.parse::<SortSpec>()?);
        }
        if let Some(id) = non_blank(self.id) {
            query = query.with_exact_id(id.parse::<ItemId>()?);
        }
        if let Some(keyword) = self.keyword {
            query = query.with_keyword(keyword);
        }
        if let Some(category) = non_blank(self.category) {
            query = query.with_category(category);
        }
        Ok(query)
    }
}

/// Sampling parameters as received in a JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SampleParams {
    pub category: Option<String>,
    pub batch_size: Option<i64>,
    pub exclude_ids: Vec<String>,
}

impl SampleParams {
    /// Validates and converts into a [`SampleRequest`].
    ///
    /// Duplicate exclusion identifiers collapse into one.
    ///
    /// # Errors
    /// - `CatalogError::InvalidArgument` - non-positive batch size or a
    ///   malformed exclusion identifier
    pub fn into_request(self, limits: &QueryConfig) -> Result<SampleRequest> {
        let requested = match self.batch_size {
            Some(size) if size >= 1 => size.unsigned_abs(),
            Some(size) => {
                return Err(CatalogError::invalid(
                    "batchSize",
                    format!("must be a positive integer, got {size}"),
                ));
            }
            None => limits.default_batch_size,
        };
        let batch_size = requested.min(limits.max_batch_size);
        if batch_size < requested {
            debug!(requested, batch_size, "Clamped batch size");
        }

        let exclude = self
            .exclude_ids
            .iter()
            .map(|raw| {
                raw.parse::<ItemId>().map_err(|_| {
                    CatalogError::invalid("excludeIds", format!("'{raw}' is not a valid identifier"))
                })
            })
            .collect::<Result<ExclusionSet>>()?;

        let mut request = SampleRequest::new(batch_size).excluding(exclude);
        if let Some(category) = non_blank(self.category) {
            request = request.with_category(category);
        }
        Ok(request)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_positive(field: &str, raw: &str) -> Result<u64> {
    match raw.parse::<u64>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(CatalogError::invalid(
            field,
            format!("must be a positive integer, got '{raw}'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SortDirection;

    fn limits() -> QueryConfig {
        QueryConfig::default()
    }

    fn list(page: Option<&str>, limit: Option<&str>) -> ListParams {
        ListParams {
            page: page.map(String::from),
            limit: limit.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_list_defaults() {
        let query = ListParams::default().into_query(&limits()).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 20);
        assert!(query.sort.is_none());
        assert!(query.keyword.is_none());
    }

    #[test]
    fn test_list_rejects_bad_numbers() {
        for (page, limit) in [
            (Some("0"), None),
            (Some("-1"), None),
            (Some("two"), None),
            (None, Some("0")),
            (None, Some("1.5")),
        ] {
            let err = list(page, limit).into_query(&limits()).unwrap_err();
            assert!(err.is_user_error(), "{page:?} {limit:?}");
        }
    }

    #[test]
    fn test_list_clamps_limit() {
        let query = list(Some("3"), Some("5000")).into_query(&limits()).unwrap();
        assert_eq!(query.page, 3);
        assert_eq!(query.limit, 100);
    }

    #[test]
    fn test_list_parses_sort_id_and_keyword() {
        let params = ListParams {
            sort: Some("-title".to_string()),
            id: Some("65a1f0c2e4b0a1b2c3d4e5f6".to_string()),
            keyword: Some("  ".to_string()),
            category: Some("".to_string()),
            ..Default::default()
        };
        let query = params.into_query(&limits()).unwrap();
        assert_eq!(query.sort, Some(SortSpec::new("title", SortDirection::Desc)));
        assert!(query.exact_id.is_some());
        assert!(query.keyword.is_none());
        assert!(query.category.is_none());

        let bad_id = ListParams {
            id: Some("xyz".to_string()),
            ..Default::default()
        };
        assert!(bad_id.into_query(&limits()).is_err());
    }

    #[test]
    fn test_sample_defaults_and_clamping() {
        let request = SampleParams::default().into_request(&limits()).unwrap();
        assert_eq!(request.batch_size, 10);
        assert!(request.exclude.is_empty());

        let request = SampleParams {
            batch_size: Some(1_000),
            ..Default::default()
        }
        .into_request(&limits())
        .unwrap();
        assert_eq!(request.batch_size, 50);

        let err = SampleParams {
            batch_size: Some(0),
            ..Default::default()
        }
        .into_request(&limits())
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument { ref field, .. } if field == "batchSize"));
    }

    #[test]
    fn test_sample_exclusions() {
        let id = "65a1f0c2e4b0a1b2c3d4e5f6".to_string();
        let request = SampleParams {
            exclude_ids: vec![id.clone(), id.clone()],
            category: Some("movie".to_string()),
            ..Default::default()
        }
        .into_request(&limits())
        .unwrap();
        assert_eq!(request.exclude.len(), 1);
        assert_eq!(request.category.as_deref(), Some("movie"));

        let err = SampleParams {
            exclude_ids: vec![id, "nope".to_string()],
            ..Default::default()
        }
        .into_request(&limits())
        .unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_sample_params_json_shape() {
        let params: SampleParams = serde_json::from_str(
            r#"{"category":"easy","batchSize":3,"excludeIds":["65a1f0c2e4b0a1b2c3d4e5f6"]}"#,
        )
        .unwrap();
        assert_eq!(params.batch_size, Some(3));
        assert_eq!(params.exclude_ids.len(), 1);

        let empty: SampleParams = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, SampleParams::default());
    }
}
