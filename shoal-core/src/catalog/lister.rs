//! Range Lister: offset pagination with sort, keyword search and exact-id
//! lookup, generic over resource descriptors.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::bounded;
use crate::Result;
use crate::domain::{ListPage, ListQuery, ResourceDescriptor};
use crate::pagination::{PaginationResult, page_offset};
use crate::store::{CollectionStore, Filter};

/// Serves sorted, filtered pages of any resource type.
#[derive(Debug, Clone)]
pub struct RangeLister {
    store: Arc<dyn CollectionStore>,
    query_timeout: Duration,
}

impl RangeLister {
    pub fn new(store: Arc<dyn CollectionStore>, query_timeout: Duration) -> Self {
        Self {
            store,
            query_timeout,
        }
    }

    /// Returns one page of items plus pagination metadata.
    ///
    /// The count and the page fetch run concurrently. A page past the end
    /// yields empty data with the real page count.
    ///
    /// # Errors
    /// - `CatalogError::InvalidArgument` - zero page or limit, sort field not
    ///   sortable, category not allowed
    /// - `CatalogError::StorageUnavailable` - store failed or timed out
    pub async fn list(&self, descriptor: &ResourceDescriptor, query: &ListQuery) -> Result<ListPage> {
        query.validate()?;

        let sort = match &query.sort {
            Some(sort) => {
                descriptor.validate_sort(sort)?;
                sort.clone()
            }
            None => descriptor.default_sort(),
        };
        let filter = list_filter(descriptor, query)?;
        let skip = page_offset(query.page, query.limit);

        debug!(
            resource = %descriptor.resource,
            page = query.page,
            limit = query.limit,
            sort = %sort,
            keyword = ?query.keyword,
            exact_id = ?query.exact_id,
            "Listing"
        );

        let collection = descriptor.collection;
        let (total_count, data) = tokio::try_join!(
            bounded(
                "count",
                descriptor.resource,
                self.query_timeout,
                self.store.count(collection, &filter),
            ),
            bounded(
                "sorted_range",
                descriptor.resource,
                self.query_timeout,
                self.store
                    .sorted_range(collection, &filter, &sort, skip, query.limit),
            ),
        )?;

        Ok(ListPage {
            data,
            pagination_results: PaginationResult::compute(query.page, query.limit, total_count),
        })
    }
}

/// Builds the store filter: an exact id wins over a keyword, and the
/// category clause is ANDed with either.
fn list_filter(descriptor: &ResourceDescriptor, query: &ListQuery) -> Result<Filter> {
    let mut filter = Filter::all();
    if let Some(id) = &query.exact_id {
        filter = filter.with_id(id.clone());
    } else if let Some(keyword) = &query.keyword {
        filter = filter.with_keyword(descriptor.keyword_match(keyword));
    }
    if let Some(category) = &query.category {
        filter = filter.with_category(descriptor.category_match(category)?);
    }
    Ok(filter)
}
