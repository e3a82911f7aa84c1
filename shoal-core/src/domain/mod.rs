//! Domain types shared by the lister, the sampler and the store adapters.

pub mod item;
pub mod page;
pub mod query;
pub mod resource;

pub use item::{FieldValue, Item, ItemId, Timestamp};
pub use page::{ListPage, SampleResult};
pub use query::{ExclusionSet, ListQuery, SampleRequest, SortDirection, SortSpec};
pub use resource::{CategoryField, ResourceDescriptor, ResourceRegistry, ResourceType};
