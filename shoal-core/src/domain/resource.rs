//! Resource descriptors: the static per-type configuration that makes the
//! lister and sampler generic over playlists, episodes, videos, quizzes and
//! flashcards.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::query::{SortDirection, SortSpec};
use crate::CatalogError;
use crate::store::{CategoryMatch, KeywordMatch};

/// Content categories sharing the List/Sample contract.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Playlist,
    Episode,
    Video,
    Quiz,
    Flashcard,
}

impl ResourceType {
    /// Every resource type, in display order.
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Playlist,
        ResourceType::Episode,
        ResourceType::Video,
        ResourceType::Quiz,
        ResourceType::Flashcard,
    ];

    /// Built-in descriptor for this resource type.
    pub fn descriptor(self) -> &'static ResourceDescriptor {
        match self {
            ResourceType::Playlist => &PLAYLISTS,
            ResourceType::Episode => &EPISODES,
            ResourceType::Video => &VIDEOS,
            ResourceType::Quiz => &QUIZZES,
            ResourceType::Flashcard => &FLASHCARDS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Playlist => "playlist",
            ResourceType::Episode => "episode",
            ResourceType::Video => "video",
            ResourceType::Quiz => "quiz",
            ResourceType::Flashcard => "flashcard",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = CatalogError;

    /// Accepts singular and plural names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "playlist" | "playlists" => Ok(ResourceType::Playlist),
            "episode" | "episodes" => Ok(ResourceType::Episode),
            "video" | "videos" => Ok(ResourceType::Video),
            "quiz" | "quizzes" => Ok(ResourceType::Quiz),
            "flashcard" | "flashcards" => Ok(ResourceType::Flashcard),
            _ => Err(CatalogError::UnknownResource {
                name: s.to_string(),
            }),
        }
    }
}

/// Enum-valued field usable as a category filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryField {
    pub field: &'static str,
    pub values: &'static [&'static str],
}

/// Static configuration for one content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub resource: ResourceType,
    pub collection: &'static str,
    pub id_field: &'static str,
    pub default_sort_field: &'static str,
    pub default_sort_direction: SortDirection,
    pub sortable: &'static [&'static str],
    pub searchable: &'static [&'static str],
    pub category: Option<CategoryField>,
}

impl ResourceDescriptor {
    /// Sort applied when a listing request names none.
    pub fn default_sort(&self) -> SortSpec {
        SortSpec::new(self.default_sort_field, self.default_sort_direction)
    }

    /// Checks that the sort field is one this resource allows.
    ///
    /// # Errors
    /// - `CatalogError::InvalidArgument` - field is not sortable
    pub fn validate_sort(&self, sort: &SortSpec) -> Result<(), CatalogError> {
        if self.sortable.contains(&sort.field.as_str()) {
            Ok(())
        } else {
            Err(CatalogError::invalid(
                "sort",
                format!(
                    "'{}' is not sortable for {}; allowed: {}",
                    sort.field,
                    self.resource,
                    self.sortable.join(", ")
                ),
            ))
        }
    }

    /// Resolves a category value into a store filter clause.
    ///
    /// # Errors
    /// - `CatalogError::InvalidArgument` - resource has no category field, or
    ///   the value is not one of its allowed values
    pub fn category_match(&self, value: &str) -> Result<CategoryMatch, CatalogError> {
        let Some(category) = self.category else {
            return Err(CatalogError::invalid(
                "category",
                format!("{} does not support category filtering", self.resource),
            ));
        };
        if !category.values.contains(&value) {
            return Err(CatalogError::invalid(
                "category",
                format!(
                    "'{value}' is not a valid {}; allowed: {}",
                    category.field,
                    category.values.join(", ")
                ),
            ));
        }
        Ok(CategoryMatch::new(category.field, value))
    }

    /// Builds the case-insensitive keyword clause over the searchable fields.
    pub fn keyword_match(&self, keyword: &str) -> KeywordMatch {
        KeywordMatch::new(self.searchable, keyword)
    }
}

pub static PLAYLISTS: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::Playlist,
    collection: "playlists",
    id_field: "id",
    default_sort_field: "createdAt",
    default_sort_direction: SortDirection::Desc,
    sortable: &["createdAt", "updatedAt", "title"],
    searchable: &["title", "description"],
    category: Some(CategoryField {
        field: "type",
        values: &["movie", "series"],
    }),
};

pub static EPISODES: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::Episode,
    collection: "episodes",
    id_field: "id",
    default_sort_field: "createdAt",
    default_sort_direction: SortDirection::Desc,
    sortable: &["createdAt", "updatedAt", "title", "episodeNumber"],
    searchable: &["title"],
    category: None,
};

pub static VIDEOS: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::Video,
    collection: "videos",
    id_field: "id",
    default_sort_field: "createdAt",
    default_sort_direction: SortDirection::Desc,
    sortable: &["createdAt", "updatedAt", "title", "duration"],
    searchable: &["title", "description"],
    category: Some(CategoryField {
        field: "type",
        values: &["movie", "trailer", "clip"],
    }),
};

pub static QUIZZES: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::Quiz,
    collection: "quizzes",
    id_field: "id",
    default_sort_field: "createdAt",
    default_sort_direction: SortDirection::Desc,
    sortable: &["createdAt", "updatedAt", "question"],
    searchable: &["question"],
    category: Some(CategoryField {
        field: "difficulty",
        values: &["easy", "medium", "hard"],
    }),
};

pub static FLASHCARDS: ResourceDescriptor = ResourceDescriptor {
    resource: ResourceType::Flashcard,
    collection: "flashcards",
    id_field: "id",
    default_sort_field: "createdAt",
    default_sort_direction: SortDirection::Desc,
    sortable: &["createdAt", "updatedAt", "front"],
    searchable: &["front", "back"],
    category: None,
};

/// Process-wide table of descriptors, built once at startup.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    descriptors: HashMap<ResourceType, ResourceDescriptor>,
}

impl ResourceRegistry {
    /// Registry holding the built-in descriptor for every resource type.
    pub fn standard() -> Self {
        ResourceType::ALL
            .iter()
            .map(|resource| resource.descriptor().clone())
            .collect()
    }

    pub fn get(&self, resource: ResourceType) -> Option<&ResourceDescriptor> {
        self.descriptors.get(&resource)
    }

    /// Looks up a descriptor by resource name (singular or plural).
    ///
    /// # Errors
    /// - `CatalogError::UnknownResource` - name unknown or not registered
    pub fn resolve(&self, name: &str) -> Result<&ResourceDescriptor, CatalogError> {
        let resource: ResourceType = name.parse()?;
        self.get(resource).ok_or_else(|| CatalogError::UnknownResource {
            name: name.to_string(),
        })
    }

    /// Descriptors ordered by resource type.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        let mut all: Vec<_> = self.descriptors.values().collect();
        all.sort_by_key(|d| d.resource);
        all.into_iter()
    }
}

impl FromIterator<ResourceDescriptor> for ResourceRegistry {
    fn from_iter<I: IntoIterator<Item = ResourceDescriptor>>(iter: I) -> Self {
        Self {
            descriptors: iter.into_iter().map(|d| (d.resource, d)).collect(),
        }
    }
}
