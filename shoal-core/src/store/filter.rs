//! Filter clauses understood by every collection store.

use crate::domain::{ExclusionSet, Item, ItemId};

/// Case-insensitive substring match over one or more text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub fields: Vec<String>,
    needle: String,
}

impl KeywordMatch {
    pub fn new(fields: &[&str], keyword: &str) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            needle: keyword.trim().to_lowercase(),
        }
    }

    /// Lowercased keyword.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// True when any of the fields contains the keyword.
    pub fn matches(&self, item: &Item) -> bool {
        self.fields.iter().any(|field| {
            item.field(field)
                .and_then(|value| value.as_text())
                .is_some_and(|text| text.to_lowercase().contains(&self.needle))
        })
    }
}

/// Exact match on an enum-valued category field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    pub field: String,
    pub value: String,
}

impl CategoryMatch {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        item.field(&self.field).and_then(|value| value.as_text()) == Some(self.value.as_str())
    }
}

/// Conjunction of the optional clauses; an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub id: Option<ItemId>,
    pub keyword: Option<KeywordMatch>,
    pub category: Option<CategoryMatch>,
    pub exclude: ExclusionSet,
}

impl Filter {
    /// Filter matching every item.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_keyword(mut self, keyword: KeywordMatch) -> Self {
        self.keyword = Some(keyword);
        self
    }

    pub fn with_category(mut self, category: CategoryMatch) -> Self {
        self.category = Some(category);
        self
    }

    pub fn excluding(mut self, exclude: ExclusionSet) -> Self {
        self.exclude = exclude;
        self
    }

    /// Evaluates every clause against an item.
    pub fn matches(&self, item: &Item) -> bool {
        self.id.as_ref().is_none_or(|id| *id == item.id)
            && !self.exclude.contains(&item.id)
            && self.category.as_ref().is_none_or(|c| c.matches(item))
            && self.keyword.as_ref().is_none_or(|k| k.matches(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: u8, title: &str, kind: &str) -> Item {
        Item::new(ItemId::from_bytes([n; 12]))
            .with_field("title", title)
            .with_field("type", kind)
    }

    #[test]
    fn test_keyword_is_case_insensitive_substring() {
        let keyword = KeywordMatch::new(&["title", "description"], "ABC");
        assert!(keyword.matches(&item(1, "xxabcxx", "movie")));
        assert!(keyword.matches(&item(2, "ABCdef", "movie")));
        assert!(!keyword.matches(&item(3, "a-b-c", "movie")));
    }

    #[test]
    fn test_keyword_checks_any_field() {
        let keyword = KeywordMatch::new(&["title", "description"], "reef");
        let described = item(1, "Untitled", "series").with_field("description", "A Reef story");
        assert!(keyword.matches(&described));
    }

    #[test]
    fn test_keyword_finds_date_like_text() {
        let raw = r#"{"id": "65a1f0c2e4b0a1b2c3d4e5f6", "title": "2024-05-01T10:00:00+02:00"}"#;
        let dated: Item = serde_json::from_str(raw).unwrap();
        assert!(KeywordMatch::new(&["title"], "10:00:00+02").matches(&dated));
    }

    #[test]
    fn test_filter_clauses_are_anded() {
        let target = item(1, "Deep Blue", "series");
        let filter = Filter::all()
            .with_keyword(KeywordMatch::new(&["title"], "blue"))
            .with_category(CategoryMatch::new("type", "movie"));
        assert!(!filter.matches(&target));

        let filter = Filter::all()
            .with_keyword(KeywordMatch::new(&["title"], "blue"))
            .with_category(CategoryMatch::new("type", "series"));
        assert!(filter.matches(&target));
    }

    #[test]
    fn test_exclusion_and_id_clauses() {
        let target = item(7, "Tide", "movie");
        let excluded: ExclusionSet = [target.id.clone()].into_iter().collect();
        assert!(!Filter::all().excluding(excluded).matches(&target));
        assert!(Filter::all().with_id(target.id.clone()).matches(&target));
        assert!(
            !Filter::all()
                .with_id(ItemId::from_bytes([8; 12]))
                .matches(&target)
        );
    }
}
