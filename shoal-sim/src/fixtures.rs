//! Deterministic synthetic catalogs.
//!
//! The same seed always produces the same items, identifiers and shuffle
//! keys, so tests can assert on exact contents.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shoal_core::{Item, ItemId, MemoryStore, ResourceType};
use tracing::debug;

use crate::content_database::{
    DESCRIPTION_OPENERS, DESCRIPTION_SUBJECTS, FLASHCARD_BANK, QUIZ_BANK, TITLE_ADJECTIVES,
    TITLE_NOUNS,
};

/// Builder of reproducible catalog contents.
#[derive(Debug, Clone)]
pub struct CatalogFixture {
    rng: ChaCha8Rng,
    items_per_resource: usize,
    epoch: DateTime<Utc>,
}

impl CatalogFixture {
    /// Creates a fixture producing `items_per_resource` items per type.
    pub fn new(seed: u64, items_per_resource: usize) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            items_per_resource,
            epoch: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single().unwrap_or_default(),
        }
    }

    /// Creates a fixture seeded from the OS.
    pub fn random(items_per_resource: usize) -> Self {
        Self::new(rand::rng().random(), items_per_resource)
    }

    /// Generates items for one resource type.
    pub fn generate(&mut self, resource: ResourceType) -> Vec<Item> {
        (0..self.items_per_resource)
            .map(|index| self.item(resource, index))
            .collect()
    }

    /// Generates items for every resource type.
    pub fn generate_all(&mut self) -> BTreeMap<ResourceType, Vec<Item>> {
        ResourceType::ALL
            .iter()
            .map(|&resource| (resource, self.generate(resource)))
            .collect()
    }

    /// Inserts a generated catalog into the store, returning per-type counts.
    pub async fn populate(&mut self, store: &MemoryStore) -> BTreeMap<ResourceType, usize> {
        let mut counts = BTreeMap::new();
        for (resource, items) in self.generate_all() {
            counts.insert(resource, items.len());
            store
                .insert_many(resource.descriptor().collection, items)
                .await;
        }
        debug!(?counts, "Populated synthetic catalog");
        counts
    }

    fn item(&mut self, resource: ResourceType, index: usize) -> Item {
        let created = self.epoch
            + Duration::hours(index as i64 * 6)
            + Duration::minutes(self.rng.random_range(0..360));
        let updated = created + Duration::days(self.rng.random_range(0..90));

        let item = Item::new(self.item_id(created))
            .with_shuffle_key(self.rng.random())
            .with_field("createdAt", created)
            .with_field("updatedAt", updated);

        match resource {
            ResourceType::Playlist => {
                let kind = self.pick(&["movie", "series"]);
                item.with_field("title", self.title())
                    .with_field("description", self.description())
                    .with_field("type", kind)
            }
            ResourceType::Episode => item
                .with_field("title", self.title())
                .with_field("episodeNumber", (index % 12 + 1) as i64)
                .with_field("season", (index / 12 + 1) as i64),
            ResourceType::Video => {
                let kind = self.pick(&["movie", "trailer", "clip"]);
                let duration: i64 = match kind {
                    "movie" => self.rng.random_range(4_800..9_000),
                    "trailer" => self.rng.random_range(60..180),
                    _ => self.rng.random_range(15..600),
                };
                item.with_field("title", self.title())
                    .with_field("description", self.description())
                    .with_field("type", kind)
                    .with_field("duration", duration)
            }
            ResourceType::Quiz => {
                let (question, answer) = QUIZ_BANK[index % QUIZ_BANK.len()];
                let difficulty = self.pick(&["easy", "medium", "hard"]);
                item.with_field("question", format!("{question} (#{})", index + 1))
                    .with_field("answer", answer)
                    .with_field("difficulty", difficulty)
            }
            ResourceType::Flashcard => {
                let (front, back) = FLASHCARD_BANK[index % FLASHCARD_BANK.len()];
                item.with_field("front", format!("{front} {}", index + 1))
                    .with_field("back", back)
            }
        }
    }

    fn item_id(&mut self, created: DateTime<Utc>) -> ItemId {
        let seconds = created.timestamp().clamp(0, i64::from(u32::MAX)) as u32;
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        self.rng.fill(&mut bytes[4..]);
        ItemId::from_bytes(bytes)
    }

    fn pick(&mut self, options: &[&'static str]) -> &'static str {
        options[self.rng.random_range(0..options.len())]
    }

    fn title(&mut self) -> String {
        let adjective = self.pick(TITLE_ADJECTIVES);
        let noun = self.pick(TITLE_NOUNS);
        format!("The {adjective} {noun}")
    }

    fn description(&mut self) -> String {
        let opener = self.pick(DESCRIPTION_OPENERS);
        let subject = self.pick(DESCRIPTION_SUBJECTS);
        format!("{opener} {subject}.")
    }
}
