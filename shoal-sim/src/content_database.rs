//! Word lists used to build believable synthetic catalog entries.

/// Adjectives combined with nouns into titles.
pub const TITLE_ADJECTIVES: &[&str] = &[
    "Hidden", "Silent", "Deep", "Electric", "Frozen", "Golden", "Restless", "Tidal", "Midnight",
    "Coral", "Sunken", "Drifting", "Luminous", "Northern", "Wild",
];

/// Nouns combined with adjectives into titles.
pub const TITLE_NOUNS: &[&str] = &[
    "Reef", "Current", "Lagoon", "Harbor", "Abyss", "Shoal", "Horizon", "Kelp Forest", "Trench",
    "Archipelago", "Lighthouse", "Estuary", "Atoll", "Swell", "Undertow",
];

/// Openers for descriptions.
pub const DESCRIPTION_OPENERS: &[&str] = &[
    "A journey through",
    "An intimate portrait of",
    "The untold story of",
    "A season spent exploring",
    "Life and survival in",
];

/// Subjects for descriptions.
pub const DESCRIPTION_SUBJECTS: &[&str] = &[
    "the world's largest coral systems",
    "creatures of the midnight zone",
    "a fishing village on the edge of change",
    "migrating whales and their calves",
    "the scientists mapping the sea floor",
    "storms that reshape the coastline",
];

/// Quiz questions paired with their answers.
pub const QUIZ_BANK: &[(&str, &str)] = &[
    ("Which ocean is the deepest?", "Pacific"),
    ("What is a group of fish called?", "A school or shoal"),
    ("Which animal has three hearts?", "Octopus"),
    ("What percentage of Earth is covered by oceans?", "About 71%"),
    ("What is the largest living structure on Earth?", "The Great Barrier Reef"),
    ("How do dolphins sleep?", "With one brain hemisphere at a time"),
    ("What causes ocean tides?", "The Moon's gravity"),
    ("Which fish can walk on land?", "Mudskipper"),
];

/// Flashcard fronts paired with backs.
pub const FLASHCARD_BANK: &[(&str, &str)] = &[
    ("Bioluminescence", "Light produced by living organisms"),
    ("Thermocline", "Layer where water temperature changes rapidly with depth"),
    ("Plankton", "Drifting organisms that cannot swim against currents"),
    ("Salinity", "Concentration of dissolved salts in water"),
    ("Upwelling", "Rising of cold, nutrient-rich water toward the surface"),
    ("Atoll", "Ring-shaped reef enclosing a lagoon"),
    ("Benthic", "Relating to the bottom of a body of water"),
];
