//! Item suggestions and category guesses.
//!
//! This is a placeholder integration point. Suggestions come from a fixed
//! vocabulary, and categorization goes through a [`Classifier`] whose failures
//! only ever mean "uncategorized".

use crate::{config::features::FeatureFlags, errors::Result};
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Categories an item name can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Things to wear
    Clothing,
    /// Devices and chargers
    Electronics,
    /// Hygiene and care products
    Toiletries,
    /// Something to do rather than pack
    Task,
    /// Anything else
    Other,
}

impl Category {
    /// Human-readable label, also stored as an item's category text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clothing => "Clothing",
            Self::Electronics => "Electronics",
            Self::Toiletries => "Toiletries",
            Self::Task => "Task",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One suggested item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Suggested category
    pub category: Category,
    /// Item name
    pub item: &'static str,
    /// Suggested count
    pub count: i32,
    /// When the suggestion applies
    pub context: &'static str,
}

const VOCABULARY: &[Suggestion] = &[
    Suggestion {
        category: Category::Clothing,
        item: "Rain jacket",
        count: 1,
        context: "Wet weather",
    },
    Suggestion {
        category: Category::Clothing,
        item: "Swimsuit",
        count: 1,
        context: "Beach",
    },
    Suggestion {
        category: Category::Clothing,
        item: "Thermal socks",
        count: 3,
        context: "Cold weather",
    },
    Suggestion {
        category: Category::Electronics,
        item: "Power adapter",
        count: 1,
        context: "International",
    },
    Suggestion {
        category: Category::Electronics,
        item: "Headlamp",
        count: 1,
        context: "Camping",
    },
    Suggestion {
        category: Category::Toiletries,
        item: "Sunscreen",
        count: 1,
        context: "Sunny",
    },
    Suggestion {
        category: Category::Toiletries,
        item: "Toothbrush",
        count: 1,
        context: "Any trip",
    },
    Suggestion {
        category: Category::Task,
        item: "Hold the mail",
        count: 1,
        context: "Long trip",
    },
    Suggestion {
        category: Category::Task,
        item: "Check passport expiry",
        count: 1,
        context: "International",
    },
];

/// Picks a random suggestion. Returns `None` unless plus is unlocked.
pub fn suggest<R>(features: &FeatureFlags, rng: &mut R) -> Option<Suggestion>
where
    R: Rng + ?Sized,
{
    if !features.has_unlocked_plus() {
        return None;
    }
    VOCABULARY.choose(rng).copied()
}

/// External text classifier.
pub trait Classifier {
    /// Guesses the category of an item name.
    fn classify(&self, item_name: &str) -> impl Future<Output = Result<Category>> + Send;
}

/// Keyword-matching classifier used when no external classifier is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Clothing,
        &[
            "shirt", "sock", "pant", "jacket", "coat", "hat", "dress", "shoe", "boot", "sweater",
            "underwear", "swimsuit",
        ],
    ),
    (
        Category::Electronics,
        &[
            "charger", "phone", "laptop", "cable", "adapter", "camera", "headphone", "battery",
            "headlamp",
        ],
    ),
    (
        Category::Toiletries,
        &[
            "tooth", "shampoo", "soap", "deodorant", "razor", "sunscreen", "lotion", "brush",
        ],
    ),
    (
        Category::Task,
        &[
            "water", "lock", "book", "cancel", "check", "call", "pay", "empty", "turn off",
        ],
    ),
];

impl KeywordClassifier {
    /// Synchronous keyword lookup; unmatched names are [`Category::Other`].
    #[must_use]
    pub fn lookup(item_name: &str) -> Category {
        let name = item_name.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|word| name.contains(word)))
            .map_or(Category::Other, |(category, _)| *category)
    }
}

impl Classifier for KeywordClassifier {
    async fn classify(&self, item_name: &str) -> Result<Category> {
        Ok(Self::lookup(item_name))
    }
}

/// Classifies an item name, treating any classifier failure as [`Category::Other`].
pub async fn classify<C>(classifier: &C, item_name: &str) -> Category
where
    C: Classifier,
{
    match classifier.classify(item_name).await {
        Ok(category) => category,
        Err(e) => {
            tracing::warn!("Classification of {:?} failed: {}", item_name, e);
            Category::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use rand::{SeedableRng, rngs::StdRng};

    struct BrokenClassifier;

    impl Classifier for BrokenClassifier {
        async fn classify(&self, _item_name: &str) -> Result<Category> {
            Err(Error::Config {
                message: "model unavailable".to_string(),
            })
        }
    }

    #[test]
    fn test_suggest_requires_plus() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(suggest(&FeatureFlags::free(), &mut rng).is_none());
    }

    #[test]
    fn test_suggest_picks_from_vocabulary() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let suggestion = suggest(&FeatureFlags::plus(), &mut rng);
            assert!(suggestion.is_some_and(|s| VOCABULARY.contains(&s) && s.count >= 1));
        }
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(KeywordClassifier::lookup("Wool Socks"), Category::Clothing);
        assert_eq!(KeywordClassifier::lookup("USB-C charger"), Category::Electronics);
        assert_eq!(KeywordClassifier::lookup("Toothpaste"), Category::Toiletries);
        assert_eq!(KeywordClassifier::lookup("Water the plants"), Category::Task);
        assert_eq!(KeywordClassifier::lookup("Trail mix"), Category::Other);
    }

    #[tokio::test]
    async fn test_classify_uses_classifier() {
        assert_eq!(
            classify(&KeywordClassifier, "Rain jacket").await,
            Category::Clothing
        );
    }

    #[tokio::test]
    async fn test_classify_failure_is_uncategorized() {
        assert_eq!(classify(&BrokenClassifier, "Rain jacket").await, Category::Other);
    }
}
