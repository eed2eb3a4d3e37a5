//! Passage source: category-keyed quote sets embedded at build time.

use crate::config::Mode;
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;

static QUOTE_DIR: Dir = include_dir!("src/quotes");

/// Shown when a category file is missing or empty at runtime; sessions must
/// never start with an empty target.
const FALLBACK_PASSAGE: &str = "The quick brown fox jumps over the lazy dog.";

/// Passage category selectable from the CLI and the persisted config.
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    General,
    Technology,
    Code,
}

impl Category {
    /// Resolve a persisted category name; anything unknown falls back to
    /// the default set rather than failing.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "technology" => Category::Technology,
            "code" => Category::Code,
            _ => Category::General,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct QuoteSet {
    pub name: String,
    pub passages: Vec<String>,
}

impl QuoteSet {
    /// Load the embedded set for a category, falling back to the general
    /// set (and, last resort, a built-in passage) when a set is empty.
    pub fn load(category: Category) -> Self {
        read_quote_set(category)
            .or_else(|| read_quote_set(Category::General))
            .unwrap_or_else(|| QuoteSet {
                name: "fallback".to_string(),
                passages: vec![FALLBACK_PASSAGE.to_string()],
            })
    }

    fn random_passage(&self) -> &str {
        self.passages
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(FALLBACK_PASSAGE)
    }

    /// Concatenate random passages until the word goal is met, then trim to
    /// exactly `word_count` whitespace-separated words.
    fn passage_with_word_count(&self, word_count: usize) -> String {
        let mut text = self.random_passage().to_string();
        while text.split_whitespace().count() < word_count {
            text.push(' ');
            text.push_str(self.random_passage());
        }
        text.split_whitespace()
            .take(word_count)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn read_quote_set(category: Category) -> Option<QuoteSet> {
    let file = QUOTE_DIR.get_file(format!("{category}.json"))?;
    let set: QuoteSet = serde_json::from_str(file.contents_utf8()?).ok()?;
    if set.passages.iter().all(|p| p.trim().is_empty()) {
        return None;
    }
    Some(set)
}

/// Configuration for passage generation
#[derive(Debug, Clone)]
pub struct PassageConfig {
    pub category: Category,
    pub mode: Mode,
    pub word_count: usize,
    pub custom_passage: Option<String>,
}

/// Supplies the target text for one session.
pub struct PassageSource {
    config: PassageConfig,
}

impl PassageSource {
    pub fn new(config: PassageConfig) -> Self {
        Self { config }
    }

    /// Generate a non-empty target passage per the configuration.
    pub fn generate(&self) -> String {
        if let Some(ref custom) = self.config.custom_passage {
            if !custom.trim().is_empty() {
                return custom.clone();
            }
        }

        let set = QuoteSet::load(self.config.category);
        match self.config.mode {
            Mode::Time => set.random_passage().to_string(),
            Mode::Words => set.passage_with_word_count(self.config.word_count.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(category: Category, mode: Mode, word_count: usize) -> PassageSource {
        PassageSource::new(PassageConfig {
            category,
            mode,
            word_count,
            custom_passage: None,
        })
    }

    #[test]
    fn test_all_categories_load() {
        for category in [Category::General, Category::Technology, Category::Code] {
            let set = QuoteSet::load(category);
            assert_eq!(set.name, category.to_string());
            assert!(!set.passages.is_empty());
        }
    }

    #[test]
    fn test_time_mode_picks_a_known_passage() {
        let set = QuoteSet::load(Category::Technology);
        let passage = source(Category::Technology, Mode::Time, 10).generate();
        assert!(set.passages.contains(&passage));
    }

    #[test]
    fn test_words_mode_hits_exact_word_count() {
        for goal in [1, 5, 10, 50] {
            let passage = source(Category::General, Mode::Words, goal).generate();
            assert_eq!(passage.split_whitespace().count(), goal);
        }
    }

    #[test]
    fn test_words_mode_spans_multiple_passages() {
        // no single general passage has 40 words
        let passage = source(Category::General, Mode::Words, 40).generate();
        assert_eq!(passage.split_whitespace().count(), 40);
    }

    #[test]
    fn test_zero_word_goal_still_yields_text() {
        let passage = source(Category::General, Mode::Words, 0).generate();
        assert!(!passage.is_empty());
    }

    #[test]
    fn test_custom_passage_wins() {
        let mut config = PassageConfig {
            category: Category::Code,
            mode: Mode::Time,
            word_count: 10,
            custom_passage: Some("custom target".to_string()),
        };
        assert_eq!(PassageSource::new(config.clone()).generate(), "custom target");

        // a blank custom passage falls through to the category set
        config.custom_passage = Some("   ".to_string());
        assert!(!PassageSource::new(config).generate().trim().is_empty());
    }

    #[test]
    fn test_unknown_category_name_falls_back_to_general() {
        assert_eq!(Category::from_name("no-such-set"), Category::General);
        assert_eq!(Category::from_name("Technology"), Category::Technology);
        assert_eq!(Category::from_name(" code "), Category::Code);
    }

    #[test]
    fn test_generated_passage_is_never_empty() {
        for category in [Category::General, Category::Technology, Category::Code] {
            for mode in [Mode::Time, Mode::Words] {
                let passage = source(category, mode, 12).generate();
                assert!(!passage.is_empty());
            }
        }
    }
}
