//! Structural quality checks for generated article fragments.

use std::sync::LazyLock;

use scraper::{Html, Selector};

/// Phrases that give away machine-written text. Matched case-insensitively.
pub const AI_DISCLOSURE_PHRASES: &[&str] = &[
    "as an ai",
    "i am an ai",
    "i'm an ai assistant",
    "as a large language model",
    "i'm designed to",
    "i cannot",
    "i don't have personal",
    "i don't have",
];

/// Minimum `<h2>` sections for an article to count as well structured.
pub const MIN_SECTIONS: usize = 4;

/// Counts describing an article fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityReport {
    pub word_count: usize,
    pub h2_count: usize,
    pub h3_count: usize,
    pub list_count: usize,
    pub paragraph_count: usize,
    pub image_count: usize,
    /// Disclosure phrases found in the visible text.
    pub ai_phrases: Vec<&'static str>,
}

impl QualityReport {
    /// Whether the article reaches the word-count target.
    pub fn meets_length(&self, min_words: usize) -> bool {
        self.word_count >= min_words
    }

    /// At least [`MIN_SECTIONS`] `<h2>` sections.
    pub fn has_sections(&self) -> bool {
        self.h2_count >= MIN_SECTIONS
    }

    /// Length reached, sectioned with `<h2>`, and no disclosure phrases.
    pub fn is_publishable(&self, min_words: usize) -> bool {
        self.meets_length(min_words) && self.h2_count > 0 && self.ai_phrases.is_empty()
    }
}

/// Whitespace-delimited token count, tags included.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Analyze an HTML fragment.
pub fn analyze(fragment: &str) -> QualityReport {
    static H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").expect("valid"));
    static H3: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").expect("valid"));
    static LISTS: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("ul, ol").expect("valid"));
    static PARAS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").expect("valid"));
    static IMGS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").expect("valid"));

    let doc = Html::parse_fragment(fragment);
    let text = doc
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace('\u{2019}', "'");

    let ai_phrases = AI_DISCLOSURE_PHRASES
        .iter()
        .copied()
        .filter(|phrase| text.contains(phrase))
        .collect();

    QualityReport {
        word_count: count_words(fragment),
        h2_count: doc.select(&H2).count(),
        h3_count: doc.select(&H3).count(),
        list_count: doc.select(&LISTS).count(),
        paragraph_count: doc.select(&PARAS).count(),
        image_count: doc.select(&IMGS).count(),
        ai_phrases,
    }
}
