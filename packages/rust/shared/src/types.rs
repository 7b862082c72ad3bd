//! Core domain types for the article pipeline.

use serde::{Deserialize, Serialize};

/// Status used for every post the pipeline creates.
pub const PUBLISH_STATUS: &str = "publish";

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// A subject to write an article about. Sourced externally, read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    pub description: String,
}

impl Topic {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Generation artifacts
// ---------------------------------------------------------------------------

/// An article accepted by the quality gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArticle {
    /// Normalized HTML fragment.
    pub body: String,
    /// Whitespace-delimited token count of `body`.
    pub word_count: usize,
    /// Zero-based attempt that produced this article.
    pub attempt: u32,
    /// Set when the retry budget ran out before reaching the minimum.
    pub below_target: bool,
}

/// Optional header image for an article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Illustration {
    pub url: Option<String>,
}

impl Illustration {
    /// An illustration that was not produced.
    pub fn absent() -> Self {
        Self { url: None }
    }

    pub fn is_present(&self) -> bool {
        self.url.is_some()
    }
}

// ---------------------------------------------------------------------------
// Content store records
// ---------------------------------------------------------------------------

/// A taxonomy category in the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// Payload for creating an entry in the content store.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<u64>,
}

/// A post the content store accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub id: u64,
    pub url: String,
    pub status: String,
}

/// An existing entry as returned by a content-store lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySummary {
    pub id: u64,
    pub title: String,
    pub status: String,
    pub link: String,
    pub slug: String,
    pub date: Option<String>,
}

/// The authenticated account behind the content-store credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreUser {
    pub id: u64,
    pub name: String,
    pub capabilities: Vec<String>,
}

// ---------------------------------------------------------------------------
// Generation requests
// ---------------------------------------------------------------------------

/// Model constraints attached to every completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConstraints {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A single chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub constraints: CompletionConstraints,
}

/// A single image generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub model: String,
    pub size: String,
    pub quality: String,
}
