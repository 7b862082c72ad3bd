//! Collaborator traits for the external services the pipeline talks to.
//!
//! Concrete HTTP implementations live in `postsmith-openai` and
//! `postsmith-wordpress`; the pipeline only sees these seams.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    Category, CompletionRequest, ImageRequest, NewPost, PublishedPost,
};

/// A text-generation service (chat completions).
#[async_trait]
pub trait TextService: Send + Sync {
    /// Run one completion and return the generated text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// An image-generation service.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Generate a single image and return its URL.
    async fn generate_image(&self, request: &ImageRequest) -> Result<String>;
}

/// The content store holding posts and taxonomy categories.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Categories whose name matches the search term (store-side fuzzy match).
    async fn search_categories(&self, term: &str) -> Result<Vec<Category>>;

    /// Create a category and return the stored record.
    async fn create_category(&self, name: &str, slug: &str, description: &str)
    -> Result<Category>;

    /// Create a post. Any status other than "created" is an error.
    async fn create_post(&self, post: &NewPost) -> Result<PublishedPost>;
}
