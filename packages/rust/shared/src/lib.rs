//! Shared types, error model, and configuration for Postsmith.
//!
//! This crate is the foundation depended on by all other Postsmith crates.
//! It provides:
//! - [`PostsmithError`], the unified error type
//! - Domain types ([`Topic`], [`GeneratedArticle`], [`PublishedPost`], ...)
//! - Collaborator traits ([`TextService`], [`ImageService`], [`ContentStore`])
//! - Configuration ([`AppConfig`], [`RuntimeConfig`], config loading)

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, GenerationConfig, OpenAiConfig, OpenAiSettings, PipelineSettings, RuntimeConfig,
    SiteConfig, TopicsConfig, WordPressSettings, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_openai, resolve_openai_with, resolve_runtime,
    resolve_runtime_with, resolve_wordpress, resolve_wordpress_with,
};
pub use error::{PostsmithError, Result, body_prefix};
pub use traits::{ContentStore, ImageService, TextService};
pub use types::{
    Category, CompletionConstraints, CompletionRequest, EntrySummary, GeneratedArticle,
    Illustration, ImageRequest, NewPost, PUBLISH_STATUS, PublishedPost, StoreUser, Topic,
};
