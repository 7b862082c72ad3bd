//! Category resolution and post creation.

use tracing::{debug, info, instrument, warn};

use postsmith_shared::{
    Category, ContentStore, Illustration, NewPost, PUBLISH_STATUS, PublishedPost, Result,
};

/// Category slug: lowercase, spaces replaced with hyphens.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Post body with the header image, if any, in front of the article.
pub fn compose_content(title: &str, content: &str, illustration: &Illustration) -> String {
    match &illustration.url {
        Some(url) => format!(
            "<img src=\"{src}\" alt=\"{alt}\" style=\"max-width: 100%; height: auto; margin-bottom: 20px;\" />\n\n{content}",
            src = escape_attr(url),
            alt = escape_attr(title),
        ),
        None => content.to_string(),
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

pub struct Publisher<'a> {
    store: &'a dyn ContentStore,
}

impl<'a> Publisher<'a> {
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// Find the category by case-insensitive name, creating it when absent.
    ///
    /// A failed search is logged and treated as "not found".
    #[instrument(skip(self))]
    pub async fn resolve_category(&self, name: &str) -> Result<Category> {
        match self.store.search_categories(name).await {
            Ok(found) => {
                if let Some(category) = found
                    .into_iter()
                    .find(|c| c.name.to_lowercase() == name.to_lowercase())
                {
                    debug!(id = category.id, "using existing category");
                    return Ok(category);
                }
            }
            Err(e) => warn!(error = %e, "category search failed, creating instead"),
        }

        let description = format!("Content related to {name}");
        let category = self
            .store
            .create_category(name, &slugify(name), &description)
            .await?;
        info!(id = category.id, name = %category.name, "created category");
        Ok(category)
    }

    /// Publish an article under `category_name`.
    #[instrument(skip(self, content, illustration), fields(illustrated = illustration.is_present()))]
    pub async fn publish(
        &self,
        title: &str,
        content: &str,
        illustration: &Illustration,
        category_name: &str,
    ) -> Result<PublishedPost> {
        let category = self.resolve_category(category_name).await?;

        let post = NewPost {
            title: title.to_string(),
            content: compose_content(title, content, illustration),
            status: PUBLISH_STATUS.to_string(),
            slug: None,
            categories: vec![category.id],
        };

        self.store.create_post(&post).await
    }
}
