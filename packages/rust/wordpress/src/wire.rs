//! JSON shapes returned by `/wp-json/wp/v2` and their domain conversions.

use std::collections::BTreeMap;

use scraper::Html;
use serde::Deserialize;

use postsmith_shared::{Category, EntrySummary, StoreUser};

#[derive(Debug, Deserialize)]
pub(crate) struct WpUser {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capabilities: BTreeMap<String, serde_json::Value>,
}

impl From<WpUser> for StoreUser {
    fn from(user: WpUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            capabilities: user
                .capabilities
                .into_iter()
                .filter(|(_, granted)| granted.as_bool().unwrap_or(false))
                .map(|(name, _)| name)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WpCategory {
    pub id: u64,
    pub name: String,
}

impl From<WpCategory> for Category {
    fn from(cat: WpCategory) -> Self {
        Self {
            id: cat.id,
            name: unescape(&cat.name),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WpPost {
    pub id: u64,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub date: Option<String>,
}

impl From<WpPost> for EntrySummary {
    fn from(post: WpPost) -> Self {
        Self {
            id: post.id,
            title: unescape(&post.title.rendered),
            status: post.status,
            link: post.link,
            slug: post.slug,
            date: post.date,
        }
    }
}

/// WordPress returns names and rendered titles HTML-escaped; decode to text.
fn unescape(raw: &str) -> String {
    if !raw.contains('&') && !raw.contains('<') {
        return raw.to_string();
    }
    let fragment = Html::parse_fragment(raw);
    fragment.root_element().text().collect::<String>()
}
