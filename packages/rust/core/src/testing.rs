//! In-memory collaborators with call counters for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use postsmith_shared::{
    Category, CompletionConstraints, CompletionRequest, ContentStore, ImageRequest,
    ImageService, NewPost, OpenAiSettings, PostsmithError, PublishedPost, Result, TextService,
};

/// An article fragment with exactly `words` whitespace tokens.
pub fn article_of(words: usize) -> String {
    let filler = vec!["insight"; words.saturating_sub(1)].join(" ");
    format!("<h2>Overview</h2>\n<p>{filler}</p>")
}

pub fn openai_settings() -> OpenAiSettings {
    OpenAiSettings {
        api_key: "sk-test".into(),
        base_url: "http://localhost/v1".into(),
        text: CompletionConstraints {
            model: "gpt-4o".into(),
            max_tokens: 6000,
            temperature: 0.8,
        },
        text_timeout: Duration::from_secs(1),
        image_model: "dall-e-3".into(),
        image_size: "1024x1024".into(),
        image_quality: "standard".into(),
        image_timeout: Duration::from_secs(1),
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub struct FakeText {
    script: Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeText {
    /// Replies with `body` on every call.
    pub fn always(body: String) -> Self {
        Self::scripted(Vec::new(), Some(body))
    }

    /// Fails every call.
    pub fn failing() -> Self {
        Self::scripted(Vec::new(), None)
    }

    /// Replies from `script` in order, then from `fallback` (or fails).
    pub fn scripted(script: Vec<Result<String>>, fallback: Option<String>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextService for FakeText {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        self.fallback
            .clone()
            .ok_or_else(|| PostsmithError::Network("text service unreachable".into()))
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

pub struct FakeImages {
    url: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeImages {
    pub fn returning(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            url: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageService for FakeImages {
    async fn generate_image(&self, request: &ImageRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.url
            .clone()
            .ok_or_else(|| PostsmithError::api("openai", 400, "content policy violation"))
    }
}

// ---------------------------------------------------------------------------
// Content store
// ---------------------------------------------------------------------------

pub struct FakeStore {
    categories: Mutex<Vec<Category>>,
    posts: Mutex<Vec<NewPost>>,
    reject_post: Mutex<Option<usize>>,
    fail_category_create: bool,
    pub searches: AtomicUsize,
    pub category_creates: AtomicUsize,
    pub post_attempts: AtomicUsize,
}

impl FakeStore {
    pub fn empty() -> Self {
        Self {
            categories: Mutex::new(Vec::new()),
            posts: Mutex::new(Vec::new()),
            reject_post: Mutex::new(None),
            fail_category_create: false,
            searches: AtomicUsize::new(0),
            category_creates: AtomicUsize::new(0),
            post_attempts: AtomicUsize::new(0),
        }
    }

    pub fn with_category(id: u64, name: &str) -> Self {
        let store = Self::empty();
        store.categories.lock().unwrap().push(Category {
            id,
            name: name.to_string(),
        });
        store
    }

    pub fn with_failing_category_create() -> Self {
        Self {
            fail_category_create: true,
            ..Self::empty()
        }
    }

    /// Answer HTTP 500 to the `n`th post creation (one-based).
    pub fn reject_post_number(&self, n: usize) {
        *self.reject_post.lock().unwrap() = Some(n);
    }

    pub fn created_posts(&self) -> Vec<NewPost> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentStore for FakeStore {
    async fn search_categories(&self, term: &str) -> Result<Vec<Category>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let term = term.to_lowercase();
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&term))
            .cloned()
            .collect())
    }

    async fn create_category(&self, name: &str, _slug: &str, _description: &str) -> Result<Category> {
        self.category_creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_category_create {
            return Err(PostsmithError::api("wordpress", 403, "rest_cannot_create"));
        }
        let mut categories = self.categories.lock().unwrap();
        let category = Category {
            id: 100 + categories.len() as u64,
            name: name.to_string(),
        };
        categories.push(category.clone());
        Ok(category)
    }

    async fn create_post(&self, post: &NewPost) -> Result<PublishedPost> {
        let n = self.post_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.reject_post.lock().unwrap() == Some(n) {
            return Err(PostsmithError::publish(500, "internal error"));
        }
        let mut posts = self.posts.lock().unwrap();
        posts.push(post.clone());
        let id = 1000 + posts.len() as u64;
        Ok(PublishedPost {
            id,
            url: format!("https://blog.example/?p={id}"),
            status: post.status.clone(),
        })
    }
}
