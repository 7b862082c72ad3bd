//! Header images for articles.

use tracing::{info, instrument, warn};

use postsmith_shared::{Illustration, ImageRequest, ImageService, OpenAiSettings};

/// Characters of the title carried into the image prompt.
pub const PROMPT_TITLE_CHARS: usize = 50;

const STYLE_SUFFIX: &str = " - AI technology illustration, vibrant digital art, \
modern tech aesthetic, professional blog header";

/// Image prompt for an article title.
pub fn illustration_prompt(title: &str) -> String {
    let head: String = title.chars().take(PROMPT_TITLE_CHARS).collect();
    format!("{head}{STYLE_SUFFIX}")
}

pub struct Illustrator<'a> {
    images: &'a dyn ImageService,
    template: ImageRequest,
}

impl<'a> Illustrator<'a> {
    pub fn new(images: &'a dyn ImageService, settings: &OpenAiSettings) -> Self {
        Self {
            images,
            template: settings.image_request(String::new()),
        }
    }

    /// One image request. Failures are logged and yield an absent illustration.
    #[instrument(skip(self))]
    pub async fn illustrate(&self, title: &str) -> Illustration {
        let request = ImageRequest {
            prompt: illustration_prompt(title),
            ..self.template.clone()
        };

        match self.images.generate_image(&request).await {
            Ok(url) => {
                info!(%url, "illustration generated");
                Illustration { url: Some(url) }
            }
            Err(e) => {
                warn!(error = %e, "illustration failed, publishing without image");
                Illustration::absent()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeImages, openai_settings};

    #[test]
    fn prompt_truncates_long_titles_on_char_boundary() {
        let title = "é".repeat(80);
        let prompt = illustration_prompt(&title);
        assert!(prompt.starts_with(&"é".repeat(50)));
        assert!(!prompt.starts_with(&"é".repeat(51)));
        assert!(prompt.ends_with("professional blog header"));
    }

    #[test]
    fn short_title_is_kept_whole() {
        assert_eq!(
            illustration_prompt("Edge AI"),
            format!("Edge AI{STYLE_SUFFIX}")
        );
    }

    #[tokio::test]
    async fn success_carries_url() {
        let images = FakeImages::returning("https://img.example/x.png");
        let illustration = Illustrator::new(&images, &openai_settings())
            .illustrate("Edge AI")
            .await;

        assert_eq!(illustration.url.as_deref(), Some("https://img.example/x.png"));
        assert_eq!(images.calls(), 1);
        assert!(images.prompts()[0].starts_with("Edge AI - "));
    }

    #[tokio::test]
    async fn failure_is_absorbed() {
        let images = FakeImages::failing();
        let illustration = Illustrator::new(&images, &openai_settings())
            .illustrate("Edge AI")
            .await;

        assert!(!illustration.is_present());
        assert_eq!(images.calls(), 1);
    }
}
