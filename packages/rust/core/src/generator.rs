//! Article generation with a word-count quality gate.

use tracing::{debug, info, instrument, warn};

use postsmith_content::{analyze, count_words, normalize};
use postsmith_shared::{
    CompletionConstraints, CompletionRequest, GeneratedArticle, TextService, Topic,
};

use crate::pipeline::{ProgressReporter, SilentProgress, TopicStage};
use crate::prompt::{SYSTEM_PERSONA, article_prompt};

/// Writes one article per topic through a [`TextService`].
pub struct ArticleGenerator<'a> {
    text: &'a dyn TextService,
    constraints: CompletionConstraints,
    progress: &'a dyn ProgressReporter,
}

impl<'a> ArticleGenerator<'a> {
    pub fn new(text: &'a dyn TextService, constraints: CompletionConstraints) -> Self {
        Self {
            text,
            constraints,
            progress: &SilentProgress,
        }
    }

    /// Report attempts and stage changes to `progress`.
    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Generate an article of at least `min_words` words.
    ///
    /// Makes at most `max_retries + 1` calls, re-sending the same prompt each
    /// time. A short article on the final attempt is still returned, flagged
    /// `below_target`. Returns `None` only when the final call fails.
    #[instrument(skip_all, fields(title = %topic.title, min_words, max_retries))]
    pub async fn generate(
        &self,
        topic: &Topic,
        min_words: usize,
        max_retries: u32,
    ) -> Option<GeneratedArticle> {
        let request = CompletionRequest {
            system: SYSTEM_PERSONA.to_string(),
            prompt: article_prompt(topic, min_words),
            constraints: self.constraints.clone(),
        };

        for attempt in 0..=max_retries {
            if attempt > 0 {
                self.progress.stage(TopicStage::Generating);
            }
            self.progress.attempt(attempt, max_retries);

            let raw = match self.text.complete(&request).await {
                Ok(raw) => raw,
                Err(e) if attempt < max_retries => {
                    warn!(attempt, error = %e, "generation call failed, retrying");
                    continue;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "generation call failed, no attempts left");
                    return None;
                }
            };

            self.progress.stage(TopicStage::Normalizing);
            let body = normalize(&raw);
            let word_count = count_words(&body);

            let report = analyze(&body);
            if !report.ai_phrases.is_empty() {
                warn!(phrases = ?report.ai_phrases, "article contains AI disclosure phrases");
            }
            debug!(
                attempt,
                word_count,
                h2 = report.h2_count,
                h3 = report.h3_count,
                lists = report.list_count,
                "article received"
            );

            if word_count >= min_words {
                info!(attempt, word_count, "article meets length target");
                return Some(GeneratedArticle {
                    body,
                    word_count,
                    attempt,
                    below_target: false,
                });
            }

            if attempt < max_retries {
                info!(attempt, word_count, min_words, "article too short, retrying");
                continue;
            }

            warn!(
                attempt,
                word_count,
                min_words,
                "article still below target after all attempts, using it anyway"
            );
            return Some(GeneratedArticle {
                body,
                word_count,
                attempt,
                below_target: true,
            });
        }

        None
    }
}
