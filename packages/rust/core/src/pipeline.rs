//! Run coordinator: topics → generate → illustrate → publish.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use postsmith_shared::{
    ContentStore, ImageService, OpenAiSettings, PipelineSettings, PostsmithError, PublishedPost,
    Result, TextService, Topic,
};

use crate::generator::ArticleGenerator;
use crate::illustration::Illustrator;
use crate::publisher::Publisher;

/// Where a topic is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicStage {
    Pending,
    Generating,
    Normalizing,
    Illustrating,
    Publishing,
}

impl fmt::Display for TopicStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Generating => "generating",
            Self::Normalizing => "normalizing",
            Self::Illustrating => "illustrating",
            Self::Publishing => "publishing",
        };
        f.write_str(label)
    }
}

/// Terminal state of one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicOutcome {
    Published(PublishedPost),
    Skipped { stage: TopicStage, reason: String },
}

impl TopicOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published(_))
    }
}

/// Tally of a run. Article bodies are not retained.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub published: usize,
    pub total: usize,
    /// `(topic title, outcome)` in processing order.
    pub outcomes: Vec<(String, TopicOutcome)>,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called before the first topic.
    fn run_started(&self, total: usize);
    /// Called when a topic is picked up, before its `Pending` stage. `index` is one-based.
    fn topic_started(&self, index: usize, total: usize, topic: &Topic);
    /// Called on every stage transition of the current topic.
    fn stage(&self, stage: TopicStage);
    /// Called before each generation call.
    fn attempt(&self, attempt: u32, max_retries: u32);
    /// Called once the topic reaches a terminal state.
    fn topic_finished(&self, topic: &Topic, outcome: &TopicOutcome);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn run_started(&self, _total: usize) {}
    fn topic_started(&self, _index: usize, _total: usize, _topic: &Topic) {}
    fn stage(&self, _stage: TopicStage) {}
    fn attempt(&self, _attempt: u32, _max_retries: u32) {}
    fn topic_finished(&self, _topic: &Topic, _outcome: &TopicOutcome) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// External collaborators for a run.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub text: &'a dyn TextService,
    /// `None` disables illustration entirely.
    pub images: Option<&'a dyn ImageService>,
    pub store: &'a dyn ContentStore,
}

/// Process every topic in order.
///
/// Per-topic failures are recorded as [`TopicOutcome::Skipped`] and never
/// abort the run; only an empty topic list is an error.
#[instrument(skip_all, fields(topics = topics.len(), category = %settings.category))]
pub async fn run_pipeline(
    topics: &[Topic],
    settings: &PipelineSettings,
    openai: &OpenAiSettings,
    services: Services<'_>,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    if topics.is_empty() {
        return Err(PostsmithError::validation("no topics to process"));
    }

    let start = Instant::now();
    let total = topics.len();

    let generator =
        ArticleGenerator::new(services.text, openai.text.clone()).with_progress(progress);
    let illustrator = services
        .images
        .filter(|_| settings.illustrate)
        .map(|images| Illustrator::new(images, openai));
    let publisher = Publisher::new(services.store);

    info!(total, "starting run");
    progress.run_started(total);

    let mut outcomes = Vec::with_capacity(total);
    let mut published = 0;

    for (i, topic) in topics.iter().enumerate() {
        progress.topic_started(i + 1, total, topic);
        progress.stage(TopicStage::Pending);

        let outcome = process_topic(
            topic,
            settings,
            &generator,
            illustrator.as_ref(),
            &publisher,
            progress,
        )
        .await;

        match &outcome {
            TopicOutcome::Published(post) => {
                published += 1;
                info!(title = %topic.title, id = post.id, url = %post.url, "published");
            }
            TopicOutcome::Skipped { stage, reason } => {
                warn!(title = %topic.title, %stage, %reason, "topic skipped");
            }
        }

        progress.topic_finished(topic, &outcome);
        outcomes.push((topic.title.clone(), outcome));
    }

    let summary = RunSummary {
        published,
        total,
        outcomes,
        elapsed: start.elapsed(),
    };

    progress.done(&summary);
    info!(
        published = summary.published,
        total = summary.total,
        elapsed_ms = summary.elapsed.as_millis(),
        "run complete"
    );

    Ok(summary)
}

async fn process_topic(
    topic: &Topic,
    settings: &PipelineSettings,
    generator: &ArticleGenerator<'_>,
    illustrator: Option<&Illustrator<'_>>,
    publisher: &Publisher<'_>,
    progress: &dyn ProgressReporter,
) -> TopicOutcome {
    progress.stage(TopicStage::Generating);
    let Some(article) = generator
        .generate(topic, settings.min_words, settings.max_retries)
        .await
    else {
        return TopicOutcome::Skipped {
            stage: TopicStage::Generating,
            reason: "article generation failed".into(),
        };
    };

    let illustration = match illustrator {
        Some(illustrator) => {
            progress.stage(TopicStage::Illustrating);
            illustrator.illustrate(&topic.title).await
        }
        None => Default::default(),
    };

    progress.stage(TopicStage::Publishing);
    match publisher
        .publish(&topic.title, &article.body, &illustration, &settings.category)
        .await
    {
        Ok(post) => TopicOutcome::Published(post),
        Err(e) => TopicOutcome::Skipped {
            stage: TopicStage::Publishing,
            reason: e.to_string(),
        },
    }
}
