//! Postsmith core: topic loading, article generation, illustration,
//! publishing, and the run coordinator that ties them together.

pub mod generator;
pub mod illustration;
pub mod pipeline;
pub mod prompt;
pub mod publisher;
pub mod topics;

#[cfg(test)]
mod testing;

pub use generator::ArticleGenerator;
pub use illustration::{Illustrator, illustration_prompt};
pub use pipeline::{
    ProgressReporter, RunSummary, Services, SilentProgress, TopicOutcome, TopicStage,
    run_pipeline,
};
pub use publisher::{Publisher, compose_content, slugify};
pub use topics::{TopicSource, parse_topics, sample_topic};
