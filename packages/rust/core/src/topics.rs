//! Loading the day's topics from the upstream story generator's output.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use postsmith_shared::{PostsmithError, Result, Topic, TopicsConfig};

/// Where topics come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicSource {
    /// `<dir>/<prefix>_<YYYY-MM-DD>.json`; falls back to a sample topic when unusable.
    Daily {
        dir: PathBuf,
        prefix: String,
        date: NaiveDate,
    },
    /// A file named on the command line; any failure is fatal.
    File(PathBuf),
}

impl TopicSource {
    /// Today's file (local time) under the configured directory.
    pub fn today(config: &TopicsConfig) -> Self {
        Self::for_date(config, chrono::Local::now().date_naive())
    }

    pub fn for_date(config: &TopicsConfig, date: NaiveDate) -> Self {
        Self::Daily {
            dir: PathBuf::from(&config.dir),
            prefix: config.file_prefix.clone(),
            date,
        }
    }

    pub fn path(&self) -> PathBuf {
        match self {
            Self::Daily { dir, prefix, date } => {
                dir.join(format!("{prefix}_{}.json", date.format("%Y-%m-%d")))
            }
            Self::File(path) => path.clone(),
        }
    }

    /// Load topics. An empty result is always an error.
    pub fn load(&self) -> Result<Vec<Topic>> {
        let path = self.path();
        let topics = match self {
            Self::File(_) => read_topics(&path)?,
            Self::Daily { .. } => match read_topics(&path) {
                Ok(topics) => topics,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "no usable topics for today, using sample topic");
                    vec![sample_topic()]
                }
            },
        };

        if topics.is_empty() {
            return Err(PostsmithError::validation(format!(
                "{} contains no topics",
                path.display()
            )));
        }

        info!(count = topics.len(), path = %path.display(), "loaded topics");
        Ok(topics)
    }
}

/// The built-in topic used when there is no file for today.
pub fn sample_topic() -> Topic {
    Topic::new(
        "Breaking: AI Achieves New Milestone in Natural Language Understanding",
        "Researchers have developed an AI system that demonstrates unprecedented natural \
         language understanding, marking a significant step toward artificial general intelligence.",
    )
}

fn read_topics(path: &Path) -> Result<Vec<Topic>> {
    let raw = std::fs::read_to_string(path).map_err(|e| PostsmithError::io(path, e))?;
    parse_topics(&raw)
        .map_err(|e| PostsmithError::parse(format!("{}: {e}", path.display())))
}

// ---------------------------------------------------------------------------
// Record shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TopicRecord {
    Story {
        mytribal_adaptation: Adaptation,
        content: StoryContent,
    },
    Plain {
        title: String,
        #[serde(default)]
        description: String,
    },
}

#[derive(Debug, Deserialize)]
struct Adaptation {
    suggested_title: String,
}

#[derive(Debug, Deserialize)]
struct StoryContent {
    #[serde(default)]
    summary: String,
}

impl From<TopicRecord> for Topic {
    fn from(record: TopicRecord) -> Self {
        match record {
            TopicRecord::Story {
                mytribal_adaptation,
                content,
            } => Topic::new(mytribal_adaptation.suggested_title, content.summary),
            TopicRecord::Plain { title, description } => Topic::new(title, description),
        }
    }
}

/// Parse a JSON array of story or `{title, description}` records.
///
/// Records with a blank title are dropped.
pub fn parse_topics(json: &str) -> std::result::Result<Vec<Topic>, serde_json::Error> {
    let records: Vec<TopicRecord> = serde_json::from_str(json)?;
    Ok(records
        .into_iter()
        .map(Topic::from)
        .filter(|t| !t.title.trim().is_empty())
        .collect())
}
