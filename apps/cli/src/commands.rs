//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use postsmith_core::{
    ArticleGenerator, ProgressReporter, RunSummary, Services, TopicOutcome, TopicSource,
    TopicStage, run_pipeline,
};
use postsmith_openai::OpenAiClient;
use postsmith_shared::{
    AppConfig, PipelineSettings, RuntimeConfig, Topic, init_config, load_config, load_config_from,
    resolve_openai, resolve_runtime, resolve_wordpress,
};
use postsmith_wordpress::WordPressClient;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Postsmith: write articles with a language model and publish them to WordPress.
#[derive(Parser)]
#[command(
    name = "postsmith",
    version,
    about = "Generate long-form articles for a list of topics and publish them to WordPress.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.postsmith/postsmith.toml.
    #[arg(long, global = true, env = "POSTSMITH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip TLS certificate validation for the WordPress site.
    #[arg(long, global = true)]
    pub insecure: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate and publish an article for every topic.
    Run {
        /// Topics file (JSON array). Defaults to today's story file.
        #[arg(long)]
        topics: Option<PathBuf>,

        /// Category to publish under.
        #[arg(long)]
        category: Option<String>,

        /// Minimum article length in words.
        #[arg(long)]
        min_words: Option<usize>,

        /// Extra generation attempts for short articles.
        #[arg(long)]
        max_retries: Option<u32>,

        /// Publish without header images.
        #[arg(long)]
        no_images: bool,
    },

    /// Verify WordPress credentials and connectivity.
    Check,

    /// List recently published posts, or look one up by slug.
    Posts {
        /// Number of posts to show (1-100).
        #[arg(short, long, default_value = "10")]
        limit: u8,

        /// Look up posts by slug instead of listing recent ones.
        #[arg(long)]
        slug: Option<String>,
    },

    /// Generate one article and print its quality report without publishing.
    Generate {
        /// Article title.
        #[arg(long)]
        title: String,

        /// Short description of the topic.
        #[arg(long, default_value = "")]
        description: String,

        /// Minimum article length in words.
        #[arg(long)]
        min_words: Option<usize>,

        /// Print the generated HTML after the report.
        #[arg(long)]
        show: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "postsmith=info",
        1 => "postsmith=debug",
        _ => "postsmith=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if cli.insecure {
        config.site.accept_invalid_certs = true;
    }

    match cli.command {
        Command::Run {
            topics,
            category,
            min_words,
            max_retries,
            no_images,
        } => {
            if let Some(category) = category {
                config.generation.category = category;
            }
            if let Some(min_words) = min_words {
                config.generation.min_words = min_words;
            }
            if let Some(max_retries) = max_retries {
                config.generation.max_retries = max_retries;
            }
            if no_images {
                config.generation.illustrate = false;
            }
            cmd_run(&config, topics.as_deref()).await
        }
        Command::Check => cmd_check(&config).await,
        Command::Posts { limit, slug } => cmd_posts(&config, limit, slug.as_deref()).await,
        Command::Generate {
            title,
            description,
            min_words,
            show,
        } => {
            if let Some(min_words) = min_words {
                config.generation.min_words = min_words;
            }
            cmd_generate(&config, Topic::new(title, description), show).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(config: &AppConfig, topics_file: Option<&Path>) -> Result<()> {
    let runtime = resolve_runtime(config)?;
    let wordpress = connect(&runtime).await?;
    let openai = OpenAiClient::new(&runtime.openai)?;

    let source = match topics_file {
        Some(path) => TopicSource::File(path.to_path_buf()),
        None => TopicSource::today(&config.topics),
    };
    let topics = source
        .load()
        .wrap_err_with(|| format!("could not load topics from {}", source.path().display()))?;

    info!(
        topics = topics.len(),
        category = %runtime.pipeline.category,
        min_words = runtime.pipeline.min_words,
        max_retries = runtime.pipeline.max_retries,
        "starting publishing run"
    );

    let services = Services {
        text: &openai,
        images: Some(&openai),
        store: &wordpress,
    };

    let reporter = CliProgress::new();
    let summary = run_pipeline(
        &topics,
        &runtime.pipeline,
        &runtime.openai,
        services,
        &reporter,
    )
    .await?;

    print_summary(&summary);
    Ok(())
}

async fn cmd_check(config: &AppConfig) -> Result<()> {
    let wordpress = resolve_wordpress(config)?;
    let client = WordPressClient::new(&wordpress)?;
    let user = client.current_user().await?;

    println!();
    println!("  Connected to {}", wordpress.base_url);
    println!("  User:   {} (id {})", user.name, user.id);
    if user.capabilities.is_empty() {
        println!("  Capabilities: not reported");
    } else if user.capabilities.iter().any(|c| c == "publish_posts") {
        println!("  Can publish posts: yes");
    } else {
        println!("  Can publish posts: no");
        warn!(user = %user.name, "account lacks the publish_posts capability");
    }
    println!();
    Ok(())
}

async fn cmd_posts(config: &AppConfig, limit: u8, slug: Option<&str>) -> Result<()> {
    let client = WordPressClient::new(&resolve_wordpress(config)?)?;
    let posts = match slug {
        Some(slug) => client.find_posts_by_slug(slug).await?,
        None => client.list_posts(limit).await?,
    };

    if posts.is_empty() {
        match slug {
            Some(slug) => println!("No post with slug '{slug}'."),
            None => println!("No published posts."),
        }
        return Ok(());
    }

    println!();
    for post in &posts {
        let date = post.date.as_deref().map(short_date).unwrap_or("");
        println!("  {:>6}  {date:<10}  {}", post.id, post.title);
        println!("          {}", post.link);
    }
    println!();
    println!("  {} post(s)", posts.len());
    Ok(())
}

async fn cmd_generate(config: &AppConfig, topic: Topic, show: bool) -> Result<()> {
    let settings = resolve_openai(config)?;
    let pipeline = PipelineSettings::from(config);
    let openai = OpenAiClient::new(&settings)?;
    let min_words = pipeline.min_words;

    let reporter = CliProgress::new();
    reporter.spinner.set_message(format!("Generating \"{}\"", topic.title));
    let generator =
        ArticleGenerator::new(&openai, settings.text.clone()).with_progress(&reporter);
    let article = generator
        .generate(&topic, min_words, pipeline.max_retries)
        .await;
    reporter.spinner.finish_and_clear();

    let article = article.ok_or_else(|| eyre!("article generation failed for \"{}\"", topic.title))?;
    let report = postsmith_content::analyze(&article.body);

    let mark = |ok: bool| if ok { "ok" } else { "LOW" };
    println!();
    println!("  Title:      {}", topic.title);
    println!("  Attempts:   {}", article.attempt + 1);
    println!(
        "  Words:      {} (target {min_words}) {}",
        report.word_count,
        mark(report.meets_length(min_words))
    );
    println!(
        "  Sections:   {} h2, {} h3 {}",
        report.h2_count,
        report.h3_count,
        mark(report.has_sections())
    );
    println!("  Paragraphs: {}", report.paragraph_count);
    println!("  Lists:      {}", report.list_count);
    if report.ai_phrases.is_empty() {
        println!("  AI phrases: none");
    } else {
        println!("  AI phrases: {}", report.ai_phrases.join(", "));
    }
    println!(
        "  Verdict:    {}",
        if report.is_publishable(min_words) {
            "ready to publish"
        } else {
            "needs work"
        }
    );
    println!();

    if show {
        println!("{}", article.body);
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the WordPress client and verify the credentials before any work.
async fn connect(runtime: &RuntimeConfig) -> Result<WordPressClient> {
    let client = WordPressClient::new(&runtime.wordpress)?;
    client
        .current_user()
        .await
        .wrap_err_with(|| format!("connection check against {} failed", runtime.wordpress.base_url))?;
    Ok(client)
}

/// `2025-03-09T10:00:00` → `2025-03-09`.
fn short_date(date: &str) -> &str {
    date.split('T').next().unwrap_or(date)
}

fn print_summary(summary: &RunSummary) {
    println!();
    for (title, outcome) in &summary.outcomes {
        match outcome {
            TopicOutcome::Published(post) => {
                println!("  published  {title}");
                println!("             id {}  {}", post.id, post.url);
            }
            TopicOutcome::Skipped { stage, reason } => {
                println!("  skipped    {title}");
                println!("             while {stage}: {reason}");
            }
        }
    }
    println!();
    println!(
        "  Published {}/{} article(s) in {:.1}s",
        summary.published,
        summary.total,
        summary.elapsed.as_secs_f64()
    );
    println!(
        "  Finished at {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn run_started(&self, total: usize) {
        self.spinner.set_message(format!("{total} topic(s) queued"));
    }

    fn topic_started(&self, index: usize, total: usize, topic: &Topic) {
        self.spinner.set_prefix(format!("[{index}/{total}]"));
        self.spinner.set_message(topic.title.clone());
    }

    fn stage(&self, stage: TopicStage) {
        let label = match stage {
            TopicStage::Pending => "Waiting",
            TopicStage::Generating => "Writing article",
            TopicStage::Normalizing => "Cleaning up HTML",
            TopicStage::Illustrating => "Generating header image",
            TopicStage::Publishing => "Publishing",
        };
        self.spinner.set_message(label);
    }

    fn attempt(&self, attempt: u32, max_retries: u32) {
        if attempt > 0 {
            self.spinner
                .set_message(format!("Retrying ({attempt}/{max_retries})"));
        }
    }

    fn topic_finished(&self, topic: &Topic, outcome: &TopicOutcome) {
        let line = match outcome {
            TopicOutcome::Published(post) => format!("✓ {} → {}", topic.title, post.url),
            TopicOutcome::Skipped { stage, .. } => {
                format!("✗ {} (failed while {stage})", topic.title)
            }
        };
        self.spinner.println(line);
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
