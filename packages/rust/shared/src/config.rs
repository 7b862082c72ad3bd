//! Application configuration for Postsmith.
//!
//! User config lives at `~/.postsmith/postsmith.toml`. Secrets never go in the
//! file: it only names the environment variables that hold them. The
//! environment is read once at startup by [`resolve_runtime`], producing a
//! [`RuntimeConfig`] that is passed explicitly into every component.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PostsmithError, Result};
use crate::types::{CompletionConstraints, ImageRequest};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "postsmith.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".postsmith";

// ---------------------------------------------------------------------------
// Config structs (matching postsmith.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// WordPress site settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// OpenAI-compatible API settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Quality gate and publishing defaults.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Where daily topic files are found.
    #[serde(default)]
    pub topics: TopicsConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site base URL, used when the URL env var is unset.
    #[serde(default = "default_site_url")]
    pub url: String,

    /// Env var that overrides `url`.
    #[serde(default = "default_site_url_env")]
    pub url_env: String,

    /// Env var holding the WordPress username.
    #[serde(default = "default_username_env")]
    pub username_env: String,

    /// Env var holding the WordPress application password.
    #[serde(default = "default_app_password_env")]
    pub app_password_env: String,

    /// Skip TLS certificate validation. Off unless explicitly enabled.
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Per-request timeout for content-store calls.
    #[serde(default = "default_site_timeout")]
    pub timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: default_site_url(),
            url_env: default_site_url_env(),
            username_env: default_username_env(),
            app_password_env: default_app_password_env(),
            accept_invalid_certs: false,
            timeout_secs: default_site_timeout(),
        }
    }
}

fn default_site_url() -> String {
    "https://mytribal.ai".into()
}
fn default_site_url_env() -> String {
    "WP_URL".into()
}
fn default_username_env() -> String {
    "WP_USERNAME".into()
}
fn default_app_password_env() -> String {
    "WP_APP_PASSWORD".into()
}
fn default_site_timeout() -> u64 {
    60
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// API base, up to and including the version segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for article text.
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Output budget for one completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Timeout for one completion call.
    #[serde(default = "default_text_timeout")]
    pub text_timeout_secs: u64,

    /// Model used for illustrations.
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Illustration size, e.g. `1024x1024`.
    #[serde(default = "default_image_size")]
    pub image_size: String,

    /// Illustration quality tier.
    #[serde(default = "default_image_quality")]
    pub image_quality: String,

    /// Timeout for one image call.
    #[serde(default = "default_image_timeout")]
    pub image_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            text_model: default_text_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            text_timeout_secs: default_text_timeout(),
            image_model: default_image_model(),
            image_size: default_image_size(),
            image_quality: default_image_quality(),
            image_timeout_secs: default_image_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_text_model() -> String {
    "gpt-4o".into()
}
fn default_max_tokens() -> u32 {
    6000
}
fn default_temperature() -> f32 {
    0.8
}
fn default_text_timeout() -> u64 {
    120
}
fn default_image_model() -> String {
    "dall-e-3".into()
}
fn default_image_size() -> String {
    "1024x1024".into()
}
fn default_image_quality() -> String {
    "standard".into()
}
fn default_image_timeout() -> u64 {
    60
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Minimum word count for the quality gate.
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    /// Regenerations allowed after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Category every post is filed under.
    #[serde(default = "default_category")]
    pub category: String,

    /// Whether to request a header illustration.
    #[serde(default = "default_true")]
    pub illustrate: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            max_retries: default_max_retries(),
            category: default_category(),
            illustrate: true,
        }
    }
}

fn default_min_words() -> usize {
    1000
}
fn default_max_retries() -> u32 {
    2
}
fn default_category() -> String {
    "AI Technology".into()
}
fn default_true() -> bool {
    true
}

/// `[topics]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicsConfig {
    /// Directory holding the daily topic files.
    #[serde(default = "default_topics_dir")]
    pub dir: String,

    /// File name prefix; the full name is `<prefix>_<YYYY-MM-DD>.json`.
    #[serde(default = "default_topics_prefix")]
    pub file_prefix: String,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            dir: default_topics_dir(),
            file_prefix: default_topics_prefix(),
        }
    }
}

fn default_topics_dir() -> String {
    "content_for_mytribal".into()
}
fn default_topics_prefix() -> String {
    "mytribal_stories".into()
}

// ---------------------------------------------------------------------------
// Runtime config (resolved once from file + environment)
// ---------------------------------------------------------------------------

/// Content-store connection settings with credentials resolved.
#[derive(Clone)]
pub struct WordPressSettings {
    pub base_url: Url,
    pub username: String,
    pub app_password: String,
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

impl std::fmt::Debug for WordPressSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordPressSettings")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("app_password", &"<redacted>")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Text/image service settings with the API key resolved.
#[derive(Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub text: CompletionConstraints,
    pub text_timeout: Duration,
    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
    pub image_timeout: Duration,
}

impl OpenAiSettings {
    /// Image request for the given prompt using the configured model/size/quality.
    pub fn image_request(&self, prompt: impl Into<String>) -> ImageRequest {
        ImageRequest {
            prompt: prompt.into(),
            model: self.image_model.clone(),
            size: self.image_size.clone(),
            quality: self.image_quality.clone(),
        }
    }
}

impl std::fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("text", &self.text)
            .field("image_model", &self.image_model)
            .finish_non_exhaustive()
    }
}

/// Quality gate and publishing settings for one run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub min_words: usize,
    pub max_retries: u32,
    pub category: String,
    pub illustrate: bool,
}

impl From<&AppConfig> for PipelineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            min_words: config.generation.min_words,
            max_retries: config.generation.max_retries,
            category: config.generation.category.clone(),
            illustrate: config.generation.illustrate,
        }
    }
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub wordpress: WordPressSettings,
    pub openai: OpenAiSettings,
    pub pipeline: PipelineSettings,
}

/// Resolve the runtime config from the process environment.
pub fn resolve_runtime(config: &AppConfig) -> Result<RuntimeConfig> {
    resolve_runtime_with(config, |name| std::env::var(name).ok())
}

/// Resolve the runtime config using `lookup` for environment variables.
///
/// Every missing secret is reported in a single error so the user can fix
/// them all at once.
pub fn resolve_runtime_with(
    config: &AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<RuntimeConfig> {
    let mut missing = Vec::new();
    let wordpress = wordpress_settings(config, &lookup, &mut missing);
    let openai = openai_settings(config, &lookup, &mut missing);
    ensure_present(&missing)?;

    Ok(RuntimeConfig {
        wordpress: wordpress?,
        openai,
        pipeline: PipelineSettings::from(config),
    })
}

/// Resolve only the content-store settings from the process environment.
pub fn resolve_wordpress(config: &AppConfig) -> Result<WordPressSettings> {
    resolve_wordpress_with(config, |name| std::env::var(name).ok())
}

/// Content-store settings alone; the model API key is not required.
pub fn resolve_wordpress_with(
    config: &AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<WordPressSettings> {
    let mut missing = Vec::new();
    let wordpress = wordpress_settings(config, &lookup, &mut missing);
    ensure_present(&missing)?;
    wordpress
}

/// Resolve only the text/image service settings from the process environment.
pub fn resolve_openai(config: &AppConfig) -> Result<OpenAiSettings> {
    resolve_openai_with(config, |name| std::env::var(name).ok())
}

/// Text/image service settings alone; site credentials are not required.
pub fn resolve_openai_with(
    config: &AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<OpenAiSettings> {
    let mut missing = Vec::new();
    let openai = openai_settings(config, &lookup, &mut missing);
    ensure_present(&missing)?;
    Ok(openai)
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Non-blank value of `name`, or an empty string with `name` noted as missing.
fn secret(lookup: Lookup<'_>, name: &str, missing: &mut Vec<String>) -> String {
    match lookup(name).filter(|v| !v.trim().is_empty()) {
        Some(value) => value,
        None => {
            missing.push(name.to_string());
            String::new()
        }
    }
}

fn ensure_present(missing: &[String]) -> Result<()> {
    if missing.is_empty() {
        return Ok(());
    }
    Err(PostsmithError::config(format!(
        "missing required environment variables: {}",
        missing.join(", ")
    )))
}

fn wordpress_settings(
    config: &AppConfig,
    lookup: Lookup<'_>,
    missing: &mut Vec<String>,
) -> Result<WordPressSettings> {
    let username = secret(lookup, &config.site.username_env, missing);
    let app_password = secret(lookup, &config.site.app_password_env, missing);

    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let raw_url = get(&config.site.url_env).unwrap_or_else(|| config.site.url.clone());
    let base_url = parse_site_url(&raw_url)?;

    let insecure_env = get("WP_INSECURE")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    Ok(WordPressSettings {
        base_url,
        username,
        app_password,
        accept_invalid_certs: config.site.accept_invalid_certs || insecure_env,
        timeout: Duration::from_secs(config.site.timeout_secs),
    })
}

fn openai_settings(
    config: &AppConfig,
    lookup: Lookup<'_>,
    missing: &mut Vec<String>,
) -> OpenAiSettings {
    OpenAiSettings {
        api_key: secret(lookup, &config.openai.api_key_env, missing),
        base_url: config.openai.base_url.trim_end_matches('/').to_string(),
        text: CompletionConstraints {
            model: config.openai.text_model.clone(),
            max_tokens: config.openai.max_tokens,
            temperature: config.openai.temperature,
        },
        text_timeout: Duration::from_secs(config.openai.text_timeout_secs),
        image_model: config.openai.image_model.clone(),
        image_size: config.openai.image_size.clone(),
        image_quality: config.openai.image_quality.clone(),
        image_timeout: Duration::from_secs(config.openai.image_timeout_secs),
    }
}

/// Parse and validate the site base URL (http/https only, trailing slash removed).
fn parse_site_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| PostsmithError::config(format!("invalid site URL '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PostsmithError::config(format!(
            "site URL must be http or https, got '{other}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.postsmith/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PostsmithError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.postsmith/postsmith.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PostsmithError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PostsmithError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PostsmithError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PostsmithError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PostsmithError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("WP_USERNAME", "editor"),
            ("WP_APP_PASSWORD", "abcd efgh"),
            ("OPENAI_API_KEY", "sk-test"),
        ]
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("OPENAI_API_KEY"));
        assert!(toml_str.contains("WP_APP_PASSWORD"));
        assert!(toml_str.contains("AI Technology"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[generation]
min_words = 800

[site]
url = "https://blog.example.com"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.generation.min_words, 800);
        assert_eq!(config.generation.max_retries, 2);
        assert_eq!(config.site.url, "https://blog.example.com");
        assert!(!config.site.accept_invalid_certs);
        assert_eq!(config.openai.text_model, "gpt-4o");
    }

    #[test]
    fn resolve_runtime_with_all_secrets() {
        let runtime = resolve_runtime_with(&AppConfig::default(), env(&full_env())).unwrap();
        assert_eq!(runtime.wordpress.username, "editor");
        assert_eq!(runtime.wordpress.base_url.as_str(), "https://mytribal.ai/");
        assert!(!runtime.wordpress.accept_invalid_certs);
        assert_eq!(runtime.openai.text.max_tokens, 6000);
        assert_eq!(runtime.pipeline.category, "AI Technology");
    }

    #[test]
    fn resolve_runtime_reports_every_missing_secret() {
        let err = resolve_runtime_with(&AppConfig::default(), env(&[("WP_USERNAME", "editor")]))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("WP_APP_PASSWORD"));
        assert!(msg.contains("OPENAI_API_KEY"));
        assert!(!msg.contains("WP_USERNAME"));
    }

    #[test]
    fn wordpress_resolves_without_api_key() {
        let vars = [("WP_USERNAME", "editor"), ("WP_APP_PASSWORD", "abcd efgh")];
        let wordpress = resolve_wordpress_with(&AppConfig::default(), env(&vars)).unwrap();
        assert_eq!(wordpress.username, "editor");
        assert_eq!(wordpress.app_password, "abcd efgh");

        let err = resolve_runtime_with(&AppConfig::default(), env(&vars)).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn wordpress_resolution_reports_only_site_secrets() {
        let err = resolve_wordpress_with(&AppConfig::default(), env(&[("OPENAI_API_KEY", "sk")]))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("WP_USERNAME"));
        assert!(msg.contains("WP_APP_PASSWORD"));
        assert!(!msg.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn openai_resolves_without_site_credentials() {
        let openai =
            resolve_openai_with(&AppConfig::default(), env(&[("OPENAI_API_KEY", "sk-test")]))
                .unwrap();
        assert_eq!(openai.api_key, "sk-test");
        assert_eq!(openai.image_model, "dall-e-3");
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let mut vars = full_env();
        vars[2] = ("OPENAI_API_KEY", "   ");
        let err = resolve_runtime_with(&AppConfig::default(), env(&vars)).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn url_env_overrides_file_and_trailing_slash_is_dropped() {
        let mut vars = full_env();
        vars.push(("WP_URL", "https://staging.example.com/"));
        let runtime = resolve_runtime_with(&AppConfig::default(), env(&vars)).unwrap();
        assert_eq!(runtime.wordpress.base_url.host_str(), Some("staging.example.com"));
    }

    #[test]
    fn non_http_site_url_is_rejected() {
        let mut vars = full_env();
        vars.push(("WP_URL", "ftp://example.com"));
        let err = resolve_runtime_with(&AppConfig::default(), env(&vars)).unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn insecure_mode_is_opt_in() {
        let mut vars = full_env();
        vars.push(("WP_INSECURE", "true"));
        let runtime = resolve_runtime_with(&AppConfig::default(), env(&vars)).unwrap();
        assert!(runtime.wordpress.accept_invalid_certs);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let runtime = resolve_runtime_with(&AppConfig::default(), env(&full_env())).unwrap();
        let debug = format!("{runtime:?}");
        assert!(!debug.contains("abcd efgh"));
        assert!(!debug.contains("sk-test"));
        assert!(debug.contains("<redacted>"));
    }
}
