use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use syllabus_core::retrieval::RetrievalParams;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub retrieval: RetrievalSettings,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalSettings {
    /// Minimum similarity a semantic candidate must reach; a tuned value,
    /// kept in configuration rather than hard-coded at call sites.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    /// Maximum candidates returned from the semantic path.
    #[serde(default = "default_semantic_limit")]
    pub semantic_limit: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            semantic_limit: default_semantic_limit(),
        }
    }
}

impl RetrievalSettings {
    pub fn params(&self) -> RetrievalParams {
        RetrievalParams {
            min_score: self.similarity_threshold,
            limit: self.semantic_limit,
        }
    }
}

fn default_similarity_threshold() -> f32 {
    0.5
}
fn default_semantic_limit() -> usize {
    8
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScraperConfig {
    /// Extraction service endpoint. Scraping is disabled when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_scraper_timeout_secs")]
    pub timeout_secs: u64,
}

impl ScraperConfig {
    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }
}

fn default_scraper_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_completion_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_completion_provider(),
            model: None,
            timeout_secs: default_completion_timeout_secs(),
        }
    }
}

impl CompletionConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_completion_provider() -> String {
    "disabled".to_string()
}
fn default_completion_timeout_secs() -> u64 {
    60
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if !(0.0..=1.0).contains(&config.retrieval.similarity_threshold) {
        anyhow::bail!("retrieval.similarity_threshold must be in [0.0, 1.0]");
    }

    if config.retrieval.semantic_limit < 1 {
        anyhow::bail!("retrieval.semantic_limit must be >= 1");
    }

    if let Some(endpoint) = &config.scraper.endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            anyhow::bail!("scraper.endpoint must be an http(s) URL");
        }
    }

    match config.completion.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown completion provider: '{}'. Must be disabled or openai.",
            other
        ),
    }
    if config.completion.is_enabled() && config.completion.model.is_none() {
        anyhow::bail!(
            "completion.model must be specified when provider is '{}'",
            config.completion.provider
        );
    }

    Ok(config)
}
