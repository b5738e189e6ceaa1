//! Web scraper client.
//!
//! Fetching and content extraction run in an external service; this module
//! only defines the consumed contract and two implementations:
//!
//! - **[`DisabledScraper`]** — returns errors; used when no endpoint is
//!   configured.
//! - **[`HttpScraper`]** — posts the target URL to the configured
//!   extraction endpoint and returns its markdown + metadata.
//!
//! A target that is unreachable or yields no extractable content is a
//! descriptive error, never an empty success — callers must be able to
//! tell "nothing there" from "scraping broke".

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use syllabus_core::models::PageMetadata;

use crate::config::ScraperConfig;

/// A successfully scraped page, ready for ingestion.
#[derive(Debug, Clone)]
pub struct ScrapedContent {
    pub markdown: String,
    pub html: Option<String>,
    pub metadata: PageMetadata,
}

/// The external scraping fetcher, consumed as a capability.
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ScrapedContent>;
}

/// Instantiate the scraper matching the configuration.
pub fn create_scraper(config: &ScraperConfig) -> Result<Box<dyn Scraper>> {
    match &config.endpoint {
        Some(endpoint) => Ok(Box::new(HttpScraper::new(
            endpoint.clone(),
            config.timeout_secs,
        )?)),
        None => Ok(Box::new(DisabledScraper)),
    }
}

/// A no-op scraper that always returns errors.
pub struct DisabledScraper;

#[async_trait]
impl Scraper for DisabledScraper {
    async fn fetch(&self, _url: &str) -> Result<ScrapedContent> {
        bail!("scraper is disabled; set scraper.endpoint in the config")
    }
}

/// Scraper backed by an HTTP extraction service.
pub struct HttpScraper {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    markdown: String,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    metadata: ScrapeMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeMetadata {
    title: Option<String>,
    description: Option<String>,
    og_image: Option<String>,
}

impl HttpScraper {
    pub fn new(endpoint: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build scraper HTTP client")?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Scraper for HttpScraper {
    async fn fetch(&self, url: &str) -> Result<ScrapedContent> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .with_context(|| format!("scrape request failed for {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("scraper returned HTTP {status} for {url}: {body}");
        }

        let parsed: ScrapeResponse = response
            .json()
            .await
            .with_context(|| format!("scraper returned an unreadable response for {url}"))?;

        if parsed.markdown.trim().is_empty() {
            bail!("no extractable content at {url}");
        }

        Ok(ScrapedContent {
            markdown: parsed.markdown,
            html: parsed.html,
            metadata: PageMetadata {
                title: parsed.metadata.title,
                description: parsed.metadata.description,
                og_image: parsed.metadata.og_image,
            },
        })
    }
}
