//! # Syllabus CLI (`syl`)
//!
//! The `syl` binary drives the full pipeline against a local SQLite
//! database: database initialization, document and page ingestion,
//! semantic search with attribution, the deterministic keyword fallback,
//! and content management.
//!
//! ## Usage
//!
//! ```bash
//! syl --config ./config/syllabus.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `syl init` | Create the SQLite database and run schema migrations |
//! | `syl ingest <file>` | Ingest a text/markdown file into a namespace |
//! | `syl scrape <url>` | Scrape a page and ingest its markdown |
//! | `syl search "<query>"` | Semantic search with source attribution |
//! | `syl keyword "<query>"` | Deterministic keyword search (no index needed) |
//! | `syl list` | List a namespace's content items |
//! | `syl remove <key>` | Delete an item and its indexed chunks |
//!
//! Every content command takes `--user <id>` and an optional
//! `--space <id>`; with a space the operation runs against the shared
//! space corpus, without one against the user's private corpus.
//!
//! ## Examples
//!
//! ```bash
//! syl init
//! syl ingest ./notes/photosynthesis.md --user 42
//! syl scrape https://example.edu/syllabus --user 42 --space bio-101
//! syl search "light-dependent reactions" --user 42
//! syl keyword "mitosis" --user 42 --space bio-101
//! syl remove doc_7f1c... --user 42
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;

use syllabus::assist::Assistant;
use syllabus::completion;
use syllabus::config::{self, Config};
use syllabus::content_store::SqliteContentStore;
use syllabus::db;
use syllabus::migrate;
use syllabus::scrape;
use syllabus::sqlite_index::SqliteIndex;
use syllabus_core::access::OpenPolicy;
use syllabus_core::error::EngineError;
use syllabus_core::models::SourceRef;
use syllabus_core::namespace::Namespace;

/// Syllabus CLI — tenant-scoped content ingestion, retrieval, and
/// attribution for AI teaching assistants.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/syllabus.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "syl",
    about = "Syllabus — tenant-scoped ingestion, retrieval, and attribution for AI teaching assistants",
    version,
    long_about = "Syllabus chunks uploaded documents and scraped web pages into a \
    namespace-isolated index, retrieves relevant content per tenant (semantic search or a \
    deterministic keyword fallback), and attributes which sources backed each answer."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/syllabus.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables. This
    /// command is idempotent — running it multiple times is safe.
    Init,

    /// Ingest a text or markdown file.
    ///
    /// Chunks the file and indexes it under the resolved namespace.
    /// Re-ingesting a file of the same name replaces its chunks.
    Ingest {
        /// Path to the file to ingest.
        file: PathBuf,

        /// Acting user id.
        #[arg(long)]
        user: String,

        /// Collaborative space id; omit for the user's private corpus.
        #[arg(long)]
        space: Option<String>,
    },

    /// Scrape a web page and ingest its extracted markdown.
    ///
    /// Requires `scraper.endpoint` in the config. Re-scraping the same
    /// URL replaces its chunks.
    Scrape {
        /// The page URL to scrape.
        url: String,

        #[arg(long)]
        user: String,

        #[arg(long)]
        space: Option<String>,
    },

    /// Semantic search with source attribution.
    Search {
        /// The search query string.
        query: String,

        #[arg(long)]
        user: String,

        #[arg(long)]
        space: Option<String>,

        /// Maximum number of candidates.
        #[arg(long)]
        limit: Option<usize>,

        /// Also generate an answer from the retrieved context (requires a
        /// configured completion provider).
        #[arg(long)]
        answer: bool,
    },

    /// Deterministic keyword search over the namespace's own documents.
    ///
    /// Works without the vector index; results are capped at the top 5.
    Keyword {
        /// The search query string.
        query: String,

        #[arg(long)]
        user: String,

        #[arg(long)]
        space: Option<String>,
    },

    /// List a namespace's content items.
    List {
        #[arg(long)]
        user: String,

        #[arg(long)]
        space: Option<String>,
    },

    /// Delete a content item and its indexed chunks.
    Remove {
        /// The content key (`doc_<id>` or `web_<id>`).
        key: String,

        #[arg(long)]
        user: String,

        #[arg(long)]
        space: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&config).await?;
            println!("initialized {}", config.db.path.display());
        }
        Commands::Ingest { file, user, space } => {
            let (pool, assistant) = build_assistant(&config).await?;
            run_ingest(&assistant, &file, &user, space.as_deref()).await?;
            pool.close().await;
        }
        Commands::Scrape { url, user, space } => {
            let (pool, assistant) = build_assistant(&config).await?;
            run_scrape(&config, &assistant, &url, &user, space.as_deref()).await?;
            pool.close().await;
        }
        Commands::Search {
            query,
            user,
            space,
            limit,
            answer,
        } => {
            let (pool, assistant) = build_assistant(&config).await?;
            run_search(
                &config,
                &assistant,
                &query,
                &user,
                space.as_deref(),
                limit,
                answer,
            )
            .await?;
            pool.close().await;
        }
        Commands::Keyword { query, user, space } => {
            let (pool, assistant) = build_assistant(&config).await?;
            run_keyword(&assistant, &query, &user, space.as_deref()).await?;
            pool.close().await;
        }
        Commands::List { user, space } => {
            let (pool, assistant) = build_assistant(&config).await?;
            run_list(&assistant, &user, space.as_deref()).await?;
            pool.close().await;
        }
        Commands::Remove { key, user, space } => {
            let (pool, assistant) = build_assistant(&config).await?;
            run_remove(&assistant, &key, &user, space.as_deref()).await?;
            pool.close().await;
        }
    }

    Ok(())
}

async fn build_assistant(config: &Config) -> Result<(SqlitePool, Assistant)> {
    let pool = db::connect(config).await?;
    let store = Arc::new(SqliteContentStore::new(pool.clone()));
    let index = Arc::new(SqliteIndex::new(pool.clone()));
    let assistant = Assistant::new(store, index, Arc::new(OpenPolicy), config.retrieval.params());
    Ok((pool, assistant))
}

fn media_type_for(file: &std::path::Path) -> &'static str {
    match file.extension().and_then(|e| e.to_str()) {
        Some("md") | Some("markdown") => "text/markdown",
        Some("html") | Some("htm") => "text/html",
        _ => "text/plain",
    }
}

/// One display line of a possibly long, possibly multiline text.
fn snippet(text: &str, max_chars: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .take(max_chars)
        .collect();
    flat
}

async fn run_ingest(
    assistant: &Assistant,
    file: &std::path::Path,
    user: &str,
    space: Option<&str>,
) -> Result<()> {
    let raw_text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("file has no usable name: {}", file.display()))?;

    let receipt = assistant
        .ingest_document(user, space, file_name, media_type_for(file), &raw_text)
        .await?;

    println!("ingested {}", file_name);
    println!("  namespace: {}", Namespace::resolve(user, space));
    println!("  key: {}", receipt.source.key());
    println!("  chunks: {}", receipt.chunk_count);
    println!("ok");
    Ok(())
}

async fn run_scrape(
    config: &Config,
    assistant: &Assistant,
    url: &str,
    user: &str,
    space: Option<&str>,
) -> Result<()> {
    let scraper = scrape::create_scraper(&config.scraper)?;
    let content = scraper.fetch(url).await?;
    let title = content
        .metadata
        .title
        .clone()
        .unwrap_or_else(|| url.to_string());

    let receipt = assistant
        .ingest_scraped_page(user, space, url, &title, &content.markdown, content.metadata)
        .await?;

    println!("scraped {}", url);
    println!("  title: {}", title);
    println!("  namespace: {}", Namespace::resolve(user, space));
    println!("  key: {}", receipt.source.key());
    println!("  chunks: {}", receipt.chunk_count);
    println!("ok");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_search(
    config: &Config,
    assistant: &Assistant,
    query: &str,
    user: &str,
    space: Option<&str>,
    limit: Option<usize>,
    answer: bool,
) -> Result<()> {
    let outcome = match assistant.search(user, space, query, limit).await {
        Ok(outcome) => outcome,
        Err(err @ EngineError::Upstream { .. }) => {
            eprintln!("search is temporarily unavailable: {err}");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    if outcome.candidates.is_empty() {
        println!("No relevant sources found.");
        return Ok(());
    }

    for candidate in &outcome.candidates {
        println!(
            "score: {:.2}  key: {}",
            candidate.score,
            candidate.source.key()
        );
        println!("  {}", snippet(&candidate.text, 160));
    }

    println!();
    println!("--- Sources ---");
    if !outcome.attribution.document_ids.is_empty() {
        println!("documents: {}", outcome.attribution.document_ids.join(", "));
    }
    if !outcome.attribution.website_ids.is_empty() {
        println!("websites:  {}", outcome.attribution.website_ids.join(", "));
    }

    if answer {
        if !config.completion.is_enabled() {
            anyhow::bail!("completion provider is disabled; set completion.provider in the config");
        }
        let provider = completion::create_provider(&config.completion)?;
        let text = provider.complete(query, &outcome.source_text).await?;
        println!();
        println!("--- Answer ({}) ---", provider.model_name());
        println!("{text}");
    }

    Ok(())
}

async fn run_keyword(
    assistant: &Assistant,
    query: &str,
    user: &str,
    space: Option<&str>,
) -> Result<()> {
    let matches = match assistant.keyword_search(user, space, query).await {
        Ok(matches) => matches,
        Err(err @ EngineError::Upstream { .. }) => {
            eprintln!("search is temporarily unavailable: {err}");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    if matches.is_empty() {
        println!("No relevant sources found.");
        return Ok(());
    }

    for m in &matches {
        println!("{}  {} ({} hits)", m.source.key(), m.name, m.score);
        println!("  {}", snippet(&m.preview, 160));
    }
    Ok(())
}

async fn run_list(assistant: &Assistant, user: &str, space: Option<&str>) -> Result<()> {
    let items = assistant.list(user, space).await?;
    let namespace = Namespace::resolve(user, space);

    if items.is_empty() {
        println!("No content ingested for {namespace}.");
        return Ok(());
    }

    let mut chunk_counts: std::collections::HashMap<String, usize> =
        std::collections::HashMap::new();
    for info in assistant.chunks(user, space).await? {
        *chunk_counts.entry(info.source.key()).or_insert(0) += 1;
    }

    println!("{:<42} {:<10} {:>7} NAME", "KEY", "KIND", "CHUNKS");
    for item in &items {
        let key = item.source_ref().key();
        println!(
            "{:<42} {:<10} {:>7} {}",
            key,
            item.kind().as_tag(),
            chunk_counts.get(&key).copied().unwrap_or(0),
            item.display_name()
        );
    }
    Ok(())
}

async fn run_remove(
    assistant: &Assistant,
    key: &str,
    user: &str,
    space: Option<&str>,
) -> Result<()> {
    let source = SourceRef::parse(key)
        .ok_or_else(|| anyhow!("invalid content key: '{key}' (expected doc_<id> or web_<id>)"))?;

    let removed = assistant.remove(user, space, &source).await?;
    println!("removed {}", source.key());
    println!("  chunks deleted: {removed}");
    println!("ok");
    Ok(())
}
