//! cropchat CLI.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cropchat::config::AppConfig;
use cropchat::corpus::{Category, CorpusStore};
use cropchat::multimodal::MultimodalInput;
use cropchat::routing::predicates::is_exit_command;
use cropchat::services::catalog::BackendCatalog;
use cropchat::services::http_client;
use cropchat::services::translate::{GoogleTranslateClient, DEFAULT_TRANSLATE_BASE};
use cropchat::services::vision::{GeminiVisionClient, DEFAULT_GEMINI_BASE};
use cropchat::services::weather::OpenWeatherClient;
use cropchat::Assistant;

const INTERNAL_ERROR_REPLY: &str = "⚠️ Something went wrong while answering. Please try again.";

/// Agricultural assistant for plant health, pesticides and weather.
#[derive(Parser, Debug)]
#[command(name = "cropchat", version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session on stdin
    Chat {
        #[arg(long, default_value = "intents")]
        category: String,
        #[arg(long)]
        city: Option<String>,
    },

    /// Answer a single message
    Ask {
        message: String,
        #[arg(long, default_value = "intents")]
        category: String,
        #[arg(long)]
        city: Option<String>,
        /// Leaf photo to analyze alongside the message
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Plant health report for a leaf photo
    AnalyzeImage { path: PathBuf },

    /// List categories with their record and pattern counts
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;

    if let Command::Categories = cli.command {
        print_categories(&CorpusStore::load_dir(&config.corpus_dir));
        return Ok(());
    }

    let assistant = Arc::new(build_assistant(&config)?);

    match cli.command {
        Command::Chat { category, city } => chat(assistant, category, city).await?,
        Command::Ask {
            message,
            category,
            city,
            image,
        } => {
            let text = match image {
                Some(path) => {
                    let mut input =
                        MultimodalInput::new(&message, &category).with_image(read_image(&path)?);
                    if let Some(city) = city.as_deref() {
                        input = input.with_city(city);
                    }
                    assistant.multimodal(&input).await
                }
                None => {
                    assistant
                        .get_response(&message, &category, city.as_deref())
                        .await
                }
            };
            println!("{text}");
        }
        Command::AnalyzeImage { path } => {
            println!("{}", assistant.analyze_image(&read_image(&path)?).await);
        }
        Command::Categories => {}
    }
    Ok(())
}

fn build_assistant(config: &AppConfig) -> Result<Assistant> {
    let corpus = CorpusStore::load_dir(&config.corpus_dir);
    let http = http_client(config.request_timeout()).context("building HTTP client")?;

    let weather = Arc::new(OpenWeatherClient::new(
        http.clone(),
        &config.weather_base,
        config.weather_api_key.clone(),
    ));
    let catalog = Arc::new(BackendCatalog::new(http.clone(), &config.backend_base));
    let vision = Arc::new(GeminiVisionClient::new(
        http.clone(),
        DEFAULT_GEMINI_BASE,
        config.gemini_api_key.clone(),
        &config.gemini_model,
    ));

    let mut builder = Assistant::builder(corpus, weather, catalog)
        .with_vision(vision)
        .with_product_limit(config.product_limit)
        .with_frontend_base(&config.frontend_base);
    if config.translate {
        let google = Arc::new(GoogleTranslateClient::new(http, DEFAULT_TRANSLATE_BASE));
        builder = builder.with_translator(google.clone()).with_detector(google);
    }
    if let Some(seed) = config.seed {
        builder = builder.with_seed(seed);
    }

    builder.build().context("building assistant")
}

async fn chat(assistant: Arc<Assistant>, category: String, city: Option<String>) -> Result<()> {
    let mut category = category;
    println!("🌱 cropchat ready (category: {category}). Type 'exit' to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush().context("flushing stdout")?;

        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        let line = line.trim().to_string();

        if is_exit_command(&line) {
            println!("Bot: Goodbye! 👋");
            break;
        }
        if let Some(next) = line.strip_prefix("/category") {
            match next.parse::<Category>() {
                Ok(c) => {
                    category = c.to_string();
                    println!("Bot: switched to '{category}'.");
                }
                Err(e) => println!("Bot: {e}"),
            }
            continue;
        }

        let turn = {
            let assistant = assistant.clone();
            let category = category.clone();
            let city = city.clone();
            tokio::spawn(async move {
                assistant
                    .get_response(&line, &category, city.as_deref())
                    .await
            })
        };
        match turn.await {
            Ok(text) => println!("Bot: {text}"),
            Err(e) => {
                error!("turn failed: {e}");
                println!("Bot: {INTERNAL_ERROR_REPLY}");
            }
        }
    }
    info!("chat session ended");
    Ok(())
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading image {}", path.display()))
}

fn print_categories(corpus: &CorpusStore) {
    for category in Category::ALL {
        println!(
            "{category:<12} {:>4} records {:>5} patterns",
            corpus.records(category).len(),
            corpus.pattern_count(category)
        );
    }
}
