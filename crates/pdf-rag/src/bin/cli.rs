//! Command line interface for indexing and querying without the HTTP server
//!
//! Run with: cargo run -p pdf-rag --features cli --bin pdf-rag -- --help

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pdf_rag::{
    config::RagConfig,
    ingestion::IngestPipeline,
    providers::OllamaProvider,
    retrieval::QueryEngine,
    server::state::open_store,
    storage::UploadArea,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pdf-rag", version, about = "Index a PDF and ask questions about it")]
struct Cli {
    /// TOML configuration file (defaults to $PDF_RAG_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Index a PDF; only chunks not already stored are embedded
    Index {
        /// PDF to index
        file: PathBuf,

        /// Clear the content store first
        #[arg(long, default_value_t = false)]
        reset: bool,
    },
    /// Answer a question from the indexed content
    Query {
        /// The question
        text: String,

        /// Override the number of retrieved chunks
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Clear the content store
    Reset,
    /// List PDFs in the upload directory
    Uploads,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_rag=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = RagConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Index { file, reset } => {
            let store = open_store(&config)?;
            let (embedder, _) = OllamaProvider::new(&config.llm)?.split();
            let pipeline = IngestPipeline::from_config(&config)?;

            if reset {
                store.reset().await?;
            }

            let report = pipeline
                .run(&file, store.as_ref(), &embedder)
                .await
                .with_context(|| format!("failed to index {}", file.display()))?;

            println!(
                "{}: {} chunks, {} already stored, {} added",
                file.display(),
                report.total,
                report.existing,
                report.inserted.len()
            );
        }
        Command::Query { text, top_k } => {
            let store = open_store(&config)?;
            let (embedder, llm) = OllamaProvider::new(&config.llm)?.split();
            let engine = QueryEngine::new(top_k.unwrap_or(config.retrieval.top_k));

            let answer = engine.answer(&text, store.as_ref(), &embedder, &llm).await?;

            println!("{}", answer.response);
            if !answer.sources.is_empty() {
                println!("\nSources: {}", answer.sources.join(", "));
            }
        }
        Command::Reset => {
            let store = open_store(&config)?;
            store.reset().await?;
            println!("Content store cleared");
        }
        Command::Uploads => {
            let uploads = UploadArea::open(&config.uploads.dir).await?;
            let files = uploads.list_pdfs().await?;
            if files.is_empty() {
                println!("No PDFs found");
            }
            for file in files {
                println!("{}", file);
            }
        }
    }

    Ok(())
}
