//! # anycite: Citation-grounded document summaries
//!
//! Command-line entry point. Reads PDF files from disk, runs them through the summary
//! pipeline and prints the resulting summary as JSON.

mod config;
mod sink;

use anycite::{
    DocumentRef, FileContent, ModelOption, ProviderRouter, SummaryPipeline, SummaryRequest,
};
use anycite_pdf::PdfTextExtractor;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sink::JsonFileSink;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a YAML configuration file (defaults to `anycite.yml` if present)
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the models that can be selected with `--model`
    Models,
    /// Summarize one or more PDF documents into cited sentences
    Summarize(SummarizeArgs),
}

#[derive(Parser, Debug)]
struct SummarizeArgs {
    /// Title stored with the summary
    #[arg(long)]
    title: String,
    /// Description stored with the summary
    #[arg(long, default_value = "")]
    description: String,
    /// Model key or provider model id (see `anycite models`)
    #[arg(long)]
    model: String,
    /// Extra guidance appended to the prompt
    #[arg(long)]
    instruction: Option<String>,
    /// Recorded in the logs for the run
    #[arg(long, env = "USER")]
    requester: Option<String>,
    /// Directory to write the summary JSON into
    #[arg(long)]
    out: Option<PathBuf>,
    /// Documents as `PATH` or `ID=PATH`; unnumbered documents get their 1-based position
    #[arg(required = true, value_parser = parse_document_arg)]
    documents: Vec<DocumentArg>,
}

#[derive(Debug, Clone)]
struct DocumentArg {
    id: Option<i64>,
    path: PathBuf,
}

fn parse_document_arg(raw: &str) -> Result<DocumentArg, String> {
    if let Some((id, path)) = raw.split_once('=') {
        if let Ok(id) = id.trim().parse::<i64>() {
            if path.is_empty() {
                return Err(format!("missing path after '{id}='"));
            }
            return Ok(DocumentArg {
                id: Some(id),
                path: PathBuf::from(path),
            });
        }
    }
    Ok(DocumentArg {
        id: None,
        path: PathBuf::from(raw),
    })
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Models => print_models(),
        Commands::Summarize(args) => handle_summarize(cli.config.as_deref(), args).await?,
    }

    Ok(())
}

// --- Command Handlers ---

fn print_models() {
    println!("{:<22} {:<8} MODEL ID", "KEY", "PROVIDER");
    for model in ModelOption::ALL {
        println!(
            "{:<22} {:<8} {}",
            model.key(),
            format!("{:?}", model.provider()),
            model.model_id()
        );
    }
}

async fn handle_summarize(config_path: Option<&str>, args: SummarizeArgs) -> Result<()> {
    let app_config = config::get_config(config_path).context("Failed to load configuration")?;
    let router = ProviderRouter::from_settings(
        &app_config.providers,
        app_config.pipeline.request_timeout,
    )?;
    let pipeline = SummaryPipeline::new(
        Arc::new(PdfTextExtractor::new()),
        router,
        app_config.pipeline,
    );

    let documents = to_document_refs(args.documents)?;
    let request = SummaryRequest {
        requester: args.requester,
        documents,
        title: args.title,
        description: args.description,
        model_key: args.model,
        instruction: args.instruction,
    };

    let summary = match args.out {
        Some(dir) => {
            let sink = JsonFileSink::new(dir);
            let stored = pipeline.run_and_persist(request, &sink).await?;
            info!(
                "Saved summary '{}' under '{}'.",
                stored.id,
                sink.dir().display()
            );
            stored.summary
        }
        None => pipeline.run(request).await?,
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn to_document_refs(args: Vec<DocumentArg>) -> Result<Vec<DocumentRef>> {
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            if !arg.path.is_file() {
                bail!("'{}' is not a readable file", arg.path.display());
            }
            let id = arg.id.unwrap_or(index as i64 + 1);
            let file_name = arg
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
            Ok(DocumentRef::new(id, file_name, FileContent::new(arg.path)))
        })
        .collect()
}
