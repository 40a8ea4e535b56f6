//! medrag - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

use medrag::cli::{Args, Commands, Config, Verbosity};
use medrag::corpus::Corpus;
use medrag::models::{CrossEncoderClient, OllamaEmbedder, OllamaGenerator};
use medrag::pipeline::RetrievalPipeline;
use medrag::repl;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(msg) = args.validate() {
        eprintln!("{}: {}", "Error".red(), msg);
        std::process::exit(1);
    }

    let mut config = Config::load(args.config.clone()).context("failed to load configuration")?;
    apply_overrides(&mut config, &args);
    config.validate().context("invalid configuration")?;

    let verbosity = args.verbosity();

    match args.command {
        Some(Commands::Config) => {
            print_config(&config);
            Ok(())
        }
        Some(Commands::Start) => {
            let pipeline = build_pipeline(&config, verbosity).await?;
            repl::run(pipeline, verbosity).await
        }
        None => {
            // validate() guarantees a query is present here
            let query = args.query.clone().unwrap_or_default();
            let pipeline = build_pipeline(&config, verbosity).await?;
            run_single_query(&pipeline, &query, args.compare, verbosity).await
        }
    }
}

/// Apply CLI flag overrides onto the loaded configuration
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(ref model) = args.model {
        config.ollama.generate_model = model.clone();
    }
    if let Some(ref host) = args.host {
        config.ollama.host = host.clone();
    }
    if let Some(port) = args.port {
        config.ollama.port = port;
    }
}

/// Load the corpus and wire up collaborators into a pipeline
async fn build_pipeline(config: &Config, verbosity: Verbosity) -> Result<Arc<RetrievalPipeline>> {
    let spinner = if verbosity.show_progress() {
        Some(loading_spinner("Loading corpus..."))
    } else {
        None
    };

    let corpus = Corpus::load(&config.keys_path(), &config.values_path()).with_context(|| {
        format!(
            "failed to load corpus from {} / {}",
            config.keys_path().display(),
            config.values_path().display()
        )
    })?;
    let index = Arc::new(corpus.into_index().context("failed to build similarity index")?);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let ollama_url = config.ollama_url();
    let embedder = Arc::new(OllamaEmbedder::new(
        &ollama_url,
        &config.ollama.embed_model,
    )?);
    let scorer = Arc::new(CrossEncoderClient::new(&config.reranker.url)?);
    let generator = Arc::new(OllamaGenerator::new(
        &ollama_url,
        &config.ollama.generate_model,
    )?);

    let pipeline = RetrievalPipeline::new(
        index,
        embedder,
        scorer,
        generator,
        config.pipeline_config(),
    )
    .context("failed to construct pipeline")?;

    Ok(Arc::new(pipeline))
}

/// Answer a single query and print the result
async fn run_single_query(
    pipeline: &RetrievalPipeline,
    query: &str,
    compare: bool,
    verbosity: Verbosity,
) -> Result<()> {
    let spinner = if verbosity.show_progress() {
        Some(loading_spinner("Retrieving and generating..."))
    } else {
        None
    };

    if compare {
        let comparison = pipeline.compare_modes(query).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        repl::print_comparison(&comparison?, verbosity);
    } else {
        let result = pipeline.answer(query).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        let answer = result?;

        if verbosity.show_passages() {
            println!("{}", "Evidence:".bold());
            for (i, candidate) in answer.evidence.iter().enumerate() {
                println!("  [{}] ({:.3}) {}", i, candidate.score, candidate.text);
            }
            println!();
        }
        println!("{}", answer.answer);
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("{}", "Current configuration:".bold());
    println!("  Ollama:     {}", config.ollama_url());
    println!("  Embedding:  {}", config.ollama.embed_model);
    println!("  Generation: {}", config.ollama.generate_model);
    println!("  Reranker:   {}", config.reranker.url);
    println!(
        "  Retrieval:  k_coarse={}, k_fine={}",
        config.pipeline.k_coarse, config.pipeline.k_fine
    );
    println!("  Corpus:     {}", config.keys_path().display());
    println!("              {}", config.values_path().display());
}

fn loading_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
