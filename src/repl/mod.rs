//! Interactive query loop
//!
//! Reads questions with rustyline, runs the three-mode pipeline comparison,
//! and prints retrieved passages, reranked passages, and each generation.

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::Verbosity;
use crate::pipeline::{ModeComparison, RetrievalPipeline};

/// Input handler managing readline interface and command history
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    prompt: String,
}

impl InputHandler {
    /// Create new input handler
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()?;

        Ok(InputHandler {
            editor,
            history_path: None,
            prompt: ">medrag: ".to_string(),
        })
    }

    /// Create input handler with persistent history (~/.medrag_history)
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(InputHandler {
            editor,
            history_path: Some(history_file),
            prompt: ">medrag: ".to_string(),
        })
    }

    /// Read a line of input from user
    ///
    /// Returns:
    /// - Ok(Some(input)) for normal input
    /// - Ok(None) for EOF (Ctrl-D)
    /// - Err on interrupt (Ctrl-C) or other errors
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed.is_empty() {
                    return Ok(Some(String::new()));
                }

                let _ = self.editor.add_history_entry(trimmed);

                Ok(Some(trimmed.to_string()))
            }
            Err(ReadlineError::Interrupted) => Err(anyhow::anyhow!("Interrupted")),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    /// Save history to disk
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            self.editor.save_history(path)?;
        }
        Ok(())
    }
}

/// Spinner shown while the pipeline is running
fn start_spinner(message: &str) -> ProgressBar {
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

/// Print one three-mode comparison
pub fn print_comparison(comparison: &ModeComparison, verbosity: Verbosity) {
    if verbosity.show_passages() {
        println!("\n{}", "Retrieved passages:".bold());
        for (i, hit) in comparison.coarse_hits.iter().enumerate() {
            println!("  [{}] ({:.3}) {}", i, hit.score, hit.text.dimmed());
        }
    }

    println!("\n{}", "Reranked evidence:".bold());
    for (i, candidate) in comparison.reranked.iter().enumerate() {
        println!("  [{}] ({:.3}) {}", i, candidate.score, candidate.text);
    }

    println!("\n{}", "=== Query only ===".cyan().bold());
    println!("{}", comparison.no_evidence_answer);

    println!("\n{}", "=== Retrieval only ===".cyan().bold());
    println!("{}", comparison.coarse_answer);

    println!("\n{}", "=== Retrieval + reranking ===".cyan().bold());
    println!("{}", comparison.reranked_answer);
    println!();
}

/// Run the interactive query loop until EOF or an empty exit
pub async fn run(pipeline: Arc<RetrievalPipeline>, verbosity: Verbosity) -> Result<()> {
    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".medrag_history");

    let mut input = InputHandler::with_history(history_path)?;

    println!(
        "{} corpus loaded ({} passages, dim {})",
        "✓".green(),
        pipeline.index().len(),
        pipeline.index().dim()
    );
    println!("Ask a question, or press Ctrl-D to exit.\n");

    loop {
        match input.read_line() {
            Ok(Some(query)) => {
                if query.is_empty() {
                    continue;
                }

                let spinner = if verbosity.show_progress() {
                    Some(start_spinner("Retrieving and generating..."))
                } else {
                    None
                };

                let result = pipeline.compare_modes(&query).await;

                if let Some(pb) = spinner {
                    pb.finish_and_clear();
                }

                match result {
                    Ok(comparison) => print_comparison(&comparison, verbosity),
                    Err(e) => eprintln!("{}: {}", "Error".red(), e),
                }
            }
            Ok(None) => break,
            Err(e) => {
                if e.to_string().contains("Interrupted") {
                    println!("\nPress Ctrl-D to exit");
                    continue;
                }
                return Err(e);
            }
        }
    }

    input.save_history()?;

    Ok(())
}
