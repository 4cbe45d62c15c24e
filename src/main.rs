//! # Transcript Insights CLI (`tix`)
//!
//! The `tix` binary is the primary interface for Transcript Insights. It
//! provides commands for language detection, transcript chunking, running
//! analysis operations, transcript question answering, and exporting
//! transcripts to portable formats.
//!
//! ## Usage
//!
//! ```bash
//! tix --config ./tix.toml <command> <file>
//! ```
//!
//! Input files are parsed by extension: `.srt` and `.vtt` are treated as
//! subtitles, anything else as plain text (one segment per line). A path
//! of `-` reads plain text from stdin.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tix detect <file>` | Detect the transcript language |
//! | `tix chunks <file>` | Split the transcript into retrieval chunks |
//! | `tix analyze <op> <file>` | Run an analysis operation (summary, mindmap, keywords, sentiment, heatmap, template) |
//! | `tix ask <file> "<question>"` | Answer a question from the transcript |
//! | `tix export <file> --format md` | Render the transcript as Markdown, CSV, or PDF |
//!
//! ## Examples
//!
//! ```bash
//! # Detect the language of a subtitle file
//! tix detect talk.srt
//!
//! # Chunk with a custom character budget
//! tix chunks talk.vtt --chunk-size 800
//!
//! # Summarize with the local heuristics backend
//! tix analyze summary talk.srt --length detailed
//!
//! # Summarize with a hosted model instead
//! tix analyze summary talk.srt --runtime openai
//!
//! # Structured meeting notes
//! tix analyze template standup.vtt --kind meeting
//!
//! # Question answering over the transcript
//! tix ask talk.srt "what was decided about the rollout?"
//!
//! # Export as CSV
//! tix export talk.srt --format csv -o talk.csv
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use transcript_insights::analyze::Analyzer;
use transcript_insights::chunk::{chunk_transcript, DEFAULT_CHUNK_SIZE};
use transcript_insights::config::{load_config, Config};
use transcript_insights::export::{render_csv, render_markdown, render_pdf, ExportRequest};
use transcript_insights::language::detect_language_segments;
use transcript_insights::models::{
    ExportFormat, Segment, SummaryLength, TemplateKind, TranscriptSource,
};
use transcript_insights::subtitles::{parse_srt, parse_vtt, segments_from_plain_text};

/// Transcript Insights CLI — transcript analysis with pluggable local and
/// hosted backends.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "tix",
    about = "Transcript Insights — chunking, retrieval, and analysis for video transcripts",
    version,
    long_about = "Transcript Insights parses subtitle files into timestamped segments, splits \
    them into retrieval chunks, and runs analysis operations (summaries, mind maps, keywords, \
    sentiment, question answering, structured templates) through a local heuristics backend or \
    hosted LLM APIs."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./tix.toml`. Chunking budgets, retrieval limits,
    /// provider selection, and cache TTLs are read from this file; a
    /// missing file falls back to built-in defaults.
    #[arg(long, global = true, default_value = "./tix.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Detect the language of a transcript.
    ///
    /// Prints the ISO 639-1 code, the confidence score, and the
    /// reliability band. Short inputs default to English with zero
    /// confidence.
    Detect {
        /// Subtitle or plain-text transcript file.
        file: PathBuf,
    },

    /// Split a transcript into retrieval chunks.
    ///
    /// Prints each chunk's time range, segment count, and character
    /// length as JSON. Chunks respect segment boundaries; a single
    /// oversized segment becomes its own chunk rather than being split.
    Chunks {
        /// Subtitle or plain-text transcript file.
        file: PathBuf,

        /// Character budget per chunk.
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },

    /// Run an analysis operation over a transcript.
    ///
    /// Results are printed as JSON and cached per video, language, and
    /// operation for the configured TTL.
    Analyze {
        /// Operation: `summary`, `mindmap`, `keywords`, `sentiment`,
        /// `heatmap`, or `template`.
        operation: String,

        /// Subtitle or plain-text transcript file.
        file: PathBuf,

        /// Summary length: `short`, `medium`, or `detailed`.
        #[arg(long, default_value = "medium")]
        length: String,

        /// Template kind: `recipe`, `education`, or `meeting`.
        #[arg(long, default_value = "meeting")]
        kind: String,

        /// Override the configured backend: `local`, `openai`, or `gemini`.
        #[arg(long)]
        runtime: Option<String>,

        /// Identifier used for caching; defaults to the file stem.
        #[arg(long)]
        video_id: Option<String>,
    },

    /// Answer a question from a transcript.
    ///
    /// Retrieves the most relevant chunks for the question and prints the
    /// answer with its source segments as JSON.
    Ask {
        /// Subtitle or plain-text transcript file.
        file: PathBuf,

        /// The question to answer.
        question: String,

        /// Override the configured backend: `local`, `openai`, or `gemini`.
        #[arg(long)]
        runtime: Option<String>,
    },

    /// Export a transcript as Markdown, CSV, or PDF.
    Export {
        /// Subtitle or plain-text transcript file.
        file: PathBuf,

        /// Output format: `md`, `csv`, or `pdf`.
        #[arg(long, default_value = "md")]
        format: String,

        /// Output path. Defaults to stdout for text formats; required for PDF.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Parse a transcript file into segments based on its extension. A path of
/// `-` reads plain text from stdin.
fn load_segments(path: &Path) -> Result<Vec<Segment>> {
    if path.as_os_str() == "-" {
        let content = std::io::read_to_string(std::io::stdin())
            .context("Failed to read transcript from stdin")?;
        let segments = segments_from_plain_text(&content);
        if segments.is_empty() {
            bail!("No segments found on stdin");
        }
        return Ok(segments);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    let segments = match extension.as_deref() {
        Some("srt") => parse_srt(&content),
        Some("vtt") => parse_vtt(&content),
        _ => segments_from_plain_text(&content),
    };
    if segments.is_empty() {
        bail!("No segments found in {}", path.display());
    }
    Ok(segments)
}

fn video_id_for(path: &Path, explicit: Option<String>) -> String {
    explicit.unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("transcript")
            .to_string()
    })
}

fn parse_length(value: &str) -> Result<SummaryLength> {
    match value.to_lowercase().as_str() {
        "short" => Ok(SummaryLength::Short),
        "medium" => Ok(SummaryLength::Medium),
        "detailed" => Ok(SummaryLength::Detailed),
        other => bail!("Unknown summary length: {} (expected short, medium, detailed)", other),
    }
}

fn parse_kind(value: &str) -> Result<TemplateKind> {
    match value.to_lowercase().as_str() {
        "recipe" => Ok(TemplateKind::Recipe),
        "education" => Ok(TemplateKind::Education),
        "meeting" => Ok(TemplateKind::Meeting),
        other => bail!("Unknown template kind: {} (expected recipe, education, meeting)", other),
    }
}

fn parse_format(value: &str) -> Result<ExportFormat> {
    match value.to_lowercase().as_str() {
        "md" | "markdown" => Ok(ExportFormat::Markdown),
        "csv" => Ok(ExportFormat::Csv),
        "pdf" => Ok(ExportFormat::Pdf),
        other => bail!("Unknown export format: {} (expected md, csv, pdf)", other),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Detect { file } => {
            let segments = load_segments(&file)?;
            let detection = detect_language_segments(&segments);
            print_json(&detection)?;
        }
        Commands::Chunks { file, chunk_size } => {
            let segments = load_segments(&file)?;
            let chunks = chunk_transcript(&segments, chunk_size);
            print_json(&chunks)?;
        }
        Commands::Analyze {
            operation,
            file,
            length,
            kind,
            runtime,
            video_id,
        } => {
            let segments = load_segments(&file)?;
            let analyzer = Analyzer::new(cfg);
            let document = analyzer.build_document(
                &video_id_for(&file, video_id),
                "auto",
                segments,
                TranscriptSource::Uploaded,
            )?;
            let runtime = runtime.as_deref();
            match operation.to_lowercase().as_str() {
                "summary" => {
                    let result = analyzer
                        .get_summary(&document, parse_length(&length)?, runtime)
                        .await?;
                    print_json(&result)?;
                }
                "mindmap" => {
                    let result = analyzer.get_mind_map(&document, runtime).await?;
                    print_json(&result)?;
                }
                "keywords" => {
                    let result = analyzer.get_keywords(&document, runtime).await?;
                    print_json(&result)?;
                }
                "sentiment" => {
                    let result = analyzer.get_sentiment(&document, runtime).await?;
                    print_json(&result)?;
                }
                "heatmap" => {
                    let result = analyzer.get_heatmap(&document, runtime).await?;
                    print_json(&result)?;
                }
                "template" => {
                    let result = analyzer
                        .get_template(&document, parse_kind(&kind)?, runtime)
                        .await?;
                    print_json(&result)?;
                }
                other => bail!(
                    "Unknown operation: {} (expected summary, mindmap, keywords, sentiment, heatmap, template)",
                    other
                ),
            }
        }
        Commands::Ask {
            file,
            question,
            runtime,
        } => {
            let segments = load_segments(&file)?;
            let analyzer = Analyzer::new(cfg);
            let document = analyzer.build_document(
                &video_id_for(&file, None),
                "auto",
                segments,
                TranscriptSource::Uploaded,
            )?;
            let result = analyzer
                .get_qa(&document, &question, runtime.as_deref())
                .await?;
            print_json(&result)?;
        }
        Commands::Export {
            file,
            format,
            output,
        } => {
            let segments = load_segments(&file)?;
            let analyzer = Analyzer::new(cfg);
            let document = analyzer.build_document(
                &video_id_for(&file, None),
                "auto",
                segments,
                TranscriptSource::Uploaded,
            )?;
            let format = parse_format(&format)?;
            let request = ExportRequest::transcript_only(&document);
            match format {
                ExportFormat::Markdown | ExportFormat::Csv => {
                    let rendered = match format {
                        ExportFormat::Markdown => render_markdown(&request),
                        _ => render_csv(&request),
                    };
                    match output {
                        Some(path) => std::fs::write(&path, rendered)
                            .with_context(|| format!("Failed to write {}", path.display()))?,
                        None => print!("{}", rendered),
                    }
                }
                ExportFormat::Pdf => {
                    let Some(path) = output else {
                        bail!("PDF export requires --output");
                    };
                    std::fs::write(&path, render_pdf(&request))
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                }
            }
        }
    }

    Ok(())
}
