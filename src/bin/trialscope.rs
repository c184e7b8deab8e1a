//! trialscope - clinical-trial entity extraction CLI
//!
//! Runs the built-in pattern tagger over a batch of trial documents and
//! exports the mention table, highlighted HTML, co-occurrence counts, or a
//! per-trial summary.
//!
//! # Usage
//!
//! ```bash
//! # Extract a mention table from a JSON document batch
//! trialscope extract trials.json --format tsv
//!
//! # Render one document as highlighted HTML
//! trialscope annotate trials.json --doc-id NCT00000001 > out.html
//!
//! # Disease × drug co-occurrence over the whole batch
//! trialscope cooccur trials.json --left disease --right drug --top-left 25
//!
//! # Entity summary for one trial
//! trialscope table trials.json --doc-id NCT00000001
//! ```
//!
//! Input is a JSON array of `{"id": ..., "text": ...}` records; `-` reads
//! from stdin.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use trialscope::{
    annotate_html, build_cooccurrence, per_trial_table, Aggregator, Document, EntityGroup, Error,
    Mention, MentionTable, PatternTaggerProvider, Result, TaggerProvider, MAX_ANNOTATED_SPANS,
};

/// Clinical-trial entity extraction and exploration.
#[derive(Debug, Parser)]
#[command(name = "trialscope", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run taggers over a document batch and export the mention table.
    Extract {
        /// Path to a JSON array of {id, text} records, or `-` for stdin.
        input: PathBuf,
        /// Export format.
        #[arg(long, value_enum, default_value_t = TableFormat::Json)]
        format: TableFormat,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render one document's mentions as highlighted HTML.
    Annotate {
        /// Path to a JSON array of {id, text} records, or `-` for stdin.
        input: PathBuf,
        /// Document to render.
        #[arg(long)]
        doc_id: String,
        /// Hide the group-label pills after each highlighted span.
        #[arg(long)]
        no_tags: bool,
        /// Maximum highlighted spans for the document.
        #[arg(long, default_value_t = MAX_ANNOTATED_SPANS)]
        max_spans: usize,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Count trials in which top entities of two groups co-occur.
    Cooccur {
        /// Path to a JSON array of {id, text} records, or `-` for stdin.
        input: PathBuf,
        /// Left entity group.
        #[arg(long, value_enum, default_value_t = GroupArg::Disease)]
        left: GroupArg,
        /// Right entity group.
        #[arg(long, value_enum, default_value_t = GroupArg::Drug)]
        right: GroupArg,
        /// How many left-group entities to keep, by trial frequency.
        #[arg(long, default_value_t = 25)]
        top_left: usize,
        /// How many right-group entities to keep, by trial frequency.
        #[arg(long, default_value_t = 25)]
        top_right: usize,
        /// Export format.
        #[arg(long, value_enum, default_value_t = TableFormat::Json)]
        format: TableFormat,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarize one trial's entities (group, surface, mention count).
    Table {
        /// Path to a JSON array of {id, text} records, or `-` for stdin.
        input: PathBuf,
        /// Trial to summarize.
        #[arg(long)]
        doc_id: String,
        /// Export format.
        #[arg(long, value_enum, default_value_t = TableFormat::Json)]
        format: TableFormat,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TableFormat {
    /// One JSON array.
    Json,
    /// One JSON object per line.
    Jsonl,
    /// Tab-separated values with a header row.
    Tsv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GroupArg {
    Disease,
    Drug,
    GeneProtein,
}

impl From<GroupArg> for EntityGroup {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::Disease => EntityGroup::Disease,
            GroupArg::Drug => EntityGroup::Drug,
            GroupArg::GeneProtein => EntityGroup::GeneProtein,
        }
    }
}

/// Input record shape; fingerprints are computed, not supplied.
#[derive(Debug, Deserialize)]
struct InputDocument {
    id: String,
    text: String,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Extract {
            input,
            format,
            output,
        } => {
            let table = extract(&input)?;
            write_output(output.as_deref(), &render_mentions(&table, format)?)
        }
        Command::Annotate {
            input,
            doc_id,
            no_tags,
            max_spans,
            output,
        } => {
            let docs = read_documents(&input)?;
            let doc = docs
                .iter()
                .find(|d| d.id == doc_id)
                .ok_or_else(|| Error::invalid_input(format!("no document with id '{doc_id}'")))?;
            let table = aggregate(&docs)?;
            let html = annotate_html(
                &doc.text,
                table.for_document(&doc_id),
                !no_tags,
                max_spans,
            );
            write_output(output.as_deref(), &html)
        }
        Command::Cooccur {
            input,
            left,
            right,
            top_left,
            top_right,
            format,
            output,
        } => {
            let table = extract(&input)?;
            let cells =
                build_cooccurrence(&table, &left.into(), &right.into(), top_left, top_right);
            let rows: Vec<Vec<String>> = cells
                .iter()
                .map(|c| vec![c.left.clone(), c.right.clone(), c.trial_count.to_string()])
                .collect();
            write_output(
                output.as_deref(),
                &render_rows(&cells, &["left", "right", "trial_count"], &rows, format)?,
            )
        }
        Command::Table {
            input,
            doc_id,
            format,
            output,
        } => {
            let table = extract(&input)?;
            let trial_rows = per_trial_table(&table, &doc_id);
            let rows: Vec<Vec<String>> = trial_rows
                .iter()
                .map(|r| {
                    vec![
                        r.group.as_label().to_string(),
                        r.surface.clone(),
                        r.normalized.clone(),
                        r.mentions.to_string(),
                    ]
                })
                .collect();
            write_output(
                output.as_deref(),
                &render_rows(
                    &trial_rows,
                    &["group", "surface", "normalized", "mentions"],
                    &rows,
                    format,
                )?,
            )
        }
    }
}

fn read_documents(input: &std::path::Path) -> Result<Vec<Document>> {
    let raw = if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(input)?
    };
    let records: Vec<InputDocument> = serde_json::from_str(&raw)?;
    if records.is_empty() {
        return Err(Error::invalid_input("input contains no documents"));
    }
    Ok(records
        .into_iter()
        .map(|r| Document::new(r.id, r.text))
        .collect())
}

fn extract(input: &std::path::Path) -> Result<MentionTable> {
    let docs = read_documents(input)?;
    aggregate(&docs)
}

fn aggregate(docs: &[Document]) -> Result<MentionTable> {
    let providers: Vec<Box<dyn TaggerProvider>> = vec![Box::new(PatternTaggerProvider)];
    Aggregator::new().run(docs, &providers)
}

fn render_mentions(table: &MentionTable, format: TableFormat) -> Result<String> {
    let header = [
        "doc_id",
        "surface",
        "normalized",
        "group",
        "label_raw",
        "start",
        "end",
        "fingerprint",
    ];
    let rows: Vec<Vec<String>> = table
        .iter()
        .map(|m: &Mention| {
            vec![
                m.doc_id.clone(),
                m.surface.clone(),
                m.normalized.clone(),
                m.group.as_label().to_string(),
                m.label_raw.clone(),
                m.start.to_string(),
                m.end.to_string(),
                m.fingerprint.clone(),
            ]
        })
        .collect();
    match format {
        TableFormat::Json => Ok(serde_json::to_string_pretty(table)?),
        TableFormat::Jsonl => {
            let mut out = String::new();
            for m in table {
                out.push_str(&serde_json::to_string(m)?);
                out.push('\n');
            }
            Ok(out)
        }
        TableFormat::Tsv => Ok(tsv(&header, &rows)),
    }
}

fn render_rows<T: serde::Serialize>(
    items: &[T],
    header: &[&str],
    rows: &[Vec<String>],
    format: TableFormat,
) -> Result<String> {
    match format {
        TableFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        TableFormat::Jsonl => {
            let mut out = String::new();
            for item in items {
                out.push_str(&serde_json::to_string(item)?);
                out.push('\n');
            }
            Ok(out)
        }
        TableFormat::Tsv => Ok(tsv(header, rows)),
    }
}

fn tsv(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = header.join("\t");
    out.push('\n');
    for row in rows {
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

fn write_output(path: Option<&std::path::Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, content)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
