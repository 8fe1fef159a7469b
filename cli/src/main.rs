use crate::cli::{Args, Command, LogFormat, OutputFormat};
use anyhow::{Context, bail};
use clap::Parser;
use sparfront::{Query, SparqlParser, Update};
use sparfront::media_type::{MediaType, select_media_type, supported_media_types_message};
use std::fs;
use std::io::{self, Write, stdin, stdout};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;

pub fn main() -> anyhow::Result<()> {
    let matches = Args::parse();
    init_logging(&matches.log_level, matches.log_format)?;
    match matches.command {
        Command::Parse {
            query,
            query_file,
            base,
            max_depth,
            update,
            format,
        } => parse(query, query_file, base, max_depth, update, format),
        Command::Negotiate { accept, candidate } => negotiate(&accept, &candidate),
    }
}

/// Logs go to stderr so that stdout only holds the command output.
fn init_logging(default_level: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("Invalid log level '{default_level}'"))?,
    };
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr),
            )
            .try_init(),
    }
    .context("Not able to initialize logging")
}

/// A parsed request, either a query or an update.
enum Parsed {
    Query(Query),
    Update(Update),
}

fn parse(
    query: Option<String>,
    query_file: Option<PathBuf>,
    base: Option<String>,
    max_depth: Option<usize>,
    update: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let kind = if update { "update" } else { "query" };
    let query = if let Some(query) = query {
        query
    } else if let Some(query_file) = query_file {
        fs::read_to_string(&query_file)
            .with_context(|| format!("Not able to read {kind} file {}", query_file.display()))?
    } else {
        io::read_to_string(stdin().lock())?
    };
    let mut parser = SparqlParser::new();
    if let Some(base) = base {
        parser = parser
            .with_base_iri(&base)
            .with_context(|| format!("Invalid base IRI {base}"))?;
    }
    if let Some(max_depth) = max_depth {
        parser = parser.with_max_depth(max_depth);
    }

    let start = Instant::now();
    let parsed = if update {
        parser.parse_update(&query).map(Parsed::Update)
    } else {
        parser.parse_query(&query).map(Parsed::Query)
    };
    debug!(
        elapsed_us = start.elapsed().as_micros(),
        bytes = query.len(),
        kind,
        "input parsed"
    );
    let parsed = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            let location = e.location();
            warn!(
                line = location.start.line + 1,
                column = location.start.column + 1,
                "invalid {kind}: {e}"
            );
            return Err(e).with_context(|| format!("The {kind} is invalid"));
        }
    };

    let mut stdout = stdout().lock();
    match (format, &parsed) {
        (OutputFormat::Sparql, Parsed::Query(query)) => writeln!(stdout, "{query}")?,
        // Each operation is already on its own line
        (OutputFormat::Sparql, Parsed::Update(update)) => write!(stdout, "{update}")?,
        (OutputFormat::Sse, Parsed::Query(query)) => writeln!(stdout, "{}", query.to_sse())?,
        (OutputFormat::Sse, Parsed::Update(update)) => writeln!(stdout, "{}", update.to_sse())?,
        (OutputFormat::Json, Parsed::Query(query)) => {
            serde_json::to_writer_pretty(&mut stdout, query)?;
            writeln!(stdout)?;
        }
        (OutputFormat::Json, Parsed::Update(update)) => {
            serde_json::to_writer_pretty(&mut stdout, update)?;
            writeln!(stdout)?;
        }
    }
    stdout.flush()?;
    Ok(())
}

/// Prints the selected media type, fails if there is none.
fn negotiate(accept: &str, candidates: &[String]) -> anyhow::Result<()> {
    let candidates = if candidates.is_empty() {
        MediaType::well_known().collect::<Vec<_>>()
    } else {
        candidates
            .iter()
            .map(|c| MediaType::parse(c).with_context(|| format!("Invalid candidate {c}")))
            .collect::<anyhow::Result<Vec<_>>>()?
    };
    let selected = select_media_type(accept, &candidates)
        .with_context(|| format!("Invalid Accept header '{accept}'"))?;
    let Some(selected) = selected else {
        warn!(accept, "no acceptable media type");
        bail!(
            "The Accept header does not match any supported media type. {}",
            supported_media_types_message(&candidates)
        );
    };
    info!(accept, %selected, "media type selected");
    let mut stdout = stdout().lock();
    writeln!(stdout, "{selected}")?;
    stdout.flush()?;
    Ok(())
}
