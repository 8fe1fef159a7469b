use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "sparfront")]
/// SPARQL 1.1 query and update parser and HTTP Accept header negotiation toolkit
pub struct Args {
    /// Default log filter, used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
    /// Format of the logs written to stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a SPARQL query or update and print its syntax tree
    ///
    /// The process fails with the error location if the input is invalid.
    Parse {
        /// The SPARQL query to parse
        ///
        /// If no query or query file are given, stdin is used.
        #[arg(short, long, conflicts_with = "query_file")]
        query: Option<String>,
        /// File in which the query is stored
        ///
        /// If no query or query file are given, stdin is used.
        #[arg(long, conflicts_with = "query", value_hint = ValueHint::FilePath)]
        query_file: Option<PathBuf>,
        /// Base IRI of the query
        #[arg(long, value_hint = ValueHint::Url)]
        base: Option<String>,
        /// Maximal nesting of groups, expressions, property paths and collections
        #[arg(long)]
        max_depth: Option<usize>,
        /// Parse the input as a SPARQL update instead of a query
        #[arg(short, long)]
        update: bool,
        /// The output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Sparql)]
        format: OutputFormat,
    },
    /// Pick the media type to answer with given an HTTP Accept header
    ///
    /// The process fails if none of the candidates is acceptable.
    Negotiate {
        /// The Accept header value
        #[arg(short, long, default_value = "")]
        accept: String,
        /// A media type the server is able to produce, in order of preference
        ///
        /// By default, a built-in list of well-known media types is used.
        #[arg(short, long)]
        candidate: Vec<String>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// SPARQL syntax
    Sparql,
    /// SPARQL S-Expressions
    Sse,
    /// JSON serialization of the syntax tree
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
