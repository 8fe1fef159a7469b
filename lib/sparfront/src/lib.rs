#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![doc(test(attr(deny(warnings))))]
#![doc(html_favicon_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]

pub mod algebra;
mod cursor;
mod error;
pub mod lexer;
pub mod media_type;
mod parser;
pub mod path;
mod query;
pub mod term;
mod update;

pub use error::{LexError, ParseError, SemanticError, SparqlSyntaxError, TextPosition};
pub use parser::SparqlParser;
pub use query::*;
pub use update::*;

/// Parses a query with the default [`SparqlParser`] options.
///
/// ```
/// let query = sparfront::parse_query("PREFIX ex: <http://example.com/> ASK { ex:s ?p ?o }")?;
/// assert_eq!(
///     query.to_sse(),
///     "(ask (group (bgp (triple <http://example.com/s> ?p ?o))))"
/// );
/// # Ok::<_, sparfront::SparqlSyntaxError>(())
/// ```
#[inline]
pub fn parse_query(query: &str) -> Result<Query, SparqlSyntaxError> {
    SparqlParser::new().parse_query(query)
}

/// Parses an update with the default [`SparqlParser`] options.
///
/// ```
/// let update = sparfront::parse_update("DELETE WHERE { ?s <http://example.com/p> ?o }")?;
/// assert_eq!(
///     update.to_sse(),
///     "(update (deleteWhere ((triple ?s <http://example.com/p> ?o))))"
/// );
/// # Ok::<_, sparfront::SparqlSyntaxError>(())
/// ```
#[inline]
pub fn parse_update(update: &str) -> Result<Update, SparqlSyntaxError> {
    SparqlParser::new().parse_update(update)
}
