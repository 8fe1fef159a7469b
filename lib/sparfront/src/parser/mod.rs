//! A recursive descent parser for the [SPARQL 1.1 query grammar](https://www.w3.org/TR/sparql11-query/#grammar)
//! and its [update extension](https://www.w3.org/TR/sparql11-update/#grammar).
//!
//! Each grammar rule is a method of [`Parser`], spread over the sibling modules by component.
//! Rule comments quote the production they implement.

mod expression;
mod path;
mod pattern;
mod query;
mod term;
mod update;

use crate::cursor::TokenCursor;
use crate::error::{ParseError, SemanticError, SparqlSyntaxError, TextPosition};
use crate::query::{Declaration, Query};
use crate::update::Update;
use oxiri::{Iri, IriParseError};
use std::collections::{HashMap, HashSet};
use std::ops::Range;

type ParseResult<T> = Result<T, SparqlSyntaxError>;

/// A parser for the [SPARQL 1.1 query language](https://www.w3.org/TR/sparql11-query/).
///
/// ```
/// use sparfront::SparqlParser;
///
/// let query_str = "SELECT ?s ?p ?o WHERE { ?s ?p ?o . }";
/// let query = SparqlParser::new().parse_query(query_str)?;
/// assert_eq!(query.to_string(), query_str);
/// # Ok::<_, sparfront::SparqlSyntaxError>(())
/// ```
#[must_use]
#[derive(Clone)]
pub struct SparqlParser {
    base_iri: Option<Iri<String>>,
    prefixes: HashMap<String, String>,
    max_depth: usize,
}

impl Default for SparqlParser {
    fn default() -> Self {
        Self {
            base_iri: None,
            prefixes: HashMap::new(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

impl SparqlParser {
    /// The default nesting limit of groups, expressions, paths and triples nodes.
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provides an IRI that could be used to resolve the query relative IRIs.
    ///
    /// A `BASE` declaration inside of the query takes precedence.
    ///
    /// ```
    /// use sparfront::SparqlParser;
    ///
    /// let query = SparqlParser::new()
    ///     .with_base_iri("http://example.com/")?
    ///     .parse_query("SELECT * WHERE { <s> <p> <o> }")?;
    /// assert_eq!(
    ///     query.to_string(),
    ///     "SELECT * WHERE { <http://example.com/s> <http://example.com/p> <http://example.com/o> . }"
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Result<Self, IriParseError> {
        self.base_iri = Some(Iri::parse(base_iri.into())?);
        Ok(self)
    }

    /// Set a default IRI prefix used during parsing.
    ///
    /// ```
    /// use sparfront::SparqlParser;
    ///
    /// let query = SparqlParser::new()
    ///     .with_prefix("ex", "http://example.com/")?
    ///     .parse_query("SELECT * WHERE { ex:s ex:p ex:o }")?;
    /// assert_eq!(
    ///     query.to_string(),
    ///     "SELECT * WHERE { <http://example.com/s> <http://example.com/p> <http://example.com/o> . }"
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn with_prefix(
        mut self,
        prefix_name: impl Into<String>,
        prefix_iri: impl Into<String>,
    ) -> Result<Self, IriParseError> {
        self.prefixes.insert(
            prefix_name.into(),
            Iri::parse(prefix_iri.into())?.into_inner(),
        );
        Ok(self)
    }

    /// Bounds how deeply groups, expressions, property paths and collections might be nested.
    ///
    /// Queries going deeper fail with a [`ParseError`] instead of exhausting the stack.
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the given query string using the already set options.
    ///
    /// ```
    /// use sparfront::SparqlParser;
    ///
    /// let query_str = "ASK { ?s ?p ?o . }";
    /// let query = SparqlParser::new().parse_query(query_str)?;
    /// assert_eq!(query.to_string(), "ASK WHERE { ?s ?p ?o . }");
    /// # Ok::<_, sparfront::SparqlSyntaxError>(())
    /// ```
    pub fn parse_query(&self, query: &str) -> Result<Query, SparqlSyntaxError> {
        Parser::new(query, self).query_unit()
    }

    /// Parse the given update string using the already set options.
    ///
    /// Prefixes declared by an operation stay in scope for the next ones.
    ///
    /// ```
    /// use sparfront::SparqlParser;
    ///
    /// let update = SparqlParser::new().parse_update(
    ///     "PREFIX ex: <http://example.com/> INSERT DATA { ex:s ex:p ex:o } ; DELETE WHERE { ex:s ?p ?o }",
    /// )?;
    /// assert_eq!(update.operations.len(), 2);
    /// # Ok::<_, sparfront::SparqlSyntaxError>(())
    /// ```
    pub fn parse_update(&self, update: &str) -> Result<Update, SparqlSyntaxError> {
        Parser::new(update, self).update_unit()
    }
}

/// The state of a single parse: it is never shared between two queries.
pub(crate) struct Parser<'a> {
    cursor: TokenCursor<'a>,
    base_iri: Option<Iri<String>>,
    prefixes: HashMap<String, String>,
    declarations: Vec<Declaration>,
    /// Next id of the blank nodes minted for `[]` and collections.
    blank_node_counter: u64,
    /// Labels of the previous basic graph patterns.
    used_bnodes: HashSet<String>,
    /// Labels of the current basic graph pattern.
    currently_used_bnodes: HashSet<String>,
    depth: usize,
    max_depth: usize,
    aggregates_allowed: bool,
}

impl<'a> Parser<'a> {
    fn new(query: &'a str, options: &SparqlParser) -> Self {
        Self {
            cursor: TokenCursor::new(query),
            base_iri: options.base_iri.clone(),
            prefixes: options.prefixes.clone(),
            declarations: Vec::new(),
            blank_node_counter: 0,
            used_bnodes: HashSet::new(),
            currently_used_bnodes: HashSet::new(),
            depth: 0,
            max_depth: options.max_depth,
            aggregates_allowed: false,
        }
    }

    /// Runs a nested rule, failing if the nesting limit is reached.
    fn guarded<T>(&mut self, rule: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= self.max_depth {
            let token = self.cursor.peek()?;
            return Err(ParseError::new(
                self.cursor.location()?,
                Vec::new(),
                token.kind(),
                token.to_string(),
            )
            .with_message(format!(
                "the query is nested too deeply, at most {} nested levels are allowed",
                self.max_depth
            ))
            .into());
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// Runs `rule` with aggregates allowed or not.
    fn with_aggregates<T>(
        &mut self,
        allowed: bool,
        rule: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let previous = self.aggregates_allowed;
        self.aggregates_allowed = allowed;
        let result = rule(self);
        self.aggregates_allowed = previous;
        result
    }

    fn semantic_error(
        location: Range<TextPosition>,
        message: impl Into<String>,
    ) -> SparqlSyntaxError {
        SemanticError::new(location, message).into()
    }

    /// The location from `start` to the end of the last consumed token.
    fn location_from(&self, start: TextPosition) -> Range<TextPosition> {
        start..self.cursor.last_end()
    }
}
