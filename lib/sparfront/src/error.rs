use crate::lexer::TokenKind;
use std::ops::Range;
use std::{fmt, io};

/// A position in a text i.e. a `line` number starting from 0, a `column` number starting from 0 (in number of code points) and a global file `offset` starting from 0 (in number of bytes).
#[derive(Eq, PartialEq, Debug, Copy, Clone, Default, Hash)]
pub struct TextPosition {
    pub line: u64,
    pub column: u64,
    pub offset: u64,
}

/// An error raised while parsing a SPARQL query.
///
/// The variants follow the stage that detected the problem:
/// the lexer, the grammar or the AST builders.
#[derive(Debug, thiserror::Error)]
pub enum SparqlSyntaxError {
    /// A malformed token.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// A token the grammar does not accept at this position.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A grammatically valid construction that is not a valid query.
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

impl SparqlSyntaxError {
    /// The location of the error inside of the query.
    #[inline]
    pub fn location(&self) -> Range<TextPosition> {
        match self {
            Self::Lex(e) => e.location(),
            Self::Parse(e) => e.location(),
            Self::Semantic(e) => e.location(),
        }
    }
}

impl From<SparqlSyntaxError> for io::Error {
    #[inline]
    fn from(error: SparqlSyntaxError) -> Self {
        Self::new(io::ErrorKind::InvalidData, error)
    }
}

/// A malformed token: unterminated literal or IRI, bad escape sequence, unexpected character...
#[derive(Debug, Clone, thiserror::Error)]
pub struct LexError {
    location: Range<TextPosition>,
    message: String,
}

impl LexError {
    pub(crate) fn new(location: Range<TextPosition>, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }

    /// The location of the error inside of the query.
    #[inline]
    pub fn location(&self) -> Range<TextPosition> {
        self.location.clone()
    }

    /// The error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LexError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_located(f, &self.location, &self.message)
    }
}

/// A grammar violation: the token found at `location` is not one of the `expected` ones.
#[derive(Debug, Clone, thiserror::Error)]
pub struct ParseError {
    location: Range<TextPosition>,
    expected: Vec<TokenKind>,
    found: TokenKind,
    lexeme: String,
    message: Option<String>,
}

impl ParseError {
    pub(crate) fn new(
        location: Range<TextPosition>,
        expected: Vec<TokenKind>,
        found: TokenKind,
        lexeme: impl Into<String>,
    ) -> Self {
        Self {
            location,
            expected,
            found,
            lexeme: lexeme.into(),
            message: None,
        }
    }

    /// Replaces the "expected ..." text by a custom message.
    pub(crate) fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The location of the unexpected token.
    #[inline]
    pub fn location(&self) -> Range<TextPosition> {
        self.location.clone()
    }

    /// The kinds of tokens that would have been accepted.
    #[inline]
    pub fn expected(&self) -> &[TokenKind] {
        &self.expected
    }

    /// The kind of the unexpected token.
    #[inline]
    pub fn found(&self) -> &TokenKind {
        &self.found
    }

    /// The text of the unexpected token as written in the query.
    #[inline]
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            return write_located(f, &self.location, message);
        }
        let mut message = String::from("expected ");
        match self.expected.as_slice() {
            [] => message.push_str("nothing"),
            [single] => message.push_str(&single.to_string()),
            expected => {
                message.push_str("one of ");
                for (i, kind) in expected.iter().enumerate() {
                    if i > 0 {
                        message.push_str(", ");
                    }
                    message.push_str(&kind.to_string());
                }
            }
        }
        message.push_str(", found ");
        message.push_str(&self.found.to_string());
        if !self.lexeme.is_empty()
            && !matches!(
                self.found,
                TokenKind::Punctuation(_) | TokenKind::Keyword(_) | TokenKind::EndOfInput
            )
        {
            message.push_str(" '");
            message.push_str(&self.lexeme);
            message.push('\'');
        }
        write_located(f, &self.location, &message)
    }
}

/// A construction accepted by the grammar but rejected by the AST builders: undeclared prefix, invalid IRI, ill-scoped variable...
#[derive(Debug, Clone, thiserror::Error)]
pub struct SemanticError {
    location: Range<TextPosition>,
    message: String,
}

impl SemanticError {
    pub(crate) fn new(location: Range<TextPosition>, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }

    /// The location of the offending construction.
    #[inline]
    pub fn location(&self) -> Range<TextPosition> {
        self.location.clone()
    }

    /// The error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SemanticError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_located(f, &self.location, &self.message)
    }
}

fn write_located(
    f: &mut fmt::Formatter<'_>,
    location: &Range<TextPosition>,
    message: &str,
) -> fmt::Result {
    if location.start.offset + 1 >= location.end.offset {
        write!(
            f,
            "Parser error at line {} column {}: {message}",
            location.start.line + 1,
            location.start.column + 1,
        )
    } else if location.start.line == location.end.line {
        write!(
            f,
            "Parser error at line {} between columns {} and {}: {message}",
            location.start.line + 1,
            location.start.column + 1,
            location.end.column + 1,
        )
    } else {
        write!(
            f,
            "Parser error between line {} column {} and line {} column {}: {message}",
            location.start.line + 1,
            location.start.column + 1,
            location.end.line + 1,
            location.end.column + 1,
        )
    }
}
