//! Leaf terms of the query tree: [variables](https://www.w3.org/TR/sparql11-query/#sparqlQueryVariables), [IRIs](https://www.w3.org/TR/rdf11-concepts/#dfn-iri), [blank nodes](https://www.w3.org/TR/rdf11-concepts/#dfn-blank-node) and [literals](https://www.w3.org/TR/rdf11-concepts/#dfn-literal).
//!
//! The default string formatters return a SPARQL compatible representation.

use std::fmt;
use std::fmt::Write;

/// A [SPARQL query variable](https://www.w3.org/TR/sparql11-query/#sparqlQueryVariables).
///
/// ```
/// use sparfront::term::Variable;
///
/// assert_eq!("?foo", Variable::new_unchecked("foo").to_string());
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    name: String,
}

impl Variable {
    /// Creates a variable from its name, without the leading `?`.
    ///
    /// The name is not validated.
    #[inline]
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.name
    }
}

impl fmt::Display for Variable {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}

/// An absolute [IRI](https://www.w3.org/TR/rdf11-concepts/#dfn-iri).
///
/// Prefixed names and relative references are resolved by the parser before building it.
///
/// ```
/// use sparfront::term::Iri;
///
/// assert_eq!(
///     "<http://example.com/foo>",
///     Iri::new_unchecked("http://example.com/foo").to_string()
/// );
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Iri {
    iri: String,
}

impl Iri {
    /// Builds an IRI without validating it.
    #[inline]
    pub fn new_unchecked(iri: impl Into<String>) -> Self {
        Self { iri: iri.into() }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.iri
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.iri
    }
}

impl fmt::Display for Iri {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.iri)
    }
}

impl PartialEq<str> for Iri {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.iri == other
    }
}

impl PartialEq<&str> for Iri {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.iri == *other
    }
}

/// A [blank node](https://www.w3.org/TR/rdf11-concepts/#dfn-blank-node).
///
/// Labels come from the query text (`_:foo`). Anonymous nodes are minted by the parser for `[]`, `[ ... ]` and collections,
/// numbered from 0 in order of appearance inside each query.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlankNode {
    Labeled(String),
    Anonymous(u64),
}

impl fmt::Display for BlankNode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Labeled(label) => write!(f, "_:{label}"),
            Self::Anonymous(id) => write!(f, "_:anon{id}"),
        }
    }
}

/// What is attached to the lexical form of a [`Literal`].
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LiteralAnnotation {
    /// A plain string.
    Simple,
    /// A [language-tagged string](https://www.w3.org/TR/rdf11-concepts/#dfn-language-tagged-string), with its tag in lowercase.
    Language(String),
    /// A literal with an explicit datatype.
    Datatype(Iri),
}

/// An RDF [literal](https://www.w3.org/TR/rdf11-concepts/#dfn-literal) written as a string.
///
/// A literal has either a language tag or a datatype, never both.
///
/// ```
/// use sparfront::term::{Iri, Literal};
///
/// assert_eq!("\"foo\\nbar\"", Literal::new_simple_literal("foo\nbar").to_string());
/// assert_eq!(
///     "\"1999-01-01\"^^<http://www.w3.org/2001/XMLSchema#date>",
///     Literal::new_typed_literal(
///         "1999-01-01",
///         Iri::new_unchecked("http://www.w3.org/2001/XMLSchema#date")
///     )
///     .to_string()
/// );
/// assert_eq!(
///     "\"foo\"@en",
///     Literal::new_language_tagged_literal_unchecked("foo", "en").to_string()
/// );
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Literal {
    value: String,
    annotation: LiteralAnnotation,
}

impl Literal {
    #[inline]
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            annotation: LiteralAnnotation::Simple,
        }
    }

    #[inline]
    pub fn new_typed_literal(value: impl Into<String>, datatype: Iri) -> Self {
        Self {
            value: value.into(),
            annotation: LiteralAnnotation::Datatype(datatype),
        }
    }

    /// Builds a language-tagged string. The tag is not validated.
    #[inline]
    pub fn new_language_tagged_literal_unchecked(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            value: value.into(),
            annotation: LiteralAnnotation::Language(language.into()),
        }
    }

    /// The [lexical form](https://www.w3.org/TR/rdf11-concepts/#dfn-lexical-form), with escape sequences resolved.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn language(&self) -> Option<&str> {
        match &self.annotation {
            LiteralAnnotation::Language(language) => Some(language),
            _ => None,
        }
    }

    /// The explicit datatype, if any.
    #[inline]
    pub fn datatype(&self) -> Option<&Iri> {
        match &self.annotation {
            LiteralAnnotation::Datatype(datatype) => Some(datatype),
            _ => None,
        }
    }

    #[inline]
    pub fn annotation(&self) -> &LiteralAnnotation {
        &self.annotation
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        print_quoted_str(&self.value, f)?;
        match &self.annotation {
            LiteralAnnotation::Simple => Ok(()),
            LiteralAnnotation::Language(language) => write!(f, "@{language}"),
            LiteralAnnotation::Datatype(datatype) => write!(f, "^^{datatype}"),
        }
    }
}

/// The lexical class of a [`NumericLiteral`].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericKind {
    /// `xsd:integer`
    Integer,
    /// `xsd:decimal`
    Decimal,
    /// `xsd:double`
    Double,
}

impl NumericKind {
    /// The XSD datatype IRI of the class.
    pub fn datatype(self) -> Iri {
        Iri::new_unchecked(match self {
            Self::Integer => "http://www.w3.org/2001/XMLSchema#integer",
            Self::Decimal => "http://www.w3.org/2001/XMLSchema#decimal",
            Self::Double => "http://www.w3.org/2001/XMLSchema#double",
        })
    }
}

/// The explicit sign written in front of a [`NumericLiteral`].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sign {
    Unsigned,
    Positive,
    Negative,
}

/// A numeric literal as written in the query, like `12`, `-1.5` or `+3e10`.
///
/// The lexical form is kept as is, sign included: the value is never computed.
///
/// ```
/// use sparfront::term::{NumericKind, NumericLiteral, Sign};
///
/// let literal = NumericLiteral::new("-1.5", NumericKind::Decimal);
/// assert_eq!(literal.sign(), Sign::Negative);
/// assert_eq!(literal.to_string(), "-1.5");
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericLiteral {
    lexical: String,
    kind: NumericKind,
    sign: Sign,
}

impl NumericLiteral {
    /// Builds the literal from its lexical form. The sign is read from the first character.
    pub fn new(lexical: impl Into<String>, kind: NumericKind) -> Self {
        let lexical = lexical.into();
        let sign = match lexical.as_bytes().first() {
            Some(b'+') => Sign::Positive,
            Some(b'-') => Sign::Negative,
            _ => Sign::Unsigned,
        };
        Self {
            lexical,
            kind,
            sign,
        }
    }

    #[inline]
    pub fn lexical_form(&self) -> &str {
        &self.lexical
    }

    #[inline]
    pub fn kind(&self) -> NumericKind {
        self.kind
    }

    #[inline]
    pub fn sign(&self) -> Sign {
        self.sign
    }
}

impl fmt::Display for NumericLiteral {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexical)
    }
}

/// A term of a triple pattern or of an inline data block.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Term {
    Variable(Variable),
    Iri(Iri),
    BlankNode(BlankNode),
    Literal(Literal),
    Numeric(NumericLiteral),
    Boolean(bool),
}

impl Term {
    #[inline]
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(var) => var.fmt(f),
            Self::Iri(iri) => iri.fmt(f),
            Self::BlankNode(node) => node.fmt(f),
            Self::Literal(literal) => literal.fmt(f),
            Self::Numeric(literal) => literal.fmt(f),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

impl From<Variable> for Term {
    #[inline]
    fn from(var: Variable) -> Self {
        Self::Variable(var)
    }
}

impl From<Iri> for Term {
    #[inline]
    fn from(iri: Iri) -> Self {
        Self::Iri(iri)
    }
}

impl From<BlankNode> for Term {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Self::BlankNode(node)
    }
}

impl From<Literal> for Term {
    #[inline]
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<NumericLiteral> for Term {
    #[inline]
    fn from(literal: NumericLiteral) -> Self {
        Self::Numeric(literal)
    }
}

impl From<VarOrIri> for Term {
    #[inline]
    fn from(value: VarOrIri) -> Self {
        match value {
            VarOrIri::Variable(var) => var.into(),
            VarOrIri::Iri(iri) => iri.into(),
        }
    }
}

/// The union of [`Variable`] and [`Iri`], used for graph names, plain predicates and `DESCRIBE` targets.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarOrIri {
    Variable(Variable),
    Iri(Iri),
}

impl fmt::Display for VarOrIri {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(var) => var.fmt(f),
            Self::Iri(iri) => iri.fmt(f),
        }
    }
}

impl From<Variable> for VarOrIri {
    #[inline]
    fn from(var: Variable) -> Self {
        Self::Variable(var)
    }
}

impl From<Iri> for VarOrIri {
    #[inline]
    fn from(iri: Iri) -> Self {
        Self::Iri(iri)
    }
}

pub(crate) fn print_quoted_str(string: &str, f: &mut impl Write) -> fmt::Result {
    f.write_char('"')?;
    for c in string.chars() {
        match c {
            '\u{08}' => f.write_str("\\b"),
            '\t' => f.write_str("\\t"),
            '\n' => f.write_str("\\n"),
            '\u{0c}' => f.write_str("\\f"),
            '\r' => f.write_str("\\r"),
            '"' => f.write_str("\\\""),
            '\\' => f.write_str("\\\\"),
            '\0'..='\u{1f}' | '\u{7f}' => write!(f, "\\u{:04X}", u32::from(c)),
            c => f.write_char(c),
        }?;
    }
    f.write_char('"')
}

/// The IRI `a` stands for.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
/// Predicates of the triples generated for `( ... )` collections.
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
