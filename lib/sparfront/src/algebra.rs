//! Expressions, graph patterns and solution modifiers of the [SPARQL 1.1 grammar](https://www.w3.org/TR/sparql11-query/#grammar).
//!
//! The tree follows the concrete syntax: it is not the algebra of the [query evaluation](https://www.w3.org/TR/sparql11-query/#sparqlQuery) section.

use crate::path::PropertyPath;
use crate::query::Query;
use crate::term::*;
use std::fmt;

/// An [expression](https://www.w3.org/TR/sparql11-query/#expressions).
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expression {
    Variable(Variable),
    Iri(Iri),
    Literal(Literal),
    Numeric(NumericLiteral),
    Boolean(bool),
    /// [Logical-or](https://www.w3.org/TR/sparql11-query/#func-logical-or).
    Or(Box<Self>, Box<Self>),
    /// [Logical-and](https://www.w3.org/TR/sparql11-query/#func-logical-and).
    And(Box<Self>, Box<Self>),
    /// [fn:not](https://www.w3.org/TR/xpath-functions/#func-not).
    Not(Box<Self>),
    /// [RDFterm-equal](https://www.w3.org/TR/sparql11-query/#func-RDFterm-equal) and all the XSD equalities.
    Equal(Box<Self>, Box<Self>),
    NotEqual(Box<Self>, Box<Self>),
    /// [op:numeric-less-than](https://www.w3.org/TR/xpath-functions/#func-numeric-less-than) and other XSD less than operators.
    Less(Box<Self>, Box<Self>),
    /// [op:numeric-greater-than](https://www.w3.org/TR/xpath-functions/#func-numeric-greater-than) and other XSD greater than operators.
    Greater(Box<Self>, Box<Self>),
    LessOrEqual(Box<Self>, Box<Self>),
    GreaterOrEqual(Box<Self>, Box<Self>),
    /// [IN](https://www.w3.org/TR/sparql11-query/#func-in)
    In(Box<Self>, Vec<Self>),
    /// [NOT IN](https://www.w3.org/TR/sparql11-query/#func-not-in)
    NotIn(Box<Self>, Vec<Self>),
    /// [op:numeric-add](https://www.w3.org/TR/xpath-functions/#func-numeric-add) and other XSD additions.
    Add(Box<Self>, Box<Self>),
    /// [op:numeric-subtract](https://www.w3.org/TR/xpath-functions/#func-numeric-subtract) and other XSD subtractions.
    Subtract(Box<Self>, Box<Self>),
    /// [op:numeric-multiply](https://www.w3.org/TR/xpath-functions/#func-numeric-multiply) and other XSD multiplications.
    Multiply(Box<Self>, Box<Self>),
    /// [op:numeric-divide](https://www.w3.org/TR/xpath-functions/#func-numeric-divide) and other XSD divides.
    Divide(Box<Self>, Box<Self>),
    UnaryPlus(Box<Self>),
    UnaryMinus(Box<Self>),
    /// [EXISTS](https://www.w3.org/TR/sparql11-query/#func-filter-exists).
    Exists(Box<GraphPattern>),
    NotExists(Box<GraphPattern>),
    /// [BOUND](https://www.w3.org/TR/sparql11-query/#func-bound).
    Bound(Variable),
    /// [IF](https://www.w3.org/TR/sparql11-query/#func-if).
    If(Box<Self>, Box<Self>, Box<Self>),
    /// [COALESCE](https://www.w3.org/TR/sparql11-query/#func-coalesce).
    Coalesce(Vec<Self>),
    /// A built-in or custom function call.
    FunctionCall(Function, Vec<Self>),
    /// A [set function](https://www.w3.org/TR/sparql11-query/#aggregates) call.
    Aggregate(AggregateExpression),
}

impl Expression {
    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub(crate) fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Self::Variable(var) => write!(f, "{var}"),
            Self::Iri(iri) => write!(f, "{iri}"),
            Self::Literal(l) => write!(f, "{l}"),
            Self::Numeric(l) => write!(f, "{l}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Or(a, b) => fmt_sse_binary_expression(f, "||", a, b),
            Self::And(a, b) => fmt_sse_binary_expression(f, "&&", a, b),
            Self::Equal(a, b) => fmt_sse_binary_expression(f, "=", a, b),
            Self::NotEqual(a, b) => fmt_sse_binary_expression(f, "!=", a, b),
            Self::Less(a, b) => fmt_sse_binary_expression(f, "<", a, b),
            Self::Greater(a, b) => fmt_sse_binary_expression(f, ">", a, b),
            Self::LessOrEqual(a, b) => fmt_sse_binary_expression(f, "<=", a, b),
            Self::GreaterOrEqual(a, b) => fmt_sse_binary_expression(f, ">=", a, b),
            Self::In(a, b) => fmt_sse_list(f, "in", a, b),
            Self::NotIn(a, b) => fmt_sse_list(f, "notin", a, b),
            Self::Add(a, b) => fmt_sse_binary_expression(f, "+", a, b),
            Self::Subtract(a, b) => fmt_sse_binary_expression(f, "-", a, b),
            Self::Multiply(a, b) => fmt_sse_binary_expression(f, "*", a, b),
            Self::Divide(a, b) => fmt_sse_binary_expression(f, "/", a, b),
            Self::UnaryPlus(e) => fmt_sse_unary_expression(f, "+", e),
            Self::UnaryMinus(e) => fmt_sse_unary_expression(f, "-", e),
            Self::Not(e) => fmt_sse_unary_expression(f, "!", e),
            Self::Exists(p) => {
                write!(f, "(exists ")?;
                p.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::NotExists(p) => {
                write!(f, "(notexists ")?;
                p.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::Bound(v) => write!(f, "(bound {v})"),
            Self::If(a, b, c) => {
                write!(f, "(if ")?;
                a.fmt_sse(f)?;
                write!(f, " ")?;
                b.fmt_sse(f)?;
                write!(f, " ")?;
                c.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::Coalesce(parameters) => {
                write!(f, "(coalesce")?;
                for p in parameters {
                    write!(f, " ")?;
                    p.fmt_sse(f)?;
                }
                write!(f, ")")
            }
            Self::FunctionCall(function, parameters) => {
                write!(f, "(")?;
                function.fmt_sse(f)?;
                for p in parameters {
                    write!(f, " ")?;
                    p.fmt_sse(f)?;
                }
                write!(f, ")")
            }
            Self::Aggregate(aggregate) => aggregate.fmt_sse(f),
        }
    }

    /// Checks if the expression contains an aggregate outside of `EXISTS` blocks.
    pub fn contains_aggregate(&self) -> bool {
        let mut found = false;
        self.visit(&mut |e| found |= matches!(e, Self::Aggregate(_)));
        found
    }

    /// Calls `callback` on the variables used outside of aggregates.
    pub(crate) fn for_each_unaggregated_variable(&self, callback: &mut impl FnMut(&Variable)) {
        match self {
            Self::Variable(v) | Self::Bound(v) => callback(v),
            Self::Aggregate(_) | Self::Exists(_) | Self::NotExists(_) => (),
            _ => self.for_each_child(|c| c.for_each_unaggregated_variable(callback)),
        }
    }

    fn visit(&self, callback: &mut impl FnMut(&Self)) {
        callback(self);
        if !matches!(self, Self::Aggregate(_)) {
            self.for_each_child(|c| c.visit(callback));
        }
    }

    fn for_each_child(&self, mut callback: impl FnMut(&Self)) {
        match self {
            Self::Variable(_)
            | Self::Iri(_)
            | Self::Literal(_)
            | Self::Numeric(_)
            | Self::Boolean(_)
            | Self::Bound(_)
            | Self::Exists(_)
            | Self::NotExists(_) => (),
            Self::Or(a, b)
            | Self::And(a, b)
            | Self::Equal(a, b)
            | Self::NotEqual(a, b)
            | Self::Less(a, b)
            | Self::Greater(a, b)
            | Self::LessOrEqual(a, b)
            | Self::GreaterOrEqual(a, b)
            | Self::Add(a, b)
            | Self::Subtract(a, b)
            | Self::Multiply(a, b)
            | Self::Divide(a, b) => {
                callback(a);
                callback(b);
            }
            Self::In(a, b) | Self::NotIn(a, b) => {
                callback(a);
                b.iter().for_each(callback);
            }
            Self::UnaryPlus(e) | Self::UnaryMinus(e) | Self::Not(e) => callback(e),
            Self::If(a, b, c) => {
                callback(a);
                callback(b);
                callback(c);
            }
            Self::Coalesce(p) | Self::FunctionCall(_, p) => p.iter().for_each(callback),
            Self::Aggregate(aggregate) => {
                if let Some(expr) = aggregate.expression() {
                    callback(expr)
                }
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(var) => var.fmt(f),
            Self::Iri(iri) => iri.fmt(f),
            Self::Literal(l) => l.fmt(f),
            Self::Numeric(l) => l.fmt(f),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Or(a, b) => write!(f, "({a} || {b})"),
            Self::And(a, b) => write!(f, "({a} && {b})"),
            Self::Equal(a, b) => write!(f, "({a} = {b})"),
            Self::NotEqual(a, b) => write!(f, "({a} != {b})"),
            Self::Less(a, b) => write!(f, "({a} < {b})"),
            Self::Greater(a, b) => write!(f, "({a} > {b})"),
            Self::LessOrEqual(a, b) => write!(f, "({a} <= {b})"),
            Self::GreaterOrEqual(a, b) => write!(f, "({a} >= {b})"),
            Self::In(a, b) => {
                write!(f, "({a} IN ")?;
                write_arg_list(b, f)?;
                write!(f, ")")
            }
            Self::NotIn(a, b) => {
                write!(f, "({a} NOT IN ")?;
                write_arg_list(b, f)?;
                write!(f, ")")
            }
            Self::Add(a, b) => write!(f, "({a} + {b})"),
            Self::Subtract(a, b) => write!(f, "({a} - {b})"),
            Self::Multiply(a, b) => write!(f, "({a} * {b})"),
            Self::Divide(a, b) => write!(f, "({a} / {b})"),
            // The operand is wrapped so that a numeric literal is not read back as a signed literal
            Self::UnaryPlus(e) => write!(f, "+({e})"),
            Self::UnaryMinus(e) => write!(f, "-({e})"),
            Self::Not(e) => write!(f, "!({e})"),
            Self::Exists(p) => write!(f, "EXISTS {p}"),
            Self::NotExists(p) => write!(f, "NOT EXISTS {p}"),
            Self::Bound(v) => write!(f, "BOUND({v})"),
            Self::If(a, b, c) => write!(f, "IF({a}, {b}, {c})"),
            Self::Coalesce(parameters) => {
                write!(f, "COALESCE")?;
                write_arg_list(parameters, f)
            }
            Self::FunctionCall(function, parameters) => {
                write!(f, "{function}")?;
                write_arg_list(parameters, f)
            }
            Self::Aggregate(aggregate) => aggregate.fmt(f),
        }
    }
}

impl From<Variable> for Expression {
    fn from(v: Variable) -> Self {
        Self::Variable(v)
    }
}

impl From<Iri> for Expression {
    fn from(iri: Iri) -> Self {
        Self::Iri(iri)
    }
}

impl From<Literal> for Expression {
    fn from(l: Literal) -> Self {
        Self::Literal(l)
    }
}

impl From<NumericLiteral> for Expression {
    fn from(l: NumericLiteral) -> Self {
        Self::Numeric(l)
    }
}

fn write_arg_list(
    params: impl IntoIterator<Item = impl fmt::Display>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    write!(f, "(")?;
    let mut cont = false;
    for p in params {
        if cont {
            write!(f, ", ")?;
        }
        p.fmt(f)?;
        cont = true;
    }
    write!(f, ")")
}

/// A [built-in function](https://www.w3.org/TR/sparql11-query/#rBuiltInCall) name or a custom function IRI.
///
/// `BOUND`, `IF`, `COALESCE`, `EXISTS` and `NOT EXISTS` have their own [`Expression`] variants.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Function {
    Str,
    Lang,
    LangMatches,
    Datatype,
    Iri,
    BNode,
    Rand,
    Abs,
    Ceil,
    Floor,
    Round,
    Concat,
    SubStr,
    StrLen,
    Replace,
    UCase,
    LCase,
    EncodeForUri,
    Contains,
    StrStarts,
    StrEnds,
    StrBefore,
    StrAfter,
    Year,
    Month,
    Day,
    Hours,
    Minutes,
    Seconds,
    Timezone,
    Tz,
    Now,
    Uuid,
    StrUuid,
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    StrLang,
    StrDt,
    SameTerm,
    IsIri,
    IsBlank,
    IsLiteral,
    IsNumeric,
    Regex,
    Custom(Iri),
}

impl Function {
    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub(crate) fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Self::Custom(iri) => write!(f, "{iri}"),
            _ => f.write_str(&self.to_string().to_ascii_lowercase()),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => write!(f, "STR"),
            Self::Lang => write!(f, "LANG"),
            Self::LangMatches => write!(f, "LANGMATCHES"),
            Self::Datatype => write!(f, "DATATYPE"),
            Self::Iri => write!(f, "IRI"),
            Self::BNode => write!(f, "BNODE"),
            Self::Rand => write!(f, "RAND"),
            Self::Abs => write!(f, "ABS"),
            Self::Ceil => write!(f, "CEIL"),
            Self::Floor => write!(f, "FLOOR"),
            Self::Round => write!(f, "ROUND"),
            Self::Concat => write!(f, "CONCAT"),
            Self::SubStr => write!(f, "SUBSTR"),
            Self::StrLen => write!(f, "STRLEN"),
            Self::Replace => write!(f, "REPLACE"),
            Self::UCase => write!(f, "UCASE"),
            Self::LCase => write!(f, "LCASE"),
            Self::EncodeForUri => write!(f, "ENCODE_FOR_URI"),
            Self::Contains => write!(f, "CONTAINS"),
            Self::StrStarts => write!(f, "STRSTARTS"),
            Self::StrEnds => write!(f, "STRENDS"),
            Self::StrBefore => write!(f, "STRBEFORE"),
            Self::StrAfter => write!(f, "STRAFTER"),
            Self::Year => write!(f, "YEAR"),
            Self::Month => write!(f, "MONTH"),
            Self::Day => write!(f, "DAY"),
            Self::Hours => write!(f, "HOURS"),
            Self::Minutes => write!(f, "MINUTES"),
            Self::Seconds => write!(f, "SECONDS"),
            Self::Timezone => write!(f, "TIMEZONE"),
            Self::Tz => write!(f, "TZ"),
            Self::Now => write!(f, "NOW"),
            Self::Uuid => write!(f, "UUID"),
            Self::StrUuid => write!(f, "STRUUID"),
            Self::Md5 => write!(f, "MD5"),
            Self::Sha1 => write!(f, "SHA1"),
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha384 => write!(f, "SHA384"),
            Self::Sha512 => write!(f, "SHA512"),
            Self::StrLang => write!(f, "STRLANG"),
            Self::StrDt => write!(f, "STRDT"),
            Self::SameTerm => write!(f, "sameTerm"),
            Self::IsIri => write!(f, "isIRI"),
            Self::IsBlank => write!(f, "isBLANK"),
            Self::IsLiteral => write!(f, "isLITERAL"),
            Self::IsNumeric => write!(f, "isNUMERIC"),
            Self::Regex => write!(f, "REGEX"),
            Self::Custom(iri) => iri.fmt(f),
        }
    }
}

/// A [set function](https://www.w3.org/TR/sparql11-query/#rAggregate) call.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AggregateExpression {
    /// `COUNT(*)`
    CountAll,
    /// [Count](https://www.w3.org/TR/sparql11-query/#defn_aggCount).
    Count {
        expr: Box<Expression>,
        distinct: bool,
    },
    /// [Sum](https://www.w3.org/TR/sparql11-query/#defn_aggSum).
    Sum {
        expr: Box<Expression>,
        distinct: bool,
    },
    /// [Avg](https://www.w3.org/TR/sparql11-query/#defn_aggAvg).
    Avg {
        expr: Box<Expression>,
        distinct: bool,
    },
    /// [Min](https://www.w3.org/TR/sparql11-query/#defn_aggMin).
    Min {
        expr: Box<Expression>,
        distinct: bool,
    },
    /// [Max](https://www.w3.org/TR/sparql11-query/#defn_aggMax).
    Max {
        expr: Box<Expression>,
        distinct: bool,
    },
    /// [Sample](https://www.w3.org/TR/sparql11-query/#defn_aggSample).
    Sample {
        expr: Box<Expression>,
        distinct: bool,
    },
    /// [GroupConcat](https://www.w3.org/TR/sparql11-query/#defn_aggGroupConcat).
    GroupConcat {
        expr: Box<Expression>,
        distinct: bool,
        separator: Option<String>,
    },
}

impl AggregateExpression {
    /// The aggregated expression, `None` for `COUNT(*)`.
    pub fn expression(&self) -> Option<&Expression> {
        match self {
            Self::CountAll => None,
            Self::Count { expr, .. }
            | Self::Sum { expr, .. }
            | Self::Avg { expr, .. }
            | Self::Min { expr, .. }
            | Self::Max { expr, .. }
            | Self::Sample { expr, .. }
            | Self::GroupConcat { expr, .. } => Some(expr),
        }
    }

    pub fn is_distinct(&self) -> bool {
        match self {
            Self::CountAll => false,
            Self::Count { distinct, .. }
            | Self::Sum { distinct, .. }
            | Self::Avg { distinct, .. }
            | Self::Min { distinct, .. }
            | Self::Max { distinct, .. }
            | Self::Sample { distinct, .. }
            | Self::GroupConcat { distinct, .. } => *distinct,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::CountAll | Self::Count { .. } => "COUNT",
            Self::Sum { .. } => "SUM",
            Self::Avg { .. } => "AVG",
            Self::Min { .. } => "MIN",
            Self::Max { .. } => "MAX",
            Self::Sample { .. } => "SAMPLE",
            Self::GroupConcat { .. } => "GROUP_CONCAT",
        }
    }

    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub(crate) fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "({}", self.name().to_ascii_lowercase())?;
        if self.is_distinct() {
            write!(f, " distinct")?;
        }
        if let Some(expr) = self.expression() {
            write!(f, " ")?;
            expr.fmt_sse(f)?;
        }
        if let Self::GroupConcat {
            separator: Some(separator),
            ..
        } = self
        {
            write!(f, " ")?;
            print_quoted_str(separator, f)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for AggregateExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        if self.is_distinct() {
            write!(f, "DISTINCT ")?;
        }
        match self.expression() {
            Some(expr) => expr.fmt(f)?,
            None => write!(f, "*")?,
        }
        if let Self::GroupConcat {
            separator: Some(separator),
            ..
        } = self
        {
            write!(f, "; SEPARATOR = ")?;
            print_quoted_str(separator, f)?;
        }
        write!(f, ")")
    }
}

/// The predicate of a [`TripleOrPath`].
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Predicate {
    Iri(Iri),
    Variable(Variable),
    /// A property path that is more than a single IRI.
    Path(PropertyPath),
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => iri.fmt(f),
            Self::Variable(var) => var.fmt(f),
            Self::Path(path) => path.fmt(f),
        }
    }
}

/// A triple of a `WHERE` clause, whose predicate might be a [property path](PropertyPath).
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripleOrPath {
    pub subject: Term,
    pub predicate: Predicate,
    pub object: Term,
}

impl TripleOrPath {
    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub(crate) fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match &self.predicate {
            Predicate::Path(path) => {
                write!(f, "(path {} ", self.subject)?;
                path.fmt_sse(f)?;
                write!(f, " {})", self.object)
            }
            predicate => write!(f, "(triple {} {} {})", self.subject, predicate, self.object),
        }
    }
}

impl From<TriplePattern> for TripleOrPath {
    #[inline]
    fn from(triple: TriplePattern) -> Self {
        Self {
            subject: triple.subject,
            predicate: match triple.predicate {
                VarOrIri::Iri(iri) => Predicate::Iri(iri),
                VarOrIri::Variable(var) => Predicate::Variable(var),
            },
            object: triple.object,
        }
    }
}

impl fmt::Display for TripleOrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// A [triple pattern](https://www.w3.org/TR/sparql11-query/#defn_TriplePattern) of a `CONSTRUCT` template.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriplePattern {
    pub subject: Term,
    pub predicate: VarOrIri,
    pub object: Term,
}

impl TriplePattern {
    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub(crate) fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "(triple {} {} {})",
            self.subject, self.predicate, self.object
        )
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// A [graph pattern](https://www.w3.org/TR/sparql11-query/#GraphPattern) as written in the query.
///
/// [`GraphPattern::Group`] and [`GraphPattern::SubSelect`] are the two forms of a `{ ... }` block.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GraphPattern {
    /// A [basic graph pattern](https://www.w3.org/TR/sparql11-query/#defn_BasicGraphPattern) with its property paths.
    Bgp(Vec<TripleOrPath>),
    /// A [group](https://www.w3.org/TR/sparql11-query/#GroupPatterns): its elements in query order.
    Group(Vec<Self>),
    /// `OPTIONAL { ... }`
    Optional(Box<Self>),
    /// `{ ... } UNION { ... }`
    Union(Box<Self>, Box<Self>),
    /// `MINUS { ... }`
    Minus(Box<Self>),
    /// `GRAPH name { ... }`
    Graph { name: VarOrIri, inner: Box<Self> },
    /// `SERVICE [SILENT] name { ... }`
    Service {
        name: VarOrIri,
        silent: bool,
        inner: Box<Self>,
    },
    /// `BIND(expression AS ?variable)`
    Bind {
        expression: Expression,
        variable: Variable,
    },
    /// `VALUES`
    Values(InlineData),
    /// `FILTER`
    Filter(Expression),
    /// A nested `SELECT` query. It never has a prologue nor a dataset.
    SubSelect(Box<Query>),
}

impl GraphPattern {
    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub(crate) fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Self::Bgp(triples) => {
                write!(f, "(bgp")?;
                for triple in triples {
                    write!(f, " ")?;
                    triple.fmt_sse(f)?;
                }
                write!(f, ")")
            }
            Self::Group(elements) => {
                write!(f, "(group")?;
                for element in elements {
                    write!(f, " ")?;
                    element.fmt_sse(f)?;
                }
                write!(f, ")")
            }
            Self::Optional(inner) => {
                write!(f, "(optional ")?;
                inner.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::Union(left, right) => {
                write!(f, "(union ")?;
                left.fmt_sse(f)?;
                write!(f, " ")?;
                right.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::Minus(inner) => {
                write!(f, "(minus ")?;
                inner.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::Graph { name, inner } => {
                write!(f, "(graph {name} ")?;
                inner.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::Service {
                name,
                silent,
                inner,
            } => {
                write!(f, "(service ")?;
                if *silent {
                    write!(f, "silent ")?;
                }
                write!(f, "{name} ")?;
                inner.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::Bind {
                expression,
                variable,
            } => {
                write!(f, "(extend (({variable} ")?;
                expression.fmt_sse(f)?;
                write!(f, ")))")
            }
            Self::Values(data) => data.fmt_sse(f),
            Self::Filter(expression) => {
                write!(f, "(filter ")?;
                expression.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::SubSelect(query) => query.fmt_sse(f),
        }
    }

    /// Calls `callback` on the variables [in scope](https://www.w3.org/TR/sparql11-query/#variableScope) after the pattern.
    pub(crate) fn on_in_scope_variable<'a>(&'a self, callback: &mut impl FnMut(&'a Variable)) {
        match self {
            Self::Bgp(triples) => {
                for triple in triples {
                    if let Term::Variable(v) = &triple.subject {
                        callback(v);
                    }
                    if let Predicate::Variable(v) = &triple.predicate {
                        callback(v);
                    }
                    if let Term::Variable(v) = &triple.object {
                        callback(v);
                    }
                }
            }
            Self::Group(elements) => {
                for element in elements {
                    element.on_in_scope_variable(callback);
                }
            }
            Self::Optional(inner) => inner.on_in_scope_variable(callback),
            Self::Union(left, right) => {
                left.on_in_scope_variable(callback);
                right.on_in_scope_variable(callback);
            }
            Self::Graph { name, inner } | Self::Service { name, inner, .. } => {
                if let VarOrIri::Variable(v) = name {
                    callback(v);
                }
                inner.on_in_scope_variable(callback);
            }
            Self::Bind { variable, .. } => callback(variable),
            Self::Values(data) => data.variables.iter().for_each(callback),
            Self::SubSelect(query) => query.on_projected_variable(callback),
            Self::Minus(_) | Self::Filter(_) => (),
        }
    }
}

impl fmt::Display for GraphPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bgp(triples) => {
                for (i, triple) in triples.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{triple} .")?;
                }
                Ok(())
            }
            Self::Group(elements) => {
                write!(f, "{{")?;
                for element in elements {
                    write!(f, " {element}")?;
                }
                write!(f, " }}")
            }
            Self::Optional(inner) => write!(f, "OPTIONAL {inner}"),
            Self::Union(left, right) => write!(f, "{left} UNION {right}"),
            Self::Minus(inner) => write!(f, "MINUS {inner}"),
            Self::Graph { name, inner } => write!(f, "GRAPH {name} {inner}"),
            Self::Service {
                name,
                silent,
                inner,
            } => {
                if *silent {
                    write!(f, "SERVICE SILENT {name} {inner}")
                } else {
                    write!(f, "SERVICE {name} {inner}")
                }
            }
            Self::Bind {
                expression,
                variable,
            } => write!(f, "BIND({expression} AS {variable})"),
            Self::Values(data) => write!(f, "VALUES {data}"),
            Self::Filter(expression) => write!(f, "FILTER({expression})"),
            Self::SubSelect(query) => write!(f, "{{ {query} }}"),
        }
    }
}

/// An [inline data](https://www.w3.org/TR/sparql11-query/#inline-data) block. `None` stands for `UNDEF`.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InlineData {
    pub variables: Vec<Variable>,
    pub rows: Vec<Vec<Option<Term>>>,
}

impl InlineData {
    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub(crate) fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "(table (vars")?;
        for var in &self.variables {
            write!(f, " {var}")?;
        }
        write!(f, ")")?;
        for row in &self.rows {
            write!(f, " (row")?;
            for (value, var) in row.iter().zip(&self.variables) {
                if let Some(value) = value {
                    write!(f, " ({var} {value})")?;
                }
            }
            write!(f, ")")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for InlineData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, var) in self.variables.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{var}")?;
        }
        write!(f, ") {{")?;
        for row in &self.rows {
            write!(f, " (")?;
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                match value {
                    Some(value) => write!(f, "{value}")?,
                    None => write!(f, "UNDEF")?,
                }
            }
            write!(f, ")")?;
        }
        write!(f, " }}")
    }
}

/// A [GROUP BY](https://www.w3.org/TR/sparql11-query/#groupby) key.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupCondition {
    Variable(Variable),
    /// An expression, with an optional `AS` name.
    Expression(Expression, Option<Variable>),
}

impl GroupCondition {
    /// The variable holding the key value after grouping, if any.
    ///
    /// A bracketed variable without `AS`, like `GROUP BY (?x)`, groups by that variable.
    pub fn variable(&self) -> Option<&Variable> {
        match self {
            Self::Variable(v)
            | Self::Expression(_, Some(v))
            | Self::Expression(Expression::Variable(v), None) => Some(v),
            Self::Expression(_, None) => None,
        }
    }
}

impl fmt::Display for GroupCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(v) => v.fmt(f),
            Self::Expression(e, Some(v)) => write!(f, "({e} AS {v})"),
            Self::Expression(e, None) => write!(f, "({e})"),
        }
    }
}

/// An ordering comparator of [ORDER BY](https://www.w3.org/TR/sparql11-query/#modOrderBy).
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderCondition {
    /// Ascending order, the default one.
    Asc(Expression),
    /// Descending order
    Desc(Expression),
}

impl OrderCondition {
    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub(crate) fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Self::Asc(e) => {
                write!(f, "(asc ")?;
                e.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::Desc(e) => {
                write!(f, "(desc ")?;
                e.fmt_sse(f)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for OrderCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc(e) => write!(f, "ASC({e})"),
            Self::Desc(e) => write!(f, "DESC({e})"),
        }
    }
}

/// The [solution modifiers](https://www.w3.org/TR/sparql11-query/#solutionModifiers) of a query.
///
/// Empty lists stand for absent clauses.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolutionModifiers {
    pub group_by: Vec<GroupCondition>,
    pub having: Vec<Expression>,
    pub order_by: Vec<OrderCondition>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SolutionModifiers {
    pub fn is_empty(&self) -> bool {
        self.group_by.is_empty()
            && self.having.is_empty()
            && self.order_by.is_empty()
            && self.limit.is_none()
            && self.offset.is_none()
    }

    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub(crate) fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        if !self.group_by.is_empty() {
            write!(f, " (group (")?;
            for (i, condition) in self.group_by.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                match condition {
                    GroupCondition::Variable(v) => write!(f, "{v}")?,
                    GroupCondition::Expression(e, v) => {
                        write!(f, "(")?;
                        if let Some(v) = v {
                            write!(f, "{v} ")?;
                        }
                        e.fmt_sse(f)?;
                        write!(f, ")")?;
                    }
                }
            }
            write!(f, "))")?;
        }
        if !self.having.is_empty() {
            write!(f, " (having")?;
            for e in &self.having {
                write!(f, " ")?;
                e.fmt_sse(f)?;
            }
            write!(f, ")")?;
        }
        if !self.order_by.is_empty() {
            write!(f, " (order (")?;
            for (i, c) in self.order_by.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                c.fmt_sse(f)?;
            }
            write!(f, "))")?;
        }
        if self.limit.is_some() || self.offset.is_some() {
            write!(f, " (slice ")?;
            match self.offset {
                Some(offset) => write!(f, "{offset}")?,
                None => write!(f, "_")?,
            }
            match self.limit {
                Some(limit) => write!(f, " {limit})")?,
                None => write!(f, " _)")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for SolutionModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY")?;
            for condition in &self.group_by {
                write!(f, " {condition}")?;
            }
        }
        if !self.having.is_empty() {
            write!(f, " HAVING")?;
            for e in &self.having {
                write!(f, " ({e})")?;
            }
        }
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY")?;
            for c in &self.order_by {
                write!(f, " {c}")?;
            }
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}

#[inline]
fn fmt_sse_unary_expression(f: &mut impl fmt::Write, name: &str, e: &Expression) -> fmt::Result {
    write!(f, "({name} ")?;
    e.fmt_sse(f)?;
    write!(f, ")")
}

#[inline]
fn fmt_sse_binary_expression(
    f: &mut impl fmt::Write,
    name: &str,
    a: &Expression,
    b: &Expression,
) -> fmt::Result {
    write!(f, "({name} ")?;
    a.fmt_sse(f)?;
    write!(f, " ")?;
    b.fmt_sse(f)?;
    write!(f, ")")
}

fn fmt_sse_list(
    f: &mut impl fmt::Write,
    name: &str,
    a: &Expression,
    list: &[Expression],
) -> fmt::Result {
    write!(f, "({name} ")?;
    a.fmt_sse(f)?;
    for p in list {
        write!(f, " ")?;
        p.fmt_sse(f)?;
    }
    write!(f, ")")
}
