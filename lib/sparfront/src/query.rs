use crate::SparqlParser;
use crate::algebra::*;
use crate::error::SparqlSyntaxError;
use crate::term::*;
use std::fmt;
use std::str::FromStr;

/// A parsed [SPARQL query](https://www.w3.org/TR/sparql11-query/).
///
/// ```
/// use sparfront::SparqlParser;
///
/// let query_str = "SELECT ?s ?p ?o WHERE { ?s ?p ?o . }";
/// let query = SparqlParser::new().parse_query(query_str)?;
/// assert_eq!(query.to_string(), query_str);
/// assert_eq!(
///     query.to_sse(),
///     "(select (?s ?p ?o) (group (bgp (triple ?s ?p ?o))))"
/// );
/// # Ok::<_, sparfront::SparqlSyntaxError>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Query {
    /// [SELECT](https://www.w3.org/TR/sparql11-query/#select).
    Select {
        /// The `BASE` and `PREFIX` declarations.
        prologue: Prologue,
        /// The projection.
        select: SelectClause,
        /// The [query dataset specification](https://www.w3.org/TR/sparql11-query/#specifyingDataset).
        dataset: Option<QueryDataset>,
        /// The `WHERE` clause.
        pattern: GraphPattern,
        modifiers: SolutionModifiers,
        /// The trailing `VALUES` clause.
        values: Option<InlineData>,
    },
    /// [CONSTRUCT](https://www.w3.org/TR/sparql11-query/#construct).
    Construct {
        /// The `BASE` and `PREFIX` declarations.
        prologue: Prologue,
        /// The query construction template.
        template: Vec<TriplePattern>,
        /// The [query dataset specification](https://www.w3.org/TR/sparql11-query/#specifyingDataset).
        dataset: Option<QueryDataset>,
        /// The `WHERE` clause.
        pattern: GraphPattern,
        modifiers: SolutionModifiers,
        /// The trailing `VALUES` clause.
        values: Option<InlineData>,
    },
    /// [DESCRIBE](https://www.w3.org/TR/sparql11-query/#describe).
    Describe {
        /// The `BASE` and `PREFIX` declarations.
        prologue: Prologue,
        /// The resources to describe.
        targets: DescribeTargets,
        /// The [query dataset specification](https://www.w3.org/TR/sparql11-query/#specifyingDataset).
        dataset: Option<QueryDataset>,
        /// The optional `WHERE` clause.
        pattern: Option<GraphPattern>,
        modifiers: SolutionModifiers,
        /// The trailing `VALUES` clause.
        values: Option<InlineData>,
    },
    /// [ASK](https://www.w3.org/TR/sparql11-query/#ask).
    Ask {
        /// The `BASE` and `PREFIX` declarations.
        prologue: Prologue,
        /// The [query dataset specification](https://www.w3.org/TR/sparql11-query/#specifyingDataset).
        dataset: Option<QueryDataset>,
        /// The `WHERE` clause.
        pattern: GraphPattern,
        modifiers: SolutionModifiers,
        /// The trailing `VALUES` clause.
        values: Option<InlineData>,
    },
}

impl Query {
    #[inline]
    pub fn prologue(&self) -> &Prologue {
        match self {
            Self::Select { prologue, .. }
            | Self::Construct { prologue, .. }
            | Self::Describe { prologue, .. }
            | Self::Ask { prologue, .. } => prologue,
        }
    }

    /// The base IRI in effect at the end of the prologue.
    #[inline]
    pub fn base_iri(&self) -> Option<&Iri> {
        self.prologue().base_iri()
    }

    #[inline]
    pub fn dataset(&self) -> Option<&QueryDataset> {
        match self {
            Self::Select { dataset, .. }
            | Self::Construct { dataset, .. }
            | Self::Describe { dataset, .. }
            | Self::Ask { dataset, .. } => dataset.as_ref(),
        }
    }

    /// The `WHERE` clause. Only `DESCRIBE` queries might not have one.
    #[inline]
    pub fn pattern(&self) -> Option<&GraphPattern> {
        match self {
            Self::Select { pattern, .. }
            | Self::Construct { pattern, .. }
            | Self::Ask { pattern, .. } => Some(pattern),
            Self::Describe { pattern, .. } => pattern.as_ref(),
        }
    }

    #[inline]
    pub fn modifiers(&self) -> &SolutionModifiers {
        match self {
            Self::Select { modifiers, .. }
            | Self::Construct { modifiers, .. }
            | Self::Describe { modifiers, .. }
            | Self::Ask { modifiers, .. } => modifiers,
        }
    }

    #[inline]
    pub fn values(&self) -> Option<&InlineData> {
        match self {
            Self::Select { values, .. }
            | Self::Construct { values, .. }
            | Self::Describe { values, .. }
            | Self::Ask { values, .. } => values.as_ref(),
        }
    }

    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub fn to_sse(&self) -> String {
        Sse(self).to_string()
    }

    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub(crate) fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        let base_iri = self.base_iri();
        if let Some(base_iri) = base_iri {
            write!(f, "(base {base_iri} ")?;
        }
        match self {
            Self::Select { select, .. } => {
                write!(f, "(select")?;
                select.fmt_sse(f)?;
            }
            Self::Construct { template, .. } => {
                write!(f, "(construct (")?;
                for (i, t) in template.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    t.fmt_sse(f)?;
                }
                write!(f, ")")?;
            }
            Self::Describe { targets, .. } => {
                write!(f, "(describe ")?;
                match targets {
                    DescribeTargets::All => write!(f, "*")?,
                    DescribeTargets::Resources(resources) => {
                        write!(f, "(")?;
                        for (i, r) in resources.iter().enumerate() {
                            if i > 0 {
                                write!(f, " ")?;
                            }
                            write!(f, "{r}")?;
                        }
                        write!(f, ")")?;
                    }
                }
            }
            Self::Ask { .. } => write!(f, "(ask")?,
        }
        if let Some(dataset) = self.dataset() {
            write!(f, " (dataset ")?;
            dataset.fmt_sse(f)?;
            write!(f, ")")?;
        }
        if let Some(pattern) = self.pattern() {
            write!(f, " ")?;
            pattern.fmt_sse(f)?;
        }
        self.modifiers().fmt_sse(f)?;
        if let Some(values) = self.values() {
            write!(f, " ")?;
            values.fmt_sse(f)?;
        }
        write!(f, ")")?;
        if base_iri.is_some() {
            write!(f, ")")?;
        }
        Ok(())
    }

    /// Calls `callback` on the variables a sub-select makes visible to its enclosing group.
    pub(crate) fn on_projected_variable<'a>(&'a self, callback: &mut impl FnMut(&'a Variable)) {
        if let Self::Select {
            select, pattern, ..
        } = self
        {
            match &select.projection {
                Projection::All => pattern.on_in_scope_variable(callback),
                Projection::Items(items) => {
                    for item in items {
                        callback(item.variable());
                    }
                }
            }
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.prologue().fmt(f)?;
        match self {
            Self::Select { select, .. } => write!(f, "SELECT {select}")?,
            Self::Construct { template, .. } => {
                f.write_str("CONSTRUCT {")?;
                for triple in template {
                    write!(f, " {triple} .")?;
                }
                f.write_str(" }")?;
            }
            Self::Describe { targets, .. } => write!(f, "DESCRIBE {targets}")?,
            Self::Ask { .. } => f.write_str("ASK")?,
        }
        if let Some(dataset) = self.dataset() {
            dataset.fmt(f)?;
        }
        if let Some(pattern) = self.pattern() {
            write!(f, " WHERE {pattern}")?;
        }
        self.modifiers().fmt(f)?;
        if let Some(values) = self.values() {
            write!(f, " VALUES {values}")?;
        }
        Ok(())
    }
}

impl FromStr for Query {
    type Err = SparqlSyntaxError;

    fn from_str(query: &str) -> Result<Self, Self::Err> {
        SparqlParser::new().parse_query(query)
    }
}

impl TryFrom<&str> for Query {
    type Error = SparqlSyntaxError;

    fn try_from(query: &str) -> Result<Self, Self::Error> {
        Self::from_str(query)
    }
}

impl TryFrom<&String> for Query {
    type Error = SparqlSyntaxError;

    fn try_from(query: &String) -> Result<Self, Self::Error> {
        Self::from_str(query)
    }
}

struct Sse<'a>(&'a Query);

impl fmt::Display for Sse<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_sse(f)
    }
}

/// A `BASE` or `PREFIX` declaration.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Declaration {
    /// A base IRI, already resolved against the previous one.
    Base(Iri),
    Prefix { name: String, iri: Iri },
}

/// The [prologue](https://www.w3.org/TR/sparql11-query/#rPrologue) of a query or of an update operation, in declaration order.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prologue {
    pub declarations: Vec<Declaration>,
}

impl Prologue {
    /// The last declared base IRI.
    pub fn base_iri(&self) -> Option<&Iri> {
        self.declarations.iter().rev().find_map(|d| match d {
            Declaration::Base(iri) => Some(iri),
            Declaration::Prefix { .. } => None,
        })
    }

    /// The IRI of the last declaration of the prefix `name`.
    pub fn prefix(&self, name: &str) -> Option<&Iri> {
        self.declarations.iter().rev().find_map(|d| match d {
            Declaration::Prefix { name: n, iri } if n == name => Some(iri),
            _ => None,
        })
    }
}

impl fmt::Display for Prologue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for declaration in &self.declarations {
            match declaration {
                Declaration::Base(iri) => writeln!(f, "BASE {iri}")?,
                Declaration::Prefix { name, iri } => writeln!(f, "PREFIX {name}: {iri}")?,
            }
        }
        Ok(())
    }
}

/// The [SELECT clause](https://www.w3.org/TR/sparql11-query/#rSelectClause).
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectClause {
    pub modifier: Option<SelectModifier>,
    pub projection: Projection,
}

impl SelectClause {
    fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self.modifier {
            Some(SelectModifier::Distinct) => write!(f, " distinct")?,
            Some(SelectModifier::Reduced) => write!(f, " reduced")?,
            None => (),
        }
        match &self.projection {
            Projection::All => write!(f, " *"),
            Projection::Items(items) => {
                write!(f, " (")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match item {
                        SelectItem::Variable(v) => write!(f, "{v}")?,
                        SelectItem::Alias(e, v) => {
                            write!(f, "({v} ")?;
                            e.fmt_sse(f)?;
                            write!(f, ")")?;
                        }
                    }
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for SelectClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            Some(SelectModifier::Distinct) => write!(f, "DISTINCT ")?,
            Some(SelectModifier::Reduced) => write!(f, "REDUCED ")?,
            None => (),
        }
        match &self.projection {
            Projection::All => write!(f, "*"),
            Projection::Items(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectModifier {
    Distinct,
    Reduced,
}

/// The projected variables of a `SELECT`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Projection {
    /// `SELECT *`
    All,
    Items(Vec<SelectItem>),
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectItem {
    Variable(Variable),
    /// `(expression AS ?variable)`
    Alias(Expression, Variable),
}

impl SelectItem {
    /// The projected variable.
    #[inline]
    pub fn variable(&self) -> &Variable {
        match self {
            Self::Variable(v) | Self::Alias(_, v) => v,
        }
    }
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(v) => v.fmt(f),
            Self::Alias(e, v) => write!(f, "({e} AS {v})"),
        }
    }
}

/// The resources of a `DESCRIBE` query.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DescribeTargets {
    /// `DESCRIBE *`
    All,
    Resources(Vec<VarOrIri>),
}

impl fmt::Display for DescribeTargets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "*"),
            Self::Resources(resources) => {
                for (i, r) in resources.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{r}")?;
                }
                Ok(())
            }
        }
    }
}

/// A SPARQL query [dataset specification](https://www.w3.org/TR/sparql11-query/#specifyingDataset).
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryDataset {
    /// The `FROM` graphs.
    pub default: Vec<Iri>,
    /// The `FROM NAMED` graphs.
    pub named: Vec<Iri>,
}

impl QueryDataset {
    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub(crate) fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "(")?;
        for (i, graph_name) in self.default.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{graph_name}")?;
        }
        for (i, graph_name) in self.named.iter().enumerate() {
            if !self.default.is_empty() || i > 0 {
                write!(f, " ")?;
            }
            write!(f, "(named {graph_name})")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for QueryDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for g in &self.default {
            write!(f, " FROM {g}")?;
        }
        for g in &self.named {
            write!(f, " FROM NAMED {g}")?;
        }
        Ok(())
    }
}
