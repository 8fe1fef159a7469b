use crate::SparqlParser;
use crate::algebra::GraphPattern;
use crate::error::SparqlSyntaxError;
use crate::query::{Prologue, QueryDataset};
use crate::term::*;
use std::fmt;
use std::str::FromStr;

/// A parsed [SPARQL update](https://www.w3.org/TR/sparql11-update/).
///
/// ```
/// use sparfront::SparqlParser;
///
/// let update_str = "CLEAR ALL ;";
/// let update = SparqlParser::new().parse_update(update_str)?;
/// assert_eq!(update.to_string().trim(), update_str);
/// assert_eq!(update.to_sse(), "(update (clear all))");
/// # Ok::<_, sparfront::SparqlSyntaxError>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Update {
    /// The operations in request order. Might be empty.
    pub operations: Vec<UpdateOperation>,
}

impl Update {
    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub fn to_sse(&self) -> String {
        Sse(self).to_string()
    }

    fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("(update")?;
        for operation in &self.operations {
            f.write_str(" ")?;
            operation.fmt_sse(f)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for operation in &self.operations {
            writeln!(f, "{operation} ;")?;
        }
        Ok(())
    }
}

impl FromStr for Update {
    type Err = SparqlSyntaxError;

    fn from_str(update: &str) -> Result<Self, Self::Err> {
        SparqlParser::new().parse_update(update)
    }
}

impl TryFrom<&str> for Update {
    type Error = SparqlSyntaxError;

    fn try_from(update: &str) -> Result<Self, Self::Error> {
        Self::from_str(update)
    }
}

impl TryFrom<&String> for Update {
    type Error = SparqlSyntaxError;

    fn try_from(update: &String) -> Result<Self, Self::Error> {
        Self::from_str(update)
    }
}

struct Sse<'a>(&'a Update);

impl fmt::Display for Sse<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_sse(f)
    }
}

/// An update operation with the `BASE` and `PREFIX` declarations written just before it.
///
/// Declarations stay in effect for the following operations of the same request.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdateOperation {
    pub prologue: Prologue,
    pub operation: GraphUpdateOperation,
}

impl UpdateOperation {
    fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        let base_iri = self.prologue.base_iri();
        if let Some(base_iri) = base_iri {
            write!(f, "(base {base_iri} ")?;
        }
        self.operation.fmt_sse(f)?;
        if base_iri.is_some() {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for UpdateOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prologue, self.operation)
    }
}

/// The [graph update operations](https://www.w3.org/TR/sparql11-update/#formalModelGraphUpdate), as written.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GraphUpdateOperation {
    /// [INSERT DATA](https://www.w3.org/TR/sparql11-update/#insertData): quads without variables.
    InsertData { data: Vec<QuadPattern> },
    /// [DELETE DATA](https://www.w3.org/TR/sparql11-update/#deleteData): quads without variables nor blank nodes.
    DeleteData { data: Vec<QuadPattern> },
    /// [DELETE WHERE](https://www.w3.org/TR/sparql11-update/#deleteWhere): the quads are both the pattern and the template.
    DeleteWhere { pattern: Vec<QuadPattern> },
    /// [DELETE/INSERT](https://www.w3.org/TR/sparql11-update/#deleteInsert).
    Modify {
        /// The `WITH` graph.
        with: Option<Iri>,
        delete: Vec<QuadPattern>,
        insert: Vec<QuadPattern>,
        /// The `USING` and `USING NAMED` graphs.
        using: Option<QueryDataset>,
        pattern: GraphPattern,
    },
    /// [LOAD](https://www.w3.org/TR/sparql11-update/#load).
    Load {
        silent: bool,
        source: Iri,
        /// The `INTO GRAPH` target, the default graph if `None`.
        destination: Option<Iri>,
    },
    /// [CLEAR](https://www.w3.org/TR/sparql11-update/#clear).
    Clear { silent: bool, graph: GraphTarget },
    /// [DROP](https://www.w3.org/TR/sparql11-update/#drop).
    Drop { silent: bool, graph: GraphTarget },
    /// [CREATE](https://www.w3.org/TR/sparql11-update/#create).
    Create { silent: bool, graph: Iri },
    /// [ADD](https://www.w3.org/TR/sparql11-update/#add).
    Add {
        silent: bool,
        from: GraphOrDefault,
        to: GraphOrDefault,
    },
    /// [MOVE](https://www.w3.org/TR/sparql11-update/#move).
    Move {
        silent: bool,
        from: GraphOrDefault,
        to: GraphOrDefault,
    },
    /// [COPY](https://www.w3.org/TR/sparql11-update/#copy).
    Copy {
        silent: bool,
        from: GraphOrDefault,
        to: GraphOrDefault,
    },
}

impl GraphUpdateOperation {
    fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Self::InsertData { data } => fmt_sse_quads("insertData", data, f),
            Self::DeleteData { data } => fmt_sse_quads("deleteData", data, f),
            Self::DeleteWhere { pattern } => fmt_sse_quads("deleteWhere", pattern, f),
            Self::Modify {
                with,
                delete,
                insert,
                using,
                pattern,
            } => {
                f.write_str("(modify")?;
                if let Some(with) = with {
                    write!(f, " (with {with})")?;
                }
                if let Some(using) = using {
                    f.write_str(" (using ")?;
                    using.fmt_sse(f)?;
                    f.write_str(")")?;
                }
                f.write_str(" ")?;
                pattern.fmt_sse(f)?;
                if !delete.is_empty() {
                    f.write_str(" ")?;
                    fmt_sse_quads("delete", delete, f)?;
                }
                if !insert.is_empty() {
                    f.write_str(" ")?;
                    fmt_sse_quads("insert", insert, f)?;
                }
                f.write_str(")")
            }
            Self::Load {
                silent,
                source,
                destination,
            } => {
                f.write_str("(load ")?;
                if *silent {
                    f.write_str("silent ")?;
                }
                write!(f, "{source}")?;
                if let Some(destination) = destination {
                    write!(f, " {destination}")?;
                }
                f.write_str(")")
            }
            Self::Clear { silent, graph } => fmt_sse_management("clear", *silent, graph, f),
            Self::Drop { silent, graph } => fmt_sse_management("drop", *silent, graph, f),
            Self::Create { silent, graph } => {
                f.write_str("(create ")?;
                if *silent {
                    f.write_str("silent ")?;
                }
                write!(f, "{graph})")
            }
            Self::Add { silent, from, to } => fmt_sse_transfer("add", *silent, from, to, f),
            Self::Move { silent, from, to } => fmt_sse_transfer("move", *silent, from, to, f),
            Self::Copy { silent, from, to } => fmt_sse_transfer("copy", *silent, from, to, f),
        }
    }
}

fn fmt_sse_quads(name: &str, quads: &[QuadPattern], f: &mut impl fmt::Write) -> fmt::Result {
    write!(f, "({name} (")?;
    for (i, quad) in quads.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        quad.fmt_sse(f)?;
    }
    f.write_str("))")
}

fn fmt_sse_management(
    name: &str,
    silent: bool,
    graph: &GraphTarget,
    f: &mut impl fmt::Write,
) -> fmt::Result {
    write!(f, "({name} ")?;
    if silent {
        f.write_str("silent ")?;
    }
    graph.fmt_sse(f)?;
    f.write_str(")")
}

fn fmt_sse_transfer(
    name: &str,
    silent: bool,
    from: &GraphOrDefault,
    to: &GraphOrDefault,
    f: &mut impl fmt::Write,
) -> fmt::Result {
    write!(f, "({name} ")?;
    if silent {
        f.write_str("silent ")?;
    }
    from.fmt_sse(f)?;
    f.write_str(" ")?;
    to.fmt_sse(f)?;
    f.write_str(")")
}

impl fmt::Display for GraphUpdateOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsertData { data } => write!(f, "INSERT DATA {}", Quads(data)),
            Self::DeleteData { data } => write!(f, "DELETE DATA {}", Quads(data)),
            Self::DeleteWhere { pattern } => write!(f, "DELETE WHERE {}", Quads(pattern)),
            Self::Modify {
                with,
                delete,
                insert,
                using,
                pattern,
            } => {
                if let Some(with) = with {
                    write!(f, "WITH {with} ")?;
                }
                if !delete.is_empty() {
                    write!(f, "DELETE {} ", Quads(delete))?;
                }
                if !insert.is_empty() || delete.is_empty() {
                    write!(f, "INSERT {} ", Quads(insert))?;
                }
                if let Some(using) = using {
                    for g in &using.default {
                        write!(f, "USING {g} ")?;
                    }
                    for g in &using.named {
                        write!(f, "USING NAMED {g} ")?;
                    }
                }
                write!(f, "WHERE {pattern}")
            }
            Self::Load {
                silent,
                source,
                destination,
            } => {
                f.write_str("LOAD ")?;
                if *silent {
                    f.write_str("SILENT ")?;
                }
                write!(f, "{source}")?;
                if let Some(destination) = destination {
                    write!(f, " INTO GRAPH {destination}")?;
                }
                Ok(())
            }
            Self::Clear { silent, graph } => write!(f, "CLEAR {}{graph}", Silent(*silent)),
            Self::Drop { silent, graph } => write!(f, "DROP {}{graph}", Silent(*silent)),
            Self::Create { silent, graph } => {
                write!(f, "CREATE {}GRAPH {graph}", Silent(*silent))
            }
            Self::Add { silent, from, to } => {
                write!(f, "ADD {}{from} TO {to}", Silent(*silent))
            }
            Self::Move { silent, from, to } => {
                write!(f, "MOVE {}{from} TO {to}", Silent(*silent))
            }
            Self::Copy { silent, from, to } => {
                write!(f, "COPY {}{from} TO {to}", Silent(*silent))
            }
        }
    }
}

struct Silent(bool);

impl fmt::Display for Silent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 {
            f.write_str("SILENT ")?;
        }
        Ok(())
    }
}

/// A `{ ... }` block of quads.
struct Quads<'a>(&'a [QuadPattern]);

impl fmt::Display for Quads<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for quad in self.0 {
            write!(f, " {quad}")?;
        }
        f.write_str(" }")
    }
}

/// A triple pattern of an update template, in the default graph or in a `GRAPH` block.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadPattern {
    pub subject: Term,
    pub predicate: VarOrIri,
    pub object: Term,
    /// `None` for the default graph.
    pub graph: Option<VarOrIri>,
}

impl QuadPattern {
    fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match &self.graph {
            Some(graph) => write!(
                f,
                "(quad {graph} {} {} {})",
                self.subject, self.predicate, self.object
            ),
            None => write!(
                f,
                "(triple {} {} {})",
                self.subject, self.predicate, self.object
            ),
        }
    }

    /// Calls `callback` on the variables of the quad, including the graph name.
    pub(crate) fn on_variable<'a>(&'a self, callback: &mut impl FnMut(&'a Variable)) {
        if let Term::Variable(v) = &self.subject {
            callback(v);
        }
        if let VarOrIri::Variable(v) = &self.predicate {
            callback(v);
        }
        if let Term::Variable(v) = &self.object {
            callback(v);
        }
        if let Some(VarOrIri::Variable(v)) = &self.graph {
            callback(v);
        }
    }

    /// Calls `callback` on the blank nodes of the quad.
    pub(crate) fn on_blank_node<'a>(&'a self, callback: &mut impl FnMut(&'a BlankNode)) {
        if let Term::BlankNode(node) = &self.subject {
            callback(node);
        }
        if let Term::BlankNode(node) = &self.object {
            callback(node);
        }
    }
}

impl fmt::Display for QuadPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.graph {
            Some(graph) => write!(
                f,
                "GRAPH {graph} {{ {} {} {} . }}",
                self.subject, self.predicate, self.object
            ),
            None => write!(f, "{} {} {} .", self.subject, self.predicate, self.object),
        }
    }
}

/// The graphs a `CLEAR` or a `DROP` applies to.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GraphTarget {
    Named(Iri),
    DefaultGraph,
    NamedGraphs,
    AllGraphs,
}

impl GraphTarget {
    fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Self::Named(iri) => write!(f, "{iri}"),
            Self::DefaultGraph => f.write_str("default"),
            Self::NamedGraphs => f.write_str("named"),
            Self::AllGraphs => f.write_str("all"),
        }
    }
}

impl fmt::Display for GraphTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(iri) => write!(f, "GRAPH {iri}"),
            Self::DefaultGraph => f.write_str("DEFAULT"),
            Self::NamedGraphs => f.write_str("NAMED"),
            Self::AllGraphs => f.write_str("ALL"),
        }
    }
}

/// The source or the target of an `ADD`, `MOVE` or `COPY`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GraphOrDefault {
    Graph(Iri),
    DefaultGraph,
}

impl GraphOrDefault {
    fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Self::Graph(iri) => write!(f, "{iri}"),
            Self::DefaultGraph => f.write_str("default"),
        }
    }
}

impl fmt::Display for GraphOrDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graph(iri) => write!(f, "GRAPH {iri}"),
            Self::DefaultGraph => f.write_str("DEFAULT"),
        }
    }
}
