use super::{ParseResult, Parser};
use crate::error::TextPosition;
use crate::query::QueryDataset;
use crate::term::{Iri, VarOrIri};
use crate::update::*;
use std::ops::Range;

impl Parser<'_> {
    /// [3] UpdateUnit ::= Update
    /// [29] Update ::= Prologue ( Update1 ( ';' Update )? )?
    ///
    /// The whole input must be consumed. Declarations after the last operation are dropped.
    pub(super) fn update_unit(&mut self) -> ParseResult<Update> {
        let mut operations = Vec::new();
        loop {
            let prologue = self.prologue()?;
            let Some(operation) = self.try_update1()? else {
                break;
            };
            operations.push(UpdateOperation {
                prologue,
                operation,
            });
            // Blank node labels are scoped to an operation
            self.used_bnodes.clear();
            self.currently_used_bnodes.clear();
            if !self.cursor.eat_punctuation(";")? {
                break;
            }
        }
        self.end_of_input()?;
        Ok(Update { operations })
    }

    /// [30] Update1 ::= Load | Clear | Drop | Add | Move | Copy | Create | InsertData | DeleteData | DeleteWhere | Modify
    fn try_update1(&mut self) -> ParseResult<Option<GraphUpdateOperation>> {
        if self.cursor.eat_keyword("LOAD")? {
            // [31] Load ::= 'LOAD' 'SILENT'? iri ( 'INTO' GraphRef )?
            let silent = self.cursor.eat_keyword("SILENT")?;
            let source = self.iri()?;
            let destination = if self.cursor.eat_keyword("INTO")? {
                Some(self.graph_ref()?)
            } else {
                None
            };
            return Ok(Some(GraphUpdateOperation::Load {
                silent,
                source,
                destination,
            }));
        }
        if self.cursor.eat_keyword("CLEAR")? {
            // [32] Clear ::= 'CLEAR' 'SILENT'? GraphRefAll
            let silent = self.cursor.eat_keyword("SILENT")?;
            let graph = self.graph_ref_all()?;
            return Ok(Some(GraphUpdateOperation::Clear { silent, graph }));
        }
        if self.cursor.eat_keyword("DROP")? {
            // [33] Drop ::= 'DROP' 'SILENT'? GraphRefAll
            let silent = self.cursor.eat_keyword("SILENT")?;
            let graph = self.graph_ref_all()?;
            return Ok(Some(GraphUpdateOperation::Drop { silent, graph }));
        }
        if self.cursor.eat_keyword("CREATE")? {
            // [34] Create ::= 'CREATE' 'SILENT'? GraphRef
            let silent = self.cursor.eat_keyword("SILENT")?;
            let graph = self.graph_ref()?;
            return Ok(Some(GraphUpdateOperation::Create { silent, graph }));
        }
        // [35] Add ::= 'ADD' 'SILENT'? GraphOrDefault 'TO' GraphOrDefault
        if self.cursor.eat_keyword("ADD")? {
            let (silent, from, to) = self.graph_transfer()?;
            return Ok(Some(GraphUpdateOperation::Add { silent, from, to }));
        }
        // [36] Move ::= 'MOVE' 'SILENT'? GraphOrDefault 'TO' GraphOrDefault
        if self.cursor.eat_keyword("MOVE")? {
            let (silent, from, to) = self.graph_transfer()?;
            return Ok(Some(GraphUpdateOperation::Move { silent, from, to }));
        }
        // [37] Copy ::= 'COPY' 'SILENT'? GraphOrDefault 'TO' GraphOrDefault
        if self.cursor.eat_keyword("COPY")? {
            let (silent, from, to) = self.graph_transfer()?;
            return Ok(Some(GraphUpdateOperation::Copy { silent, from, to }));
        }
        if self.cursor.eat_keyword("INSERT")? {
            if self.cursor.eat_keyword("DATA")? {
                // [38] InsertData ::= 'INSERT DATA' QuadData
                let (data, location) = self.quads()?;
                Self::ensure_no_variable("INSERT DATA", &data, location)?;
                return Ok(Some(GraphUpdateOperation::InsertData { data }));
            }
            let (insert, _) = self.quads()?;
            return self.modify_end(None, Vec::new(), insert).map(Some);
        }
        if self.cursor.eat_keyword("DELETE")? {
            if self.cursor.eat_keyword("DATA")? {
                // [39] DeleteData ::= 'DELETE DATA' QuadData
                let (data, location) = self.quads()?;
                Self::ensure_no_variable("DELETE DATA", &data, location.clone())?;
                Self::ensure_no_blank_node("DELETE DATA", &data, location)?;
                return Ok(Some(GraphUpdateOperation::DeleteData { data }));
            }
            if self.cursor.eat_keyword("WHERE")? {
                // [40] DeleteWhere ::= 'DELETE WHERE' QuadPattern
                let (pattern, location) = self.quads()?;
                Self::ensure_no_blank_node("DELETE WHERE", &pattern, location)?;
                return Ok(Some(GraphUpdateOperation::DeleteWhere { pattern }));
            }
            let delete = self.delete_clause()?;
            return self.modify(None, delete).map(Some);
        }
        if self.cursor.eat_keyword("WITH")? {
            let with = self.iri()?;
            if self.cursor.eat_keyword("DELETE")? {
                let delete = self.delete_clause()?;
                return self.modify(Some(with), delete).map(Some);
            }
            self.cursor.expect_keyword("INSERT")?;
            let (insert, _) = self.quads()?;
            return self.modify_end(Some(with), Vec::new(), insert).map(Some);
        }
        Ok(None)
    }

    /// [41] Modify ::= ( 'WITH' iri )? ( DeleteClause InsertClause? | InsertClause ) UsingClause* 'WHERE' GroupGraphPattern
    ///
    /// The rest of the rule after the `DELETE` clause.
    fn modify(
        &mut self,
        with: Option<Iri>,
        delete: Vec<QuadPattern>,
    ) -> ParseResult<GraphUpdateOperation> {
        // [43] InsertClause ::= 'INSERT' QuadPattern
        let insert = if self.cursor.eat_keyword("INSERT")? {
            self.quads()?.0
        } else {
            Vec::new()
        };
        self.modify_end(with, delete, insert)
    }

    /// The `USING` clauses and the `WHERE` clause of a [`modify`](Self::modify).
    fn modify_end(
        &mut self,
        with: Option<Iri>,
        delete: Vec<QuadPattern>,
        insert: Vec<QuadPattern>,
    ) -> ParseResult<GraphUpdateOperation> {
        let mut using: Option<QueryDataset> = None;
        while self.cursor.eat_keyword("USING")? {
            // [44] UsingClause ::= 'USING' ( iri | 'NAMED' iri )
            let using = using.get_or_insert_with(QueryDataset::default);
            if self.cursor.eat_keyword("NAMED")? {
                using.named.push(self.iri()?);
            } else {
                using.default.push(self.iri()?);
            }
        }
        self.cursor.expect_keyword("WHERE")?;
        let pattern = self.group_graph_pattern()?;
        Ok(GraphUpdateOperation::Modify {
            with,
            delete,
            insert,
            using,
            pattern,
        })
    }

    /// [42] DeleteClause ::= 'DELETE' QuadPattern
    fn delete_clause(&mut self) -> ParseResult<Vec<QuadPattern>> {
        let (delete, location) = self.quads()?;
        Self::ensure_no_blank_node("DELETE", &delete, location)?;
        Ok(delete)
    }

    /// The `'SILENT'? GraphOrDefault 'TO' GraphOrDefault` tail of `ADD`, `MOVE` and `COPY`.
    fn graph_transfer(&mut self) -> ParseResult<(bool, GraphOrDefault, GraphOrDefault)> {
        let silent = self.cursor.eat_keyword("SILENT")?;
        let from = self.graph_or_default()?;
        self.cursor.expect_keyword("TO")?;
        let to = self.graph_or_default()?;
        Ok((silent, from, to))
    }

    /// [45] GraphOrDefault ::= 'DEFAULT' | 'GRAPH'? iri
    fn graph_or_default(&mut self) -> ParseResult<GraphOrDefault> {
        if self.cursor.eat_keyword("DEFAULT")? {
            return Ok(GraphOrDefault::DefaultGraph);
        }
        self.cursor.eat_keyword("GRAPH")?;
        Ok(GraphOrDefault::Graph(self.iri()?))
    }

    /// [46] GraphRef ::= 'GRAPH' iri
    fn graph_ref(&mut self) -> ParseResult<Iri> {
        self.cursor.expect_keyword("GRAPH")?;
        self.iri()
    }

    /// [47] GraphRefAll ::= GraphRef | 'DEFAULT' | 'NAMED' | 'ALL'
    fn graph_ref_all(&mut self) -> ParseResult<GraphTarget> {
        if self.cursor.eat_keyword("DEFAULT")? {
            Ok(GraphTarget::DefaultGraph)
        } else if self.cursor.eat_keyword("NAMED")? {
            Ok(GraphTarget::NamedGraphs)
        } else if self.cursor.eat_keyword("ALL")? {
            Ok(GraphTarget::AllGraphs)
        } else {
            Ok(GraphTarget::Named(self.graph_ref()?))
        }
    }

    /// [48] QuadPattern ::= '{' Quads '}'
    /// [49] QuadData ::= '{' Quads '}'
    /// [50] Quads ::= TriplesTemplate? ( QuadsNotTriples '.'? TriplesTemplate? )*
    ///
    /// Returns the quads with the location of the whole block.
    fn quads(&mut self) -> ParseResult<(Vec<QuadPattern>, Range<TextPosition>)> {
        let start = self.cursor.location()?.start;
        self.cursor.expect_punctuation("{")?;
        let mut quads = Vec::new();
        loop {
            self.push_quads(&mut quads, None)?;
            if !self.cursor.eat_keyword("GRAPH")? {
                break;
            }
            // [51] QuadsNotTriples ::= 'GRAPH' VarOrIri '{' TriplesTemplate? '}'
            let graph = self.var_or_iri()?;
            self.cursor.expect_punctuation("{")?;
            self.push_quads(&mut quads, Some(graph))?;
            self.cursor.expect_punctuation("}")?;
            self.cursor.eat_punctuation(".")?;
        }
        self.cursor.expect_punctuation("}")?;
        Ok((quads, self.location_from(start)))
    }

    /// [52] TriplesTemplate ::= TriplesSameSubject ( '.' TriplesTemplate? )?
    fn push_quads(
        &mut self,
        quads: &mut Vec<QuadPattern>,
        graph: Option<VarOrIri>,
    ) -> ParseResult<()> {
        quads.extend(
            self.template_triples()?
                .into_iter()
                .map(|triple| QuadPattern {
                    subject: triple.subject,
                    predicate: triple.predicate,
                    object: triple.object,
                    graph: graph.clone(),
                }),
        );
        Ok(())
    }

    fn ensure_no_variable(
        operation: &str,
        quads: &[QuadPattern],
        location: Range<TextPosition>,
    ) -> ParseResult<()> {
        let mut found = None;
        for quad in quads {
            quad.on_variable(&mut |v| {
                found.get_or_insert(v);
            });
        }
        match found {
            Some(variable) => Err(Self::semantic_error(
                location,
                format!("Variables are not allowed in {operation}, found {variable}"),
            )),
            None => Ok(()),
        }
    }

    fn ensure_no_blank_node(
        operation: &str,
        quads: &[QuadPattern],
        location: Range<TextPosition>,
    ) -> ParseResult<()> {
        let mut found = None;
        for quad in quads {
            quad.on_blank_node(&mut |node| {
                found.get_or_insert(node);
            });
        }
        match found {
            Some(node) => Err(Self::semantic_error(
                location,
                format!("Blank nodes are not allowed in {operation}, found {node}"),
            )),
            None => Ok(()),
        }
    }
}
