use super::{ParseResult, Parser};
use crate::algebra::{GraphPattern, InlineData, Predicate, TripleOrPath, TriplePattern};
use crate::lexer::{Token, TokenKind};
use crate::path::PropertyPath;
use crate::term::*;

impl Parser<'_> {
    /// [53] GroupGraphPattern ::= '{' ( SubSelect | GroupGraphPatternSub ) '}'
    pub(super) fn group_graph_pattern(&mut self) -> ParseResult<GraphPattern> {
        self.guarded(|p| {
            p.with_aggregates(false, |p| {
                p.cursor.expect_punctuation("{")?;
                p.close_basic_graph_pattern();
                let pattern = if p.cursor.check_keyword("SELECT")? {
                    GraphPattern::SubSelect(Box::new(p.sub_select()?))
                } else {
                    GraphPattern::Group(p.group_graph_pattern_sub()?)
                };
                p.cursor.expect_punctuation("}")?;
                p.close_basic_graph_pattern();
                Ok(pattern)
            })
        })
    }

    /// Blank node labels are scoped to a basic graph pattern: the ones seen so far can't be reused.
    pub(super) fn close_basic_graph_pattern(&mut self) {
        self.used_bnodes.extend(self.currently_used_bnodes.drain());
    }

    /// [54] GroupGraphPatternSub ::= TriplesBlock? ( GraphPatternNotTriples '.'? TriplesBlock? )*
    fn group_graph_pattern_sub(&mut self) -> ParseResult<Vec<GraphPattern>> {
        let mut elements = Vec::new();
        let mut triples = Vec::new();
        loop {
            self.triples_block(&mut triples)?;
            if !triples.is_empty() {
                elements.push(GraphPattern::Bgp(std::mem::take(&mut triples)));
            }
            // The next triples block, after a filter or a bind, is another basic graph pattern
            self.close_basic_graph_pattern();
            let Some(element) = self.graph_pattern_not_triples(&elements)? else {
                return Ok(elements);
            };
            elements.push(element);
            self.cursor.eat_punctuation(".")?;
        }
    }

    /// [55] TriplesBlock ::= TriplesSameSubjectPath ( '.' TriplesBlock? )?
    fn triples_block(&mut self, triples: &mut Vec<TripleOrPath>) -> ParseResult<()> {
        while self.triples_same_subject(triples, true)? {
            if !self.cursor.eat_punctuation(".")? {
                break;
            }
        }
        Ok(())
    }

    /// [56] GraphPatternNotTriples ::= GroupOrUnionGraphPattern | OptionalGraphPattern | MinusGraphPattern | GraphGraphPattern | ServiceGraphPattern | Filter | Bind | InlineData
    ///
    /// `previous` are the elements of the enclosing group read so far.
    fn graph_pattern_not_triples(
        &mut self,
        previous: &[GraphPattern],
    ) -> ParseResult<Option<GraphPattern>> {
        if self.cursor.check_punctuation("{")? {
            return self.group_or_union_graph_pattern().map(Some);
        }
        if self.cursor.eat_keyword("OPTIONAL")? {
            // [57] OptionalGraphPattern ::= 'OPTIONAL' GroupGraphPattern
            return Ok(Some(GraphPattern::Optional(Box::new(
                self.group_graph_pattern()?,
            ))));
        }
        if self.cursor.eat_keyword("MINUS")? {
            // [66] MinusGraphPattern ::= 'MINUS' GroupGraphPattern
            return Ok(Some(GraphPattern::Minus(Box::new(
                self.group_graph_pattern()?,
            ))));
        }
        if self.cursor.eat_keyword("GRAPH")? {
            // [58] GraphGraphPattern ::= 'GRAPH' VarOrIri GroupGraphPattern
            let name = self.var_or_iri()?;
            let inner = Box::new(self.group_graph_pattern()?);
            return Ok(Some(GraphPattern::Graph { name, inner }));
        }
        if self.cursor.eat_keyword("SERVICE")? {
            // [59] ServiceGraphPattern ::= 'SERVICE' 'SILENT'? VarOrIri GroupGraphPattern
            let silent = self.cursor.eat_keyword("SILENT")?;
            let name = self.var_or_iri()?;
            let inner = Box::new(self.group_graph_pattern()?);
            return Ok(Some(GraphPattern::Service {
                name,
                silent,
                inner,
            }));
        }
        if self.cursor.eat_keyword("FILTER")? {
            // [68] Filter ::= 'FILTER' Constraint
            return Ok(Some(GraphPattern::Filter(self.constraint()?)));
        }
        if self.cursor.check_keyword("BIND")? {
            return self.bind(previous).map(Some);
        }
        if self.cursor.eat_keyword("VALUES")? {
            // [61] InlineData ::= 'VALUES' DataBlock
            return Ok(Some(GraphPattern::Values(self.data_block()?)));
        }
        Ok(None)
    }

    /// [67] GroupOrUnionGraphPattern ::= GroupGraphPattern ( 'UNION' GroupGraphPattern )*
    fn group_or_union_graph_pattern(&mut self) -> ParseResult<GraphPattern> {
        let mut pattern = self.group_graph_pattern()?;
        while self.cursor.eat_keyword("UNION")? {
            let right = self.group_graph_pattern()?;
            pattern = GraphPattern::Union(Box::new(pattern), Box::new(right));
        }
        Ok(pattern)
    }

    /// [60] Bind ::= 'BIND' '(' Expression 'AS' Var ')'
    fn bind(&mut self, previous: &[GraphPattern]) -> ParseResult<GraphPattern> {
        self.cursor.expect_keyword("BIND")?;
        self.cursor.expect_punctuation("(")?;
        let expression = self.expression()?;
        self.cursor.expect_keyword("AS")?;
        let location = self.cursor.location()?;
        let variable = self.var()?;
        self.cursor.expect_punctuation(")")?;
        let mut in_scope = false;
        for element in previous {
            element.on_in_scope_variable(&mut |v| in_scope |= *v == variable);
        }
        if in_scope {
            return Err(Self::semantic_error(
                location,
                format!("The target variable {variable} of a BIND is already in scope"),
            ));
        }
        Ok(GraphPattern::Bind {
            expression,
            variable,
        })
    }

    /// [62] DataBlock ::= InlineDataOneVar | InlineDataFull
    pub(super) fn data_block(&mut self) -> ParseResult<InlineData> {
        if let Some(variable) = self.try_var()? {
            // [63] InlineDataOneVar ::= Var '{' DataBlockValue* '}'
            self.cursor.expect_punctuation("{")?;
            let mut rows = Vec::new();
            while !self.cursor.eat_punctuation("}")? {
                rows.push(vec![self.data_block_value()?]);
            }
            return Ok(InlineData {
                variables: vec![variable],
                rows,
            });
        }
        // [64] InlineDataFull ::= ( NIL | '(' Var* ')' ) '{' ( '(' DataBlockValue* ')' | NIL )* '}'
        self.cursor.expect_punctuation("(")?;
        let mut variables = Vec::new();
        while !self.cursor.eat_punctuation(")")? {
            variables.push(self.var()?);
        }
        self.cursor.expect_punctuation("{")?;
        let mut rows = Vec::new();
        while !self.cursor.eat_punctuation("}")? {
            let start = self.cursor.location()?.start;
            self.cursor.expect_punctuation("(")?;
            let mut row = Vec::with_capacity(variables.len());
            while !self.cursor.eat_punctuation(")")? {
                row.push(self.data_block_value()?);
            }
            if row.len() != variables.len() {
                return Err(Self::semantic_error(
                    self.location_from(start),
                    format!(
                        "The number of values in every data block must match the number of variables in a values clause: {} values found for {} variables",
                        row.len(),
                        variables.len()
                    ),
                ));
            }
            rows.push(row);
        }
        Ok(InlineData { variables, rows })
    }

    /// [75] TriplesSameSubject ::= VarOrTerm PropertyListNotEmpty | TriplesNode PropertyList
    /// [81] TriplesSameSubjectPath ::= VarOrTerm PropertyListPathNotEmpty | TriplesNodePath PropertyListPath
    ///
    /// `paths` selects the second rule. Returns `false` if the current token cannot start a subject.
    pub(super) fn triples_same_subject(
        &mut self,
        triples: &mut Vec<TripleOrPath>,
        paths: bool,
    ) -> ParseResult<bool> {
        if let Some(subject) = self.try_var_or_term()? {
            self.property_list_not_empty(&subject, triples, paths)?;
            return Ok(true);
        }
        if let Some(subject) = self.try_triples_node(triples, paths)? {
            if let Some(verb) = self.try_verb(paths)? {
                self.property_list_rest(&subject, verb, triples, paths)?;
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// [77] PropertyListNotEmpty ::= Verb ObjectList ( ';' ( Verb ObjectList )? )*
    /// [83] PropertyListPathNotEmpty ::= ( VerbPath | VerbSimple ) ObjectListPath ( ';' ( ( VerbPath | VerbSimple ) ObjectList )? )*
    fn property_list_not_empty(
        &mut self,
        subject: &Term,
        triples: &mut Vec<TripleOrPath>,
        paths: bool,
    ) -> ParseResult<()> {
        let verb = self
            .try_verb(paths)?
            .ok_or_else(|| self.cursor.unexpected())?;
        self.property_list_rest(subject, verb, triples, paths)
    }

    /// The object list of `verb` and the `;` separated pairs after it. Empty pairs are skipped.
    fn property_list_rest(
        &mut self,
        subject: &Term,
        verb: Predicate,
        triples: &mut Vec<TripleOrPath>,
        paths: bool,
    ) -> ParseResult<()> {
        self.object_list(subject, &verb, triples, paths)?;
        while self.cursor.eat_punctuation(";")? {
            if let Some(verb) = self.try_verb(paths)? {
                self.object_list(subject, &verb, triples, paths)?;
            }
        }
        Ok(())
    }

    /// [78] Verb ::= VarOrIri | 'a'
    /// [84] VerbPath ::= Path
    /// [85] VerbSimple ::= Var
    fn try_verb(&mut self, paths: bool) -> ParseResult<Option<Predicate>> {
        if let Some(var) = self.try_var()? {
            return Ok(Some(Predicate::Variable(var)));
        }
        if !paths {
            return Ok(self.try_iri_or_a()?.map(Predicate::Iri));
        }
        let token = self.cursor.peek()?;
        let is_path_start = matches!(
            token,
            Token::IriRef(_) | Token::PrefixedName { .. } | Token::Keyword("a")
        ) || token.is_punctuation("^")
            || token.is_punctuation("!")
            || token.is_punctuation("(");
        if !is_path_start {
            for kind in [
                TokenKind::IriRef,
                TokenKind::PrefixedName,
                TokenKind::keyword("a"),
                TokenKind::Punctuation("^"),
                TokenKind::Punctuation("!"),
                TokenKind::Punctuation("("),
            ] {
                self.cursor.expect_kind(kind);
            }
            return Ok(None);
        }
        Ok(Some(match self.path()? {
            PropertyPath::Iri(iri) => Predicate::Iri(iri),
            path => Predicate::Path(path),
        }))
    }

    /// [79] ObjectList ::= Object ( ',' Object )*
    /// [86] ObjectListPath ::= ObjectPath ( ',' ObjectPath )*
    fn object_list(
        &mut self,
        subject: &Term,
        verb: &Predicate,
        triples: &mut Vec<TripleOrPath>,
        paths: bool,
    ) -> ParseResult<()> {
        loop {
            let object = self.graph_node(triples, paths)?;
            triples.push(TripleOrPath {
                subject: subject.clone(),
                predicate: verb.clone(),
                object,
            });
            if !self.cursor.eat_punctuation(",")? {
                return Ok(());
            }
        }
    }

    /// [104] GraphNode ::= VarOrTerm | TriplesNode
    /// [105] GraphNodePath ::= VarOrTerm | TriplesNodePath
    fn graph_node(&mut self, triples: &mut Vec<TripleOrPath>, paths: bool) -> ParseResult<Term> {
        if let Some(term) = self.try_var_or_term()? {
            return Ok(term);
        }
        if let Some(node) = self.try_triples_node(triples, paths)? {
            return Ok(node);
        }
        Err(self.cursor.unexpected())
    }

    /// [98] TriplesNode ::= Collection | BlankNodePropertyList
    /// [100] TriplesNodePath ::= CollectionPath | BlankNodePropertyListPath
    ///
    /// The generated triples are appended to `triples` and the node heading them is returned.
    fn try_triples_node(
        &mut self,
        triples: &mut Vec<TripleOrPath>,
        paths: bool,
    ) -> ParseResult<Option<Term>> {
        if self.cursor.eat_punctuation("[")? {
            // [99] BlankNodePropertyList ::= '[' PropertyListNotEmpty ']'
            return self.guarded(|p| {
                let node = Term::from(p.fresh_blank_node());
                p.property_list_not_empty(&node, triples, paths)?;
                p.cursor.expect_punctuation("]")?;
                Ok(Some(node))
            });
        }
        if self.cursor.eat_punctuation("(")? {
            // [102] Collection ::= '(' GraphNode+ ')'
            return self.guarded(|p| p.collection(triples, paths).map(Some));
        }
        Ok(None)
    }

    /// The elements of a collection after its opening `(`, encoded as an RDF list.
    fn collection(&mut self, triples: &mut Vec<TripleOrPath>, paths: bool) -> ParseResult<Term> {
        let head = Term::from(self.fresh_blank_node());
        let mut cell = head.clone();
        loop {
            let element = self.graph_node(triples, paths)?;
            triples.push(TripleOrPath {
                subject: cell.clone(),
                predicate: Predicate::Iri(Iri::new_unchecked(RDF_FIRST)),
                object: element,
            });
            let rest = if self.cursor.eat_punctuation(")")? {
                Term::from(Iri::new_unchecked(RDF_NIL))
            } else {
                Term::from(self.fresh_blank_node())
            };
            triples.push(TripleOrPath {
                subject: cell,
                predicate: Predicate::Iri(Iri::new_unchecked(RDF_REST)),
                object: rest.clone(),
            });
            if matches!(rest, Term::Iri(_)) {
                return Ok(head);
            }
            cell = rest;
        }
    }

    /// [73] ConstructTemplate ::= '{' ConstructTriples? '}'
    pub(super) fn construct_template(&mut self) -> ParseResult<Vec<TriplePattern>> {
        self.cursor.expect_punctuation("{")?;
        let triples = self.template_triples()?;
        self.cursor.expect_punctuation("}")?;
        Ok(triples)
    }

    /// [74] ConstructTriples ::= TriplesSameSubject ( '.' ConstructTriples? )?
    ///
    /// Template blank nodes are not shared with the `WHERE` clause ones.
    pub(super) fn template_triples(&mut self) -> ParseResult<Vec<TriplePattern>> {
        let mut triples = Vec::new();
        let start = self.cursor.location()?.start;
        while self.triples_same_subject(&mut triples, false)? {
            if !self.cursor.eat_punctuation(".")? {
                break;
            }
        }
        self.currently_used_bnodes.clear();
        triples
            .into_iter()
            .map(|triple| {
                let predicate = match triple.predicate {
                    Predicate::Iri(iri) => VarOrIri::Iri(iri),
                    Predicate::Variable(var) => VarOrIri::Variable(var),
                    Predicate::Path(_) => {
                        return Err(Self::semantic_error(
                            self.location_from(start),
                            "Property paths are not allowed in templates",
                        ));
                    }
                };
                Ok(TriplePattern {
                    subject: triple.subject,
                    predicate,
                    object: triple.object,
                })
            })
            .collect()
    }
}
