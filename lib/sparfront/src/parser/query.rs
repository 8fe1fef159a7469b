use super::expression::is_built_in_name;
use super::{ParseResult, Parser};
use crate::algebra::{
    Expression, GraphPattern, GroupCondition, InlineData, OrderCondition, SolutionModifiers,
    TripleOrPath,
};
use crate::error::TextPosition;
use crate::lexer::{Token, TokenKind};
use crate::query::*;
use crate::term::Variable;
use std::ops::Range;

impl<'a> Parser<'a> {
    /// [1] QueryUnit ::= Query
    /// [2] Query ::= Prologue ( SelectQuery | ConstructQuery | DescribeQuery | AskQuery ) ValuesClause
    ///
    /// The whole input must be consumed.
    pub(super) fn query_unit(&mut self) -> ParseResult<Query> {
        let prologue = self.prologue()?;
        let query = if self.cursor.check_keyword("SELECT")? {
            self.select_query(prologue, true)?
        } else if self.cursor.eat_keyword("CONSTRUCT")? {
            self.construct_query(prologue)?
        } else if self.cursor.eat_keyword("DESCRIBE")? {
            self.describe_query(prologue)?
        } else if self.cursor.eat_keyword("ASK")? {
            self.ask_query(prologue)?
        } else {
            return Err(self.cursor.unexpected());
        };
        self.end_of_input()?;
        Ok(query)
    }

    /// Fails if some tokens are left.
    pub(super) fn end_of_input(&mut self) -> ParseResult<()> {
        if matches!(self.cursor.peek()?, Token::End) {
            return Ok(());
        }
        self.cursor.expect_kind(TokenKind::EndOfInput);
        Err(self.cursor.unexpected())
    }

    /// [4] Prologue ::= ( BaseDecl | PrefixDecl )*
    pub(super) fn prologue(&mut self) -> ParseResult<Prologue> {
        loop {
            if self.cursor.eat_keyword("BASE")? {
                // [5] BaseDecl ::= 'BASE' IRIREF
                let (iri, location) = self.iri_ref()?;
                // Resolved against the previous base
                let iri = self.resolve_iri_ref(iri, location.clone())?;
                self.base_iri = Some(
                    oxiri::Iri::parse(iri.as_str().to_owned())
                        .map_err(|e| Self::semantic_error(location, e.to_string()))?,
                );
                self.declarations.push(Declaration::Base(iri));
            } else if self.cursor.eat_keyword("PREFIX")? {
                // [6] PrefixDecl ::= 'PREFIX' PNAME_NS IRIREF
                let location = self.cursor.location()?;
                let Token::PrefixedName { prefix, local } = self.cursor.peek()? else {
                    self.cursor.expect_kind(TokenKind::PrefixedName);
                    return Err(self.cursor.unexpected());
                };
                if !local.is_empty() {
                    return Err(Self::semantic_error(
                        location,
                        format!("The prefix name {prefix}:{local} of a PREFIX declaration must end with ':'"),
                    ));
                }
                self.cursor.next()?;
                let (iri, location) = self.iri_ref()?;
                let iri = self.resolve_iri_ref(iri, location)?;
                self.prefixes.insert(prefix.into(), iri.as_str().into());
                self.declarations.push(Declaration::Prefix {
                    name: prefix.into(),
                    iri,
                });
            } else {
                return Ok(Prologue {
                    declarations: std::mem::take(&mut self.declarations),
                });
            }
        }
    }

    /// An `<...>` token, not yet resolved.
    fn iri_ref(&mut self) -> ParseResult<(&'a str, Range<TextPosition>)> {
        if let Token::IriRef(iri) = self.cursor.peek()? {
            let location = self.cursor.next()?.location;
            return Ok((iri, location));
        }
        self.cursor.expect_kind(TokenKind::IriRef);
        Err(self.cursor.unexpected())
    }

    /// [7] SelectQuery ::= SelectClause DatasetClause* WhereClause SolutionModifier
    /// [8] SubSelect ::= SelectClause WhereClause SolutionModifier ValuesClause
    ///
    /// `dataset_allowed` is `false` for sub-selects.
    fn select_query(&mut self, prologue: Prologue, dataset_allowed: bool) -> ParseResult<Query> {
        let (select, locations) = self.select_clause()?;
        let dataset = if dataset_allowed {
            self.dataset_clauses()?
        } else {
            None
        };
        let pattern = self.where_clause()?;
        let modifiers = self.solution_modifier()?;
        Self::validate_projection(&select, &locations, &pattern, &modifiers)?;
        let values = self.values_clause()?;
        Ok(Query::Select {
            prologue,
            select,
            dataset,
            pattern,
            modifiers,
            values,
        })
    }

    /// The nested `SELECT` of a group graph pattern.
    pub(super) fn sub_select(&mut self) -> ParseResult<Query> {
        self.select_query(Prologue::default(), false)
    }

    /// [9] SelectClause ::= 'SELECT' ( 'DISTINCT' | 'REDUCED' )? ( ( Var | ( '(' Expression 'AS' Var ')' ) )+ | '*' )
    ///
    /// Returns the clause with the location of the `SELECT` keyword and the ones of the projected items.
    fn select_clause(&mut self) -> ParseResult<(SelectClause, ProjectionLocations)> {
        let mut locations = ProjectionLocations {
            select: self.cursor.expect_keyword("SELECT")?.location,
            items: Vec::new(),
        };
        let modifier = if self.cursor.eat_keyword("DISTINCT")? {
            Some(SelectModifier::Distinct)
        } else if self.cursor.eat_keyword("REDUCED")? {
            Some(SelectModifier::Reduced)
        } else {
            None
        };
        if self.cursor.eat_punctuation("*")? {
            return Ok((
                SelectClause {
                    modifier,
                    projection: Projection::All,
                },
                locations,
            ));
        }
        let mut items: Vec<SelectItem> = Vec::new();
        loop {
            let start = self.cursor.location()?.start;
            let item = if let Some(var) = self.try_var()? {
                SelectItem::Variable(var)
            } else if self.cursor.eat_punctuation("(")? {
                let expression = self.with_aggregates(true, Self::expression)?;
                self.cursor.expect_keyword("AS")?;
                let var = self.var()?;
                self.cursor.expect_punctuation(")")?;
                SelectItem::Alias(expression, var)
            } else if items.is_empty() {
                return Err(self.cursor.unexpected());
            } else {
                break;
            };
            let location = self.location_from(start);
            if items.iter().any(|i| i.variable() == item.variable()) {
                return Err(Self::semantic_error(
                    location,
                    match &item {
                        SelectItem::Variable(v) => {
                            format!("The variable {v} is projected more than once")
                        }
                        SelectItem::Alias(_, v) => format!(
                            "The target variable {v} of an AS clause is already projected"
                        ),
                    },
                ));
            }
            items.push(item);
            locations.items.push(location);
        }
        Ok((
            SelectClause {
                modifier,
                projection: Projection::Items(items),
            },
            locations,
        ))
    }

    /// Checks the `AS` targets and, if the query groups, that only grouped or aggregated variables are projected.
    fn validate_projection(
        select: &SelectClause,
        locations: &ProjectionLocations,
        pattern: &GraphPattern,
        modifiers: &SolutionModifiers,
    ) -> ParseResult<()> {
        let items = match &select.projection {
            Projection::All => &[][..],
            Projection::Items(items) => items.as_slice(),
        };
        for (item, location) in items.iter().zip(&locations.items) {
            if let SelectItem::Alias(_, target) = item {
                let mut in_scope = false;
                pattern.on_in_scope_variable(&mut |v| in_scope |= v == target);
                if in_scope {
                    return Err(Self::semantic_error(
                        location.clone(),
                        format!("The target variable {target} of an AS clause was already used before in the query body."),
                    ));
                }
            }
        }

        let is_grouped = !modifiers.group_by.is_empty()
            || !modifiers.having.is_empty()
            || items.iter().any(|item| {
                matches!(item, SelectItem::Alias(e, _) if e.contains_aggregate())
            })
            || modifiers.order_by.iter().any(|c| match c {
                OrderCondition::Asc(e) | OrderCondition::Desc(e) => e.contains_aggregate(),
            });
        if !is_grouped {
            return Ok(());
        }
        if matches!(select.projection, Projection::All) {
            return Err(Self::semantic_error(
                locations.select.clone(),
                "GROUP BY is not allowed when all variables are selected via SELECT *",
            ));
        }
        let mut allowed: Vec<&Variable> = modifiers
            .group_by
            .iter()
            .filter_map(GroupCondition::variable)
            .collect();
        for (item, location) in items.iter().zip(&locations.items) {
            match item {
                SelectItem::Variable(v) => {
                    if !allowed.contains(&v) {
                        return Err(Self::semantic_error(
                            location.clone(),
                            format!("Variable {v} is selected but not aggregated."),
                        ));
                    }
                }
                SelectItem::Alias(expression, target) => {
                    if let Some(v) = first_ungrouped_variable(expression, &allowed) {
                        return Err(Self::semantic_error(
                            location.clone(),
                            format!("Variable {v} is used in the projection of {target} but is neither grouped nor aggregated."),
                        ));
                    }
                    allowed.push(target);
                }
            }
        }
        Ok(())
    }

    /// [10] ConstructQuery ::= 'CONSTRUCT' ( ConstructTemplate DatasetClause* WhereClause SolutionModifier | DatasetClause* 'WHERE' '{' TriplesTemplate? '}' SolutionModifier )
    fn construct_query(&mut self, prologue: Prologue) -> ParseResult<Query> {
        let (template, dataset, pattern) = if self.cursor.check_punctuation("{")? {
            let template = self.construct_template()?;
            let dataset = self.dataset_clauses()?;
            let pattern = self.where_clause()?;
            (template, dataset, pattern)
        } else {
            // The template is also the pattern to match
            let dataset = self.dataset_clauses()?;
            self.cursor.expect_keyword("WHERE")?;
            self.cursor.expect_punctuation("{")?;
            let template = self.template_triples()?;
            self.cursor.expect_punctuation("}")?;
            let triples: Vec<TripleOrPath> = template.iter().cloned().map(Into::into).collect();
            let pattern = GraphPattern::Group(if triples.is_empty() {
                Vec::new()
            } else {
                vec![GraphPattern::Bgp(triples)]
            });
            (template, dataset, pattern)
        };
        let modifiers = self.solution_modifier()?;
        let values = self.values_clause()?;
        Ok(Query::Construct {
            prologue,
            template,
            dataset,
            pattern,
            modifiers,
            values,
        })
    }

    /// [11] DescribeQuery ::= 'DESCRIBE' ( VarOrIri+ | '*' ) DatasetClause* WhereClause? SolutionModifier
    fn describe_query(&mut self, prologue: Prologue) -> ParseResult<Query> {
        let targets = if self.cursor.eat_punctuation("*")? {
            DescribeTargets::All
        } else {
            let mut resources = vec![self.var_or_iri()?];
            while let Some(resource) = self.try_var_or_iri()? {
                resources.push(resource);
            }
            DescribeTargets::Resources(resources)
        };
        let dataset = self.dataset_clauses()?;
        let pattern = if self.cursor.check_keyword("WHERE")? || self.cursor.check_punctuation("{")? {
            Some(self.where_clause()?)
        } else {
            None
        };
        let modifiers = self.solution_modifier()?;
        let values = self.values_clause()?;
        Ok(Query::Describe {
            prologue,
            targets,
            dataset,
            pattern,
            modifiers,
            values,
        })
    }

    /// [12] AskQuery ::= 'ASK' DatasetClause* WhereClause SolutionModifier
    fn ask_query(&mut self, prologue: Prologue) -> ParseResult<Query> {
        let dataset = self.dataset_clauses()?;
        let pattern = self.where_clause()?;
        let modifiers = self.solution_modifier()?;
        let values = self.values_clause()?;
        Ok(Query::Ask {
            prologue,
            dataset,
            pattern,
            modifiers,
            values,
        })
    }

    /// [13] DatasetClause ::= 'FROM' ( DefaultGraphClause | NamedGraphClause )
    fn dataset_clauses(&mut self) -> ParseResult<Option<QueryDataset>> {
        let mut dataset: Option<QueryDataset> = None;
        while self.cursor.eat_keyword("FROM")? {
            let dataset = dataset.get_or_insert_with(QueryDataset::default);
            if self.cursor.eat_keyword("NAMED")? {
                dataset.named.push(self.iri()?);
            } else {
                dataset.default.push(self.iri()?);
            }
        }
        Ok(dataset)
    }

    /// [17] WhereClause ::= 'WHERE'? GroupGraphPattern
    fn where_clause(&mut self) -> ParseResult<GraphPattern> {
        self.cursor.eat_keyword("WHERE")?;
        self.group_graph_pattern()
    }

    /// [18] SolutionModifier ::= GroupClause? HavingClause? OrderClause? LimitOffsetClauses?
    fn solution_modifier(&mut self) -> ParseResult<SolutionModifiers> {
        let mut modifiers = SolutionModifiers::default();
        if self.cursor.eat_keyword("GROUP")? {
            // [19] GroupClause ::= 'GROUP' 'BY' GroupCondition+
            self.cursor.expect_keyword("BY")?;
            loop {
                match self.try_group_condition()? {
                    Some(condition) => modifiers.group_by.push(condition),
                    None if modifiers.group_by.is_empty() => return Err(self.cursor.unexpected()),
                    None => break,
                }
            }
        }
        if self.cursor.eat_keyword("HAVING")? {
            // [21] HavingClause ::= 'HAVING' HavingCondition+
            loop {
                modifiers
                    .having
                    .push(self.with_aggregates(true, Self::constraint)?);
                if !self.is_constraint_start()? {
                    break;
                }
            }
        }
        if self.cursor.eat_keyword("ORDER")? {
            // [23] OrderClause ::= 'ORDER' 'BY' OrderCondition+
            self.cursor.expect_keyword("BY")?;
            loop {
                match self.with_aggregates(true, Self::try_order_condition)? {
                    Some(condition) => modifiers.order_by.push(condition),
                    None if modifiers.order_by.is_empty() => return Err(self.cursor.unexpected()),
                    None => break,
                }
            }
        }
        // [25] LimitOffsetClauses ::= LimitClause OffsetClause? | OffsetClause LimitClause?
        if self.cursor.eat_keyword("LIMIT")? {
            modifiers.limit = Some(self.limit_or_offset("LIMIT")?);
            if self.cursor.eat_keyword("OFFSET")? {
                modifiers.offset = Some(self.limit_or_offset("OFFSET")?);
            }
        } else if self.cursor.eat_keyword("OFFSET")? {
            modifiers.offset = Some(self.limit_or_offset("OFFSET")?);
            if self.cursor.eat_keyword("LIMIT")? {
                modifiers.limit = Some(self.limit_or_offset("LIMIT")?);
            }
        }
        Ok(modifiers)
    }

    /// [20] GroupCondition ::= BuiltInCall | FunctionCall | '(' Expression ( 'AS' Var )? ')' | Var
    fn try_group_condition(&mut self) -> ParseResult<Option<GroupCondition>> {
        if let Some(var) = self.try_var()? {
            return Ok(Some(GroupCondition::Variable(var)));
        }
        if self.cursor.eat_punctuation("(")? {
            let expression = self.expression()?;
            let variable = if self.cursor.eat_keyword("AS")? {
                Some(self.var()?)
            } else {
                None
            };
            self.cursor.expect_punctuation(")")?;
            return Ok(Some(GroupCondition::Expression(expression, variable)));
        }
        if let Some(expression) = self.try_built_in_call()? {
            return Ok(Some(GroupCondition::Expression(expression, None)));
        }
        if self.is_iri_start()? {
            return Ok(Some(GroupCondition::Expression(self.function_call()?, None)));
        }
        Ok(None)
    }

    /// [24] OrderCondition ::= ( ( 'ASC' | 'DESC' ) BrackettedExpression ) | ( Constraint | Var )
    fn try_order_condition(&mut self) -> ParseResult<Option<OrderCondition>> {
        if self.cursor.eat_keyword("ASC")? {
            return Ok(Some(OrderCondition::Asc(self.bracketted_expression()?)));
        }
        if self.cursor.eat_keyword("DESC")? {
            return Ok(Some(OrderCondition::Desc(self.bracketted_expression()?)));
        }
        if let Some(var) = self.try_var()? {
            return Ok(Some(OrderCondition::Asc(var.into())));
        }
        if self.is_constraint_start()? {
            return Ok(Some(OrderCondition::Asc(self.constraint()?)));
        }
        Ok(None)
    }

    /// Checks if the current token might start a [`constraint`](Self::constraint).
    fn is_constraint_start(&mut self) -> ParseResult<bool> {
        if self.cursor.check_punctuation("(")? || self.is_iri_start()? {
            return Ok(true);
        }
        Ok(matches!(self.cursor.peek()?, Token::Keyword(name) if is_built_in_name(name)))
    }

    fn is_iri_start(&mut self) -> ParseResult<bool> {
        if matches!(
            self.cursor.peek()?,
            Token::IriRef(_) | Token::PrefixedName { .. }
        ) {
            return Ok(true);
        }
        self.cursor.expect_kind(TokenKind::IriRef);
        self.cursor.expect_kind(TokenKind::PrefixedName);
        Ok(false)
    }

    /// [26] LimitClause ::= 'LIMIT' INTEGER
    /// [27] OffsetClause ::= 'OFFSET' INTEGER
    fn limit_or_offset(&mut self, clause: &str) -> ParseResult<u64> {
        // INTEGER is unsigned, a signed number is not part of the grammar here
        let value = match self.cursor.peek()? {
            Token::Integer(value) if !value.starts_with(['+', '-']) => value,
            _ => {
                self.cursor.expect_kind(TokenKind::Integer);
                return Err(self.cursor.unexpected());
            }
        };
        let location = self.cursor.next()?.location;
        value.parse().map_err(|e| {
            Self::semantic_error(location, format!("Invalid {clause} value {value}: {e}"))
        })
    }

    /// [28] ValuesClause ::= ( 'VALUES' DataBlock )?
    fn values_clause(&mut self) -> ParseResult<Option<InlineData>> {
        if self.cursor.eat_keyword("VALUES")? {
            Ok(Some(self.data_block()?))
        } else {
            Ok(None)
        }
    }
}

/// Where the parts of a `SELECT` clause are, for error reporting.
struct ProjectionLocations {
    select: Range<TextPosition>,
    items: Vec<Range<TextPosition>>,
}

/// The first variable of `expression` used outside of an aggregate and not in `allowed`.
fn first_ungrouped_variable(expression: &Expression, allowed: &[&Variable]) -> Option<Variable> {
    let mut found = None;
    expression.for_each_unaggregated_variable(&mut |v| {
        if found.is_none() && !allowed.contains(&v) {
            found = Some(v.clone());
        }
    });
    found
}

