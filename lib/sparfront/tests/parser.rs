#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use sparfront::algebra::*;
use sparfront::lexer::TokenKind;
use sparfront::path::{NegatedPathElement, PathModifier, PropertyPath};
use sparfront::term::*;
use sparfront::{
    DescribeTargets, Projection, Query, SelectItem, SparqlParser, SparqlSyntaxError, parse_query,
};
use std::thread;

fn iri(iri: &str) -> Iri {
    Iri::new_unchecked(iri)
}

fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

/// The triples of a query whose `WHERE` clause is a single basic graph pattern.
fn single_bgp(query: &Query) -> &[TripleOrPath] {
    match query.pattern() {
        Some(GraphPattern::Group(elements)) => match elements.as_slice() {
            [GraphPattern::Bgp(triples)] => triples,
            _ => panic!("a single basic graph pattern is expected, found {elements:?}"),
        },
        pattern => panic!("a group is expected, found {pattern:?}"),
    }
}

fn filter_expression(query: &str) -> Result<Expression, SparqlSyntaxError> {
    let query = parse_query(&format!("SELECT * WHERE {{ FILTER({query}) }}"))?;
    let Some(GraphPattern::Group(elements)) = query.pattern() else {
        panic!("a group is expected")
    };
    let [GraphPattern::Filter(expression)] = elements.as_slice() else {
        panic!("a single filter is expected, found {elements:?}")
    };
    Ok(expression.clone())
}

fn parse_error(query: &str) -> sparfront::ParseError {
    match parse_query(query) {
        Err(SparqlSyntaxError::Parse(e)) => e,
        result => panic!("a parse error is expected for {query}, found {result:?}"),
    }
}

fn semantic_error(query: &str) -> sparfront::SemanticError {
    match parse_query(query) {
        Err(SparqlSyntaxError::Semantic(e)) => e,
        result => panic!("a semantic error is expected for {query}, found {result:?}"),
    }
}

#[test]
fn test_query_forms() -> Result<(), SparqlSyntaxError> {
    assert!(matches!(
        parse_query("SELECT ?s WHERE { ?s ?p ?o }")?,
        Query::Select { .. }
    ));
    assert!(matches!(
        parse_query("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }")?,
        Query::Construct { .. }
    ));
    assert!(matches!(
        parse_query("DESCRIBE <http://example.com/s>")?,
        Query::Describe { pattern: None, .. }
    ));
    assert!(matches!(
        parse_query("ask { ?s ?p ?o }")?,
        Query::Ask { .. }
    ));
    Ok(())
}

#[test]
fn test_prefix_resolution() -> Result<(), SparqlSyntaxError> {
    let query = parse_query("PREFIX ex: <http://ex/> SELECT * WHERE { ex:s ex:p ex:o }")?;
    assert_eq!(
        single_bgp(&query),
        [TripleOrPath {
            subject: iri("http://ex/s").into(),
            predicate: Predicate::Iri(iri("http://ex/p")),
            object: iri("http://ex/o").into(),
        }]
    );
    assert_eq!(query.prologue().prefix("ex"), Some(&iri("http://ex/")));
    Ok(())
}

#[test]
fn test_prefix_override() -> Result<(), Box<dyn std::error::Error>> {
    let query = SparqlParser::new()
        .with_prefix("ex", "http://example.com/")?
        .parse_query("PREFIX ex: <http://example.org/> ASK { ex:s ?p ?o }")?;
    assert_eq!(single_bgp(&query)[0].subject, iri("http://example.org/s").into());
    Ok(())
}

#[test]
fn test_base_resolution() -> Result<(), SparqlSyntaxError> {
    let query = parse_query(
        "BASE <http://example.com/a/> BASE <b/> PREFIX ex: <c#> SELECT * WHERE { <s> ex:p ?o }",
    )?;
    assert_eq!(query.base_iri(), Some(&iri("http://example.com/a/b/")));
    let triples = single_bgp(&query);
    assert_eq!(triples[0].subject, iri("http://example.com/a/b/s").into());
    assert_eq!(
        triples[0].predicate,
        Predicate::Iri(iri("http://example.com/a/b/c#p"))
    );
    Ok(())
}

#[test]
fn test_relative_iri_without_base() {
    semantic_error("SELECT * WHERE { <s> ?p ?o }");
}

#[test]
fn test_undeclared_prefix() {
    let error = semantic_error("SELECT * WHERE { ex:s ?p ?o }");
    assert_eq!(error.message(), "The prefix ex: has not been declared");
    assert_eq!(error.location().start.column, 17);
}

#[test]
fn test_rdf_type_shortcut() -> Result<(), SparqlSyntaxError> {
    let query = parse_query("SELECT * WHERE { ?s a ?o }")?;
    assert_eq!(single_bgp(&query)[0].predicate, Predicate::Iri(iri(RDF_TYPE)));
    parse_error("SELECT * WHERE { a ?p ?o }");
    Ok(())
}

#[test]
fn test_path_inverse_then_modifier() -> Result<(), SparqlSyntaxError> {
    let query =
        parse_query("PREFIX ex: <http://ex/> SELECT * WHERE { ?a ^ex:p*/ex:q ?b }")?;
    assert_eq!(
        single_bgp(&query)[0].predicate,
        Predicate::Path(PropertyPath::Sequence(
            Box::new(PropertyPath::Modified(
                Box::new(PropertyPath::Inverse(Box::new(PropertyPath::Iri(iri(
                    "http://ex/p"
                ))))),
                PathModifier::ZeroOrMore
            )),
            Box::new(PropertyPath::Iri(iri("http://ex/q")))
        ))
    );
    Ok(())
}

#[test]
fn test_path_precedence() -> Result<(), SparqlSyntaxError> {
    let query = parse_query(
        "PREFIX ex: <http://ex/> SELECT * WHERE { ?a ex:p|ex:q/ex:r+ ?b }",
    )?;
    assert_eq!(
        single_bgp(&query)[0].predicate.to_string(),
        "(<http://ex/p> | (<http://ex/q> / <http://ex/r>+))"
    );
    Ok(())
}

#[test]
fn test_negated_property_set() -> Result<(), SparqlSyntaxError> {
    let query =
        parse_query("PREFIX ex: <http://ex/> SELECT * WHERE { ?a !(ex:p|^ex:q) ?b }")?;
    assert_eq!(
        single_bgp(&query)[0].predicate,
        Predicate::Path(PropertyPath::Negated(vec![
            NegatedPathElement::Iri(iri("http://ex/p")),
            NegatedPathElement::Inverse(iri("http://ex/q")),
        ]))
    );
    parse_error("PREFIX ex: <http://ex/> SELECT * WHERE { ?a !(ex:p/ex:q) ?b }");
    Ok(())
}

#[test]
fn test_dangling_semicolon() -> Result<(), SparqlSyntaxError> {
    let query = parse_query(
        "PREFIX ex: <http://ex/> SELECT * WHERE { ?a ex:p ?b ; . ?c ex:q ?d ;; ex:r ?e ; }",
    )?;
    let triples = single_bgp(&query);
    assert_eq!(triples.len(), 3);
    assert_eq!(
        triples.iter().map(ToString::to_string).collect::<Vec<_>>(),
        [
            "?a <http://ex/p> ?b",
            "?c <http://ex/q> ?d",
            "?c <http://ex/r> ?e"
        ]
    );
    Ok(())
}

#[test]
fn test_object_list() -> Result<(), SparqlSyntaxError> {
    let query = parse_query("SELECT * WHERE { ?s ?p 1, 2.0, 3e0, \"4\"@EN, true }")?;
    let objects = single_bgp(&query)
        .iter()
        .map(|t| t.object.to_string())
        .collect::<Vec<_>>();
    assert_eq!(objects, ["1", "2.0", "3e0", "\"4\"@en", "true"]);
    Ok(())
}

#[test]
fn test_blank_node_property_list_and_collection() -> Result<(), SparqlSyntaxError> {
    let query = parse_query("SELECT * WHERE { [ ?p ?o ] ?q (1 [] ) }")?;
    let triples = single_bgp(&query)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    assert_eq!(
        triples,
        [
            "_:anon0 ?p ?o",
            format!("_:anon1 <{RDF_FIRST}> 1").as_str(),
            format!("_:anon1 <{RDF_REST}> _:anon2").as_str(),
            format!("_:anon2 <{RDF_FIRST}> _:anon3").as_str(),
            format!("_:anon2 <{RDF_REST}> <{RDF_NIL}>").as_str(),
            "_:anon0 ?q _:anon1",
        ]
    );
    Ok(())
}

#[test]
fn test_blank_node_counter_is_per_parse() -> Result<(), SparqlSyntaxError> {
    let query = "SELECT * WHERE { [] ?p [ ?q ( ?a ?b ) ] }";
    let expected = parse_query(query)?;
    let threads = (0..4)
        .map(|_| thread::spawn(move || parse_query(query)))
        .collect::<Vec<_>>();
    for thread in threads {
        let Ok(result) = thread.join() else {
            panic!("the parsing thread panicked")
        };
        assert_eq!(result?, expected);
    }
    Ok(())
}

#[test]
fn test_blank_node_label_scope() -> Result<(), SparqlSyntaxError> {
    parse_query("SELECT * WHERE { _:a ?p ?o . _:a ?q ?r }")?;
    let error = semantic_error("SELECT * WHERE { _:a ?p ?o . { _:a ?q ?r } }");
    assert_eq!(
        error.message(),
        "The blank node _:a is already used in another basic graph pattern"
    );
    // A filter or a bind ends the basic graph pattern
    semantic_error("SELECT * WHERE { _:a ?p ?o FILTER(?o > 1) _:a ?q ?r }");
    semantic_error("SELECT * WHERE { _:a ?p ?o . BIND(1 AS ?x) _:a ?q ?r }");
    parse_query("SELECT * WHERE { _:a ?p ?o FILTER(?o > 1) _:b ?q ?r }")?;
    // The template has its own scope
    parse_query("CONSTRUCT { _:a ?p ?o } WHERE { _:a ?p ?o }")?;
    Ok(())
}

#[test]
fn test_builtin_arity() -> Result<(), SparqlSyntaxError> {
    let error = parse_error("SELECT * WHERE { FILTER(SUBSTR(?s)) }");
    assert!(error.expected().contains(&TokenKind::Punctuation(",")));
    assert_eq!(error.found(), &TokenKind::Punctuation(")"));
    filter_expression("SUBSTR(?s, 1)")?;
    filter_expression("SUBSTR(?s, 1, 3)")?;
    parse_error("SELECT * WHERE { FILTER(SUBSTR(?s, 1, 3, 4)) }");
    parse_error("SELECT * WHERE { FILTER(REPLACE(?s, \"a\")) }");
    parse_error("SELECT * WHERE { FILTER(NOW(?s)) }");
    parse_error("SELECT * WHERE { FILTER(IF(?a, ?b)) }");
    assert_eq!(
        filter_expression("replace(?s, \"a\", \"b\", \"i\")")?,
        Expression::FunctionCall(
            Function::Replace,
            vec![
                var("s").into(),
                Literal::new_simple_literal("a").into(),
                Literal::new_simple_literal("b").into(),
                Literal::new_simple_literal("i").into(),
            ]
        )
    );
    assert_eq!(
        filter_expression("CONCAT()")?,
        Expression::FunctionCall(Function::Concat, Vec::new())
    );
    Ok(())
}

#[test]
fn test_aggregates() -> Result<(), SparqlSyntaxError> {
    let query = parse_query(
        "SELECT (COUNT(*) AS ?c) (COUNT(DISTINCT ?x) AS ?d) (GROUP_CONCAT(?x; SEPARATOR = \", \") AS ?g) WHERE { ?x ?p ?o }",
    )?;
    let Query::Select { select, .. } = &query else {
        panic!("a select query is expected")
    };
    let Projection::Items(items) = &select.projection else {
        panic!("a projection is expected")
    };
    assert_eq!(
        items[0],
        SelectItem::Alias(
            Expression::Aggregate(AggregateExpression::CountAll),
            var("c")
        )
    );
    assert_eq!(
        items[1],
        SelectItem::Alias(
            Expression::Aggregate(AggregateExpression::Count {
                expr: Box::new(var("x").into()),
                distinct: true
            }),
            var("d")
        )
    );
    assert_eq!(
        items[2].to_string(),
        "(GROUP_CONCAT(?x; SEPARATOR = \", \") AS ?g)"
    );
    parse_error("SELECT (COUNT(DISTINCT *) AS ?c) WHERE { ?x ?p ?o }");
    Ok(())
}

#[test]
fn test_aggregate_placement() -> Result<(), SparqlSyntaxError> {
    let error = semantic_error("SELECT * WHERE { ?s ?p ?o FILTER(COUNT(?s) > 1) }");
    assert!(error.message().contains("only allowed in the SELECT, HAVING and ORDER BY"));
    semantic_error("SELECT ?s WHERE { ?s ?p ?o } GROUP BY (SUM(?o))");
    semantic_error("SELECT (SUM(MAX(?o)) AS ?m) WHERE { ?s ?p ?o }");
    parse_query(
        "SELECT ?s (SUM(?o) AS ?sum) WHERE { ?s ?p ?o } GROUP BY ?s HAVING (SUM(?o) > 10) ORDER BY DESC(MAX(?o))",
    )?;
    Ok(())
}

#[test]
fn test_grouping_validity() -> Result<(), SparqlSyntaxError> {
    assert_eq!(
        semantic_error("SELECT ?s ?o WHERE { ?s ?p ?o } GROUP BY ?s").message(),
        "Variable ?o is selected but not aggregated."
    );
    assert_eq!(
        semantic_error("SELECT ?s (COUNT(?p) AS ?c) WHERE { ?s ?p ?o }").message(),
        "Variable ?s is selected but not aggregated."
    );
    assert_eq!(
        semantic_error("SELECT * WHERE { ?s ?p ?o } GROUP BY ?s").message(),
        "GROUP BY is not allowed when all variables are selected via SELECT *"
    );
    assert_eq!(
        semantic_error("SELECT ((?o + 1) AS ?x) WHERE { ?s ?p ?o } GROUP BY ?s").message(),
        "Variable ?o is used in the projection of ?x but is neither grouped nor aggregated."
    );
    parse_query(
        "SELECT ?k (COUNT(?o) AS ?c) ((?c + 1) AS ?d) WHERE { ?s ?p ?o } GROUP BY (STR(?s) AS ?k)",
    )?;
    Ok(())
}

#[test]
fn test_bracketed_group_variable() -> Result<(), SparqlSyntaxError> {
    let query = parse_query("SELECT ?x WHERE { ?x ?p ?o } GROUP BY (?x)")?;
    let group_by = &query.modifiers().group_by;
    assert_eq!(
        *group_by,
        [GroupCondition::Expression(var("x").into(), None)]
    );
    assert_eq!(group_by[0].variable(), Some(&var("x")));
    parse_query("SELECT ?s (SUM(?o) AS ?t) WHERE { ?s ?p ?o } GROUP BY (?s)")?;
    assert_eq!(
        semantic_error("SELECT ?o WHERE { ?s ?p ?o } GROUP BY (?s)").message(),
        "Variable ?o is selected but not aggregated."
    );
    Ok(())
}

#[test]
fn test_projection_scoping() -> Result<(), SparqlSyntaxError> {
    assert_eq!(
        semantic_error("SELECT ?s ?s WHERE { ?s ?p ?o }").message(),
        "The variable ?s is projected more than once"
    );
    semantic_error("SELECT ?x (1 AS ?x) WHERE { ?s ?p ?o }");
    assert_eq!(
        semantic_error("SELECT (1 AS ?s) WHERE { ?s ?p ?o }").message(),
        "The target variable ?s of an AS clause was already used before in the query body."
    );
    assert_eq!(
        semantic_error("SELECT * WHERE { ?s ?p ?o BIND(1 AS ?o) }").message(),
        "The target variable ?o of a BIND is already in scope"
    );
    parse_query("SELECT * WHERE { ?s ?p ?o BIND(1 AS ?x) }")?;
    Ok(())
}

#[test]
fn test_values() -> Result<(), SparqlSyntaxError> {
    let query = parse_query(
        "SELECT * WHERE { VALUES (?a ?b) { (1 UNDEF) (<http://example.com/> \"x\") } } VALUES ?c { 1 2 }",
    )?;
    let Some(GraphPattern::Group(elements)) = query.pattern() else {
        panic!("a group is expected")
    };
    let [GraphPattern::Values(data)] = elements.as_slice() else {
        panic!("a VALUES block is expected")
    };
    assert_eq!(data.variables, [var("a"), var("b")]);
    assert_eq!(data.rows[0][1], None);
    assert_eq!(query.values().map(|v| v.rows.len()), Some(2));
    assert!(
        semantic_error("SELECT * WHERE { VALUES (?a ?b) { (1) } }")
            .message()
            .starts_with(
                "The number of values in every data block must match the number of variables in a values clause"
            )
    );
    parse_error("SELECT * WHERE { VALUES ?a { _:b } }");
    Ok(())
}

#[test]
fn test_expression_precedence() -> Result<(), SparqlSyntaxError> {
    assert_eq!(
        filter_expression("?a || ?b && !?c = 1 + 2 * -?d")?.to_string(),
        "(?a || (?b && (!(?c) = (1 + (2 * -(?d))))))"
    );
    assert_eq!(
        filter_expression("?a IN (1, 2) && ?b NOT IN ()")?.to_string(),
        "((?a IN (1, 2)) && (?b NOT IN ()))"
    );
    // A bare numeric expression is not wrapped
    assert_eq!(filter_expression("(?a)")?, Expression::Variable(var("a")));
    Ok(())
}

#[test]
fn test_signed_literal_folding() -> Result<(), SparqlSyntaxError> {
    assert_eq!(
        filter_expression("?x -1")?,
        Expression::Add(
            Box::new(var("x").into()),
            Box::new(NumericLiteral::new("-1", NumericKind::Integer).into())
        )
    );
    assert_eq!(filter_expression("?x -1 * 2")?.to_string(), "(?x + (-1 * 2))");
    assert_eq!(filter_expression("?x - 1")?.to_string(), "(?x - 1)");
    Ok(())
}

#[test]
fn test_function_calls() -> Result<(), SparqlSyntaxError> {
    assert_eq!(
        filter_expression("<http://example.com/f>(?a, 1)")?,
        Expression::FunctionCall(
            Function::Custom(iri("http://example.com/f")),
            vec![
                var("a").into(),
                NumericLiteral::new("1", NumericKind::Integer).into()
            ]
        )
    );
    assert_eq!(
        filter_expression("isIRI(?a) && isUri(?b) && BOUND(?c)")?.to_string(),
        "((isIRI(?a) && isIRI(?b)) && BOUND(?c))"
    );
    assert!(matches!(
        filter_expression("NOT EXISTS { ?s ?p ?o }")?,
        Expression::NotExists(_)
    ));
    assert!(matches!(
        filter_expression("COALESCE(?a, 1)")?,
        Expression::Coalesce(args) if args.len() == 2
    ));
    Ok(())
}

#[test]
fn test_graph_patterns() -> Result<(), SparqlSyntaxError> {
    let query = parse_query(
        "SELECT * FROM <http://example.com/g> FROM NAMED <http://example.com/n> WHERE { { ?s ?p ?o } UNION { ?o ?p ?s } OPTIONAL { ?s ?q ?r } MINUS { ?s a ?t } GRAPH ?g { ?a ?b ?c } SERVICE SILENT <http://example.com/sparql> { ?d ?e ?f } }",
    )?;
    assert_eq!(
        query.pattern().map(ToString::to_string).as_deref(),
        Some("{ { ?s ?p ?o . } UNION { ?o ?p ?s . } OPTIONAL { ?s ?q ?r . } MINUS { ?s <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ?t . } GRAPH ?g { ?a ?b ?c . } SERVICE SILENT <http://example.com/sparql> { ?d ?e ?f . } }")
    );
    let dataset = query.dataset().map(ToString::to_string);
    assert_eq!(
        dataset.as_deref(),
        Some(" FROM <http://example.com/g> FROM NAMED <http://example.com/n>")
    );
    Ok(())
}

#[test]
fn test_sub_select() -> Result<(), SparqlSyntaxError> {
    let query = parse_query(
        "SELECT ?s WHERE { { SELECT ?s (COUNT(*) AS ?c) WHERE { ?s ?p ?o } GROUP BY ?s } FILTER(?c > 1) }",
    )?;
    let Some(GraphPattern::Group(elements)) = query.pattern() else {
        panic!("a group is expected")
    };
    assert!(matches!(elements[0], GraphPattern::SubSelect(_)));
    // The projected variables of the sub-select are in scope
    semantic_error("SELECT * WHERE { { SELECT ?s WHERE { ?s ?p ?o } } BIND(1 AS ?s) }");
    // Sub-selects do not have a dataset clause
    parse_error("SELECT * WHERE { { SELECT * FROM <http://example.com/> WHERE { ?s ?p ?o } } }");
    Ok(())
}

#[test]
fn test_construct() -> Result<(), SparqlSyntaxError> {
    let query = parse_query(
        "PREFIX ex: <http://ex/> CONSTRUCT { ?s a ex:C ; ex:p [ ex:q ?o ] } WHERE { ?s ex:p ?o }",
    )?;
    let Query::Construct { template, .. } = &query else {
        panic!("a construct query is expected")
    };
    assert_eq!(template.len(), 3);
    assert_eq!(template[0].predicate, VarOrIri::Iri(iri(RDF_TYPE)));

    let query = parse_query("CONSTRUCT WHERE { ?s ?p ?o }")?;
    let Query::Construct { template, .. } = &query else {
        panic!("a construct query is expected")
    };
    assert_eq!(template.len(), 1);
    parse_error("CONSTRUCT { ?s <http://ex/p>* ?o } WHERE { ?s ?p ?o }");
    Ok(())
}

#[test]
fn test_describe() -> Result<(), SparqlSyntaxError> {
    assert!(matches!(
        parse_query("DESCRIBE * WHERE { ?s ?p ?o }")?,
        Query::Describe { targets: DescribeTargets::All, pattern: Some(_), .. }
    ));
    let Query::Describe { targets, .. } = parse_query("DESCRIBE ?s <http://example.com/> { ?s ?p ?o }")? else {
        panic!("a describe query is expected")
    };
    assert_eq!(
        targets,
        DescribeTargets::Resources(vec![
            VarOrIri::Variable(var("s")),
            VarOrIri::Iri(iri("http://example.com/"))
        ])
    );
    Ok(())
}

#[test]
fn test_solution_modifiers() -> Result<(), SparqlSyntaxError> {
    let query = parse_query(
        "SELECT ?s WHERE { ?s ?p ?o } ORDER BY ?s DESC(?o) STR(?p) OFFSET 5 LIMIT 10",
    )?;
    let modifiers = query.modifiers();
    assert_eq!(modifiers.limit, Some(10));
    assert_eq!(modifiers.offset, Some(5));
    assert_eq!(
        modifiers.order_by,
        [
            OrderCondition::Asc(var("s").into()),
            OrderCondition::Desc(var("o").into()),
            OrderCondition::Asc(Expression::FunctionCall(
                Function::Str,
                vec![var("p").into()]
            )),
        ]
    );
    parse_query("SELECT ?s WHERE { ?s ?p ?o } LIMIT 18446744073709551615")?;
    semantic_error("SELECT ?s WHERE { ?s ?p ?o } LIMIT 18446744073709551616");
    parse_error("SELECT ?s WHERE { ?s ?p ?o } LIMIT 1.5");
    parse_error("SELECT ?s WHERE { ?s ?p ?o } LIMIT -1");
    parse_error("SELECT ?s WHERE { ?s ?p ?o } OFFSET +2");
    Ok(())
}

#[test]
fn test_less_than_before_variable() -> Result<(), SparqlSyntaxError> {
    let query = parse_query("SELECT * { ?s ?p ?o } ORDER BY (?s<?o)")?;
    assert_eq!(
        query.modifiers().order_by,
        [OrderCondition::Asc(Expression::Less(
            Box::new(var("s").into()),
            Box::new(var("o").into())
        ))]
    );
    assert_eq!(filter_expression("?a<?b")?.to_string(), "(?a < ?b)");
    assert_eq!(
        filter_expression("?a<?b && ?b<=1")?.to_string(),
        "((?a < ?b) && (?b <= 1))"
    );
    Ok(())
}

#[test]
fn test_trailing_tokens() {
    let error = parse_error("ASK { ?s ?p ?o } }");
    assert!(error.expected().contains(&TokenKind::EndOfInput));
    assert_eq!(error.found(), &TokenKind::Punctuation("}"));
    parse_error("SELECT * WHERE { ?s ?p ?o } ASK { }");
}

#[test]
fn test_empty_query() {
    for query in ["", "  # only a comment\n", "PREFIX ex: <http://ex/>"] {
        let error = parse_error(query);
        assert_eq!(error.found(), &TokenKind::EndOfInput);
        assert!(error.expected().contains(&TokenKind::Keyword("SELECT".into())));
        assert!(error.expected().contains(&TokenKind::Keyword("ASK".into())));
    }
}

#[test]
fn test_lex_errors() {
    for query in [
        "SELECT * WHERE { ?s ?p \"foo }",
        "SELECT * WHERE { ?s ?p ?o . _ }",
        "SELECT * WHERE { ?s ?p \"\\q\" }",
    ] {
        assert!(
            matches!(parse_query(query), Err(SparqlSyntaxError::Lex(_))),
            "{query} should fail while lexing"
        );
    }
}

#[test]
fn test_invalid_language_tag() {
    semantic_error("SELECT * WHERE { ?s ?p \"a\"@123456789 }");
}

#[test]
fn test_depth_guard() -> Result<(), SparqlSyntaxError> {
    let nested = |depth: usize| {
        format!(
            "SELECT * WHERE {{ FILTER({}?a{}) }}",
            "(".repeat(depth),
            ")".repeat(depth)
        )
    };
    parse_query(&nested(30))?;
    let error = parse_error(&nested(10_000));
    assert!(error.to_string().contains("nested too deeply"));

    let groups = format!("ASK {}{}", "{".repeat(10_000), "}".repeat(10_000));
    assert!(parse_error(&groups).to_string().contains("nested too deeply"));

    let collections = format!(
        "ASK {{ ?s ?p {}1{} }}",
        "(".repeat(10_000),
        ")".repeat(10_000)
    );
    assert!(parse_error(&collections).to_string().contains("nested too deeply"));

    let parser = SparqlParser::new().with_max_depth(4);
    parser.parse_query("ASK { { ?s ?p ?o } }")?;
    assert!(parser.parse_query("ASK { { { { { ?s ?p ?o } } } } }").is_err());
    Ok(())
}

#[test]
fn test_error_display() {
    let error = parse_error("SELECT * WHERE { ?s ?p }");
    let message = error.to_string();
    assert!(
        message.starts_with("Parser error at line 1 column 24: expected one of "),
        "{message}"
    );
    assert!(message.ends_with(", found '}'"), "{message}");
    assert!(error.expected().contains(&TokenKind::Variable));
    assert_eq!(error.lexeme(), "}");
    assert_eq!(error.location().start.line, 0);
    assert_eq!(error.location().start.column, 23);
}

#[test]
fn test_display_reparse() -> Result<(), SparqlSyntaxError> {
    for query in [
        "PREFIX ex: <http://ex/> SELECT DISTINCT ?s (STRLEN(?o) AS ?l) WHERE { ?s ex:p/ex:q* ?o OPTIONAL { ?o ^ex:r ?x } FILTER(?o != \"a\\nb\"@en-US) } ORDER BY DESC(?l) LIMIT 3",
        "SELECT (COUNT(DISTINCT ?o) AS ?c) WHERE { ?s ?p ?o } GROUP BY ?s HAVING (COUNT(*) > 2)",
        "CONSTRUCT { ?s ?p [ ?q ?o ] } WHERE { ?s ?p ?o BIND(-?o AS ?n) VALUES ?p { <http://ex/p> UNDEF } }",
        "ASK { { ?s ?p ?o } UNION { ?s ?p (1 2) } MINUS { ?s !(<http://ex/a>|^<http://ex/b>) ?o } }",
        "DESCRIBE ?s WHERE { ?s ?p 1.5e3 FILTER(?p IN (<http://ex/a>) && NOT EXISTS { ?s ?q ?r }) }",
    ] {
        let parsed = parse_query(query)?;
        let rendered = parsed.to_string();
        let reparsed = parse_query(&rendered)?;
        assert_eq!(reparsed.to_string(), rendered, "for {query}");
        assert_eq!(reparsed.to_sse(), parsed.to_sse(), "for {query}");
    }
    Ok(())
}

#[test]
fn test_sse() -> Result<(), SparqlSyntaxError> {
    assert_eq!(
        parse_query("SELECT ?s WHERE { ?s <http://ex/p>+ ?o FILTER(?o > 1) } LIMIT 1")?.to_sse(),
        "(select (?s) (group (bgp (path ?s (path+ <http://ex/p>) ?o)) (filter (> ?o 1))) (slice _ 1))"
    );
    Ok(())
}

#[test]
fn test_from_str() -> Result<(), SparqlSyntaxError> {
    let query: Query = "ASK { ?s ?p ?o }".parse()?;
    assert_eq!(Query::try_from("ASK { ?s ?p ?o }")?, query);
    assert_eq!(Query::try_from(&"ASK { ?s ?p ?o }".to_owned())?, query);
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn test_serde() -> Result<(), Box<dyn std::error::Error>> {
    let query = parse_query(
        "PREFIX ex: <http://ex/> SELECT ?s (COUNT(*) AS ?c) WHERE { ?s ex:p* [] } GROUP BY ?s",
    )?;
    let json = serde_json::to_string(&query)?;
    assert_eq!(serde_json::from_str::<Query>(&json)?, query);
    Ok(())
}
