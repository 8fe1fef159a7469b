#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use sparfront::algebra::GraphPattern;
use sparfront::term::*;
use sparfront::{
    GraphOrDefault, GraphTarget, GraphUpdateOperation, QuadPattern, SparqlParser,
    SparqlSyntaxError, Update, parse_update,
};

fn iri(iri: &str) -> Iri {
    Iri::new_unchecked(iri)
}

fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

fn operations(update: &str) -> Result<Vec<GraphUpdateOperation>, SparqlSyntaxError> {
    Ok(parse_update(update)?
        .operations
        .into_iter()
        .map(|operation| operation.operation)
        .collect())
}

fn semantic_error(update: &str) -> sparfront::SemanticError {
    match parse_update(update) {
        Err(SparqlSyntaxError::Semantic(e)) => e,
        result => panic!("a semantic error is expected for {update}, found {result:?}"),
    }
}

fn parse_error(update: &str) -> sparfront::ParseError {
    match parse_update(update) {
        Err(SparqlSyntaxError::Parse(e)) => e,
        result => panic!("a parse error is expected for {update}, found {result:?}"),
    }
}

#[test]
fn test_insert_data() -> Result<(), SparqlSyntaxError> {
    assert_eq!(
        operations(
            "PREFIX ex: <http://ex/> INSERT DATA { ex:s ex:p ex:o . GRAPH ex:g { ex:s ex:p 1 } }"
        )?,
        [GraphUpdateOperation::InsertData {
            data: vec![
                QuadPattern {
                    subject: iri("http://ex/s").into(),
                    predicate: iri("http://ex/p").into(),
                    object: iri("http://ex/o").into(),
                    graph: None,
                },
                QuadPattern {
                    subject: iri("http://ex/s").into(),
                    predicate: iri("http://ex/p").into(),
                    object: NumericLiteral::new("1", NumericKind::Integer).into(),
                    graph: Some(iri("http://ex/g").into()),
                },
            ]
        }]
    );
    assert_eq!(
        parse_update("INSERT DATA { <http://ex/s> <http://ex/p> _:b }")?.to_sse(),
        "(update (insertData ((triple <http://ex/s> <http://ex/p> _:b))))"
    );
    Ok(())
}

#[test]
fn test_data_without_variables() {
    assert_eq!(
        semantic_error("INSERT DATA { ?a <http://ex/p> <http://ex/o> }").message(),
        "Variables are not allowed in INSERT DATA, found ?a"
    );
    assert_eq!(
        semantic_error("INSERT DATA { GRAPH ?f { <http://ex/s> <http://ex/p> <http://ex/o> } }")
            .message(),
        "Variables are not allowed in INSERT DATA, found ?f"
    );
    assert_eq!(
        semantic_error("DELETE DATA { <http://ex/s> ?p <http://ex/o> }").message(),
        "Variables are not allowed in DELETE DATA, found ?p"
    );
}

#[test]
fn test_delete_without_blank_nodes() {
    assert_eq!(
        semantic_error("DELETE DATA { _:a <http://ex/p> <http://ex/o> }").message(),
        "Blank nodes are not allowed in DELETE DATA, found _:a"
    );
    assert_eq!(
        semantic_error("DELETE WHERE { ?s <http://ex/p> _:o }").message(),
        "Blank nodes are not allowed in DELETE WHERE, found _:o"
    );
    semantic_error("DELETE { _:a <http://ex/p> ?o } WHERE { ?s <http://ex/p> ?o }");
    semantic_error("DELETE { ?s <http://ex/p> [] } WHERE { ?s <http://ex/p> ?o }");
}

#[test]
fn test_delete_where() -> Result<(), SparqlSyntaxError> {
    assert_eq!(
        operations("DELETE WHERE { ?s <http://ex/p> ?o . GRAPH ?g { ?s ?p 1 } }")?,
        [GraphUpdateOperation::DeleteWhere {
            pattern: vec![
                QuadPattern {
                    subject: var("s").into(),
                    predicate: iri("http://ex/p").into(),
                    object: var("o").into(),
                    graph: None,
                },
                QuadPattern {
                    subject: var("s").into(),
                    predicate: var("p").into(),
                    object: NumericLiteral::new("1", NumericKind::Integer).into(),
                    graph: Some(var("g").into()),
                },
            ]
        }]
    );
    Ok(())
}

#[test]
fn test_modify() -> Result<(), SparqlSyntaxError> {
    let update = parse_update(
        "WITH <http://ex/g> DELETE { ?s <http://ex/p> ?o } INSERT { ?s <http://ex/q> ?o } \
         USING <http://ex/d> USING NAMED <http://ex/n> WHERE { ?s <http://ex/p> ?o }",
    )?;
    assert_eq!(
        update.to_sse(),
        "(update (modify (with <http://ex/g>) (using (<http://ex/d> (named <http://ex/n>))) \
         (group (bgp (triple ?s <http://ex/p> ?o))) \
         (delete ((triple ?s <http://ex/p> ?o))) (insert ((triple ?s <http://ex/q> ?o)))))"
    );
    let insert_only = operations("INSERT { ?s <http://ex/p> ?o } WHERE { ?s ?q ?o }")?;
    let [
        GraphUpdateOperation::Modify {
            with,
            delete,
            insert,
            using,
            pattern,
        },
    ] = insert_only.as_slice()
    else {
        panic!("a single modify operation is expected")
    };
    assert_eq!(*with, None);
    assert!(delete.is_empty());
    assert_eq!(insert.len(), 1);
    assert_eq!(*using, None);
    assert!(matches!(pattern, GraphPattern::Group(_)));

    assert!(matches!(
        operations("DELETE { ?s ?p ?o } WHERE { ?s ?p ?o }")?.as_slice(),
        [GraphUpdateOperation::Modify { insert, .. }] if insert.is_empty()
    ));
    assert!(matches!(
        operations("WITH <http://ex/g> INSERT { ?s ?p ?o } WHERE { ?s ?p ?o }")?.as_slice(),
        [GraphUpdateOperation::Modify { with: Some(_), .. }]
    ));
    parse_error("DELETE { ?s ?p ?o } INSERT { ?s ?p ?o }");
    parse_error("WITH <http://ex/g> CLEAR ALL");
    Ok(())
}

#[test]
fn test_template_blank_nodes_are_not_shared_with_where() -> Result<(), SparqlSyntaxError> {
    parse_update("INSERT { _:b <http://ex/p> _:b } WHERE { _:b <http://ex/p> _:b }")?;
    Ok(())
}

#[test]
fn test_blank_node_labels_are_per_operation() -> Result<(), SparqlSyntaxError> {
    let update = parse_update(
        "INSERT DATA { _:a <http://ex/p> 1 } ; INSERT DATA { _:a <http://ex/p> 2 }",
    )?;
    assert_eq!(update.operations.len(), 2);
    Ok(())
}

#[test]
fn test_graph_management() -> Result<(), SparqlSyntaxError> {
    assert_eq!(
        operations(
            "LOAD SILENT <http://ex/doc> INTO GRAPH <http://ex/g> ; \
             CLEAR DEFAULT ; DROP SILENT NAMED ; CLEAR GRAPH <http://ex/g> ; DROP ALL ; \
             CREATE GRAPH <http://ex/g> ; \
             ADD DEFAULT TO <http://ex/g> ; MOVE GRAPH <http://ex/g> TO DEFAULT ; \
             COPY SILENT <http://ex/a> TO GRAPH <http://ex/b>"
        )?,
        [
            GraphUpdateOperation::Load {
                silent: true,
                source: iri("http://ex/doc"),
                destination: Some(iri("http://ex/g")),
            },
            GraphUpdateOperation::Clear {
                silent: false,
                graph: GraphTarget::DefaultGraph,
            },
            GraphUpdateOperation::Drop {
                silent: true,
                graph: GraphTarget::NamedGraphs,
            },
            GraphUpdateOperation::Clear {
                silent: false,
                graph: GraphTarget::Named(iri("http://ex/g")),
            },
            GraphUpdateOperation::Drop {
                silent: false,
                graph: GraphTarget::AllGraphs,
            },
            GraphUpdateOperation::Create {
                silent: false,
                graph: iri("http://ex/g"),
            },
            GraphUpdateOperation::Add {
                silent: false,
                from: GraphOrDefault::DefaultGraph,
                to: GraphOrDefault::Graph(iri("http://ex/g")),
            },
            GraphUpdateOperation::Move {
                silent: false,
                from: GraphOrDefault::Graph(iri("http://ex/g")),
                to: GraphOrDefault::DefaultGraph,
            },
            GraphUpdateOperation::Copy {
                silent: true,
                from: GraphOrDefault::Graph(iri("http://ex/a")),
                to: GraphOrDefault::Graph(iri("http://ex/b")),
            },
        ]
    );
    assert_eq!(
        parse_update("LOAD <http://ex/doc> ; CREATE SILENT GRAPH <http://ex/g>")?.to_sse(),
        "(update (load <http://ex/doc>) (create silent <http://ex/g>))"
    );
    parse_error("CREATE <http://ex/g>");
    parse_error("CLEAR");
    Ok(())
}

#[test]
fn test_operation_sequence() -> Result<(), SparqlSyntaxError> {
    assert_eq!(parse_update("")?, Update::default());
    assert_eq!(parse_update("  # nothing\n")?, Update::default());
    assert_eq!(parse_update("CLEAR ALL ;")?.operations.len(), 1);
    assert_eq!(parse_update("PREFIX ex: <http://ex/>")?, Update::default());
    assert_eq!(
        parse_update("CLEAR ALL ; PREFIX ex: <http://ex/>")?
            .operations
            .len(),
        1
    );
    parse_error("CLEAR ALL CLEAR ALL");
    parse_error("CLEAR ALL ; ;");
    parse_error(";");
    Ok(())
}

#[test]
fn test_prefixes_stay_in_scope() -> Result<(), SparqlSyntaxError> {
    let update = parse_update(
        "PREFIX ex: <http://ex/> CLEAR GRAPH ex:a ; BASE <http://base/> CLEAR GRAPH ex:b ; CLEAR GRAPH <c>",
    )?;
    let graphs = update
        .operations
        .iter()
        .map(|operation| match &operation.operation {
            GraphUpdateOperation::Clear {
                graph: GraphTarget::Named(graph),
                ..
            } => graph.clone(),
            operation => panic!("a clear operation is expected, found {operation:?}"),
        })
        .collect::<Vec<_>>();
    assert_eq!(
        graphs,
        [iri("http://ex/a"), iri("http://ex/b"), iri("http://base/c")]
    );
    assert_eq!(update.operations[0].prologue.declarations.len(), 1);
    assert_eq!(update.operations[2].prologue.declarations.len(), 0);
    assert_eq!(
        update.to_sse(),
        "(update (clear <http://ex/a>) (base <http://base/> (clear <http://ex/b>)) (clear <http://base/c>))"
    );
    Ok(())
}

#[test]
fn test_parser_options() -> Result<(), Box<dyn std::error::Error>> {
    let parser = SparqlParser::new().with_prefix("ex", "http://ex/")?;
    assert_eq!(
        parser.parse_update("DROP GRAPH ex:g")?.to_sse(),
        "(update (drop <http://ex/g>))"
    );
    Ok(())
}

#[test]
fn test_to_string_roundtrip() -> Result<(), SparqlSyntaxError> {
    for update in [
        "PREFIX ex: <http://ex/> INSERT DATA { ex:s ex:p \"o\"@en . GRAPH ex:g { ex:s ex:p 1.5 } }",
        "DELETE DATA { <http://ex/s> <http://ex/p> true }",
        "DELETE WHERE { ?s <http://ex/p> ?o . GRAPH ?g { ?s ?p ?o } }",
        "WITH <http://ex/g> DELETE { ?s <http://ex/p> ?o } INSERT { ?s <http://ex/q> _:b } \
         USING <http://ex/d> USING NAMED <http://ex/n> WHERE { ?s <http://ex/p> ?o OPTIONAL { ?s ?q ?r } }",
        "INSERT { } WHERE { }",
        "LOAD SILENT <http://ex/doc> INTO GRAPH <http://ex/g> ; COPY DEFAULT TO <http://ex/g>",
        "BASE <http://ex/> CLEAR GRAPH <g> ; DROP SILENT ALL ; CREATE GRAPH <http://ex/h>",
    ] {
        let parsed = parse_update(update)?;
        let reparsed: Update = parsed.to_string().parse()?;
        assert_eq!(parsed, reparsed, "{update} is not stable through {parsed}");
    }
    Ok(())
}

#[test]
fn test_try_from() -> Result<(), SparqlSyntaxError> {
    let update_str = String::from("CLEAR DEFAULT");
    assert_eq!(Update::try_from(&update_str)?, Update::try_from("CLEAR DEFAULT")?);
    Ok(())
}
