#![allow(clippy::panic, clippy::unwrap_used)]

use codspeed_criterion_compat::{Criterion, Throughput, criterion_group, criterion_main};
use sparfront::SparqlParser;
use sparfront::media_type::{MediaType, select_media_type};

const QUERIES: &[&str] = &[
    "SELECT ?s ?p ?o WHERE { ?s ?p ?o }",
    "PREFIX foaf: <http://xmlns.com/foaf/0.1/> SELECT ?name (COUNT(?friend) AS ?count) WHERE { ?person foaf:name ?name ; foaf:knows ?friend . OPTIONAL { ?friend foaf:mbox ?mbox } FILTER(LANG(?name) = \"en\" || !BOUND(?mbox)) } GROUP BY ?name HAVING (COUNT(?friend) > 2) ORDER BY DESC(?count) LIMIT 10",
    "PREFIX ex: <http://example.com/> CONSTRUCT { ?s ex:ancestor ?a } WHERE { ?s (ex:parent|^ex:child)+ ?a . ?a ex:list (1 2 [ ex:p ex:o ]) }",
    "ASK { { ?s ?p ?o } UNION { GRAPH ?g { ?s !(<http://example.com/p>|^<http://example.com/q>) ?o } } MINUS { ?s a <http://example.com/C> } VALUES (?s ?o) { (<http://example.com/a> UNDEF) } }",
    "DESCRIBE ?s WHERE { ?s ?p ?o FILTER(REGEX(STR(?o), \"^a.*b$\", \"i\") && ?o IN (1, 2.5, 3e2) && NOT EXISTS { ?o ?q ?r }) }",
];

/// A `SELECT` query with `size` triple patterns.
fn large_query(size: usize) -> String {
    let mut query = String::from("PREFIX ex: <http://example.com/> SELECT * WHERE {\n");
    for i in 0..size {
        query.push_str(&format!("  ?s{i} ex:p{i} ?o{i} ; ex:q \"value {i}\"@en .\n"));
    }
    query.push('}');
    query
}

fn parse_queries(c: &mut Criterion) {
    let parser = SparqlParser::new();
    let mut group = c.benchmark_group("parse queries");
    group.throughput(Throughput::Elements(QUERIES.len() as u64));
    group.bench_function("parse mixed queries", |b| {
        b.iter(|| {
            for query in QUERIES {
                parser.parse_query(query).unwrap();
            }
        })
    });
    group.finish();
}

const UPDATES: &[&str] = &[
    "PREFIX ex: <http://example.com/> INSERT DATA { ex:s ex:p \"o\" . GRAPH ex:g { ex:s ex:q 1 , 2 , 3 } }",
    "PREFIX foaf: <http://xmlns.com/foaf/0.1/> WITH <http://example.com/g> DELETE { ?p foaf:mbox ?m } INSERT { ?p foaf:mbox <mailto:x@example.com> } WHERE { ?p foaf:name \"x\" ; foaf:mbox ?m }",
    "DELETE WHERE { ?s <http://example.com/p> ?o } ; LOAD SILENT <http://example.com/doc> INTO GRAPH <http://example.com/g> ; CLEAR DEFAULT",
];

fn parse_updates(c: &mut Criterion) {
    let parser = SparqlParser::new();
    let mut group = c.benchmark_group("parse updates");
    group.throughput(Throughput::Elements(UPDATES.len() as u64));
    group.bench_function("parse mixed updates", |b| {
        b.iter(|| {
            for update in UPDATES {
                parser.parse_update(update).unwrap();
            }
        })
    });
    group.finish();
}

fn parse_large_queries(c: &mut Criterion) {
    let parser = SparqlParser::new();
    let mut group = c.benchmark_group("parse large queries");
    for size in [10, 100, 1_000] {
        let query = large_query(size);
        group.throughput(Throughput::Bytes(query.len() as u64));
        group.bench_function(format!("parse query with {size} triple patterns"), |b| {
            b.iter(|| parser.parse_query(&query).unwrap())
        });
    }
    group.finish();
}

fn negotiate(c: &mut Criterion) {
    let candidates = MediaType::well_known().collect::<Vec<_>>();
    c.bench_function("select media type", |b| {
        b.iter(|| {
            select_media_type(
                "text/html, application/xhtml+xml, application/xml;q=0.9, image/*;q=0.8, */*;q=0.1",
                &candidates,
            )
            .unwrap()
        })
    });
}

criterion_group!(
    parser_benches,
    parse_queries,
    parse_updates,
    parse_large_queries,
    negotiate
);

criterion_main!(parser_benches);
