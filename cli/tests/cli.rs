#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use anyhow::Result;
use assert_cmd::Command;
use assert_fs::NamedTempFile;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn cli_command() -> Result<Command> {
    Ok(Command::cargo_bin("sparfront")?)
}

#[test]
fn cli_help() -> Result<()> {
    cli_command()?
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn cli_parse_query_argument() -> Result<()> {
    cli_command()?
        .arg("parse")
        .arg("--query")
        .arg("PREFIX ex: <http://example.com/> SELECT ?s WHERE { ?s ex:p ?o }")
        .assert()
        .success()
        .stdout(
            "PREFIX ex: <http://example.com/>\nSELECT ?s WHERE { ?s <http://example.com/p> ?o . }\n",
        );
    Ok(())
}

#[test]
fn cli_parse_query_file_to_sse() -> Result<()> {
    let query_file = NamedTempFile::new("query.rq")?;
    query_file.write_str("ASK { <s> ?p ?o }")?;
    cli_command()?
        .arg("parse")
        .arg("--query-file")
        .arg(query_file.path())
        .arg("--base")
        .arg("http://example.com/")
        .arg("--format")
        .arg("sse")
        .assert()
        .success()
        .stdout("(ask (group (bgp (triple <http://example.com/s> ?p ?o))))\n");
    Ok(())
}

#[test]
fn cli_parse_stdin_to_json() -> Result<()> {
    cli_command()?
        .arg("parse")
        .arg("--format")
        .arg("json")
        .write_stdin("SELECT * WHERE { ?s ?p ?o }")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Select\""));
    Ok(())
}

#[test]
fn cli_parse_invalid_query() -> Result<()> {
    cli_command()?
        .arg("parse")
        .arg("--query")
        .arg("SELECT * WHERE { ?s ?p }")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("line 1 column 24"));
    Ok(())
}

#[test]
fn cli_parse_update() -> Result<()> {
    cli_command()?
        .arg("parse")
        .arg("--update")
        .arg("--format")
        .arg("sse")
        .arg("--query")
        .arg("PREFIX ex: <http://example.com/> DELETE WHERE { ?s ex:p ?o } ; CLEAR SILENT ALL")
        .assert()
        .success()
        .stdout(
            "(update (deleteWhere ((triple ?s <http://example.com/p> ?o))) (clear silent all))\n",
        );
    Ok(())
}

#[test]
fn cli_parse_invalid_update() -> Result<()> {
    cli_command()?
        .arg("parse")
        .arg("--update")
        .write_stdin("DELETE DATA { _:a <http://example.com/p> 1 }")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("The update is invalid"))
        .stderr(predicate::str::contains("Blank nodes are not allowed in DELETE DATA"));
    Ok(())
}

#[test]
fn cli_parse_max_depth() -> Result<()> {
    cli_command()?
        .arg("parse")
        .arg("--max-depth")
        .arg("2")
        .arg("--query")
        .arg("ASK { { { ?s ?p ?o } } }")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nested too deeply"));
    Ok(())
}

#[test]
fn cli_parse_logs_json() -> Result<()> {
    cli_command()?
        .arg("--log-format")
        .arg("json")
        .arg("--log-level")
        .arg("debug")
        .arg("parse")
        .arg("--query")
        .arg("ASK {}")
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("\"message\":\"query parsed\""));
    Ok(())
}

#[test]
fn cli_negotiate() -> Result<()> {
    cli_command()?
        .arg("negotiate")
        .arg("--accept")
        .arg("image/*, application/json;q=0.3")
        .arg("--candidate")
        .arg("application/json")
        .arg("--candidate")
        .arg("image/png")
        .assert()
        .success()
        .stdout("image/png\n");
    Ok(())
}

#[test]
fn cli_negotiate_well_known() -> Result<()> {
    cli_command()?
        .arg("negotiate")
        .arg("--accept")
        .arg("text/turtle;q=0.9, application/sparql-results+json")
        .assert()
        .success()
        .stdout("application/sparql-results+json\n");
    Ok(())
}

#[test]
fn cli_negotiate_not_acceptable() -> Result<()> {
    cli_command()?
        .arg("negotiate")
        .arg("--accept")
        .arg("text/html")
        .arg("--candidate")
        .arg("application/json")
        .env_remove("RUST_LOG")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains(
            "Currently supported media types are application/json.",
        ));
    Ok(())
}

#[test]
fn cli_negotiate_invalid_quality() -> Result<()> {
    cli_command()?
        .arg("negotiate")
        .arg("--accept")
        .arg("application/json;q=1.3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quality value"));
    Ok(())
}
