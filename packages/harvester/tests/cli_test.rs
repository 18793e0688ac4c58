//! Tests of the `oai-harvester` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn harvester() -> Command {
    Command::cargo_bin("oai-harvester").unwrap()
}

#[test]
fn test_help_lists_commands() {
    harvester()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("harvest"))
        .stdout(predicate::str::contains("count"));
}

#[test]
fn test_invalid_endpoint_is_rejected() {
    let dir = tempdir().unwrap();
    harvester()
        .args(["harvest", "not-a-url"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid OAI endpoint URL"));
}

#[test]
fn test_zero_max_files_is_rejected() {
    let dir = tempdir().unwrap();
    harvester()
        .args(["harvest", "https://example.org/oai"])
        .arg(dir.path())
        .args(["--max-files", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid archive size"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_harvest_prints_yaml_report() {
    let server = MockServer::start().await;
    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/"><ListRecords>
<record><header><identifier>oai:a:1</identifier></header><metadata/></record>
<record><header><identifier>oai:a:2</identifier></header><metadata/></record>
</ListRecords></OAI-PMH>"#;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().to_path_buf();
    let endpoint = format!("{}/oai", server.uri());

    let assert = tokio::task::spawn_blocking(move || {
        harvester()
            .args(["harvest", endpoint.as_str()])
            .arg(&dest)
            .args(["--prefix", "run", "--yaml"])
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("num_found: 2"))
        .stdout(predicate::str::contains("num_received: 2"))
        .stdout(predicate::str::contains("run-001.zip"))
        .stdout(predicate::str::contains("status: complete"));
    assert!(dir.path().join("run-001.zip").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_count_prints_total() {
    let server = MockServer::start().await;
    let body = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/"><ListRecords>
<record><header><identifier>x</identifier></header></record>
<resumptionToken completeListSize="1200">next</resumptionToken>
</ListRecords></OAI-PMH>"#;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/oai", server.uri());
    let assert =
        tokio::task::spawn_blocking(move || harvester().args(["count", endpoint.as_str()]).assert())
            .await
            .unwrap();

    assert.success().stdout(predicate::str::diff("1200\n"));
}
