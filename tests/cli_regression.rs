// Regression tests for the `sentree` binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn sentree() -> Command {
    let mut cmd = Command::cargo_bin("sentree").unwrap();
    cmd.env_remove("SENTREE_TRANSLATOR_ID")
        .env_remove("SENTREE_TRANSLATOR_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn parse_prints_an_outline() {
    sentree()
        .args(["parse", "나는=나/NP+는/JX 학생이다=학생/NNG+이/VCP+다/EF"])
        .assert()
        .success()
        .stdout(contains("Sentence").and(contains("Phrases:")).and(contains("topic: 나는")));
}

#[test]
fn parse_json_emits_the_response() {
    sentree()
        .args(["parse", "--json", "--no-definitions", "가=가/VV+아/EF"])
        .assert()
        .success()
        .stdout(contains("\"result\": \"OK\"").and(contains("\"parseTree\"")));
}

#[test]
fn parse_failure_is_rendered_with_miette() {
    sentree()
        .args(["parse", "나는=나/NP+는/JX ☆=☆/NA"])
        .assert()
        .success()
        .stdout(contains("Sorry, failed to parse sentence"))
        .stderr(contains("sentree::parse").or(contains("help:")));
}

#[test]
fn empty_input_exits_with_failure() {
    sentree()
        .args(["parse", "  "])
        .assert()
        .failure()
        .stderr(contains("Missing input sentence(s)"));
}

#[test]
fn malformed_annotation_exits_with_failure() {
    sentree()
        .args(["parse", "빵 가/VV+아/EF"])
        .assert()
        .failure()
        .stderr(contains("tagger rejected"));
}

#[test]
fn tags_lists_the_canonical_map() {
    sentree()
        .arg("tags")
        .assert()
        .success()
        .stdout(contains("ETD").and(contains("ETM")).and(contains("sentence-final tag: SF")));
}

#[test]
fn invalid_tables_file_is_reported() {
    let path = std::env::temp_dir().join("sentree_cli_bad_tables.yaml");
    fs::write(&path, "tag_map: [not, a, map").unwrap();

    sentree()
        .arg("--tables")
        .arg(&path)
        .arg("tags")
        .assert()
        .failure()
        .stderr(contains("invalid tables file"));

    let _ = fs::remove_file(&path);
}
