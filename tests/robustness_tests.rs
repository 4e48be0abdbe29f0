mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::{csv_file, serve_binlist};
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn test_malformed_card_rows_are_skipped() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    input.write_all(b"card_number\n45717360\n").unwrap();
    input.write_all(b"4571\xff7360\n").unwrap();
    input.write_all(b"4111111111111111\n").unwrap();
    input.flush().unwrap();
    let url = serve_binlist("US");

    Command::new(cargo_bin!("cardcost"))
        .arg("--no-system-proxy")
        .arg("--binlist-url")
        .arg(&url)
        .arg("quote")
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("****7360,US,10.00,200,default"))
        .stdout(predicate::str::contains("************1111,US,10.00,200,default"))
        .stderr(predicate::str::contains("Error reading card"));
}

#[test]
fn test_malformed_cost_rows_are_skipped() {
    let costs = csv_file(&[
        "country_code,cost",
        "US,5",
        "USA,7",
        "GR,-1",
        "DK,abc",
        "DK,3.5",
    ]);

    Command::new(cargo_bin!("cardcost"))
        .arg("--costs")
        .arg(costs.path())
        .args(["costs", "list"])
        .assert()
        .success()
        .stdout("id,country_code,cost\n1,US,5.00\n2,DK,3.50\n")
        .stderr(predicate::str::contains("Error reading cost table"));
}

#[test]
fn test_duplicate_cost_rows_keep_first() {
    let costs = csv_file(&["country_code,cost", "US,5", "us,9"]);

    Command::new(cargo_bin!("cardcost"))
        .arg("--costs")
        .arg(costs.path())
        .args(["costs", "get", "US"])
        .assert()
        .success()
        .stdout("id,country_code,cost\n1,US,5.00\n");
}

#[test]
fn test_missing_input_file_fails() {
    Command::new(cargo_bin!("cardcost"))
        .arg("quote")
        .arg("does/not/exist.csv")
        .assert()
        .failure();
}
