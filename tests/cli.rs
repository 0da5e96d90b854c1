//! E2E tests driving the binary over fixture files

use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"].iter().copied().chain(args.iter().copied()))
        .output()
        .expect("Failed to execute command")
}

/// The worked example: 5 @ 200 then 7 @ 100 against a sale of 12 @ 150.
#[test]
fn gains_basic() {
    let output = run(&[
        "gains",
        "-p",
        "tests/data/purchases.csv",
        "-s",
        "tests/data/sales.csv",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("Year: 2022, Capital gains/losses: $100.00"));
}

#[test]
fn gains_csv_output() {
    let output = run(&[
        "gains",
        "-p",
        "tests/data/purchases.csv",
        "-s",
        "tests/data/sales.csv",
        "--csv",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("year,gain"));
    assert!(stdout.contains("2022,100.00"));
}

#[test]
fn gains_detailed_csv_output() {
    let output = run(&[
        "gains",
        "-p",
        "tests/data/purchases.csv",
        "-s",
        "tests/data/sales.csv",
        "--csv",
        "--detail",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("running_gain"));
    // Two fills: the 200 lot first, then the 100 lot.
    assert_eq!(stdout.lines().count(), 3);
}

#[test]
fn gains_json_output() {
    let output = run(&[
        "gains",
        "-p",
        "tests/data/purchases.csv",
        "-s",
        "tests/data/sales.csv",
        "--json",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("\"total\""));
    assert!(stdout.contains("\"year\": 2022"));
    assert!(stdout.contains("\"gain\": \"100.00\""));
}

/// Selling more units than were ever purchased refuses to produce figures.
#[test]
fn gains_oversold_rejected() {
    let output = run(&[
        "gains",
        "-p",
        "tests/data/purchases.csv",
        "-s",
        "tests/data/oversold_sales.csv",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("more than the total purchased"));
    assert!(!stdout.contains("Year:"));
}

#[test]
fn lots_remaining_after_matching() {
    let output = run(&[
        "lots",
        "-p",
        "tests/data/purchases.csv",
        "-s",
        "tests/data/sales.csv",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    // 15 purchased, 12 sold: 3 units left on the cheapest lot.
    assert!(stdout.contains("OPEN LOTS"));
    assert!(stdout.contains("Total remaining units: 3"));
}

#[test]
fn validate_ok() {
    let output = run(&[
        "validate",
        "-p",
        "tests/data/purchases.csv",
        "-s",
        "tests/data/sales.csv",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("Purchased units: 15"));
    assert!(stdout.contains("Sold units:      12"));
}

#[test]
fn validate_mismatch_exits_nonzero() {
    let output = run(&[
        "validate",
        "-p",
        "tests/data/purchases.csv",
        "-s",
        "tests/data/oversold_sales.csv",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success());
    assert!(stdout.contains("more than the total purchased"));
}

#[test]
fn validate_json_output() {
    let output = run(&[
        "validate",
        "-p",
        "tests/data/purchases.csv",
        "-s",
        "tests/data/sales.csv",
        "--json",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("\"ok\": true"));
    assert!(stdout.contains("\"purchased_units\": \"15\""));
}
