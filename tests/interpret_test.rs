use std::path::{Path, PathBuf};

use tabstat::data::aggregate::{mean, median, sample_std};
use tabstat::data::summary::{describe, Summary};
use tabstat::data::{
    analyze_file, evaluate, interpret, load_file, ColumnStats, CommandError, Dataset, Operation, Outcome,
    StatValue,
};

const PEOPLE_CSV: &str = "\
Name,Age,Color,Home Price,Visits
Ann,30,red,100.5,1
Bo,,red,200,2
Cy,50,blue,,3
Dee,40,green,350.25,3
";

fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn people() -> (tempfile::TempDir, Dataset) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "people.csv", PEOPLE_CSV);
    let dataset = load_file(&path).unwrap();
    (dir, dataset)
}

fn single_number(dataset: &Dataset, command: &str, column: &str, op: Operation) -> f64 {
    let result = evaluate(dataset, command).unwrap();
    match result.get(column).and_then(|s| s.get(op)) {
        Some(StatValue::Number(v)) => *v,
        other => panic!("{command}: expected a number, got {other:?}"),
    }
}

#[test]
fn mean_matches_direct_computation() {
    let (_dir, ds) = people();
    let direct = ds.column("Home Price").unwrap().numeric_values();
    let expected = direct.iter().sum::<f64>() / direct.len() as f64;

    let got = single_number(&ds, "mean of home price", "Home Price", Operation::Mean);
    assert!((got - expected).abs() < 1e-12);
    assert!((got - 216.916_666_666_666_66).abs() < 1e-9);
}

#[test]
fn bulk_mode_matches_single_commands() {
    let (_dir, ds) = people();
    let bulk = evaluate(&ds, "").unwrap();

    let columns: Vec<&str> = bulk.entries.iter().map(|(c, _)| c.as_str()).collect();
    assert_eq!(columns, vec!["Age", "Home Price", "Visits"]);

    for column in columns {
        let stats = bulk.get(column).unwrap();
        for op in Operation::NUMERIC {
            let command = format!("{op} of {column}");
            let single = single_number(&ds, &command, column, op);
            assert_eq!(stats.get(op), Some(&StatValue::Number(single)), "{command}");
        }
    }
}

#[test]
fn statistics_use_standard_definitions() {
    let (_dir, ds) = people();
    let ages = ds.column("Age").unwrap().numeric_values();
    assert_eq!(ages, vec![30.0, 50.0, 40.0]);
    assert_eq!(single_number(&ds, "median of age", "Age", Operation::Median), median(&ages).unwrap());
    assert_eq!(single_number(&ds, "std of age", "Age", Operation::Std), sample_std(&ages).unwrap());
    assert_eq!(single_number(&ds, "std of age", "Age", Operation::Std), 10.0);
    assert_eq!(single_number(&ds, "mean of age", "Age", Operation::Mean), mean(&ages).unwrap());
    assert_eq!(single_number(&ds, "min of visits", "Visits", Operation::Min), 1.0);
    assert_eq!(single_number(&ds, "max of visits", "Visits", Operation::Max), 3.0);
}

#[test]
fn unknown_column_lists_every_header() {
    let (_dir, ds) = people();
    let err = evaluate(&ds, "mean of height").unwrap_err();
    assert_eq!(
        err,
        CommandError::UnknownColumn {
            column: "height".to_string(),
            available: ds.column_names(),
        }
    );
    assert!(err
        .to_string()
        .ends_with("Available columns: Name, Age, Color, Home Price, Visits"));
}

#[test]
fn unknown_operation_names_the_valid_set() {
    let (_dir, ds) = people();
    let Outcome::Failure { error } = interpret(&ds, "banana of Age") else {
        panic!("banana is not an operation");
    };
    assert_eq!(error, "Unknown operation 'banana'. Try: mean, median, mode, min, max, or std");
}

#[test]
fn numeric_operation_on_text_is_a_type_mismatch() {
    let (_dir, ds) = people();
    assert_eq!(
        evaluate(&ds, "mean of Name"),
        Err(CommandError::TypeMismatch {
            operation: Operation::Mean,
            column: "Name".to_string()
        })
    );
}

#[test]
fn mode_of_text_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "colors.csv", "Color\nred\nred\nblue\n");
    let ds = load_file(&path).unwrap();

    let Outcome::Success { result, command } = interpret(&ds, "mode of Color") else {
        panic!("mode should succeed");
    };
    assert_eq!(command, "mode of color");
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        serde_json::json!({"Color": {"mode": ["red"]}})
    );
}

#[test]
fn mode_ties_are_all_returned() {
    let (_dir, ds) = people();
    let result = evaluate(&ds, "mode of color").unwrap();
    assert_eq!(
        result.get("Color").and_then(|s| s.get(Operation::Mode)),
        Some(&StatValue::Values(vec!["red".to_string()]))
    );
    let result = evaluate(&ds, "mode of visits").unwrap();
    assert_eq!(
        result.get("Visits").and_then(|s| s.get(Operation::Mode)),
        Some(&StatValue::Values(vec!["3".to_string()]))
    );
    let result = evaluate(&ds, "mode of age").unwrap();
    assert_eq!(
        result.get("Age").and_then(|s| s.get(Operation::Mode)),
        Some(&StatValue::Values(vec!["30.0".to_string(), "40.0".to_string(), "50.0".to_string()]))
    );
}

#[test]
fn signed_zeros_count_as_one_mode_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "zeros.csv", "x\n0.0\n-0.0\n5.5\n");
    let ds = load_file(&path).unwrap();

    for _ in 0..5 {
        let result = evaluate(&ds, "mode of x").unwrap();
        assert_eq!(
            result.get("x").and_then(|s| s.get(Operation::Mode)),
            Some(&StatValue::Values(vec!["0.0".to_string()]))
        );
    }
    assert_eq!(describe(&ds).get("x").unwrap().mode.as_deref(), Some("0.0"));
}

#[test]
fn two_tokens_are_malformed() {
    let (_dir, ds) = people();
    assert_eq!(evaluate(&ds, "of X"), Err(CommandError::Malformed));
    assert!(!interpret(&ds, "of X").is_success());
}

#[test]
fn bulk_mode_isolates_undefined_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "sparse.csv", "a,b,label\n1,,x\n2,5,y\n3,,z\n");
    let ds = load_file(&path).unwrap();

    let result = evaluate(&ds, "   ").unwrap();
    assert_eq!(result.len(), 2);
    assert!(matches!(result.get("a"), Some(ColumnStats::Stats(_))));
    match result.get("b") {
        Some(ColumnStats::Error(msg)) => assert!(msg.starts_with("Couldn't analyze column 'b'"), "{msg}"),
        other => panic!("expected an error entry, got {other:?}"),
    }
    assert!(result.get("label").is_none());
}

#[test]
fn analyze_file_reports_load_failures() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = analyze_file(&dir.path().join("gone.csv"), "mean of age");
    match outcome {
        Outcome::Failure { error } => assert!(error.starts_with("Analysis failed: File not found"), "{error}"),
        other => panic!("expected failure, got {other:?}"),
    }

    let path = write_fixture(dir.path(), "people.csv", PEOPLE_CSV);
    assert!(analyze_file(&path, "max of home price").is_success());
}

#[test]
fn summary_export_round_trips() {
    let (dir, ds) = people();
    let summary = describe(&ds);
    let out = dir.path().join("analysis_people.csv");
    summary.save(&out).unwrap();

    let back = Summary::read_csv(std::fs::File::open(&out).unwrap()).unwrap();
    let price = back.get("Home Price").unwrap();
    let values = ds.column("Home Price").unwrap().numeric_values();

    let close = |a: Option<f64>, b: Option<f64>| (a.unwrap() - b.unwrap()).abs() < 1e-9;
    assert!(close(price.mean, mean(&values)));
    assert!(close(price.std, sample_std(&values)));
    assert!(close(price.q50, median(&values)));
    assert_eq!(price.min, Some(100.5));
    assert_eq!(price.max, Some(350.25));
    assert_eq!(price.missing_values, 1);
    assert_eq!(price.count, 3);

    let name = back.get("Name").unwrap();
    assert_eq!(name.unique, Some(4));
    assert_eq!(name.mean, None);
}
