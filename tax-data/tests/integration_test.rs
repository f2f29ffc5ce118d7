//! Integration tests that load the schedule fixture from disk and compute
//! against it end-to-end.

use std::path::Path;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_core::calculations::{ProgressiveTax, RoundingPolicy, assess_report};
use tax_core::{BoundaryConvention, BracketSchedule, FinancialReport, ScheduleError};
use tax_data::{EngineConfig, ScheduleLoader, ScheduleLoaderError};

const TEST_CSV: &str = include_str!("../test-data/municipal_brackets.csv");

fn fixture_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test-data")
        .join("municipal_brackets.csv")
}

#[test]
fn test_load_fixture_file_builds_both_years() {
    let book = ScheduleLoader::load_from_file(&fixture_path(), BoundaryConvention::default())
        .expect("fixture should load");

    assert_eq!(book.years().collect::<Vec<_>>(), vec![2024, 2026]);
}

#[test]
fn test_fixture_2024_is_the_reference_schedule() {
    let records = ScheduleLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    let book = ScheduleLoader::build_book(&records, BoundaryConvention::default()).unwrap();

    assert_eq!(book.for_year(2024), Ok(&BracketSchedule::reference()));
}

#[test]
fn test_fixture_2026_rows_are_sorted() {
    let book =
        ScheduleLoader::load_from_file(&fixture_path(), BoundaryConvention::default()).unwrap();

    let schedule = book.for_year(2026).unwrap();
    let lower_bounds: Vec<_> = schedule.brackets().iter().map(|b| b.lower_bound).collect();

    assert_eq!(
        lower_bounds,
        vec![
            dec!(0),
            dec!(1500001),
            dec!(3000001),
            dec!(6000001),
            dec!(10000001),
            dec!(20000001),
        ]
    );
}

#[test]
fn test_reference_scenarios_against_loaded_schedule() {
    let book =
        ScheduleLoader::load_from_file(&fixture_path(), BoundaryConvention::default()).unwrap();
    let schedule = book.for_year(2024).unwrap();
    let calculator = ProgressiveTax::new(schedule);

    assert_eq!(calculator.compute(dec!(500000)), Ok(dec!(0)));
    assert_eq!(calculator.compute(dec!(1000000)), Ok(dec!(0)));
    assert_eq!(calculator.compute(dec!(2000000)), Ok(dec!(50000)));
    assert_eq!(calculator.compute(dec!(4000000)), Ok(dec!(200000)));
    assert_eq!(calculator.compute(dec!(25000000)), Ok(dec!(4250000)));
}

#[test]
fn test_year_between_versions_uses_earlier_schedule() {
    let book =
        ScheduleLoader::load_from_file(&fixture_path(), BoundaryConvention::default()).unwrap();
    let report = FinancialReport {
        year: 2025,
        quarter: 3,
        revenue: dec!(2000000),
        expenses: dec!(250000),
    };

    let assessment = assess_report(&book, &report, RoundingPolicy::default()).unwrap();

    assert_eq!(assessment.tax_amount, dec!(50000));
    assert_eq!(assessment.net_income, dec!(1750000));
}

#[test]
fn test_later_version_applies_from_its_year() {
    let book =
        ScheduleLoader::load_from_file(&fixture_path(), BoundaryConvention::default()).unwrap();
    let report = FinancialReport {
        year: 2026,
        quarter: 1,
        revenue: dec!(2000000),
        expenses: dec!(0),
    };

    let assessment = assess_report(&book, &report, RoundingPolicy::default()).unwrap();

    // 1,500,001 untaxed, 499,999 at 5%.
    assert_eq!(assessment.tax_amount, dec!(25000));
}

#[test]
fn test_half_open_convention_rejects_inclusive_fixture() {
    let err = ScheduleLoader::load_from_file(&fixture_path(), BoundaryConvention::HalfOpen)
        .expect_err("inclusive boundaries leave gaps under half-open framing");

    match err {
        ScheduleLoaderError::InvalidSchedule { year, source } => {
            assert_eq!(year, 2024);
            assert!(matches!(source, ScheduleError::Gap { index: 1, .. }));
        }
        other => panic!("expected InvalidSchedule, got {other:?}"),
    }
}

#[test]
fn test_missing_file_is_an_io_error() {
    let result = ScheduleLoader::load_from_file(
        Path::new("does-not-exist.csv"),
        BoundaryConvention::default(),
    );

    assert!(matches!(result, Err(ScheduleLoaderError::Io { .. })));
}

#[test]
fn test_config_drives_rounding() {
    let config = EngineConfig::from_toml_str(
        r#"
        [rounding]
        decimal_places = 2
        "#,
    )
    .unwrap();
    let book = ScheduleLoader::load_from_file(&fixture_path(), config.convention().unwrap())
        .unwrap();

    let tax = ProgressiveTax::new(book.for_year(2024).unwrap())
        .with_rounding(config.rounding)
        .compute(dec!(2000000))
        .unwrap();

    assert_eq!(tax, dec!(49999.95));
}
