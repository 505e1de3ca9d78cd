//! End-to-end validation tests over generated bundles.
//!
//! Each test fabricates a bundle with a known defect and asserts the
//! standard registry reports exactly the expected violations.

mod common;

use common::*;

use capval::bundle::var_batch;
use capval::catalog::{Organism, ReferenceCatalogs};
use capval::engine::{Validator, ValidatorConfig, ValidatorError};
use capval::report::Severity;
use tempfile::tempdir;

fn catalogs() -> &'static ReferenceCatalogs {
    ReferenceCatalogs::bundled().expect("bundled catalogs")
}

#[test]
fn clean_bundle_is_valid_with_no_violations() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clean");
    valid_bundle(6, 4).write_directory(&path).unwrap();

    let report = Validator::new(catalogs()).validate(&path).unwrap();
    assert!(report.is_valid(), "unexpected violations:\n{}", report);
    assert!(report.violations().is_empty());
}

#[test]
fn missing_required_obs_column_yields_exactly_one_violation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no-tissue");

    let mut bundle = valid_bundle(3, 2);
    bundle.obs = Some(obs_batch_without(
        "tissue",
        &["cell_0", "cell_1", "cell_2"],
    ));
    bundle.write_directory(&path).unwrap();

    let report = Validator::new(catalogs()).validate(&path).unwrap();
    assert!(!report.is_valid());
    assert_eq!(count_rule(&report, "obs-required-columns"), 1);

    let violation = report
        .violations()
        .iter()
        .find(|v| v.rule == "obs-required-columns")
        .unwrap();
    assert!(violation.message.contains("tissue"));
}

#[test]
fn validation_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken");

    // A bundle with several defects at once.
    let mut bundle = valid_bundle(3, 3);
    bundle.var = Some(var_batch(&["ENSG00000141510", UNKNOWN_GENE, ""]).unwrap());
    bundle.write_directory(&path).unwrap();

    let validator = Validator::new(catalogs());
    let first = validator.validate(&path).unwrap();
    let second = validator.validate(&path).unwrap();

    assert!(!first.is_valid());
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn unknown_gene_yields_exactly_one_violation_naming_it() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("unknown-gene");

    let mut bundle = valid_bundle(2, 2);
    bundle.var = Some(var_batch(&["ENSG00000141510", UNKNOWN_GENE]).unwrap());
    bundle.write_directory(&path).unwrap();

    let report = Validator::new(catalogs()).validate(&path).unwrap();
    assert_eq!(count_rule(&report, "var-genes-known"), 1);

    let violation = report
        .violations()
        .iter()
        .find(|v| v.rule == "var-genes-known")
        .unwrap();
    assert!(violation.message.contains(UNKNOWN_GENE));
    assert_eq!(violation.location.as_ref().unwrap().row, Some(1));
}

#[test]
fn unknown_organism_short_circuits_gene_check() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad-organism");

    let mut bundle = valid_bundle(2, 4);
    let mut meta = metadata(2, 4, "Rattus norvegicus");
    meta.organism = Some("Rattus norvegicus".to_string());
    bundle.metadata = Some(meta);
    // obs organism values agree with the declaration, so only the
    // enumeration check can fire.
    let obs_ids = ["cell_0", "cell_1"];
    bundle.obs = Some(
        capval::bundle::obs_batch(
            &obs_ids,
            &["10x", "10x"],
            &["normal", "normal"],
            &["Rattus norvegicus", "Rattus norvegicus"],
            &["blood", "blood"],
        )
        .unwrap(),
    );
    bundle.write_directory(&path).unwrap();

    let report = Validator::new(catalogs()).validate(&path).unwrap();

    // Exactly one violation about the organism, none per gene.
    assert_eq!(report.violations().len(), 1);
    assert_eq!(count_rule(&report, "var-genes-known"), 1);
    let violation = report
        .violations()
        .iter()
        .find(|v| v.rule == "var-genes-known")
        .unwrap();
    assert!(violation.message.contains("Rattus norvegicus"));
    assert!(violation.message.contains("skipped"));
}

#[test]
fn organism_override_replaces_declared_organism() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("override");

    let mut bundle = valid_bundle(2, 2);
    let mut meta = metadata(2, 2, "Not an organism");
    meta.organism = Some("Not an organism".to_string());
    bundle.metadata = Some(meta);
    bundle.write_directory(&path).unwrap();

    // Without the override, the unsupported declaration short-circuits.
    let report = Validator::new(catalogs()).validate(&path).unwrap();
    assert_eq!(count_rule(&report, "var-genes-known"), 1);

    // With the override, the gene check runs against the human catalog and
    // the obs organism column is compared to the override.
    let config = ValidatorConfig {
        organism: Some(Organism::HomoSapiens),
        ..Default::default()
    };
    let report = Validator::with_config(catalogs(), config)
        .validate(&path)
        .unwrap();
    assert_eq!(count_rule(&report, "var-genes-known"), 0);
    assert_eq!(count_rule(&report, "organism-column"), 0);
}

#[test]
fn duplicate_obs_index_yields_one_violation_naming_axis_and_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dup-obs");

    let mut bundle = valid_bundle(3, 2);
    bundle.obs = Some(
        capval::bundle::obs_batch(
            &["cell_42", "cell_1", "cell_42"],
            &["10x", "10x", "10x"],
            &["normal", "normal", "normal"],
            &["Homo sapiens", "Homo sapiens", "Homo sapiens"],
            &["blood", "blood", "blood"],
        )
        .unwrap(),
    );
    bundle.write_directory(&path).unwrap();

    let report = Validator::new(catalogs()).validate(&path).unwrap();
    assert_eq!(count_rule(&report, "obs-index-unique"), 1);

    let violation = report
        .violations()
        .iter()
        .find(|v| v.rule == "obs-index-unique")
        .unwrap();
    assert!(violation.message.contains("obs"));
    assert!(violation.message.contains("cell_42"));
}

#[test]
fn versioned_gene_ids_warn_but_do_not_invalidate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("versioned");

    let mut bundle = valid_bundle(2, 2);
    bundle.var = Some(var_batch(&["ENSG00000141510.11", "ENSG00000012048.3"]).unwrap());
    bundle.write_directory(&path).unwrap();

    let report = Validator::new(catalogs()).validate(&path).unwrap();

    // Catalog matching strips versions, so membership passes.
    assert_eq!(count_rule(&report, "var-genes-known"), 0);
    assert_eq!(count_rule(&report, "var-gene-versions"), 1);
    assert!(report.is_valid(), "warnings must not invalidate:\n{}", report);
    assert_eq!(report.warning_count(), 1);

    let warning = report
        .violations()
        .iter()
        .find(|v| v.rule == "var-gene-versions")
        .unwrap();
    assert_eq!(warning.severity, Severity::Warning);
    assert!(warning.message.contains("ENSG00000141510.11"));
}

#[test]
fn empty_rows_and_columns_are_reported_by_position() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty-slices");

    let mut bundle = valid_bundle(3, 3);
    // Row 1 entirely zero; column 2 entirely zero.
    bundle.matrix = Some(vec![
        vec![Some(1.0), Some(2.0), Some(0.0)],
        vec![Some(0.0), Some(0.0), Some(0.0)],
        vec![Some(3.0), Some(1.0), Some(0.0)],
    ]);
    bundle.write_directory(&path).unwrap();

    let report = Validator::new(catalogs()).validate(&path).unwrap();
    assert_eq!(count_rule(&report, "matrix-empty-slices"), 2);

    let messages: Vec<&str> = report
        .violations()
        .iter()
        .filter(|v| v.rule == "matrix-empty-slices")
        .map(|v| v.message.as_str())
        .collect();
    assert!(messages.iter().any(|m| m.contains("row 1")));
    assert!(messages.iter().any(|m| m.contains("column 2")));
    // Empty-row messages name the observation.
    assert!(messages.iter().any(|m| m.contains("cell_1")));
}

#[test]
fn ragged_matrix_row_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ragged");

    let mut bundle = valid_bundle(2, 3);
    bundle.matrix = Some(vec![
        vec![Some(1.0), Some(2.0), Some(3.0)],
        vec![Some(4.0), Some(5.0)], // one value short
    ]);
    bundle.write_directory(&path).unwrap();

    let report = Validator::new(catalogs()).validate(&path).unwrap();
    let ragged: Vec<_> = report
        .violations()
        .iter()
        .filter(|v| v.rule == "matrix-empty-slices" && v.message.contains("expected n_var"))
        .collect();
    assert_eq!(ragged.len(), 1);
    assert!(ragged[0].message.contains("row 1"));
}

#[test]
fn non_count_values_fail_the_sampled_check() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("not-counts");

    let mut bundle = valid_bundle(2, 2);
    bundle.matrix = Some(vec![
        vec![Some(1.0), Some(2.5)], // fractional
        vec![Some(3.0), Some(1.0)],
    ]);
    bundle.write_directory(&path).unwrap();

    let report = Validator::new(catalogs()).validate(&path).unwrap();
    assert_eq!(count_rule(&report, "matrix-counts"), 1);
    let violation = report
        .violations()
        .iter()
        .find(|v| v.rule == "matrix-counts")
        .unwrap();
    assert!(violation.message.contains("2.5"));

    // Negative values are rejected the same way.
    let path = dir.path().join("negative");
    let mut bundle = valid_bundle(2, 2);
    bundle.matrix = Some(vec![
        vec![Some(1.0), Some(-3.0)],
        vec![Some(2.0), Some(1.0)],
    ]);
    bundle.write_directory(&path).unwrap();
    let report = Validator::new(catalogs()).validate(&path).unwrap();
    assert_eq!(count_rule(&report, "matrix-counts"), 1);
}

#[test]
fn blank_required_obs_values_are_reported_per_column() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("blank-values");

    let mut bundle = valid_bundle(3, 2);
    bundle.obs = Some(
        capval::bundle::obs_batch(
            &["cell_0", "cell_1", "cell_2"],
            &["10x", "  ", "10x"], // blank after trim
            &["normal", "normal", "normal"],
            &["Homo sapiens", "Homo sapiens", "Homo sapiens"],
            &["blood", "blood", "blood"],
        )
        .unwrap(),
    );
    bundle.write_directory(&path).unwrap();

    let report = Validator::new(catalogs()).validate(&path).unwrap();
    assert_eq!(count_rule(&report, "obs-required-values"), 1);
    let violation = report
        .violations()
        .iter()
        .find(|v| v.rule == "obs-required-values")
        .unwrap();
    assert!(violation.message.contains("assay"));
    assert!(violation.message.contains("row 1"));
}

#[test]
fn shape_mismatches_are_reported_for_each_section() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad-shape");

    let mut bundle = valid_bundle(2, 2);
    bundle.metadata = Some(metadata(3, 2, "Homo sapiens")); // n_obs lies
    bundle.write_directory(&path).unwrap();

    let report = Validator::new(catalogs()).validate(&path).unwrap();
    // Both the obs table and the matrix disagree with the declared n_obs.
    assert_eq!(count_rule(&report, "shape-consistency"), 2);
}

#[test]
fn rules_are_independent_under_multiple_defects() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("many-defects");

    let mut bundle = valid_bundle(3, 2);
    bundle.obs = Some(obs_batch_without("disease", &["cell_0", "cell_0", "cell_2"]));
    bundle.var = Some(var_batch(&[UNKNOWN_GENE, "ENSG00000141510"]).unwrap());
    bundle.write_directory(&path).unwrap();

    let report = Validator::new(catalogs()).validate(&path).unwrap();

    // Every independent defect shows up despite the others.
    assert_eq!(count_rule(&report, "obs-required-columns"), 1);
    assert_eq!(count_rule(&report, "obs-index-unique"), 1);
    assert_eq!(count_rule(&report, "var-genes-known"), 1);
}

#[test]
fn missing_file_is_a_fatal_error_not_a_report() {
    let err = Validator::new(catalogs())
        .validate("/no/such/bundle.capmat")
        .unwrap_err();
    assert!(matches!(err, ValidatorError::Unreadable(_)));
}
