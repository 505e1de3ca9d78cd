//! Shared fixtures for the integration tests.
//!
//! Bundles are written with the crate's own writer into temp directories,
//! then validated through the public API.
#![allow(dead_code)]

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray, StringDictionaryBuilder};
use arrow::datatypes::{DataType, Field, Int32Type, Schema};
use arrow::record_batch::RecordBatch;

use capval::bundle::{obs_batch, var_batch, DatasetBundle};
use capval::metadata::DatasetMetadata;

/// Human gene identifiers present in the bundled catalog snapshot.
pub const KNOWN_HUMAN_GENES: [&str; 4] = [
    "ENSG00000141510", // TP53
    "ENSG00000012048", // BRCA1
    "ENSG00000139618", // BRCA2
    "ENSG00000146648", // EGFR
];

/// An identifier absent from every bundled catalog.
pub const UNKNOWN_GENE: &str = "ENSG00000999999";

pub fn metadata(n_obs: u64, n_var: u64, organism: &str) -> DatasetMetadata {
    let mut metadata = DatasetMetadata::new();
    metadata.title = Some("integration fixture".to_string());
    metadata.organism = Some(organism.to_string());
    metadata.n_obs = Some(n_obs);
    metadata.n_var = Some(n_var);
    metadata
}

/// A bundle that satisfies every rule of the standard registry.
pub fn valid_bundle(rows: usize, cols: usize) -> DatasetBundle {
    assert!(cols <= KNOWN_HUMAN_GENES.len(), "fixture gene pool exhausted");

    let obs_ids: Vec<String> = (0..rows).map(|i| format!("cell_{i}")).collect();
    let obs_refs: Vec<&str> = obs_ids.iter().map(String::as_str).collect();
    let assay = vec!["10x 3' v3"; rows];
    let disease = vec!["normal"; rows];
    let organism = vec!["Homo sapiens"; rows];
    let tissue = vec!["blood"; rows];

    DatasetBundle {
        metadata: Some(metadata(rows as u64, cols as u64, "Homo sapiens")),
        obs: Some(obs_batch(&obs_refs, &assay, &disease, &organism, &tissue).unwrap()),
        var: Some(var_batch(&KNOWN_HUMAN_GENES[..cols]).unwrap()),
        matrix: Some(counts_matrix(rows, cols)),
    }
}

/// Deterministic non-negative integer matrix with no empty row or column.
pub fn counts_matrix(rows: usize, cols: usize) -> Vec<Vec<Option<f64>>> {
    let mut matrix: Vec<Vec<Option<f64>>> = (0..rows)
        .map(|i| (0..cols).map(|j| Some(((i + 2 * j) % 5) as f64)).collect())
        .collect();
    for (i, row) in matrix.iter_mut().enumerate() {
        if cols > 0 {
            row[i % cols] = Some(1.0 + (i % 3) as f64);
        }
    }
    for j in 0..cols {
        if rows > 0 {
            matrix[j % rows][j] = Some(1.0 + (j % 4) as f64);
        }
    }
    matrix
}

/// Observation table missing one of the required annotation columns.
pub fn obs_batch_without(column: &str, ids: &[&str]) -> RecordBatch {
    let rows = ids.len();
    let mut fields = vec![Field::new("obs_id", DataType::Utf8, false)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(ids.to_vec()))];

    for name in ["assay", "disease", "organism", "tissue"] {
        if name == column {
            continue;
        }
        fields.push(Field::new(
            name,
            DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8)),
            false,
        ));
        let mut builder = StringDictionaryBuilder::<Int32Type>::new();
        for _ in 0..rows {
            builder.append_value(if name == "organism" { "Homo sapiens" } else { "x" });
        }
        columns.push(Arc::new(builder.finish()));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap()
}

/// Count the violations a given rule contributed to a report.
pub fn count_rule(report: &capval::report::ValidationReport, rule: &str) -> usize {
    report
        .violations()
        .iter()
        .filter(|v| v.rule == rule)
        .count()
}
