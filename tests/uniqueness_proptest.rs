//! Property test: the uniqueness rule reports exactly one violation per
//! duplicated index value, whatever the arrangement of duplicates.

mod common;

use std::collections::HashMap;

use common::*;

use capval::catalog::ReferenceCatalogs;
use capval::engine::Validator;
use proptest::prelude::*;

proptest! {
    // Each case writes a real bundle to disk; keep the case count small.
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn one_violation_per_duplicated_obs_index_value(
        ids in proptest::collection::vec("[a-e]", 1..12)
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle");

        let rows = ids.len();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();

        let mut bundle = valid_bundle(1, 2);
        bundle.metadata = Some(metadata(rows as u64, 2, "Homo sapiens"));
        bundle.obs = Some(
            capval::bundle::obs_batch(
                &id_refs,
                &vec!["10x"; rows],
                &vec!["normal"; rows],
                &vec!["Homo sapiens"; rows],
                &vec!["blood"; rows],
            )
            .unwrap(),
        );
        bundle.matrix = Some(counts_matrix(rows, 2));
        bundle.write_directory(&path).unwrap();

        let catalogs = ReferenceCatalogs::bundled().unwrap();
        let report = Validator::new(catalogs).validate(&path).unwrap();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for id in &id_refs {
            *counts.entry(id).or_insert(0) += 1;
        }
        let expected = counts.values().filter(|&&c| c > 1).count();

        prop_assert_eq!(count_rule(&report, "obs-index-unique"), expected);
    }
}
