//! Property-based tests for the store's merge semantics

use proptest::prelude::*;
use std::collections::BTreeMap;
use strata::ConfigStore;
use toml::value::Table;
use toml::Value;

fn to_table(map: &BTreeMap<String, i64>) -> Table {
    map.iter()
        .map(|(k, v)| (k.clone(), Value::Integer(*v)))
        .collect()
}

/// Backfill merge never overwrites a pre-existing key and fills every
/// absent one.
#[test]
fn test_merge_defaults_backfill_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                prop::collection::btree_map("[a-e]", any::<i64>(), 0..5),
                prop::collection::btree_map("[a-e]", any::<i64>(), 0..5),
            ),
            |(existing, defaults)| {
                let mut store = ConfigStore::new();
                for (key, value) in &existing {
                    store.set(&format!("cfg.{}", key), *value).unwrap();
                }

                store
                    .merge_defaults("cfg", Value::Table(to_table(&defaults)))
                    .unwrap();

                for (key, value) in &existing {
                    prop_assert_eq!(store.get_int(&format!("cfg.{}", key)).unwrap(), *value);
                }
                for (key, value) in &defaults {
                    if !existing.contains_key(key) {
                        prop_assert_eq!(store.get_int(&format!("cfg.{}", key)).unwrap(), *value);
                    }
                }
                Ok(())
            },
        )
        .unwrap();
}

/// Override merge is last-writer-wins per key: keys from the later
/// table win, keys only in the earlier table survive.
#[test]
fn test_override_merge_last_writer_wins_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                prop::collection::btree_map("[a-e]", any::<i64>(), 0..5),
                prop::collection::btree_map("[a-e]", any::<i64>(), 0..5),
            ),
            |(first, second)| {
                let mut store = ConfigStore::new();
                let wrap = |map: &BTreeMap<String, i64>| {
                    let mut outer = Table::new();
                    outer.insert("cfg".to_string(), Value::Table(to_table(map)));
                    outer
                };
                store.merge_table(wrap(&first));
                store.merge_table(wrap(&second));

                for (key, value) in &second {
                    prop_assert_eq!(store.get_int(&format!("cfg.{}", key)).unwrap(), *value);
                }
                for (key, value) in &first {
                    if !second.contains_key(key) {
                        prop_assert_eq!(store.get_int(&format!("cfg.{}", key)).unwrap(), *value);
                    }
                }
                Ok(())
            },
        )
        .unwrap();
}

/// Applying a chain of layers is equivalent to evaluating
/// last-writer-wins over the whole sequence, whatever the chain length.
#[test]
fn test_layer_sequence_equivalence_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec(
                prop::collection::btree_map("[a-e]", any::<i64>(), 0..4),
                0..5,
            ),
            |layers| {
                let mut store = ConfigStore::new();
                let mut model: BTreeMap<String, i64> = BTreeMap::new();
                for layer in &layers {
                    store.merge_table(to_table(layer));
                    model.extend(layer.iter().map(|(k, v)| (k.clone(), *v)));
                }

                for (key, value) in &model {
                    prop_assert_eq!(store.get_int(key).unwrap(), *value);
                }
                Ok(())
            },
        )
        .unwrap();
}
