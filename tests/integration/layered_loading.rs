//! Integration tests for layered fragment loading

use super::test_utils::write_fragment;
use strata::layers::load_layers;
use strata::{ConfigError, ConfigStore, Context};
use tempfile::TempDir;

#[test]
fn test_fragments_apply_root_to_leaf() {
    let temp_dir = TempDir::new().unwrap();
    write_fragment(
        temp_dir.path(),
        "production.toml",
        r#"
[backend]
debug = false

[site]
name = "Root"
"#,
    );
    write_fragment(
        temp_dir.path(),
        "production/qa.toml",
        r#"
[site]
name = "Qa"
"#,
    );

    let ctx = Context::parse("Production/Qa").unwrap();
    let mut store = ConfigStore::new();
    let applied = load_layers(&mut store, &ctx, temp_dir.path()).unwrap();

    let applied: Vec<String> = applied
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    assert!(applied[0].ends_with("production.toml"));
    assert!(applied[1].ends_with("qa.toml"));

    // Leaf value wins, root-only values survive.
    assert_eq!(store.get_str("site.name").unwrap(), "Qa");
    assert!(!store.get_bool("backend.debug").unwrap());
}

#[test]
fn test_three_level_chain_ordering() {
    let temp_dir = TempDir::new().unwrap();
    write_fragment(temp_dir.path(), "testing.toml", "[system]\ntier = \"root\"\n");
    write_fragment(
        temp_dir.path(),
        "testing/ci.toml",
        "[system]\ntier = \"ci\"\n",
    );
    write_fragment(
        temp_dir.path(),
        "testing/ci/nightly.toml",
        "[system]\ntier = \"nightly\"\n",
    );

    let ctx = Context::parse("Testing/Ci/Nightly").unwrap();
    let mut store = ConfigStore::new();
    let applied = load_layers(&mut store, &ctx, temp_dir.path()).unwrap();

    assert_eq!(applied.len(), 3);
    assert_eq!(store.get_str("system.tier").unwrap(), "nightly");
}

#[test]
fn test_missing_fragments_produce_no_error_and_no_mutation() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = Context::parse("Production/Qa").unwrap();

    let mut store = ConfigStore::new();
    store.set("backend.debug", false).unwrap();
    let before = store.clone();

    let applied = load_layers(&mut store, &ctx, temp_dir.path()).unwrap();

    assert!(applied.is_empty());
    assert_eq!(store, before);
}

#[test]
fn test_fragment_layering_overrides_preset_defaults() {
    let temp_dir = TempDir::new().unwrap();
    write_fragment(
        temp_dir.path(),
        "production.toml",
        "[system]\ndisplay_errors = 0\n",
    );

    let ctx = Context::parse("Production").unwrap();
    let assembly = strata::Assembler::for_context(ctx)
        .base_path(temp_dir.path())
        .assemble()
        .unwrap();

    // Preset wrote -1, the fragment layer wins.
    assert_eq!(assembly.store.get_int("system.display_errors").unwrap(), 0);
    // Untouched preset keys remain.
    assert!(!assembly.store.get_bool("backend.debug").unwrap());
}

#[test]
fn test_broken_fragment_propagates_error() {
    let temp_dir = TempDir::new().unwrap();
    write_fragment(temp_dir.path(), "production.toml", "[[[[");

    let ctx = Context::parse("Production").unwrap();
    let mut store = ConfigStore::new();
    let err = load_layers(&mut store, &ctx, temp_dir.path()).unwrap_err();

    match err {
        ConfigError::FragmentLoad { path, .. } => {
            assert!(path.ends_with("production.toml"));
        }
        other => panic!("expected FragmentLoad, got {:?}", other),
    }
}
