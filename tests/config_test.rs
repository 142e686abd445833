//! Layered option loading: defaults, TOML file, environment

use std::fs;

use tempfile::TempDir;

use entity_tree::{AddMeta, TreeError, TreeOptions};

#[test]
fn given_no_sources_when_loading_then_returns_defaults_for_keys() {
    let options = TreeOptions::load(None).expect("load options");
    assert_eq!(options.id_key, "id");
    assert_eq!(options.parent_key, "parentId");
}

#[test]
fn given_options_file_when_loading_then_overrides_specified_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tree.toml");
    fs::write(
        &path,
        r#"
id_key = "_id"
validate_nodes = false

[add_meta]
is_leaf = true
"#,
    )
    .unwrap();

    let options = TreeOptions::load(Some(path.as_path())).expect("load options");

    assert_eq!(options.id_key, "_id");
    assert_eq!(options.parent_key, "parentId");
    assert!(!options.validate_nodes);
    assert_eq!(
        options.add_meta,
        Some(AddMeta {
            is_leaf: true,
            ..AddMeta::default()
        })
    );
}

#[test]
fn given_missing_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let result = TreeOptions::load(Some(dir.path().join("absent.toml").as_path()));
    assert!(matches!(result, Err(TreeError::Config { .. })));
}

#[test]
fn given_malformed_toml_when_parsing_then_config_error() {
    let result = TreeOptions::from_toml_str("embed_levels = \"sometimes\"");
    assert!(matches!(result, Err(TreeError::Config { .. })));
}

#[test]
fn given_env_override_when_loading_then_env_wins() {
    // only this test touches meta_key, other tests may load concurrently
    std::env::set_var("ENTITY_TREE_META_KEY", "_meta");
    let options = TreeOptions::load(None).expect("load options");
    std::env::remove_var("ENTITY_TREE_META_KEY");

    assert_eq!(options.meta_key, "_meta");
}

#[test]
fn given_toml_str_when_parsing_then_builds_tree_options() {
    let options = TreeOptions::from_toml_str(
        r#"
parent_key = "owner"
embed_levels = true
level_key = "depth"
"#,
    )
    .unwrap();
    assert_eq!(
        options,
        TreeOptions::default()
            .with_parent_key("owner")
            .with_embed_levels(true)
            .with_level_key("depth")
    );
}
