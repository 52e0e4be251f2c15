//! Unit tests for layered settings resolution.

use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::language::LanguageId;

#[rstest]
fn project_objects_merge_shallowly_over_global() {
    let settings = MemorySettings::new()
        .with_global("options", json!({"a": 1, "b": {"x": 1}}))
        .with_project("options", json!({"b": {"y": 2}}));

    let resolved = SettingsResolver::new(&settings).resolve("options");

    assert_eq!(resolved, Some(json!({"a": 1, "b": {"y": 2}})));
}

#[rstest]
fn project_keys_overlay_matching_global_keys_only() {
    let settings = MemorySettings::new()
        .with_global("a", json!(1))
        .with_global("b", json!({"x": 1}))
        .with_project("b", json!({"y": 2}));
    let resolver = SettingsResolver::new(&settings);

    assert_eq!(resolver.resolve("b"), Some(json!({"x": 1, "y": 2})));
    assert_eq!(resolver.resolve("a"), Some(json!(1)));
}

#[rstest]
#[case::scalar_replaces(json!(true), json!(false), json!(false))]
#[case::array_replaces_object(json!({"x": 1}), json!(["a"]), json!(["a"]))]
#[case::object_replaces_array(json!([1, 2]), json!({"y": 2}), json!({"y": 2}))]
fn non_object_project_values_replace_the_base(
    #[case] global: Value,
    #[case] project: Value,
    #[case] expected: Value,
) {
    let settings = MemorySettings::new()
        .with_global("key", global)
        .with_project("key", project);

    assert_eq!(SettingsResolver::new(&settings).resolve("key"), Some(expected));
}

#[rstest]
fn document_overlay_shadows_global_store() {
    let settings = MemorySettings::new()
        .with_document("paths", json!(["/doc"]))
        .with_global("paths", json!(["/global"]));

    let resolved = SettingsResolver::new(&settings).resolve("paths");

    assert_eq!(resolved, Some(json!(["/doc"])));
}

#[rstest]
fn null_layers_count_as_absent() {
    let settings = MemorySettings::new()
        .with_document("debug", Value::Null)
        .with_global("debug", json!(true))
        .with_project("debug", Value::Null);

    assert_eq!(SettingsResolver::new(&settings).resolve("debug"), Some(json!(true)));
}

#[rstest]
fn builtin_defaults_fill_missing_keys() {
    let settings = MemorySettings::new();
    let resolver = SettingsResolver::new(&settings);

    assert_eq!(resolver.resolve(keys::COMMAND_MAP), Some(json!({})));
    assert_eq!(resolver.resolve(keys::PIPELINE_POLICY), Some(json!("fail_fast")));
    assert_eq!(resolver.resolve("unknown"), None);
    assert_eq!(resolver.resolve_or("unknown", json!(7)), json!(7));
}

#[rstest]
fn flag_rejects_non_boolean_values() {
    let settings = MemorySettings::new().with_global("debug", json!("yes"));

    let error = SettingsResolver::new(&settings)
        .flag(keys::DEBUG)
        .expect_err("string flag must be rejected");

    assert!(matches!(error, SettingsError::InvalidType { ref key, .. } if key == "debug"));
}

#[rstest]
fn update_global_only_persists_changes() {
    let settings = MemorySettings::new().with_global("paths", json!(["/a"]));

    let unchanged = settings
        .update_global("paths", &mut |_| false)
        .expect("update succeeds");
    let changed = settings
        .update_global("debug", &mut |value| {
            *value = json!(true);
            true
        })
        .expect("update succeeds");

    assert!(!unchanged);
    assert!(changed);
    assert_eq!(settings.global_snapshot().get("debug"), Some(&json!(true)));
    assert_eq!(settings.global_snapshot().get("paths"), Some(&json!(["/a"])));
}

#[rstest]
fn effective_config_reads_every_layer() {
    let settings = MemorySettings::new()
        .with_global("debug", json!(true))
        .with_global("paths", json!(["/opt/tools/bin"]))
        .with_global("command_map", json!({"json": "jq . %file"}))
        .with_project("command_map", json!({"yaml": ["yamlfmt %file"]}))
        .with_project("pipeline_policy", json!("lenient"));

    let config = EffectiveConfig::resolve(&settings).expect("settings resolve");

    assert!(config.debug());
    assert!(!config.format_on_save());
    assert_eq!(config.paths(), [std::path::PathBuf::from("/opt/tools/bin")]);
    assert_eq!(config.policy(), PipelinePolicy::Lenient);
    let json_id = LanguageId::new("json").expect("valid id");
    let yaml_id = LanguageId::new("yaml").expect("valid id");
    assert!(config.command_map().get(&json_id).is_some());
    assert!(config.command_map().get(&yaml_id).is_some());
}

#[rstest]
#[case::paths_not_array("paths", json!("/bin"))]
#[case::policy_unknown("pipeline_policy", json!("eventually"))]
#[case::command_map_not_object("command_map", json!(["prettier"]))]
#[case::options_not_object("options", json!(true))]
fn effective_config_rejects_malformed_settings(#[case] key: &str, #[case] value: Value) {
    let settings = MemorySettings::new().with_global(key, value);

    let result = EffectiveConfig::resolve(&settings);

    assert!(result.is_err(), "{key} should be rejected");
}
