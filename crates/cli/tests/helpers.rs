use std::fs;

use dexlens::canonicalize_or_current;
use dexlens::commands::{member_owner, open_instance, resolve_provider, CLI_INSTANCE_ID};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_resolves_existing_path() {
    let tmp = tempdir().expect("tempdir");
    let file = tmp.path().join("app.json");
    fs::write(&file, "{}").expect("write");

    let result = canonicalize_or_current(file.to_str().expect("utf8 path")).expect("canonicalize");
    assert_eq!(result, file.canonicalize().expect("canonicalize file"));
}

#[test]
fn canonicalize_or_current_keeps_missing_paths_absolute() {
    let result = canonicalize_or_current("does-not-exist.json").expect("canonicalize");
    assert!(result.is_absolute());
    assert!(result.ends_with("does-not-exist.json"));
}

#[test]
fn member_owner_prefers_explicit_class() {
    assert_eq!(member_owner(Some("a.B"), "x.Y.z():void").unwrap(), "a.B");
    assert_eq!(member_owner(None, "x.Y.z():void").unwrap(), "x.Y");
    assert_eq!(member_owner(None, "Lx/Y;->z:I").unwrap(), "x.Y");
    let err = member_owner(None, "z()").unwrap_err();
    assert!(err.to_string().contains("pass --class"));
}

#[test]
fn resolve_provider_rejects_unknown_names() {
    assert_eq!(resolve_provider(Some("snapshot")).unwrap().name(), "snapshot");
    let err = resolve_provider(Some("nope")).err().expect("unknown provider");
    assert!(err.to_string().contains("Available: snapshot"));
}

#[test]
fn open_instance_loads_files_and_directories() {
    let tmp = tempdir().expect("tempdir");
    let file = tmp.path().join("app.json");
    fs::write(&file, r#"{"classes":[{"full_name":"a.B"}]}"#).expect("write");

    let instance = open_instance(file.to_str().unwrap(), Some("snapshot")).unwrap();
    assert_eq!(instance.id(), CLI_INSTANCE_ID);
    assert_eq!(instance.all_classes().unwrap(), vec!["a.B"]);

    let instance = open_instance(tmp.path().to_str().unwrap(), Some("snapshot")).unwrap();
    assert_eq!(instance.info().class_count, Some(1));

    let empty = tempdir().expect("tempdir");
    assert!(open_instance(empty.path().to_str().unwrap(), Some("snapshot")).is_err());
}
