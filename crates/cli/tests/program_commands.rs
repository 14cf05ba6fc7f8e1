use std::fs;
use std::path::{Path, PathBuf};

use predicates::prelude::*;
use tempfile::tempdir;

const SNAPSHOT: &str = r#"{
  "manifest": "<manifest package=\"com.example\"/>",
  "classes": [
    {
      "full_name": "com.example.IFoo",
      "methods": [ { "name": "ping", "params": ["int"], "return_type": "boolean" } ],
      "inner_classes": [
        { "full_name": "com.example.IFoo.Default" },
        {
          "full_name": "com.example.IFoo.Stub",
          "inner_classes": [ { "full_name": "com.example.IFoo.Stub.Proxy" } ]
        }
      ]
    },
    {
      "full_name": "com.example.FooService",
      "superclass": "com.example.IFoo$Stub",
      "source": "class FooService { boolean ping(int x) { return ready(x); } }",
      "methods": [
        {
          "name": "ping",
          "params": ["int"],
          "return_type": "boolean",
          "used_in": ["com.example.Client.call():void"],
          "source": "boolean ping(int x) { return ready(x); }"
        }
      ],
      "fields": [ { "name": "count", "field_type": "int" } ]
    }
  ]
}"#;

fn write_snapshot(dir: &Path) -> PathBuf {
    let path = dir.join("app.json");
    fs::write(&path, SNAPSHOT).expect("write snapshot");
    path
}

fn dexlens() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dexlens");
    cmd.env_remove("DEXLENS_PROVIDER");
    cmd
}

#[test]
fn info_summarizes_the_program() {
    let dir = tempdir().expect("tempdir");
    let path = write_snapshot(dir.path());

    dexlens()
        .arg("info")
        .arg("--input")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider: snapshot").and(predicate::str::contains("Classes: 5")));
}

#[test]
fn classes_lists_nested_classes() {
    let dir = tempdir().expect("tempdir");
    write_snapshot(dir.path());

    // Directory input loads every snapshot inside it.
    dexlens()
        .arg("classes")
        .arg("--input")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.IFoo.Stub.Proxy"));
}

#[test]
fn superclass_and_members_accept_binary_names() {
    let dir = tempdir().expect("tempdir");
    let path = write_snapshot(dir.path());

    dexlens()
        .args(["superclass", "--class", "Lcom/example/FooService;", "--input"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.IFoo$Stub"));

    dexlens()
        .args(["fields", "--class", "com.example.FooService", "--json", "--input"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"com.example.FooService.count :int\""));

    // Owning class is derived from the member reference.
    dexlens()
        .args(["method-callers", "--method", "Lcom/example/FooService;->ping(I)Z", "--input"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.Client.call():void"));
}

#[test]
fn missing_class_fails() {
    let dir = tempdir().expect("tempdir");
    let path = write_snapshot(dir.path());

    dexlens()
        .args(["superclass", "--class", "com.example.Nope", "--input"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn missing_input_fails_with_path_error() {
    let dir = tempdir().expect("tempdir");

    dexlens()
        .arg("classes")
        .arg("--input")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load program"));
}

#[test]
fn unknown_provider_is_reported() {
    let dir = tempdir().expect("tempdir");
    let path = write_snapshot(dir.path());

    dexlens()
        .args(["classes", "--provider", "jadx", "--input"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown provider 'jadx'"));
}

#[test]
fn search_finds_method_bodies() {
    let dir = tempdir().expect("tempdir");
    let path = write_snapshot(dir.path());

    dexlens()
        .args(["search", "--text", "ready(", "--input"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.FooService.ping(int):boolean"));
}

#[test]
fn aidl_commands_resolve_the_service() {
    let dir = tempdir().expect("tempdir");
    let path = write_snapshot(dir.path());

    dexlens()
        .args(["aidl-classes", "--input"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.IFoo -> com.example.FooService"));

    dexlens()
        .args(["aidl-impl", "--class", "com.example.IFoo", "--force", "--input"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::diff("com.example.FooService\n"));

    dexlens()
        .args(["aidl-methods", "--class", "com.example.IFoo", "--input"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.IFoo.ping(int):boolean"));
}

#[test]
fn aidl_impl_of_plain_class_fails() {
    let dir = tempdir().expect("tempdir");
    let path = write_snapshot(dir.path());

    dexlens()
        .args(["aidl-impl", "--class", "com.example.FooService", "--input"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an AIDL interface"));
}

#[test]
fn providers_and_config_list_defaults() {
    dexlens()
        .arg("providers")
        .assert()
        .success()
        .stdout(predicate::str::contains("snapshot"));

    dexlens()
        .arg("config")
        .env_remove("DEXLENS_HOST")
        .env_remove("DEXLENS_PORT")
        .env_remove("DEXLENS_MAX_INSTANCES")
        .assert()
        .success()
        .stdout(predicate::str::contains("Address: localhost:8651"));

    dexlens()
        .arg("config")
        .env("DEXLENS_PORT", "not-a-port")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEXLENS_PORT"));
}
