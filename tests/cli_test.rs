//! Integration tests for the `fnpack` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn fnpack() -> Command {
    Command::cargo_bin("fnpack").unwrap()
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[test]
fn help_describes_the_tool() {
    fnpack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--skip-build"))
        .stdout(predicate::str::contains("--native-zip"));
}

#[test]
fn missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    fnpack()
        .current_dir(dir.path())
        .args(["--config", "absent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration file"));
}

#[test]
fn malformed_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("fnpack.toml"), "concurrency = \"lots\"\n");

    fnpack()
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("fnpack.toml"));
}

#[test]
fn extension_mismatch_is_reported_as_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join("fnpack.toml"),
        r#"
format = "esm"
outExtension = ".cjs"

[functions.users]
handler = "src/users.handler"
entry = "src/users.ts"
"#,
    );

    fnpack()
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn packages_prebuilt_bundles() {
    let dir = tempfile::tempdir().unwrap();
    let service = dir.path().join("svc");
    write(
        &service.join("fnpack.toml"),
        r#"
individually = true

[functions.users]
handler = "src/users.handler"
entry = "src/users.ts"

[functions.orders]
handler = "src/orders.handler"
entry = "src/orders.ts"
"#,
    );
    write(&service.join(".esbuild/.build/src/users.js"), "exports.handler = 1;");
    write(&service.join(".esbuild/.build/src/orders.js"), "exports.handler = 2;");

    fnpack()
        .args(["--config", service.join("fnpack.toml").to_str().unwrap()])
        .arg("--skip-build")
        .assert()
        .success()
        .stdout(predicate::str::contains("users.zip"))
        .stdout(predicate::str::contains("orders.zip"));

    assert!(service.join(".serverless/users.zip").is_file());
    assert!(service.join(".serverless/orders.zip").is_file());
    // Reused bundles stay in place
    assert!(service.join(".esbuild/.build/src/users.js").is_file());
}

#[test]
fn build_folder_outside_work_folder_keeps_sources() {
    let dir = tempfile::tempdir().unwrap();
    let service = dir.path().join("svc");
    write(
        &service.join("fnpack.toml"),
        r#"
outputBuildFolder = "../.."

[functions.users]
handler = "src/users.handler"
entry = "src/users.ts"
"#,
    );
    write(&service.join("src/users.ts"), "export const handler = 1;");

    fnpack()
        .args(["--config", service.join("fnpack.toml").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));

    assert!(service.join("src/users.ts").is_file());
    assert!(service.join("fnpack.toml").is_file());
}
