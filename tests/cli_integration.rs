//! CLI integration tests for Ion.
//!
//! These tests drive the `ion` binary end to end: init, build and run.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const TEMPLATE: &str = include_str!("../Ion.default.toml");

/// Get the ion binary command, isolated from any user config.
fn ion() -> Command {
    let mut cmd = Command::cargo_bin("ion").unwrap();
    cmd.env("ION_CONFIG", "/nonexistent/ion-config.toml")
        .env_remove("ION_TOOLS_PATH")
        .env_remove("RUST_LOG");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// A project with a manifest and the given sources.
fn project(sources: &[(&str, &str)]) -> TempDir {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("Ion.toml"),
        "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();
    for (rel, text) in sources {
        let path = tmp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }
    tmp
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ============================================================================
// operation resolution
// ============================================================================

#[test]
fn test_unknown_operation_fails() {
    let tmp = temp_dir();

    ion()
        .args(["deploy", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown operation: 'deploy'"));

    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn test_operation_is_case_insensitive() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("Ion.default.toml"), TEMPLATE).unwrap();

    ion()
        .args(["INIT", "--debug", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("Ion.toml").exists());
}

#[test]
fn test_missing_root_fails() {
    let tmp = temp_dir();

    ion()
        .args(["build", "--no-integrity", "--root", "does-not-exist"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));

    assert!(!tmp.path().join("out").exists());
}

// ============================================================================
// ion init
// ============================================================================

#[test]
fn test_init_creates_manifest_from_template() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("Ion.default.toml"), TEMPLATE).unwrap();

    ion()
        .args(["init", "--debug", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Created"));

    assert_eq!(read(&tmp.path().join("Ion.toml")), TEMPLATE);
}

#[test]
fn test_reinit_restores_template() {
    let tmp = temp_dir();
    let root = tmp.path().join("proj");
    fs::create_dir(&root).unwrap();
    fs::write(tmp.path().join("Ion.default.toml"), TEMPLATE).unwrap();
    fs::write(
        root.join("Ion.toml"),
        "[package]\nname = \"edited\"\nversion = \"9.9.9\"\n",
    )
    .unwrap();

    ion()
        .args(["init", "--debug", "--no-integrity", "--root", "proj"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("re-initialized"));

    assert_eq!(fs::read(root.join("Ion.toml")).unwrap(), TEMPLATE.as_bytes());
}

#[test]
fn test_init_without_template_fails() {
    let tmp = temp_dir();

    ion()
        .args(["init", "--debug", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("default package manifest file"));

    assert!(!tmp.path().join("Ion.toml").exists());
}

// ============================================================================
// ion build
// ============================================================================

#[test]
fn test_build_without_manifest_fails() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("main.ion"), "fn main() -> i32 { return 0; }").unwrap();

    ion()
        .args(["build", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("package manifest file does not exist"))
        .stderr(predicate::str::contains("ion init"));
}

#[test]
fn test_build_with_no_sources_exits_cleanly() {
    let tmp = project(&[]);

    ion()
        .args(["build", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("No matching files discovered."));

    assert!(!tmp.path().join("out").exists());
}

#[test]
fn test_build_emits_text_ir() {
    let tmp = project(&[
        ("main.ion", "fn main() -> i32 { return square(4); }"),
        ("util/math.ion", "fn square(x: i32) -> i32 { return x * x; }"),
    ]);

    ion()
        .args(["build", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Emitting"))
        .stderr(predicate::str::contains("Finished"));

    let out = tmp.path().join("out");
    assert!(read(&out.join("main.ir")).contains("declare i32 @square(i32)"));
    assert!(read(&out.join("util.math.ir")).contains("define i32 @square(i32 %p.x)"));
    assert!(!out.join("main.bc").exists());

    // The build counter was bumped in place.
    assert!(read(&tmp.path().join("Ion.toml")).contains("build = 1"));
}

#[test]
fn test_build_emits_bitcode_to_custom_output() {
    let tmp = project(&[("main.ion", "fn main() -> i32 { return 0; }")]);

    ion()
        .args(["build", "--no-integrity", "--bitcode", "--output", "target/ion"])
        .arg("--root")
        .arg(tmp.path())
        .assert()
        .success();

    let out = tmp.path().join("target").join("ion");
    let bytes = fs::read(out.join("main.bc")).unwrap();
    assert_eq!(&bytes[..4], b"IONB");
    assert!(!out.join("main.ir").exists());
}

#[test]
fn test_build_warns_when_counter_cannot_be_bumped() {
    let tmp = project(&[("main.ion", "fn main() -> i32 { return 0; }")]);
    let manifest = tmp.path().join("Ion.toml");
    let mut text = read(&manifest);
    text.push_str("build = 9223372036854775807\n");
    fs::write(&manifest, &text).unwrap();

    ion()
        .args(["build", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("could not update the build number"))
        .stderr(predicate::str::contains("Finished"));

    assert!(tmp.path().join("out/main.ir").exists());
    assert_eq!(read(&manifest), text);
}

#[test]
fn test_build_rejects_colliding_unit_names() {
    let tmp = project(&[
        ("a.b.ion", "fn one() -> i32 { return 1; }"),
        ("a/b.ion", "fn two() -> i32 { return 2; }"),
    ]);

    ion()
        .args(["build", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("both compile to unit `a.b`"));

    assert!(!tmp.path().join("out/a.b.ir").exists());
}

#[test]
fn test_project_config_follows_root() {
    let tmp = project(&[("main.ion", "fn main() -> i32 { return 0; }")]);
    fs::create_dir(tmp.path().join(".ion")).unwrap();
    fs::write(tmp.path().join(".ion/config.toml"), "[build]\nbitcode = true\n").unwrap();
    let elsewhere = temp_dir();

    ion()
        .args(["build", "--no-integrity", "--root"])
        .arg(tmp.path())
        .current_dir(elsewhere.path())
        .assert()
        .success();

    assert!(tmp.path().join("out/main.bc").exists());
    assert!(!tmp.path().join("out/main.ir").exists());
}

#[test]
fn test_build_uses_manifest_source_root() {
    let tmp = project(&[
        ("code/main.ion", "fn main() -> i32 { return 0; }"),
        ("stray.ion", "fn stray() -> i32 { return 0; }"),
    ]);
    let manifest = tmp.path().join("Ion.toml");
    let mut text = read(&manifest);
    text.push_str("\n[options]\nsource-root = \"code\"\n");
    fs::write(&manifest, text).unwrap();

    ion()
        .args(["build", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("out/main.ir").exists());
    assert!(!tmp.path().join("out/stray.ir").exists());
}

#[test]
fn test_build_reports_compile_errors() {
    let tmp = project(&[("main.ion", "fn main() -> i32 {\n  return y;\n}\n")]);

    ion()
        .args(["build", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to compile"))
        .stderr(predicate::str::contains("2:10: cannot find value `y`"));
}

#[test]
fn test_build_rejects_invalid_manifest() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("Ion.toml"),
        "[package]\nname = \"demo\"\nversion = \"not-semver\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("main.ion"), "fn main() -> i32 { return 0; }").unwrap();

    ion()
        .args(["build", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid version"));
}

// ============================================================================
// ion run
// ============================================================================

#[cfg(unix)]
#[test]
fn test_run_invokes_interpreter() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = project(&[
        ("main.ion", "fn main() -> i32 { return helper(); }"),
        ("helper.ion", "fn helper() -> i32 { return 42; }"),
    ]);

    let tools = tmp.path().join("fake-tools");
    fs::create_dir(&tools).unwrap();
    let lli = tools.join("lli");
    fs::write(&lli, "#!/bin/sh\necho \"lli $@\" > lli-args.txt\nexit 42\n").unwrap();
    fs::set_permissions(&lli, fs::Permissions::from_mode(0o755)).unwrap();

    ion()
        .args(["run", "--no-integrity", "--bitcode"])
        .arg("--tools-path")
        .arg(&tools)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Running"))
        .stderr(predicate::str::contains("program exited with 42"))
        .stderr(predicate::str::contains("ignored"));

    let args = read(&tmp.path().join("lli-args.txt"));
    assert!(args.contains("--extra-module="));
    assert!(args.contains("helper.ir"));
    assert!(args.trim_end().ends_with("main.ir"));
}

#[test]
fn test_run_without_entry_fails() {
    let tmp = project(&[("lib.ion", "fn f() -> i32 { return 1; }")]);

    ion()
        .args(["run", "--no-integrity"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("entry unit `main` was not found"));
}

// ============================================================================
// output control
// ============================================================================

#[test]
fn test_quiet_suppresses_status() {
    let tmp = project(&[("main.ion", "fn main() -> i32 { return 0; }")]);

    ion()
        .args(["build", "--no-integrity", "--quiet"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_version_flag() {
    ion()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ion"));
}
