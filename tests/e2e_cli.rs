//! End-to-end CLI tests: exercises the six concrete scenarios and the universal invariants
//! catalogued for the reachability/classification pipeline, by laying out small synthetic
//! project trees with `tempfile::TempDir` and driving the `deadwood` binary through `assert_cmd`.

use std::path::Path;

use assert_cmd::Command;
use serde_json::Value;

fn deadwood() -> Command {
    Command::cargo_bin("deadwood").expect("deadwood binary built")
}

fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Run a scan against `root` and parse the `--json` output.
fn scan_json(root: &Path) -> Value {
    let output = deadwood().arg(root).arg("--json").arg("--quiet").output().expect("deadwood runs");
    assert!(output.status.success(), "deadwood exited non-zero: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout is valid JSON")
}

fn paths_of(array: &Value) -> Vec<String> {
    array
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v["path"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn dead_export_names(partial: &Value) -> Vec<String> {
    partial["dead_exports"]
        .as_array()
        .expect("dead_exports array")
        .iter()
        .map(|v| v.as_str().unwrap_or_default().to_string())
        .collect()
}

// ---------------------------------------------------------------------------------------------
// Scenario 1: empty project
// ---------------------------------------------------------------------------------------------

#[test]
fn scenario_empty_project_has_no_dead_files() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "package.json", "{}\n");

    let result = scan_json(tmp.path());
    assert_eq!(result["summary"]["total_files"], 1);
    assert_eq!(result["dead_files"].as_array().unwrap().len(), 0);
    assert_eq!(result["summary"]["dead_rate"], "0.00%");
}

// ---------------------------------------------------------------------------------------------
// Scenario 2: one entry, one dead file
// ---------------------------------------------------------------------------------------------

#[test]
fn scenario_one_entry_one_dead() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "package.json", r#"{"name":"demo","main":"src/main.ts"}"#);
    write_file(tmp.path(), "src/main.ts", "export function x() {}\n");
    write_file(tmp.path(), "src/unused.ts", "export const y = 1;\n");

    let result = scan_json(tmp.path());
    let entry_paths = paths_of(&result["entry_points"]);
    assert!(entry_paths.contains(&"src/main.ts".to_string()), "entries: {entry_paths:?}");

    let dead_paths = paths_of(&result["dead_files"]);
    assert_eq!(dead_paths, vec!["src/unused.ts".to_string()]);

    let unused = result["dead_files"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["path"] == "src/unused.ts")
        .unwrap();
    assert_eq!(unused["lines"], 1);
    assert_eq!(unused["exports"].as_array().unwrap(), &vec![Value::String("y".to_string())]);
}

// ---------------------------------------------------------------------------------------------
// Scenario 3: barrel re-export partial-dead
// ---------------------------------------------------------------------------------------------

#[test]
fn scenario_barrel_reexport_marks_unconsumed_export_dead() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "package.json", r#"{"name":"demo","main":"main.ts"}"#);
    write_file(
        tmp.path(),
        "src/index.ts",
        "export { a } from './a';\nexport { b } from './b';\n",
    );
    write_file(tmp.path(), "src/a.ts", "export const a = 1;\n");
    // `b` is consumed through the barrel (exercises re-export transparency), `c` never is -- this
    // hits the exact boundary of the partial-dead rule (at least one live, at least one dead own
    // export), rather than the all-dead case the rule explicitly suppresses as a likely false
    // positive.
    write_file(tmp.path(), "src/b.ts", "export const b = 2;\nexport const c = 3;\n");
    write_file(
        tmp.path(),
        "main.ts",
        "import { a, b } from './src/index';\nconsole.log(a, b);\n",
    );

    let result = scan_json(tmp.path());

    let dead_paths = paths_of(&result["dead_files"]);
    assert!(!dead_paths.contains(&"src/a.ts".to_string()), "a.ts should be live: {dead_paths:?}");
    assert!(!dead_paths.contains(&"src/b.ts".to_string()), "b.ts should be live: {dead_paths:?}");

    let partial = result["partial_files"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["path"] == "src/b.ts")
        .expect("b.ts reported as partially dead");
    assert_eq!(dead_export_names(partial), vec!["c".to_string()]);
}

// ---------------------------------------------------------------------------------------------
// Scenario 4: monorepo workspace
// ---------------------------------------------------------------------------------------------

#[test]
fn scenario_monorepo_workspace_flags_dead_export_in_dependency() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "package.json", r#"{"name":"root","workspaces":["packages/*"]}"#);
    write_file(
        tmp.path(),
        "packages/ui/package.json",
        r#"{"name":"@w/ui","main":"src/index.ts"}"#,
    );
    write_file(
        tmp.path(),
        "packages/ui/src/index.ts",
        "export function Button() {}\nexport function Deprecated() {}\n",
    );
    write_file(
        tmp.path(),
        "packages/app/package.json",
        r#"{"name":"@w/app","main":"src/index.ts","dependencies":{"@w/ui":"workspace:*"}}"#,
    );
    write_file(
        tmp.path(),
        "packages/app/src/index.ts",
        "import { Button } from '@w/ui';\nButton();\n",
    );

    let result = scan_json(tmp.path());

    let entry_paths = paths_of(&result["entry_points"]);
    assert!(entry_paths.contains(&"packages/ui/src/index.ts".to_string()));
    assert!(entry_paths.contains(&"packages/app/src/index.ts".to_string()));

    let dead_paths = paths_of(&result["dead_files"]);
    assert!(!dead_paths.contains(&"packages/ui/src/index.ts".to_string()));

    let partial = result["partial_files"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["path"] == "packages/ui/src/index.ts")
        .expect("ui/index.ts reported as partially dead");
    assert_eq!(dead_export_names(partial), vec!["Deprecated".to_string()]);
}

// ---------------------------------------------------------------------------------------------
// Scenario 5: Python relative import conservatism
// ---------------------------------------------------------------------------------------------

#[test]
fn scenario_python_relative_import_is_conservative() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "pkg/__init__.py", "");
    write_file(tmp.path(), "pkg/main.py", "from . import util\nutil.run()\n");
    write_file(tmp.path(), "pkg/util.py", "def run():\n    pass\n\n\ndef unused():\n    pass\n");

    let result = scan_json(tmp.path());

    let entry_paths = paths_of(&result["entry_points"]);
    assert!(entry_paths.contains(&"pkg/main.py".to_string()), "entries: {entry_paths:?}");

    let dead_paths = paths_of(&result["dead_files"]);
    assert!(!dead_paths.contains(&"pkg/util.py".to_string()), "util.py should be live: {dead_paths:?}");

    let partial_paths = paths_of(&result["partial_files"]);
    assert!(
        !partial_paths.contains(&"pkg/util.py".to_string()),
        "util.py should not receive partial-dead reporting: {partial_paths:?}"
    );
}

// ---------------------------------------------------------------------------------------------
// Scenario 6: Go same-package amplification
// ---------------------------------------------------------------------------------------------

#[test]
fn scenario_go_same_package_amplification_keeps_all_files_live() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(
        tmp.path(),
        "cmd/server/main.go",
        "package main\n\nfunc main() {\n\thelper()\n}\n",
    );
    write_file(
        tmp.path(),
        "cmd/server/helpers.go",
        "package main\n\nfunc helper() {}\n",
    );
    write_file(
        tmp.path(),
        "cmd/server/unused.go",
        "package main\n\nfunc neverCalled() {}\n",
    );

    let result = scan_json(tmp.path());

    let dead_paths = paths_of(&result["dead_files"]);
    assert!(dead_paths.is_empty(), "Go same-package amplification should keep every file live: {dead_paths:?}");
}

// ---------------------------------------------------------------------------------------------
// Universal invariants
// ---------------------------------------------------------------------------------------------

#[test]
fn invariant_dead_and_entry_sets_are_disjoint() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "package.json", r#"{"main":"index.ts"}"#);
    write_file(tmp.path(), "index.ts", "import './orphan';\nexport const z = 1;\n");
    write_file(tmp.path(), "orphan.ts", "console.log('side effect only');\n");
    write_file(tmp.path(), "truly-unused.ts", "export const w = 1;\n");

    let result = scan_json(tmp.path());
    let dead_paths = paths_of(&result["dead_files"]);
    let entry_paths = paths_of(&result["entry_points"]);

    for dead in &dead_paths {
        assert!(!entry_paths.contains(dead), "{dead} is both dead and an entry point");
    }
    assert!(dead_paths.contains(&"truly-unused.ts".to_string()));
    // A side-effect-only import keeps its target live and out of dead-file reporting.
    assert!(!dead_paths.contains(&"orphan.ts".to_string()));
}

#[test]
fn invariant_scan_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "package.json", r#"{"main":"index.ts"}"#);
    write_file(tmp.path(), "index.ts", "export const z = 1;\n");
    write_file(tmp.path(), "orphan.ts", "export const w = 1;\n");

    let first = scan_json(tmp.path());
    let second = scan_json(tmp.path());

    let first_dead = paths_of(&first["dead_files"]);
    let second_dead = paths_of(&second["dead_files"]);
    assert_eq!(first_dead, second_dead);

    let first_partial = paths_of(&first["partial_files"]);
    let second_partial = paths_of(&second["partial_files"]);
    assert_eq!(first_partial, second_partial);
}

#[test]
fn invariant_cycle_reachable_from_entry_keeps_both_files_live() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "package.json", r#"{"main":"src/main.ts"}"#);
    write_file(
        tmp.path(),
        "src/main.ts",
        "import { b } from './b';\nexport function a() { return b; }\n",
    );
    write_file(
        tmp.path(),
        "src/b.ts",
        "import { a } from './main';\nexport function b() { return a; }\n",
    );

    let result = scan_json(tmp.path());
    let dead_paths = paths_of(&result["dead_files"]);
    assert!(!dead_paths.contains(&"src/main.ts".to_string()));
    assert!(!dead_paths.contains(&"src/b.ts".to_string()));
}

// ---------------------------------------------------------------------------------------------
// CLI surface
// ---------------------------------------------------------------------------------------------

#[test]
fn cli_rejects_unknown_flag() {
    let tmp = tempfile::tempdir().unwrap();
    deadwood()
        .arg(tmp.path())
        .arg("--not-a-real-flag")
        .assert()
        .failure();
}

#[test]
fn cli_text_report_mentions_dead_file() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "package.json", r#"{"main":"index.ts"}"#);
    write_file(tmp.path(), "index.ts", "export const z = 1;\n");
    write_file(tmp.path(), "orphan.ts", "export const w = 1;\n");

    deadwood()
        .arg(tmp.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicates::str::contains("orphan.ts"));
}
