// Filesystem tool tests - file management and directory rendering against a
// temporary workspace root

use serde_json::{Value, json};
use std::fs;
use tempfile::tempdir;
use workbench_core::tooling::{ErrorKind, InvocationResult, ToolRegistry, Workspace};

fn registry_at(root: &std::path::Path) -> ToolRegistry {
    ToolRegistry::with_builtins(Workspace::new(root)).expect("builtins register")
}

fn expect_ok(result: InvocationResult) -> Value {
    match result {
        InvocationResult::Success { output } => output,
        InvocationResult::Failure { error } => panic!("unexpected failure: {error}"),
    }
}

#[test]
fn file_lifecycle_round_trip() {
    let dir = tempdir().expect("tempdir");
    let registry = registry_at(dir.path());
    let target = dir.path().join("notes/todo.txt");

    expect_ok(registry.invoke(
        "create_file",
        json!({ "path": "notes/todo.txt", "content": "one" }),
    ));
    assert_eq!(fs::read_to_string(&target).expect("read"), "one");

    expect_ok(registry.invoke(
        "append_file",
        json!({ "path": "notes/todo.txt", "content": "\ntwo" }),
    ));
    assert_eq!(fs::read_to_string(&target).expect("read"), "one\ntwo");

    expect_ok(registry.invoke(
        "edit_file",
        json!({ "path": "notes/todo.txt", "new_content": "replaced" }),
    ));
    assert_eq!(fs::read_to_string(&target).expect("read"), "replaced");

    expect_ok(registry.invoke("delete_file", json!({ "path": "notes/todo.txt" })));
    assert!(!target.exists());
    assert!(dir.path().join("notes").is_dir());
}

#[test]
fn create_file_defaults_to_empty_content() {
    let dir = tempdir().expect("tempdir");
    let registry = registry_at(dir.path());
    expect_ok(registry.invoke("create_file", json!({ "path": "empty.txt" })));
    assert_eq!(
        fs::read_to_string(dir.path().join("empty.txt")).expect("read"),
        ""
    );
}

#[test]
fn create_file_overwrites_existing_file() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.txt"), "old").expect("seed");
    let registry = registry_at(dir.path());
    expect_ok(registry.invoke("create_file", json!({ "path": "a.txt", "content": "new" })));
    assert_eq!(fs::read_to_string(dir.path().join("a.txt")).expect("read"), "new");
}

#[test]
fn absolute_paths_bypass_the_root() {
    let root = tempdir().expect("root");
    let elsewhere = tempdir().expect("elsewhere");
    let target = elsewhere.path().join("abs.txt");
    let registry = registry_at(root.path());

    expect_ok(registry.invoke(
        "create_file",
        json!({ "path": target.to_string_lossy(), "content": "x" }),
    ));
    assert!(target.is_file());
    assert!(!root.path().join("abs.txt").exists());
}

#[test]
fn missing_files_are_not_found() {
    let dir = tempdir().expect("tempdir");
    let registry = registry_at(dir.path());

    for (tool, args) in [
        ("edit_file", json!({ "path": "ghost.txt", "new_content": "x" })),
        ("append_file", json!({ "path": "ghost.txt", "content": "x" })),
        ("delete_file", json!({ "path": "ghost.txt" })),
        ("show_directory", json!({ "path": "ghost" })),
    ] {
        let result = registry.invoke(tool, args);
        assert_eq!(
            result.error().map(|e| e.kind),
            Some(ErrorKind::NotFound),
            "{tool}"
        );
    }
    assert!(!dir.path().join("ghost.txt").exists());
}

#[test]
fn show_directory_lists_files_before_subdirectories() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("project");
    fs::create_dir_all(root.join("src/nested")).expect("dirs");
    fs::create_dir_all(root.join("__pycache__")).expect("cache");
    fs::write(root.join("z.txt"), "").expect("file");
    fs::write(root.join("a.txt"), "").expect("file");
    fs::write(root.join("src/main.py"), "").expect("file");
    fs::write(root.join("src/nested/deep.py"), "").expect("file");
    fs::write(root.join("__pycache__/x.pyc"), "").expect("file");

    let registry = registry_at(dir.path());
    let tree = expect_ok(registry.invoke("show_directory", json!({ "path": "project" })));
    let tree = tree.as_str().expect("text output");

    let expected = [
        "project/",
        "│   └── a.txt",
        "│   └── z.txt",
        "│   ├── src/",
        "│   │   └── main.py",
        "│   │   ├── nested/",
        "│   │   │   └── deep.py",
    ]
    .join("\n");
    assert_eq!(tree, expected);
    assert!(!tree.contains("__pycache__"));
    assert!(!tree.contains("x.pyc"));
}

#[test]
fn configured_ignore_list_replaces_defaults() {
    let dir = tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("target/debug")).expect("dirs");
    fs::create_dir_all(dir.path().join(".git")).expect("dirs");

    let workspace = Workspace::new(dir.path()).with_ignored_dirs(["target"]);
    let registry = ToolRegistry::with_builtins(workspace).expect("builtins");
    let root = dir.path().to_string_lossy().into_owned();
    let tree = expect_ok(registry.invoke("show_directory", json!({ "path": root })));
    let tree = tree.as_str().expect("text output");

    assert!(!tree.contains("target"));
    assert!(tree.contains(".git/"));
}

#[cfg(unix)]
#[test]
fn shell_commands_run_in_the_workspace_root() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("marker.txt"), "").expect("file");
    let registry = registry_at(dir.path());

    let listing = expect_ok(registry.invoke("run_shell_command", json!({ "command": "ls" })));
    assert_eq!(listing, json!("Output:\nmarker.txt"));

    let failed = expect_ok(registry.invoke(
        "run_shell_command",
        json!({ "command": "echo broken >&2; exit 3" }),
    ));
    assert_eq!(failed, json!("Error:\nbroken"));
}

#[cfg(unix)]
#[test]
fn shell_commands_are_killed_after_the_timeout() {
    let dir = tempdir().expect("tempdir");
    let workspace =
        Workspace::new(dir.path()).with_shell_timeout(std::time::Duration::from_millis(200));
    let registry = ToolRegistry::with_builtins(workspace).expect("builtins");

    let result = registry.invoke("run_shell_command", json!({ "command": "sleep 5" }));
    assert_eq!(
        result.error().map(|e| e.kind),
        Some(ErrorKind::HandlerFailure)
    );
    assert!(result.text().contains("timed out"));
}
