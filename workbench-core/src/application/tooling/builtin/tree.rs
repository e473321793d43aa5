use super::super::result::ToolFailure;
use super::super::schema::Arguments;
use super::Workspace;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const INDENT: &str = "│   ";
const BRANCH: &str = "├── ";
const LEAF: &str = "└── ";

pub(super) fn show_directory(args: &Arguments, workspace: &Workspace) -> Result<Value, ToolFailure> {
    let path = args.string("path")?;
    let target = workspace.resolve(path);
    if !target.is_dir() {
        return Err(ToolFailure::not_found(format!(
            "{path} not found or not a directory"
        )));
    }
    render_tree(&target, workspace.ignored_dirs()).map(Value::String)
}

/// Renders `root` as an indented tree.
///
/// Within each directory files come first, then subdirectories, both sorted
/// by name. Directories named in `ignored` are skipped with everything below
/// them. Symlinks are listed as leaves and never followed.
pub fn render_tree(root: &Path, ignored: &BTreeSet<String>) -> Result<String, ToolFailure> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(files_first)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_ignored_dir(entry, ignored));

    let mut lines = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| {
            ToolFailure::handler(format!("failed to walk {}: {err}", root.display()))
        })?;
        let depth = entry.depth();
        let name = entry.file_name().to_string_lossy();

        if depth == 0 {
            lines.push(format!("{}/", root_label(root)));
        } else if entry.file_type().is_dir() {
            lines.push(format!("{}{BRANCH}{name}/", INDENT.repeat(depth)));
        } else {
            lines.push(format!("{}{LEAF}{name}", INDENT.repeat(depth)));
        }
    }
    Ok(lines.join("\n"))
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn is_ignored_dir(entry: &DirEntry, ignored: &BTreeSet<String>) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| ignored.contains(name))
            .unwrap_or(false)
}

/// Last component of `root` with `.` segments dropped; `.` when nothing else
/// remains.
fn root_label(root: &Path) -> String {
    let normalized: PathBuf = root
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        return ".".to_string();
    }
    normalized
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| normalized.display().to_string())
}
