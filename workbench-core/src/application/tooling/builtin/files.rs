use super::super::result::ToolFailure;
use super::super::schema::Arguments;
use super::Workspace;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

fn io_failure(action: &str, path: &str, err: io::Error) -> ToolFailure {
    if err.kind() == io::ErrorKind::NotFound {
        ToolFailure::not_found(format!("{path}: {err}"))
    } else {
        ToolFailure::handler(format!("failed to {action} {path}: {err}"))
    }
}

fn require_file(target: &Path, path: &str) -> Result<(), ToolFailure> {
    if target.is_file() {
        Ok(())
    } else {
        Err(ToolFailure::not_found(format!("file not found: {path}")))
    }
}

pub(super) fn create_file(args: &Arguments, workspace: &Workspace) -> Result<Value, ToolFailure> {
    let path = args.string("path")?;
    let content = args.string("content")?;
    let target = workspace.resolve(path);

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| io_failure("create parent of", path, err))?;
    }
    fs::write(&target, content).map_err(|err| io_failure("write", path, err))?;
    debug!(path = %target.display(), bytes = content.len(), "Created file");
    Ok(Value::String(format!("Created file {path}")))
}

pub(super) fn edit_file(args: &Arguments, workspace: &Workspace) -> Result<Value, ToolFailure> {
    let path = args.string("path")?;
    let new_content = args.string("new_content")?;
    let target = workspace.resolve(path);

    require_file(&target, path)?;
    fs::write(&target, new_content).map_err(|err| io_failure("write", path, err))?;
    Ok(Value::String(format!("Edited file {path}")))
}

pub(super) fn append_file(args: &Arguments, workspace: &Workspace) -> Result<Value, ToolFailure> {
    let path = args.string("path")?;
    let content = args.string("content")?;
    let target = workspace.resolve(path);

    require_file(&target, path)?;
    let mut file = OpenOptions::new()
        .append(true)
        .open(&target)
        .map_err(|err| io_failure("open", path, err))?;
    file.write_all(content.as_bytes())
        .map_err(|err| io_failure("append to", path, err))?;
    Ok(Value::String(format!("Appended to {path}")))
}

pub(super) fn delete_file(args: &Arguments, workspace: &Workspace) -> Result<Value, ToolFailure> {
    let path = args.string("path")?;
    let target = workspace.resolve(path);

    require_file(&target, path)?;
    fs::remove_file(&target).map_err(|err| io_failure("delete", path, err))?;
    Ok(Value::String(format!("Deleted file {path}")))
}
