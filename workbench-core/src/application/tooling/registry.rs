use super::builtin::Workspace;
use super::result::{InvocationResult, ToolFailure};
use super::schema::{ParamSpec, ParamType, input_schema, validate};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The closed set of operations a tool definition can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    ShowDirectory,
    CreateFile,
    EditFile,
    AppendFile,
    DeleteFile,
    RunShellCommand,
}

impl ToolKind {
    pub const ALL: [ToolKind; 10] = [
        ToolKind::Add,
        ToolKind::Subtract,
        ToolKind::Multiply,
        ToolKind::Divide,
        ToolKind::ShowDirectory,
        ToolKind::CreateFile,
        ToolKind::EditFile,
        ToolKind::AppendFile,
        ToolKind::DeleteFile,
        ToolKind::RunShellCommand,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Add => "add",
            ToolKind::Subtract => "subtract",
            ToolKind::Multiply => "multiply",
            ToolKind::Divide => "divide",
            ToolKind::ShowDirectory => "show_directory",
            ToolKind::CreateFile => "create_file",
            ToolKind::EditFile => "edit_file",
            ToolKind::AppendFile => "append_file",
            ToolKind::DeleteFile => "delete_file",
            ToolKind::RunShellCommand => "run_shell_command",
        }
    }

    /// Default definition: the canonical name, description and parameters.
    pub fn definition(self) -> ToolDefinition {
        let int_pair = || {
            vec![
                ParamSpec::required("a", ParamType::Integer),
                ParamSpec::required("b", ParamType::Integer),
            ]
        };
        let path = || ParamSpec::required("path", ParamType::String);

        let (description, params) = match self {
            ToolKind::Add => ("Add two integers and return a + b.", int_pair()),
            ToolKind::Subtract => ("Subtract b from a and return a - b.", int_pair()),
            ToolKind::Multiply => ("Multiply two integers and return a * b.", int_pair()),
            ToolKind::Divide => (
                "Divide a by b using floor division (rounds toward negative infinity).",
                int_pair(),
            ),
            ToolKind::ShowDirectory => (
                "List directory structure starting from path.",
                vec![path().describe("Directory to list")],
            ),
            ToolKind::CreateFile => (
                "Create a new file with given content, creating parent directories as needed.",
                vec![
                    path(),
                    ParamSpec::optional("content", ParamType::String, ""),
                ],
            ),
            ToolKind::EditFile => (
                "Overwrite an existing file with new content.",
                vec![path(), ParamSpec::required("new_content", ParamType::String)],
            ),
            ToolKind::AppendFile => (
                "Append content to an existing file.",
                vec![path(), ParamSpec::required("content", ParamType::String)],
            ),
            ToolKind::DeleteFile => ("Delete a specified file.", vec![path()]),
            ToolKind::RunShellCommand => (
                "Run a terminal command and return the output. Example: \"Run the command 'ls -la'\"",
                vec![ParamSpec::required("command", ParamType::String)],
            ),
        };

        ToolDefinition::new(self.name(), description, params, self)
    }
}

/// A named, schema-described operation. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
    kind: ToolKind,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        params: Vec<ParamSpec>,
        kind: ToolKind,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn input_schema(&self) -> Value {
        input_schema(&self.params)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{name}' is already registered")]
    Duplicate { name: String },
    #[error("alias '{alias}' points at unregistered tool '{target}'")]
    UnknownAliasTarget { alias: String, target: String },
}

/// Name → definition mapping, built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, usize>,
    workspace: Workspace,
}

impl ToolRegistry {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            aliases: HashMap::new(),
            workspace,
        }
    }

    /// Registry holding every built-in tool. The shell tool is left out when
    /// the workspace disallows it. `devide` is accepted as an unadvertised
    /// alias of `divide`.
    pub fn with_builtins(workspace: Workspace) -> Result<Self, RegistryError> {
        let allow_shell = workspace.allow_shell();
        let mut registry = Self::new(workspace);
        for kind in ToolKind::ALL {
            if kind == ToolKind::RunShellCommand && !allow_shell {
                info!("Shell tool disabled by workspace configuration");
                continue;
            }
            registry.register(kind.definition())?;
        }
        registry.alias("devide", ToolKind::Divide.name())?;
        Ok(registry)
    }

    pub fn register(&mut self, definition: ToolDefinition) -> Result<(), RegistryError> {
        let name = definition.name().to_string();
        if self.index.contains_key(&name) || self.aliases.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        debug!(tool = %name, "Registering tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(definition);
        Ok(())
    }

    pub fn alias(&mut self, alias: &str, target: &str) -> Result<(), RegistryError> {
        if self.index.contains_key(alias) || self.aliases.contains_key(alias) {
            return Err(RegistryError::Duplicate {
                name: alias.to_string(),
            });
        }
        let position =
            *self
                .index
                .get(target)
                .ok_or_else(|| RegistryError::UnknownAliasTarget {
                    alias: alias.to_string(),
                    target: target.to_string(),
                })?;
        self.aliases.insert(alias.to_string(), position);
        Ok(())
    }

    /// Advertised definitions in registration order. Aliases are not listed.
    pub fn list(&self) -> std::slice::Iter<'_, ToolDefinition> {
        self.tools.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index
            .get(name)
            .or_else(|| self.aliases.get(name))
            .and_then(|position| self.tools.get(*position))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Validates and runs one invocation. Every failure comes back as data.
    pub fn invoke(&self, name: &str, arguments: Value) -> InvocationResult {
        let Some(definition) = self.get(name) else {
            warn!(requested_tool = %name, "Unknown tool requested");
            return InvocationResult::failure(ToolFailure::not_found(format!(
                "unknown tool: {name}"
            )));
        };

        let result = validate(definition.params(), arguments)
            .and_then(|args| definition.kind().call(&args, &self.workspace));

        match &result {
            Ok(_) => info!(tool = %definition.name(), "Tool executed"),
            Err(failure) => warn!(
                tool = %definition.name(),
                kind = %failure.kind,
                message = %failure.message,
                "Tool invocation failed"
            ),
        }
        InvocationResult::from(result)
    }
}
