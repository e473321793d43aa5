use super::error::TransportError;
use super::interface::{ToolDescriptor, ToolTransport};
use super::process::StdioProcess;
use super::result::{ErrorKind, InvocationResult, ToolFailure};
use crate::config::ServerConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

/// Fans a single tool catalogue out over several MCP server processes.
///
/// Tools are routed by name. When two servers publish the same name the
/// server configured first keeps it.
pub struct ServerManager {
    processes: Vec<StdioProcess>,
    routes: AsyncMutex<HashMap<String, usize>>,
}

impl ServerManager {
    pub fn new(configs: Vec<ServerConfig>) -> Self {
        Self {
            processes: configs.into_iter().map(StdioProcess::new).collect(),
            routes: AsyncMutex::new(HashMap::new()),
        }
    }

    pub fn server_names(&self) -> impl Iterator<Item = &str> {
        self.processes.iter().map(StdioProcess::name)
    }

    /// Servers may accept names they do not advertise, such as aliases.
    /// Each server is asked in configured order; the first answer other
    /// than "not found" settles the call.
    async fn forward_unlisted(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<InvocationResult, TransportError> {
        for process in &self.processes {
            let result = match process.call_tool(name, arguments.clone()).await {
                Ok(reply) => InvocationResult::from_call_result(&reply),
                Err(TransportError::Rpc { code, message, .. }) => {
                    debug!(tool = %name, server = process.name(), code, %message, "Server declined tool");
                    continue;
                }
                Err(err) => return Err(err),
            };
            if result.error().is_some_and(|error| error.kind == ErrorKind::NotFound) {
                continue;
            }
            debug!(tool = %name, server = process.name(), "Unlisted tool answered");
            return Ok(result);
        }
        warn!(requested_tool = %name, "No configured server accepts tool");
        Ok(InvocationResult::failure(ToolFailure::not_found(format!(
            "unknown tool: {name}"
        ))))
    }

    async fn route(&self, tool: &str) -> Result<Option<usize>, TransportError> {
        if let Some(position) = self.routes.lock().await.get(tool) {
            return Ok(Some(*position));
        }
        // Unknown names may belong to a catalogue that changed since the
        // last listing.
        self.list_tools().await?;
        Ok(self.routes.lock().await.get(tool).copied())
    }
}

#[async_trait]
impl ToolTransport for ServerManager {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, TransportError> {
        let mut routes = HashMap::new();
        let mut listed = Vec::new();
        for (position, process) in self.processes.iter().enumerate() {
            for descriptor in process.tools().await? {
                if let Some(&owner) = routes.get(&descriptor.name) {
                    let kept: &StdioProcess = &self.processes[owner];
                    warn!(
                        tool = %descriptor.name,
                        kept = kept.name(),
                        ignored = process.name(),
                        "Tool name published by more than one server"
                    );
                    continue;
                }
                routes.insert(descriptor.name.clone(), position);
                listed.push(descriptor);
            }
        }
        debug!(tools = listed.len(), "Aggregated tool catalogue");
        *self.routes.lock().await = routes;
        Ok(listed)
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<InvocationResult, TransportError> {
        if let Some(position) = self.route(name).await? {
            let reply = self.processes[position].call_tool(name, arguments).await?;
            return Ok(InvocationResult::from_call_result(&reply));
        }
        self.forward_unlisted(name, arguments).await
    }

    async fn instructions(&self) -> Option<String> {
        let mut sections = Vec::new();
        for process in &self.processes {
            if let Some(text) = process.instructions().await {
                let text = text.trim();
                if !text.is_empty() {
                    sections.push(format!("[{}] {}", process.name(), text));
                }
            }
        }
        (!sections.is_empty()).then(|| sections.join("\n"))
    }

    async fn shutdown(&self) {
        for process in &self.processes {
            process.shutdown().await;
        }
    }
}
