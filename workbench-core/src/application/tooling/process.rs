use super::error::TransportError;
use super::interface::ToolDescriptor;
use crate::config::ServerConfig;
use crate::constants::PROTOCOL_VERSION;
use crate::rpc::types::{METHOD_NOT_FOUND, RpcError, RpcRequest, RpcResponse};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info, warn};

type Reply = oneshot::Sender<Result<Value, TransportError>>;

/// One MCP tool server running as a child process, spoken to over
/// newline-delimited JSON-RPC on its stdin/stdout.
///
/// The process is started lazily by the first call that needs it and is
/// restarted the same way after it exits.
#[derive(Clone)]
pub struct StdioProcess {
    shared: Arc<Shared>,
}

struct Shared {
    server: ServerConfig,
    /// Serialises start-up so only one caller spawns and handshakes.
    starting: Mutex<()>,
    ready: AtomicBool,
    session: Mutex<Option<Session>>,
    generation: AtomicU64,
    waiting: Mutex<HashMap<String, Reply>>,
    request_seq: AtomicU64,
    catalogue: Mutex<Catalogue>,
    catalogue_stale: AtomicBool,
}

struct Session {
    generation: u64,
    child: Child,
    stdin: BufWriter<ChildStdin>,
}

/// What the server told us during the handshake and the last `tools/list`.
#[derive(Default)]
struct Catalogue {
    instructions: Option<String>,
    tools: Vec<ToolDescriptor>,
}

/// Any message the server may write: a response, a request or a
/// notification.
#[derive(Deserialize)]
struct Inbound {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

impl StdioProcess {
    pub fn new(server: ServerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                server,
                starting: Mutex::new(()),
                ready: AtomicBool::new(false),
                session: Mutex::new(None),
                generation: AtomicU64::new(0),
                waiting: Mutex::new(HashMap::new()),
                request_seq: AtomicU64::new(1),
                catalogue: Mutex::new(Catalogue::default()),
                catalogue_stale: AtomicBool::new(false),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.server.name
    }

    /// Spawns the process and completes the MCP handshake unless it is
    /// already running.
    pub async fn ensure_running(&self) -> Result<(), TransportError> {
        if self.shared.ready.load(Ordering::SeqCst) {
            return Ok(());
        }
        let _guard = self.shared.starting.lock().await;
        if self.shared.ready.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.shared.start().await?;
        match self.shared.handshake().await {
            Ok(()) => {
                self.shared.ready.store(true, Ordering::SeqCst);
                Ok(())
            }
            Err(err) => {
                self.shared.stop(None).await;
                Err(err)
            }
        }
    }

    /// Raw `tools/call` result.
    pub async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, TransportError> {
        self.ensure_running().await?;
        let arguments = match arguments {
            Value::Null => json!({}),
            other => other,
        };
        self.shared
            .request("tools/call", json!({ "name": tool, "arguments": arguments }))
            .await
    }

    /// Catalogue reported by the last `tools/list`, tagged with this server.
    pub async fn tools(&self) -> Result<Vec<ToolDescriptor>, TransportError> {
        self.ensure_running().await?;
        if self.shared.catalogue_stale.swap(false, Ordering::SeqCst) {
            self.shared.refresh_tools().await?;
        }
        Ok(self.shared.catalogue.lock().await.tools.clone())
    }

    pub async fn instructions(&self) -> Option<String> {
        self.shared.catalogue.lock().await.instructions.clone()
    }

    pub async fn shutdown(&self) {
        self.shared.stop(None).await;
    }
}

impl Shared {
    async fn start(self: &Arc<Self>) -> Result<(), TransportError> {
        let mut command = Command::new(&self.server.command);
        command
            .args(&self.server.args)
            .envs(&self.server.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &self.server.workdir {
            command.current_dir(dir);
        }

        info!(
            server = %self.server.name,
            command = %self.server.command.display(),
            "Starting tool server"
        );
        let mut child = command.spawn().map_err(|source| TransportError::Spawn {
            server: self.server.name.clone(),
            source,
        })?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(self.transport_error("child stdio was not piped"));
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.session.lock().await = Some(Session {
            generation,
            child,
            stdin: BufWriter::new(stdin),
        });
        tokio::spawn(Arc::clone(self).read_stdout(stdout, generation));
        Ok(())
    }

    async fn handshake(&self) -> Result<(), TransportError> {
        let result = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            )
            .await?;
        let instructions = result
            .get("instructions")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let protocol = result
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or("?");
        debug!(server = %self.server.name, protocol, "Handshake answered");
        self.catalogue.lock().await.instructions = instructions;
        self.send(&RpcRequest::notification("notifications/initialized"))
            .await?;
        self.refresh_tools().await
    }

    async fn refresh_tools(&self) -> Result<(), TransportError> {
        let result = self.request("tools/list", json!({})).await?;
        let entries: &[Value] = result
            .get("tools")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut tools = Vec::with_capacity(entries.len());
        for entry in entries {
            match ToolDescriptor::deserialize(entry) {
                Ok(mut tool) => {
                    tool.server = Some(self.server.name.clone());
                    tools.push(tool);
                }
                Err(err) => warn!(server = %self.server.name, %err, "Skipping unreadable tool entry"),
            }
        }
        debug!(server = %self.server.name, tools = tools.len(), "Tool catalogue refreshed");
        self.catalogue.lock().await.tools = tools;
        Ok(())
    }

    async fn read_stdout(self: Arc<Self>, stdout: ChildStdout, generation: u64) {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            // Some servers colour their logs onto stdout.
            if line.starts_with('\u{1b}') {
                debug!(server = %self.server.name, line, "Ignoring ANSI log line");
                continue;
            }
            match serde_json::from_str::<Inbound>(line) {
                Ok(message) => self.dispatch(message).await,
                Err(err) => {
                    warn!(server = %self.server.name, line, %err, "Ignoring non JSON-RPC output")
                }
            }
        }
        debug!(server = %self.server.name, generation, "Tool server stdout closed");
        self.stop(Some(generation)).await;
    }

    async fn dispatch(&self, message: Inbound) {
        match (message.id, message.method) {
            (Some(id), Some(method)) => self.answer_server_request(id, &method).await,
            (Some(id), None) => self.complete(&id, message.result, message.error).await,
            (None, Some(method)) => {
                debug!(server = %self.server.name, method, "Notification from tool server");
                if method == "notifications/tools/list_changed" {
                    // Replies arrive on this task, so the refresh waits for
                    // the next catalogue read.
                    self.catalogue_stale.store(true, Ordering::SeqCst);
                }
            }
            (None, None) => {}
        }
    }

    async fn complete(&self, id: &Value, result: Option<Value>, error: Option<RpcError>) {
        let key = match id {
            Value::String(key) => key.clone(),
            other => other.to_string(),
        };
        let Some(reply) = self.waiting.lock().await.remove(&key) else {
            debug!(server = %self.server.name, id = %key, "Response to no pending request");
            return;
        };
        let outcome = match error {
            Some(error) => Err(TransportError::Rpc {
                server: self.server.name.clone(),
                code: error.code,
                message: error.message,
            }),
            None => Ok(result.unwrap_or(Value::Null)),
        };
        let _ = reply.send(outcome);
    }

    async fn answer_server_request(&self, id: Value, method: &str) {
        let response = if method == "ping" {
            RpcResponse::success(Some(id), json!({}))
        } else {
            warn!(server = %self.server.name, method, "Tool server sent an unsupported request");
            RpcResponse::error(
                Some(id),
                METHOD_NOT_FOUND,
                format!("client does not handle '{method}'"),
            )
        };
        if let Err(err) = self.send(&response).await {
            warn!(server = %self.server.name, %err, "Could not answer tool server request");
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let id = format!("req-{}", self.request_seq.fetch_add(1, Ordering::SeqCst));
        let (reply, outcome) = oneshot::channel();
        self.waiting.lock().await.insert(id.clone(), reply);

        if let Err(err) = self.send(&RpcRequest::new(id.as_str(), method, params)).await {
            self.waiting.lock().await.remove(&id);
            return Err(err);
        }
        outcome.await.unwrap_or_else(|_| {
            Err(TransportError::Cancelled {
                server: self.server.name.clone(),
            })
        })
    }

    async fn send<T: serde::Serialize>(&self, message: &T) -> Result<(), TransportError> {
        let mut line = serde_json::to_vec(message).map_err(|source| TransportError::InvalidJson {
            server: self.server.name.clone(),
            source,
        })?;
        line.push(b'\n');

        let mut session = self.session.lock().await;
        let Some(session) = session.as_mut() else {
            return Err(TransportError::Terminated {
                server: self.server.name.clone(),
            });
        };
        let io_error = |err: std::io::Error| self.transport_error(err.to_string());
        session.stdin.write_all(&line).await.map_err(io_error)?;
        session.stdin.flush().await.map_err(io_error)
    }

    /// Kills the process and fails every pending request. With a
    /// generation, only that session is torn down.
    async fn stop(&self, generation: Option<u64>) {
        let session = {
            let mut slot = self.session.lock().await;
            let replaced = matches!(
                (slot.as_ref(), generation),
                (Some(current), Some(wanted)) if current.generation != wanted
            );
            if replaced {
                return;
            }
            slot.take()
        };
        self.ready.store(false, Ordering::SeqCst);
        if let Some(mut session) = session {
            if let Err(err) = session.child.kill().await {
                debug!(server = %self.server.name, %err, "Tool server already gone");
            }
        }

        for (_, reply) in self.waiting.lock().await.drain() {
            let _ = reply.send(Err(TransportError::Terminated {
                server: self.server.name.clone(),
            }));
        }
        *self.catalogue.lock().await = Catalogue::default();
    }

    fn transport_error(&self, message: impl Into<String>) -> TransportError {
        TransportError::Transport {
            server: self.server.name.clone(),
            message: message.into(),
        }
    }
}
