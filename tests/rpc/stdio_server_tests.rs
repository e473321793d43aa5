// Stdio tool server tests - a full MCP session over in-memory pipes

use serde_json::{Value, json};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, duplex};
use tokio::task::JoinHandle;
use workbench_core::rpc::{ServeError, ToolServer};
use workbench_core::tooling::{ToolRegistry, Workspace};

struct Session {
    input: DuplexStream,
    output: Lines<BufReader<DuplexStream>>,
    server: JoinHandle<Result<(), ServeError>>,
}

impl Session {
    fn start(workspace: Workspace) -> Self {
        let registry = ToolRegistry::with_builtins(workspace).expect("builtins register");
        let server = ToolServer::new(Arc::new(registry));
        let (input, server_in) = duplex(64 * 1024);
        let (server_out, output) = duplex(64 * 1024);
        let server = tokio::spawn(async move { server.serve(server_in, server_out).await });
        Self {
            input,
            output: BufReader::new(output).lines(),
            server,
        }
    }

    async fn send(&mut self, message: &str) {
        self.input
            .write_all(format!("{message}\n").as_bytes())
            .await
            .expect("write request");
    }

    async fn receive(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(5), self.output.next_line())
            .await
            .expect("server replied in time")
            .expect("read response")
            .expect("stream still open");
        serde_json::from_str(&line).expect("response is JSON")
    }

    async fn request(&mut self, message: Value) -> Value {
        self.send(&message.to_string()).await;
        self.receive().await
    }

    async fn finish(self) {
        drop(self.input);
        self.server
            .await
            .expect("server task joined")
            .expect("server stopped cleanly");
    }
}

#[tokio::test]
async fn handshake_then_list_then_call() {
    let mut session = Session::start(Workspace::default());

    let init = session
        .request(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-06-18",
                "clientInfo": { "name": "test-client", "version": "0.0.0" },
                "capabilities": {}
            }
        }))
        .await;
    assert_eq!(init["id"], 1);
    assert_eq!(init["result"]["protocolVersion"], "2025-06-18");
    assert_eq!(init["result"]["serverInfo"]["name"], "workbench-tools");
    assert!(init["result"]["capabilities"]["tools"].is_object());

    session
        .send(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;

    let listed = session
        .request(json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }))
        .await;
    let tools = listed["result"]["tools"].as_array().expect("tool array");
    let add = tools
        .iter()
        .find(|tool| tool["name"] == "add")
        .expect("add advertised");
    assert_eq!(add["inputSchema"]["type"], "object");
    assert_eq!(add["inputSchema"]["required"], json!(["a", "b"]));
    assert!(!tools.iter().any(|tool| tool["name"] == "devide"));

    let called = session
        .request(json!({
            "jsonrpc": "2.0",
            "id": "call-1",
            "method": "tools/call",
            "params": { "name": "add", "arguments": { "a": 2, "b": 3 } }
        }))
        .await;
    assert_eq!(called["id"], "call-1");
    assert_eq!(called["result"]["isError"], false);
    assert_eq!(called["result"]["content"][0]["text"], "5");
    assert_eq!(called["result"]["structuredContent"]["result"], 5);

    session.finish().await;
}

#[tokio::test]
async fn protocol_errors_do_not_end_the_session() {
    let mut session = Session::start(Workspace::default());

    session.send("this is not json").await;
    let parse = session.receive().await;
    assert_eq!(parse["error"]["code"], -32700);
    assert_eq!(parse["id"], Value::Null);

    let unknown = session
        .request(json!({ "jsonrpc": "2.0", "id": 3, "method": "prompts/list" }))
        .await;
    assert_eq!(unknown["error"]["code"], -32601);
    assert_eq!(unknown["id"], 3);

    let pong = session
        .request(json!({ "jsonrpc": "2.0", "id": 4, "method": "ping" }))
        .await;
    assert_eq!(pong["result"], json!({}));

    session.finish().await;
}

#[tokio::test]
async fn tool_failures_are_results_not_protocol_errors() {
    let mut session = Session::start(Workspace::default());

    let missing = session
        .request(json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": { "name": "sqrt", "arguments": { "x": 4 } }
        }))
        .await;
    assert!(missing.get("error").is_none());
    assert_eq!(missing["result"]["isError"], true);
    assert_eq!(
        missing["result"]["structuredContent"]["error"]["kind"],
        "not_found"
    );

    let invalid = session
        .request(json!({
            "jsonrpc": "2.0",
            "id": 6,
            "method": "tools/call",
            "params": { "name": "add", "arguments": { "a": 1 } }
        }))
        .await;
    assert_eq!(invalid["result"]["isError"], true);
    assert_eq!(
        invalid["result"]["structuredContent"]["error"]["parameter"],
        "b"
    );

    session.finish().await;
}

#[tokio::test]
async fn file_tools_act_on_the_served_root() {
    let dir = tempdir().expect("tempdir");
    let mut session = Session::start(Workspace::new(dir.path()));

    let created = session
        .request(json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {
                "name": "create_file",
                "arguments": { "path": "out/result.txt", "content": "42" }
            }
        }))
        .await;
    assert_eq!(created["result"]["isError"], false);
    assert_eq!(
        fs::read_to_string(dir.path().join("out/result.txt")).expect("file written"),
        "42"
    );

    session.finish().await;
}
