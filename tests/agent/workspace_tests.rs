// Agent workspace tests - scripted model runs driving the built-in tools
// through the in-process transport

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use workbench_core::agent::{Agent, AgentRunConfig, AgentState};
use workbench_core::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use workbench_core::tooling::{LocalTransport, ToolRegistry, ToolTransport, Workspace};
use workbench_core::types::MessageRole;

struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    fn new(replies: &[Value]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(Value::to_string).collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn last_request(&self) -> ModelRequest {
        self.seen
            .lock()
            .expect("lock")
            .last()
            .cloned()
            .expect("model was consulted")
    }
}

#[async_trait]
impl ModelProvider for ScriptedModel {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.seen.lock().expect("lock").push(request);
        self.replies
            .lock()
            .expect("lock")
            .pop_front()
            .map(ModelResponse::new)
            .ok_or_else(|| ModelError::invalid_response("scripted", "no reply left"))
    }
}

fn transport_at(root: &Path) -> Arc<dyn ToolTransport> {
    let registry = ToolRegistry::with_builtins(Workspace::new(root)).expect("builtins register");
    Arc::new(LocalTransport::new(Arc::new(registry)))
}

fn call(tool: &str, input: Value) -> Value {
    json!({ "action": "call_tool", "tool": tool, "input": input })
}

fn finish(response: &str) -> Value {
    json!({ "action": "final", "response": response })
}

#[tokio::test]
async fn agent_builds_a_project_layout() {
    let dir = tempdir().expect("tempdir");
    let model = ScriptedModel::new(&[
        call(
            "create_file",
            json!({ "path": "demo/main.py", "content": "print('hi')\n" }),
        ),
        call(
            "append_file",
            json!({ "path": "demo/main.py", "content": "print('bye')\n" }),
        ),
        call("create_file", json!({ "path": "demo/README.md" })),
        call("show_directory", json!({ "path": "demo" })),
        finish("Created demo/ with main.py and README.md"),
    ]);
    let agent = Agent::new(Arc::clone(&model), transport_at(dir.path()));

    let outcome = agent
        .run(
            "Create a demo project",
            &AgentRunConfig::new("scripted", "test").with_max_steps(10),
        )
        .await
        .expect("run completes");

    assert_eq!(outcome.state, AgentState::Done);
    assert_eq!(outcome.steps.len(), 4);
    assert!(outcome.steps.iter().all(|step| step.success));
    assert_eq!(
        fs::read_to_string(dir.path().join("demo/main.py")).expect("main.py"),
        "print('hi')\nprint('bye')\n"
    );
    assert_eq!(
        outcome.steps[3].output,
        json!("demo/\n│   └── README.md\n│   └── main.py")
    );

    let last = model.last_request();
    let tool_turn = &last.messages[last.messages.len() - 1];
    assert_eq!(tool_turn.role, MessageRole::Tool);
    assert!(tool_turn.content.contains("README.md"));
}

#[tokio::test]
async fn agent_recovers_from_a_missing_file() {
    let dir = tempdir().expect("tempdir");
    let model = ScriptedModel::new(&[
        call("edit_file", json!({ "path": "config.ini", "new_content": "x=1" })),
        call("create_file", json!({ "path": "config.ini", "content": "x=1" })),
        finish("config.ini now holds x=1"),
    ]);
    let agent = Agent::new(Arc::clone(&model), transport_at(dir.path()));

    let outcome = agent
        .run("Set x=1 in config.ini", &AgentRunConfig::new("scripted", "test"))
        .await
        .expect("run completes");

    assert_eq!(outcome.state, AgentState::Done);
    assert!(!outcome.steps[0].success);
    assert_eq!(outcome.steps[0].output["error"]["kind"], "not_found");
    assert!(outcome.steps[1].success);
    assert_eq!(
        fs::read_to_string(dir.path().join("config.ini")).expect("config"),
        "x=1"
    );
}

#[tokio::test]
async fn aborted_run_leaves_completed_side_effects() {
    let dir = tempdir().expect("tempdir");
    let model = ScriptedModel::new(&[
        call("create_file", json!({ "path": "one.txt", "content": "1" })),
        call("create_file", json!({ "path": "two.txt", "content": "2" })),
        call("create_file", json!({ "path": "three.txt", "content": "3" })),
    ]);
    let agent = Agent::new(Arc::clone(&model), transport_at(dir.path()));

    let outcome = agent
        .run(
            "Create three files",
            &AgentRunConfig::new("scripted", "test").with_max_steps(2),
        )
        .await
        .expect("run returns an outcome");

    assert_eq!(outcome.state, AgentState::Aborted);
    assert_eq!(outcome.max_steps, 2);
    assert!(dir.path().join("one.txt").is_file());
    assert!(dir.path().join("two.txt").is_file());
    assert!(!dir.path().join("three.txt").exists());
}
