// Registry dispatch tests - validation, dispatch and failure-as-data

use serde_json::{Value, json};
use workbench_core::tooling::{
    ErrorKind, InvocationResult, ToolDefinition, ToolKind, ToolRegistry, Workspace,
};

fn registry() -> ToolRegistry {
    ToolRegistry::with_builtins(Workspace::default()).expect("builtins register")
}

fn output(result: InvocationResult) -> Value {
    match result {
        InvocationResult::Success { output } => output,
        InvocationResult::Failure { error } => panic!("unexpected failure: {error}"),
    }
}

fn failure_kind(result: &InvocationResult) -> ErrorKind {
    result.error().expect("failure expected").kind
}

#[test]
fn advertises_every_builtin_in_order() {
    let registry = registry();
    let names: Vec<&str> = registry.list().map(ToolDefinition::name).collect();
    assert_eq!(
        names,
        [
            "add",
            "subtract",
            "multiply",
            "divide",
            "show_directory",
            "create_file",
            "edit_file",
            "append_file",
            "delete_file",
            "run_shell_command",
        ]
    );
}

#[test]
fn shell_tool_is_not_registered_when_disabled() {
    let registry =
        ToolRegistry::with_builtins(Workspace::default().with_shell(false)).expect("builtins");
    assert!(registry.get("run_shell_command").is_none());
    let result = registry.invoke("run_shell_command", json!({ "command": "echo hi" }));
    assert_eq!(failure_kind(&result), ErrorKind::NotFound);
}

#[test]
fn arithmetic_uses_integer_semantics() {
    let registry = registry();
    assert_eq!(output(registry.invoke("add", json!({ "a": 2, "b": 3 }))), json!(5));
    assert_eq!(
        output(registry.invoke("subtract", json!({ "a": 2, "b": 5 }))),
        json!(-3)
    );
    assert_eq!(
        output(registry.invoke("multiply", json!({ "a": -4, "b": 6 }))),
        json!(-24)
    );
    assert_eq!(output(registry.invoke("divide", json!({ "a": 7, "b": 2 }))), json!(3));
    assert_eq!(
        output(registry.invoke("divide", json!({ "a": -7, "b": 2 }))),
        json!(-4)
    );
}

#[test]
fn misspelled_divide_still_dispatches() {
    let registry = registry();
    assert_eq!(output(registry.invoke("devide", json!({ "a": 9, "b": 3 }))), json!(3));
    assert_eq!(
        registry.get("devide").map(ToolDefinition::kind),
        Some(ToolKind::Divide)
    );
}

#[test]
fn division_by_zero_is_a_handler_failure() {
    let result = registry().invoke("divide", json!({ "a": 1, "b": 0 }));
    assert_eq!(failure_kind(&result), ErrorKind::HandlerFailure);
    assert!(result.text().contains("division by zero"));
}

#[test]
fn unknown_tool_is_not_found() {
    let result = registry().invoke("sqrt", json!({ "x": 4 }));
    assert_eq!(failure_kind(&result), ErrorKind::NotFound);
    assert_eq!(result.text(), "unknown tool: sqrt");
}

#[test]
fn invalid_arguments_name_the_parameter() {
    let registry = registry();

    let missing = registry.invoke("add", json!({ "a": 1 }));
    assert_eq!(failure_kind(&missing), ErrorKind::InvalidArguments);
    assert_eq!(
        missing.error().and_then(|e| e.parameter.as_deref()),
        Some("b")
    );

    let wrong_type = registry.invoke("multiply", json!({ "a": "x", "b": 2 }));
    assert_eq!(failure_kind(&wrong_type), ErrorKind::InvalidArguments);
    assert_eq!(
        wrong_type.error().and_then(|e| e.parameter.as_deref()),
        Some("a")
    );
}

#[test]
fn failures_survive_the_wire_encoding() {
    let result = registry().invoke("divide", json!({ "a": 1, "b": 0 }));
    let decoded = InvocationResult::from_call_result(&result.to_call_result());
    assert_eq!(decoded, result);
}

#[test]
fn foreign_error_results_become_handler_failures() {
    let foreign = json!({
        "content": [{ "type": "text", "text": "backend unavailable" }],
        "isError": true,
    });
    let decoded = InvocationResult::from_call_result(&foreign);
    assert_eq!(failure_kind(&decoded), ErrorKind::HandlerFailure);
    assert_eq!(decoded.text(), "backend unavailable");
}
