pub mod chat;
pub mod cli;

pub use cli::{Cli, RunMode, ServerArgs};

use std::error::Error;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};
use workbench_core::agent::{Agent, AgentRunConfig};
use workbench_core::config::{AppConfig, WorkspaceConfig, load_workspace};
use workbench_core::model::DynamicModelProvider;
use workbench_core::rpc::ToolServer;
use workbench_core::tooling::{
    LocalTransport, ServerManager, ToolRegistry, ToolTransport, Workspace,
};

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    init_tracing(if cli.mode == RunMode::Chat { "warn" } else { "info" });
    debug!(mode = ?cli.mode, config = ?cli.config, "CLI arguments parsed");

    let file_config = AppConfig::load(cli.config.as_deref())?;
    info!(
        provider = %file_config.default_provider,
        model = %file_config.model,
        servers = file_config.servers.len(),
        "Loaded configuration"
    );

    let transport = build_transport(&file_config)?;
    let result = match cli.mode {
        RunMode::Tools => print_tools(transport.as_ref(), cli.json).await,
        mode => {
            let provider = Arc::new(DynamicModelProvider::from_configs(&file_config.providers));
            let agent = Agent::new(provider, Arc::clone(&transport));
            let run_config = run_config(&cli, &file_config);
            if mode == RunMode::Chat {
                chat::run(&agent, &run_config).await.map_err(Into::into)
            } else {
                run_once(&cli, &agent, &run_config).await
            }
        }
    };
    transport.shutdown().await;
    info!("Client execution finished");
    result
}

/// Entry point of the `workbench-server` binary.
pub async fn run_server(args: ServerArgs) -> Result<(), Box<dyn Error>> {
    init_tracing("info");
    let mut workspace_config = load_workspace(args.config.as_deref())?;
    apply_server_overrides(&args, &mut workspace_config);

    let workspace = Workspace::from(&workspace_config);
    info!(
        root = %workspace.root().display(),
        shell = workspace.allow_shell(),
        "Preparing tool registry"
    );
    let registry = ToolRegistry::with_builtins(workspace)?;
    ToolServer::new(Arc::new(registry)).serve_stdio().await?;
    Ok(())
}

/// Logs always go to stderr; stdout carries answers or protocol traffic.
pub fn init_tracing(default_level: &str) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();
    });
}

/// Configured MCP servers when there are any, the built-in registry
/// in-process otherwise.
pub fn build_transport(config: &AppConfig) -> Result<Arc<dyn ToolTransport>, Box<dyn Error>> {
    if config.servers.is_empty() {
        info!("No MCP servers configured, serving built-in tools in-process");
        let registry = ToolRegistry::with_builtins(Workspace::from(&config.workspace))?;
        return Ok(Arc::new(LocalTransport::new(Arc::new(registry))));
    }
    let manager = ServerManager::new(config.servers.clone());
    info!(
        servers = ?manager.server_names().collect::<Vec<_>>(),
        "Using configured MCP servers"
    );
    Ok(Arc::new(manager))
}

pub fn run_config(cli: &Cli, config: &AppConfig) -> AgentRunConfig {
    let provider = cli
        .provider
        .clone()
        .unwrap_or_else(|| config.default_provider.clone());
    let model = cli.model.clone().unwrap_or_else(|| config.model.clone());
    let max_steps = cli
        .max_steps
        .map(|steps| steps.get())
        .unwrap_or(config.max_steps);
    let mut run_config = AgentRunConfig::new(provider, model).with_max_steps(max_steps);
    if let Some(system_prompt) = cli.system.clone().or_else(|| config.system_prompt.clone()) {
        run_config = run_config.with_system_prompt(system_prompt);
    }
    run_config
}

async fn run_once(
    cli: &Cli,
    agent: &Agent<DynamicModelProvider>,
    run_config: &AgentRunConfig,
) -> Result<(), Box<dyn Error>> {
    let task = load_prompt(cli).await?;
    let outcome = agent
        .run(&task, run_config)
        .await
        .map_err(|err| err.user_message())?;

    if cli.json {
        let rendered = serde_json::json!({
            "run_id": outcome.run_id,
            "state": outcome.state,
            "response": outcome.response,
            "steps": outcome.steps,
        });
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    }
    let answer = outcome.into_answer().map_err(|err| err.user_message())?;
    if !cli.json {
        println!("{answer}");
    }
    Ok(())
}

async fn load_prompt(cli: &Cli) -> Result<String, Box<dyn Error>> {
    let task = if !cli.task.is_empty() {
        cli.task.join(" ")
    } else if let Some(path) = &cli.prompt_file {
        std::fs::read_to_string(path)?
    } else if !std::io::stdin().is_terminal() {
        let mut buffer = String::new();
        tokio::io::stdin().read_to_string(&mut buffer).await?;
        buffer
    } else {
        return Err("no task given: pass it as arguments, with --prompt-file, or on stdin".into());
    };
    let task = task.trim().to_string();
    if task.is_empty() {
        return Err("task is empty".into());
    }
    Ok(task)
}

async fn print_tools(transport: &dyn ToolTransport, json: bool) -> Result<(), Box<dyn Error>> {
    let tools = transport.list_tools().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }
    for tool in &tools {
        let description = tool.description.as_deref().unwrap_or("");
        match &tool.server {
            Some(server) => println!("{} [{server}]  {description}", tool.name),
            None => println!("{}  {description}", tool.name),
        }
    }
    Ok(())
}

fn apply_server_overrides(args: &ServerArgs, config: &mut WorkspaceConfig) {
    if let Some(root) = &args.root {
        config.root = Some(root.clone());
    }
    if !args.ignore.is_empty() {
        config.ignored_dirs = args.ignore.clone();
    }
    if args.no_shell {
        config.allow_shell = false;
    }
    if let Some(secs) = args.shell_timeout {
        config.shell_timeout_secs = secs;
    }
    debug!(
        root = ?config.root.as_deref().map(Path::display),
        shell_timeout = ?Duration::from_secs(config.shell_timeout_secs),
        "Workspace overrides applied"
    );
}
