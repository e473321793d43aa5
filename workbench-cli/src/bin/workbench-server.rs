//! Stdio MCP server exposing the built-in tools.
//!
//! stdout carries protocol traffic only; logs go to stderr.

use clap::Parser;
use std::process::ExitCode;
use workbench_cli::ServerArgs;

#[tokio::main]
async fn main() -> ExitCode {
    let args = ServerArgs::parse();
    match workbench_cli::run_server(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("workbench-server: {err}");
            ExitCode::FAILURE
        }
    }
}
