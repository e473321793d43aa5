//! Interactive loop: each line is a separate agent run.

use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{debug, warn};
use workbench_core::agent::{Agent, AgentRunConfig};
use workbench_core::model::ModelProvider;

const QUIT_COMMANDS: [&str; 3] = ["q", "quit", "exit"];

pub async fn run<P: ModelProvider>(agent: &Agent<P>, config: &AgentRunConfig) -> io::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_banner(&mut stdout, config).await?;
    loop {
        write_prompt(&mut stdout).await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_quit(input) {
            debug!("Quit command received");
            break;
        }

        match agent.run(input, config).await {
            Ok(outcome) => {
                let steps = outcome.steps.len();
                match outcome.into_answer() {
                    Ok(answer) => {
                        write_line(&mut stdout, &answer).await?;
                        write_line(&mut stdout, &format!("({steps} tool call(s))")).await?;
                    }
                    Err(err) => write_line(&mut stdout, &err.user_message()).await?,
                }
            }
            Err(err) => {
                warn!(%err, "Agent run failed");
                write_line(&mut stdout, &err.user_message()).await?;
            }
        }
    }
    write_line(&mut stdout, "Bye.").await?;
    stdout.flush().await
}

fn is_quit(input: &str) -> bool {
    QUIT_COMMANDS
        .iter()
        .any(|command| input.eq_ignore_ascii_case(command))
}

async fn print_banner(stdout: &mut Stdout, config: &AgentRunConfig) -> io::Result<()> {
    write_line(
        stdout,
        &format!(
            "workbench chat | provider '{}' | model '{}' | up to {} tool calls per question",
            config.provider, config.model, config.max_steps
        ),
    )
    .await?;
    write_line(stdout, "Type a question, or 'q' to quit.").await
}

async fn write_prompt(stdout: &mut Stdout) -> io::Result<()> {
    stdout.write_all(b"Question: ").await?;
    stdout.flush().await
}

async fn write_line(stdout: &mut Stdout, text: &str) -> io::Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
