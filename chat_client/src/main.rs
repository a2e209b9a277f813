use anyhow::Result;
use clap::Parser;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use chat_client::{render::render, ChatState, RelayClient, DEFAULT_RELAY_URL};

#[derive(Parser, Debug)]
#[clap(about = "Terminal chat client for the relay service")]
struct Args {
    #[clap(short, long, env = "RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    relay_url: String,
    #[clap(long, default_value = "40")]
    rows: usize,
}

/// Warnings only unless `RUST_LOG` asks for more; stdout belongs to the transcript.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn redraw(state: &ChatState, rows: usize) -> Result<()> {
    let mut out = std::io::stdout().lock();
    write!(out, "\x1B[2J\x1B[H")?;
    for line in render(state, rows) {
        writeln!(out, "{}", line)?;
    }
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let args = Args::parse();
    let client = RelayClient::new(&args.relay_url);
    tracing::info!("Chat client using {:?}", client);

    let mut state = ChatState::new();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    redraw(&state, args.rows)?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "/quit" => break,
                    "/clear" => state.clear(),
                    _ => {
                        state.set_input(line.as_str());
                        match state.submit() {
                            Some(message) => {
                                let client = client.clone();
                                let outcome_tx = outcome_tx.clone();
                                tokio::spawn(async move {
                                    let outcome = client.send(&message).await;
                                    let _ = outcome_tx.send(outcome);
                                });
                            }
                            None => state.set_input(String::new()),
                        }
                    }
                }
                redraw(&state, args.rows)?;
            }
            Some(outcome) = outcome_rx.recv() => {
                state.settle(outcome);
                redraw(&state, args.rows)?;
            }
        }
    }

    Ok(())
}
