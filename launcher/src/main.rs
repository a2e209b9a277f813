use anyhow::Result;
use clap::Parser;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
enum LauncherError {
    #[error("failed to start relay")]
    Relay(#[source] std::io::Error),
    #[error("failed to start chat client")]
    ChatClient(#[source] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Program {
    Relay,
    ChatClient,
}

impl Program {
    fn name(&self) -> &'static str {
        match self {
            Program::Relay => "relay",
            Program::ChatClient => "chat_client",
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> LauncherError {
        match self {
            Program::Relay => LauncherError::Relay(e),
            Program::ChatClient => LauncherError::ChatClient(e),
        }
    }

    /// Only the chat client draws on the terminal. The relay's log output
    /// would otherwise land on top of the transcript.
    fn owns_terminal(&self) -> bool {
        matches!(self, Program::ChatClient)
    }

    fn executable(&self, debug: bool) -> String {
        if debug {
            tracing::warn!("Running {} from target/debug", self.name());
            format!("target/debug/{}", self.name())
        } else {
            self.name().to_string()
        }
    }
}

#[derive(Parser, Debug)]
struct Args {
    #[clap(long, default_value = "5000")]
    relay_port: u16,
    #[clap(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,
    /// Include provider error details in relay responses.
    #[clap(long)]
    dev: bool,
    #[clap(long, short, default_value = "false")]
    debug: bool,
}

impl Args {
    fn arguments(&self, program: Program) -> Vec<String> {
        match program {
            Program::Relay => {
                let mode = if self.dev { "development" } else { "production" };
                vec![
                    "--host".to_string(),
                    "127.0.0.1".to_string(),
                    "--port".to_string(),
                    self.relay_port.to_string(),
                    "--mode".to_string(),
                    mode.to_string(),
                ]
            }
            Program::ChatClient => vec![
                "--relay-url".to_string(),
                format!("http://127.0.0.1:{}", self.relay_port),
            ],
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    tracing::info!(
        "Launcher started on relay port {} (api key {})",
        args.relay_port,
        if args.gemini_api_key.is_some() { "set" } else { "missing" }
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let relay = spawn_program(&args, Program::Relay)?;

    sleep(Duration::from_millis(300));
    let mut chat_client = match spawn_program(&args, Program::ChatClient) {
        Ok(child) => child,
        Err(e) => {
            terminate(Program::Relay, relay, Duration::from_millis(500))?;
            return Err(e.into());
        }
    };

    while running.load(Ordering::SeqCst) {
        match chat_client.try_wait()? {
            Some(status) => {
                tracing::info!("Chat client exited with {}", status);
                break;
            }
            None => sleep(Duration::from_millis(100)),
        }
    }

    terminate(Program::ChatClient, chat_client, Duration::from_millis(500))?;
    terminate(Program::Relay, relay, Duration::from_millis(500))?;

    Ok(())
}

fn spawn_program(args: &Args, program: Program) -> Result<Child, LauncherError> {
    tracing::info!("Spawning {}", program.name());

    let mut command = Command::new(program.executable(args.debug));
    command.args(args.arguments(program));
    if let (Program::Relay, Some(key)) = (program, &args.gemini_api_key) {
        command.env("GEMINI_API_KEY", key);
    }
    if !program.owns_terminal() {
        command.stdout(Stdio::null()).stderr(Stdio::null());
    }

    command.spawn().map_err(|e| program.spawn_error(e))
}

fn terminate(program: Program, mut process: Child, timeout: Duration) -> Result<ExitStatus> {
    let name = program.name();
    if let Some(status) = process.try_wait()? {
        return Ok(status);
    }

    tracing::info!("Terminating {name}");

    let terminate_time = Instant::now();
    signal::kill(Pid::from_raw(process.id() as i32), Signal::SIGTERM)?;

    tracing::info!("Waiting for {name} to gracefully shutdown");

    while terminate_time.elapsed() < timeout {
        if let Some(status) = process.try_wait()? {
            tracing::info!("{name} terminated");
            return Ok(status);
        }
        sleep(Duration::from_millis(100));
    }

    tracing::info!("Killing {name}");

    process.kill()?;
    let exit_status = process.wait()?;

    tracing::info!("{name} killed");
    Ok(exit_status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dev: bool) -> Args {
        Args {
            relay_port: 6001,
            gemini_api_key: Some("k".to_string()),
            dev,
            debug: false,
        }
    }

    #[test]
    fn relay_arguments_follow_mode() {
        let relay = args(true).arguments(Program::Relay);
        assert!(relay.windows(2).any(|w| *w == ["--port", "6001"]));
        assert!(relay.windows(2).any(|w| *w == ["--mode", "development"]));

        let relay = args(false).arguments(Program::Relay);
        assert!(relay.windows(2).any(|w| *w == ["--mode", "production"]));
    }

    #[test]
    fn chat_client_points_at_relay() {
        assert_eq!(
            args(false).arguments(Program::ChatClient),
            vec!["--relay-url", "http://127.0.0.1:6001"]
        );
    }

    #[test]
    fn only_chat_client_keeps_the_terminal() {
        assert!(Program::ChatClient.owns_terminal());
        assert!(!Program::Relay.owns_terminal());
    }

    #[test]
    fn api_key_never_appears_in_arguments() {
        for program in [Program::Relay, Program::ChatClient] {
            assert!(!args(false).arguments(program).contains(&"k".to_string()));
        }
    }
}
