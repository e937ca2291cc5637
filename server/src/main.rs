mod config;
mod console;
mod session;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use config::{SessionConfig, DEFAULT_TPS};
use console::{parse_console_input, render_event, render_snapshot, ConsoleInput, USAGE};
use engine::{EngineHandle, TiltakEngine};
use session::SessionHandle;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Console analysis board for a TEI Tak engine.
#[derive(Parser)]
#[command(name = "taktty", about = "Analyse Tak positions with a TEI engine")]
struct Cli {
    /// Engine binary. Defaults to TAKTTY_ENGINE_PATH, then a search for tiltak.
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Extra argument passed to the engine (repeatable).
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    #[arg(long)]
    size: Option<u8>,

    #[arg(long, allow_negative_numbers = true)]
    half_komi: Option<i8>,

    /// Value for `go movetime`.
    #[arg(long)]
    movetime: Option<u64>,

    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Starting position in TPS.
    #[arg(long, default_value = DEFAULT_TPS)]
    tps: String,
}

impl Cli {
    fn apply(&self, config: &mut SessionConfig) {
        if let Some(ref path) = self.engine {
            config.engine_path = Some(path.clone());
        }
        if !self.engine_args.is_empty() {
            config.engine_args = self.engine_args.clone();
        }
        if let Some(size) = self.size {
            config.tei.board_size = size;
        }
        if let Some(half_komi) = self.half_komi {
            config.tei.half_komi = half_komi;
        }
        if let Some(movetime) = self.movetime {
            config.tei.movetime = movetime;
        }
        if let Some(ref dir) = self.log_dir {
            config.log_dir = dir.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SessionConfig::from_env();
    cli.apply(&mut config);

    // Logs go to a file so they never interleave with console output
    std::fs::create_dir_all(&config.log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "taktty");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("taktty starting up (config: {:?})", config);

    let (mut process, engine) = match spawn_engine(&config).await {
        Some((process, engine)) => (Some(process), Some(engine)),
        None => (None, None),
    };

    let handle = session::spawn_session(config.tei, cli.tps.clone(), engine);
    let (snapshot, mut events) = handle.subscribe().await?;

    println!("taktty - {}", USAGE);
    println!("Debug logs: {}/taktty.YYYY-MM-DD", config.log_dir.display());
    println!("{}", render_snapshot(&snapshot));

    let show_log = Arc::new(AtomicBool::new(false));
    let printer_log = show_log.clone();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = render_event(&event, printer_log.load(Ordering::Relaxed)) {
                        println!("{}", line);
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Console skipped {} events", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(input) = parse_console_input(&line) else {
            if !line.trim().is_empty() {
                println!("{}", USAGE);
            }
            continue;
        };

        match input {
            ConsoleInput::Quit => break,
            ConsoleInput::Log => {
                let enabled = !show_log.fetch_xor(true, Ordering::Relaxed);
                println!("Protocol log {}", if enabled { "on" } else { "off" });
            }
            ConsoleInput::Restart => {
                if let Some(old) = process.take() {
                    old.shutdown().await;
                }
                if let Some((new_process, engine)) = spawn_engine(&config).await {
                    process = Some(new_process);
                    handle.restart(engine).await?;
                }
            }
            input => run_intent(&handle, input).await?,
        }
    }

    tracing::info!("taktty shutting down");
    handle.shutdown().await;
    if let Some(process) = process {
        process.shutdown().await;
    }
    Ok(())
}

async fn run_intent(handle: &SessionHandle, input: ConsoleInput) -> anyhow::Result<()> {
    match input {
        ConsoleInput::Go(text) => {
            let text = match text {
                Some(text) => text,
                None => handle.get_snapshot().await?.position,
            };
            handle.request_analysis(text).await?;
        }
        ConsoleInput::Stop => handle.stop().await?,
        ConsoleInput::Next => {
            let snapshot = handle.apply_best_move().await?;
            if !snapshot.can_apply_next {
                println!("No main line to continue with yet");
            }
        }
        ConsoleInput::Undo => {
            if handle.undo().await?.is_none() {
                println!("Nothing to undo");
            }
        }
        ConsoleInput::Reset => {
            handle.reset_to_base().await?;
        }
        ConsoleInput::Status => println!("{}", render_snapshot(&handle.get_snapshot().await?)),
        ConsoleInput::Restart | ConsoleInput::Log | ConsoleInput::Quit => {}
    }
    Ok(())
}

/// Spawn the engine, reporting failure on the console instead of exiting so
/// the user can fix the setup and `restart`.
async fn spawn_engine(config: &SessionConfig) -> Option<(TiltakEngine, EngineHandle)> {
    match TiltakEngine::spawn(config.engine_config()).await {
        Ok(spawned) => Some(spawned),
        Err(e) => {
            tracing::error!("Failed to start engine: {}", e);
            eprintln!("Failed to start engine: {}", e);
            None
        }
    }
}
