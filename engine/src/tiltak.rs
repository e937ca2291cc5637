use crate::tei::{TeiCommand, TeiError};
use crate::EngineHandle;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;

/// Binary names a TEI engine is commonly installed under.
const ENGINE_NAMES: &[&str] = &["tiltak", "tei"];

/// Common install locations checked before falling back to `PATH`.
const ENGINE_DIRS: &[&str] = &["/usr/local/bin", "/usr/bin", "/opt/homebrew/bin"];

/// How to launch the engine process.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Explicit binary path. When unset, the binary is searched for.
    pub path: Option<PathBuf>,
    pub args: Vec<String>,
    /// Shows up in log spans to tell engine instances apart.
    pub label: Option<String>,
}

/// A running engine process.
///
/// The protocol conversation lives in the [`EngineHandle`] returned by
/// [`TiltakEngine::spawn`]; this struct only keeps what is needed to stop
/// the process.
pub struct TiltakEngine {
    process: Child,
    stdin: mpsc::Sender<String>,
}

impl TiltakEngine {
    /// Spawn the engine and wire its stdin/stdout to line channels.
    ///
    /// No protocol traffic is sent here; the session performs the handshake
    /// lazily.
    #[tracing::instrument(level = "info", skip(config), fields(label = ?config.label))]
    pub async fn spawn(config: EngineConfig) -> Result<(Self, EngineHandle), TeiError> {
        let path = match config.path {
            Some(path) => path,
            None => find_engine_path()
                .ok_or_else(|| TeiError::EngineNotFound(ENGINE_NAMES.join(", ")))?,
        };
        tracing::info!("Spawning TEI engine at {:?}", path);

        let mut process = tokio::process::Command::new(&path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                tracing::error!("Failed to spawn engine: {}", e);
                TeiError::Spawn(e)
            })?;

        let mut stdin = process.stdin.take().ok_or(TeiError::NoStdin)?;
        let stdout = process.stdout.take().ok_or(TeiError::NoStdout)?;

        let (line_tx, line_rx) = mpsc::channel::<String>(256);
        let (stdin_tx, mut stdin_rx) = mpsc::channel::<String>(32);

        // stdout -> session. Dropping line_tx on exit is what tells the
        // session the engine is gone.
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        tracing::warn!("Engine stdout EOF - engine closed");
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        tracing::trace!("TEI << {}", trimmed);
                        if line_tx.send(trimmed.to_string()).await.is_err() {
                            tracing::debug!("Session dropped engine output channel");
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Error reading from engine stdout: {}", e);
                        break;
                    }
                }
            }
            tracing::info!("Output reader task exiting");
        });

        // session -> stdin, strictly in arrival order
        tokio::spawn(async move {
            while let Some(cmd) = stdin_rx.recv().await {
                let trimmed = cmd.trim();
                tracing::trace!("TEI >> {}", trimmed);

                if let Err(e) = stdin.write_all(format!("{}\n", trimmed).as_bytes()).await {
                    tracing::error!("Failed to write to stdin: {}", e);
                    break;
                }
                if let Err(e) = stdin.flush().await {
                    tracing::error!("Failed to flush stdin: {}", e);
                    break;
                }
            }
            tracing::info!("Stdin writer task exiting");
        });

        tracing::info!("TEI engine spawned (pid {:?})", process.id());
        Ok((
            Self {
                process,
                stdin: stdin_tx.clone(),
            },
            EngineHandle {
                tx: stdin_tx,
                rx: line_rx,
            },
        ))
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.id()
    }

    /// Ask the engine to quit, then make sure it is gone.
    pub async fn shutdown(mut self) {
        tracing::info!("Sending quit command to engine");
        let _ = self.stdin.send(TeiCommand::Quit.to_string()).await;
        let _ = tokio::time::timeout(Duration::from_secs(1), self.process.wait()).await;
        let _ = self.process.kill().await;
    }
}

/// Find an engine executable next to this binary, in common locations, or on `PATH`.
pub fn find_engine_path() -> Option<PathBuf> {
    let sibling_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    let path_dirs: Vec<PathBuf> = std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).collect())
        .unwrap_or_default();

    let dirs = sibling_dir
        .into_iter()
        .chain(ENGINE_DIRS.iter().map(PathBuf::from))
        .chain(path_dirs);

    for dir in dirs {
        for name in ENGINE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    None
}
