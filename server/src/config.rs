//! Configuration for the taktty session host
//!
//! Every value has a compiled default and can be overridden by an environment
//! variable. Command-line flags (see `main`) take precedence over both.
//!
//! | Variable             | Default                          |
//! |----------------------|----------------------------------|
//! | `TAKTTY_ENGINE_PATH` | search for `tiltak` / `tei`      |
//! | `TAKTTY_BOARD_SIZE`  | `6`                              |
//! | `TAKTTY_HALF_KOMI`   | `4`                              |
//! | `TAKTTY_MOVETIME`    | `1000000`                        |
//! | `TAKTTY_LOG_DIR`     | `~/.local/state/taktty/logs`     |

use engine::{EngineConfig, TeiSettings};
use std::path::PathBuf;
use std::str::FromStr;

/// Empty 6x6 board, white to move, first move.
pub const DEFAULT_TPS: &str = "x6/x6/x6/x6/x6/x6 1 1";

const DEFAULT_STATE_DIR: &str = ".local/state/taktty/logs";
const DEV_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tei: TeiSettings,
    pub engine_path: Option<PathBuf>,
    pub engine_args: Vec<String>,
    pub log_dir: PathBuf,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Values that fail to parse
    /// fall back to their defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = TeiSettings::default();
        let tei = TeiSettings {
            board_size: parse_var(&lookup, "TAKTTY_BOARD_SIZE").unwrap_or(defaults.board_size),
            half_komi: parse_var(&lookup, "TAKTTY_HALF_KOMI").unwrap_or(defaults.half_komi),
            movetime: parse_var(&lookup, "TAKTTY_MOVETIME").unwrap_or(defaults.movetime),
        };

        let log_dir = match lookup("TAKTTY_LOG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => match lookup("HOME") {
                Some(home) => PathBuf::from(home).join(DEFAULT_STATE_DIR),
                None => PathBuf::from(DEV_LOG_DIR),
            },
        };

        Self {
            tei,
            engine_path: lookup("TAKTTY_ENGINE_PATH").map(PathBuf::from),
            engine_args: Vec::new(),
            log_dir,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            path: self.engine_path.clone(),
            args: self.engine_args.clone(),
            label: Some(format!("{}x{}", self.tei.board_size, self.tei.board_size)),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}
