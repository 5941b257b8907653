#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};

use tracing_subscriber::EnvFilter;

use tscat_core::{protocol, services};

const LOG_ENV: &str = "TSCAT_LOG";

// stdout carries the protocol, so logs go to stderr
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

fn main() {
    init_tracing();

    let cfg = services::config::load();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tscat-core started");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!("failed to read request line: {e}");
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = std::panic::catch_unwind(|| protocol::handle(&line, &cfg));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => {
                tracing::error!("request handler panicked");
                serde_json::json!({
                    "status": "error",
                    "message": "internal core error"
                })
                .to_string()
            }
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }

    tracing::info!("stdin closed, shutting down");
}
