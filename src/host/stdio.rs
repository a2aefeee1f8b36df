//! Stdin/stdout JSON bridge for the host command channel.
//!
//! Reads newline-delimited JSON `CommandEnvelope` messages, dispatches them
//! through a [`CommandRouter`], and writes one `ResponseEnvelope` line per
//! command.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::error::{PlannerError, Result};
use crate::host::contract::{CommandEnvelope, CommandName, ResponseEnvelope};
use crate::host::handler::CommandRouter;
use crate::store::TaskStore;

/// Run the bridge on the process's stdin and stdout until stdin closes or a
/// `host.stop` command is received.
pub async fn run_stdio_bridge<S: TaskStore + 'static>(
    router: Arc<CommandRouter<S>>,
) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = BufWriter::new(tokio::io::stdout());
    run_bridge(router, reader, writer).await
}

/// Serve commands from `reader`, writing responses to `writer`.
///
/// Storage work runs on the blocking pool so the reader never stalls the
/// runtime. Commands are handled strictly one at a time, in arrival order.
pub async fn run_bridge<S, R, W>(
    router: Arc<CommandRouter<S>>,
    mut reader: R,
    mut writer: W,
) -> Result<()>
where
    S: TaskStore + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();

    loop {
        line.clear();
        let bytes_read = reader.read_until(b'\n', &mut line).await?;

        // EOF
        if bytes_read == 0 {
            tracing::info!("stdin closed (EOF); shutting down host bridge");
            break;
        }

        let trimmed = match std::str::from_utf8(&line) {
            Ok(text) => text.trim(),
            Err(e) => {
                tracing::warn!(error = %e, len = line.len(), "command line is not valid UTF-8");
                let response = ResponseEnvelope::error(
                    "parse-error",
                    format!("command line is not valid UTF-8: {e}"),
                );
                write_line(&mut writer, &serde_json::to_string(&response)?).await?;
                continue;
            }
        };
        if trimmed.is_empty() {
            continue;
        }

        let envelope: CommandEnvelope = match serde_json::from_str(trimmed) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    raw_line = %trimmed,
                    "failed to parse command envelope"
                );
                let response = ResponseEnvelope::error(
                    "parse-error",
                    format!("failed to parse command envelope: {e}"),
                );
                write_line(&mut writer, &serde_json::to_string(&response)?).await?;
                continue;
            }
        };

        let is_stop = envelope.command == CommandName::HostStop;

        let worker = Arc::clone(&router);
        let request_id = envelope.request_id.clone();
        let response = match tokio::task::spawn_blocking(move || worker.dispatch(&envelope)).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(error = %e, "host command dispatch panicked");
                ResponseEnvelope::error(request_id, format!("dispatch failed: {e}"))
            }
        };

        write_line(&mut writer, &serde_json::to_string(&response)?).await?;

        if is_stop {
            tracing::info!("host.stop received; shutting down host bridge");
            break;
        }
    }

    Ok(())
}

/// Write a single JSON line and flush.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> Result<()> {
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await.map_err(PlannerError::from)
}
