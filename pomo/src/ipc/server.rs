//! Unix domain socket server for IPC

use crate::timer::SessionTimer;
use anyhow::Result;
use pomo_ipc::{Command, Response, SOCKET_PATH};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{error, info};

/// Serve control commands against the one shared session timer. The
/// caller hands in the same instance the TUI renders, so both surfaces
/// observe identical state.
pub async fn start(timer: SessionTimer) -> Result<()> {
    // Remove old socket if it exists
    let _ = std::fs::remove_file(SOCKET_PATH);

    let listener = UnixListener::bind(SOCKET_PATH)?;
    info!("IPC server listening on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let timer = timer.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, timer).await {
                        error!("Error handling client: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

async fn handle_client(stream: UnixStream, timer: SessionTimer) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    reader.read_line(&mut line).await?;
    let command: Command = serde_json::from_str(&line)?;

    let response = match command {
        Command::Start => {
            // The controller never rejects a start; the empty-activity
            // precondition is enforced here, at the calling layer.
            if timer.snapshot().await.current_activity.is_empty() {
                Response::Error("no activity set - use set-activity first".to_string())
            } else {
                timer.start().await;
                Response::Ok
            }
        }
        Command::Pause => {
            timer.pause().await;
            Response::Ok
        }
        Command::Reset => {
            timer.reset().await;
            Response::Ok
        }
        Command::SetActivity { name } => {
            if name.trim().is_empty() {
                Response::Error("activity name must not be empty".to_string())
            } else {
                timer.set_activity(name).await;
                Response::Ok
            }
        }
        Command::Status => Response::Status(timer.snapshot().await),
        Command::History => Response::History(timer.snapshot().await.completed_activities),
    };

    let response_json = serde_json::to_vec(&response)?;
    writer.write_all(&response_json).await?;

    Ok(())
}
