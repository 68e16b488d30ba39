//! Line-delimited JSON transport for host commands and messages

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::protocol::{HostCommand, HostMsg};

/// Transport failures
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Forward parsed command lines into the session
///
/// Malformed lines are logged and skipped. Returns at end of input, after
/// forwarding `quit`, or when the session stops listening.
pub async fn read_commands<R>(reader: R, command_tx: mpsc::Sender<HostCommand>) -> Result<(), HostError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<HostCommand>(line) {
            Ok(command) => {
                let quit = command == HostCommand::Quit;
                if command_tx.send(command).await.is_err() {
                    debug!("Command channel closed");
                    break;
                }
                if quit {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse host command");
            }
        }
    }

    debug!("Command reader finished");
    Ok(())
}

/// Write outgoing messages as JSON lines until the session drops its sender
pub async fn write_messages<W>(mut writer: W, mut msg_rx: mpsc::Receiver<HostMsg>) -> Result<(), HostError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(msg) = msg_rx.recv().await {
        let mut line = serde_json::to_vec(&msg)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::PlayerSlot;
    use tokio::io::BufReader;
    use tokio_test::io::Builder;

    #[test]
    fn reads_commands_and_skips_garbage() {
        tokio_test::block_on(async {
            let mock = Builder::new()
                .read(b"{\"type\":\"start_match\"}\nnot json\n\n")
                .read(b"{\"type\":\"input\",\"player\":\"p1\",\"jump\":true}\n")
                .build();
            let (tx, mut rx) = mpsc::channel(8);

            read_commands(BufReader::new(mock), tx).await.unwrap();

            assert_eq!(rx.recv().await, Some(HostCommand::StartMatch));
            match rx.recv().await {
                Some(HostCommand::Input { player, input }) => {
                    assert_eq!(player, PlayerSlot::One);
                    assert!(input.jump);
                }
                other => panic!("unexpected command: {other:?}"),
            }
            assert_eq!(rx.recv().await, None);
        });
    }

    #[test]
    fn stops_after_quit() {
        tokio_test::block_on(async {
            let mock = Builder::new()
                .read(b"{\"type\":\"quit\"}\n")
                .build();
            let (tx, mut rx) = mpsc::channel(8);

            read_commands(BufReader::new(mock), tx).await.unwrap();

            assert_eq!(rx.recv().await, Some(HostCommand::Quit));
            assert_eq!(rx.recv().await, None);
        });
    }

    #[test]
    fn writes_one_json_line_per_message() {
        tokio_test::block_on(async {
            let mock = Builder::new()
                .write(b"{\"type\":\"error\",\"code\":\"c\",\"message\":\"m\"}\n")
                .build();
            let (tx, rx) = mpsc::channel(8);
            tx.send(HostMsg::Error {
                code: "c".to_string(),
                message: "m".to_string(),
            })
            .await
            .unwrap();
            drop(tx);

            write_messages(mock, rx).await.unwrap();
        });
    }
}
