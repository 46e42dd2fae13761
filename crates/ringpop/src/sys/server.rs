use crate::events::AppEvent;
use async_channel::Sender;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

pub const SOCKET_PATH: &str = "/tmp/ringpop.sock";

/// Maps one line of the control protocol to an event.
pub fn parse_command(line: &str) -> Option<AppEvent> {
    match line.trim() {
        "show" => Some(AppEvent::Show),
        "hide" => Some(AppEvent::Hide),
        "reload" => Some(AppEvent::ConfigReload),
        _ => None,
    }
}

/// Client side: deliver a single command to a running daemon.
pub fn send_command(cmd: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!("Could not connect to ringpop at {}: {}", SOCKET_PATH, e)
    })?;
    writeln!(stream, "{}", cmd)?;
    Ok(())
}

/// Removes a socket left by a previous daemon. A missing file is not an error.
fn clear_stale_socket(path: &Path) -> std::io::Result<()> {
    if fs_err::symlink_metadata(path).is_err() {
        return Ok(());
    }
    fs_err::remove_file(path)
}

pub async fn run_server(tx: Sender<AppEvent>) {
    if let Err(e) = clear_stale_socket(Path::new(SOCKET_PATH)) {
        log::warn!("Failed to remove stale socket: {}", e);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };
    log::info!("Listening on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match parse_command(&line) {
                            Some(event) => {
                                if tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            None => log::warn!("Unknown command: {:?}", line.trim()),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("show\n"), Some(AppEvent::Show));
        assert_eq!(parse_command("  hide "), Some(AppEvent::Hide));
        assert_eq!(parse_command("reload"), Some(AppEvent::ConfigReload));
        assert_eq!(parse_command("SHOW"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_clear_stale_socket() {
        let dir = std::env::temp_dir().join(format!("ringpop-sock-{}", std::process::id()));
        fs_err::create_dir_all(&dir).unwrap();

        let stale = dir.join("stale.sock");
        assert!(clear_stale_socket(&stale).is_ok());
        fs_err::write(&stale, b"").unwrap();
        assert!(clear_stale_socket(&stale).is_ok());
        assert!(!stale.exists());

        // a directory in the way cannot be unlinked and must surface an error
        let blocked = dir.join("blocked.sock");
        fs_err::create_dir_all(&blocked).unwrap();
        assert!(clear_stale_socket(&blocked).is_err());

        fs_err::remove_dir_all(&dir).unwrap();
    }
}
