//! Live reload: WebSocket broadcaster driven by destination writes.
//!
//! A `notify` subscription on the destination root feeds a settle
//! window; each burst of writes broadcasts exactly one reload message
//! to every connected client.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use notify::{RecursiveMode, Watcher};
use parking_lot::Mutex;
use tungstenite::{Message, WebSocket};

use crate::config::PipelineConfig;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Quiet window before a burst of writes broadcasts a single reload
const RELOAD_SETTLE_MS: u64 = 150;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Start the reload channel; returns the actually bound port.
pub(super) fn start(base_port: u16, config: Arc<PipelineConfig>) -> Result<u16> {
    let (listener, port) = try_bind_port(base_port, MAX_PORT_RETRIES)?;
    let clients: Clients = Arc::new(Mutex::new(Vec::new()));

    spawn_acceptor(listener, Arc::clone(&clients));
    spawn_broadcaster(&config, clients)?;

    crate::debug!("reload"; "ws://localhost:{port}");
    Ok(port)
}

/// Accept incoming WebSocket clients and park them in the shared list.
fn spawn_acceptor(listener: TcpListener, clients: Clients) {
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => match tungstenite::accept(stream) {
                    Ok(ws) => {
                        crate::debug!("reload"; "client connected");
                        clients.lock().push(ws);
                    }
                    Err(e) => crate::debug!("reload"; "handshake failed: {e}"),
                },
                Err(e) => crate::log!("reload"; "accept error: {e}"),
            }
        }
    });
}

/// Watch the destination root and broadcast once per write burst.
fn spawn_broadcaster(config: &PipelineConfig, clients: Clients) -> Result<()> {
    let (tx, rx) = crossbeam_channel::unbounded::<()>();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if res.is_ok() {
            let _ = tx.send(());
        }
    })
    .context("failed to create reload watcher")?;
    watcher
        .watch(&config.paths.output, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", config.paths.output.display()))?;

    std::thread::spawn(move || {
        // The subscription dies with this thread
        let _watcher = watcher;
        while rx.recv().is_ok() {
            // A build writes many files; coalesce the burst
            while rx
                .recv_timeout(Duration::from_millis(RELOAD_SETTLE_MS))
                .is_ok()
            {}
            broadcast(&clients);
        }
    });
    Ok(())
}

/// Send a reload message to every client, dropping dead connections.
fn broadcast(clients: &Clients) {
    let mut clients = clients.lock();
    let before = clients.len();
    clients.retain_mut(|ws| ws.send(Message::Text("reload".into())).is_ok());
    crate::debug!("reload"; "notified {} client(s)", clients.len());
    if clients.len() < before {
        crate::debug!("reload"; "dropped {} dead client(s)", before - clients.len());
    }
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(format!("127.0.0.1:{port}")) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow!(
        "failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_bind_port_skips_taken_port() {
        let (first, port) = try_bind_port(0, 1).unwrap();
        // Port 0 asks the OS for an ephemeral port
        assert_ne!(port, 0);

        // Binding the same concrete port again must fall through to the next one
        let result = try_bind_port(port, 10).unwrap();
        assert_ne!(result.1, port);
        drop(first);
    }
}
