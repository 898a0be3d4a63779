//! Development server with live reload support.
//!
//! Serves the destination root as static files; the reload channel
//! watches the destination root itself, so any task write - initial
//! build, watch-triggered rebuild, even a manual `atelier sass` from
//! another shell - pushes a reload to connected browsers.

mod reload;
mod response;

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, anyhow};
use tiny_http::{Request, Server};

use crate::config::PipelineConfig;

/// Default WebSocket port for live reload
const DEFAULT_WS_PORT: u16 = 35729;

/// Maximum port retry attempts when the configured port is taken
const MAX_PORT_RETRIES: u16 = 10;

/// Set by the Ctrl-C handler; drains the request loop
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Serve the destination root until Ctrl-C.
pub fn run(config: Arc<PipelineConfig>) -> Result<()> {
    // The watcher needs the destination root to exist, served or not
    std::fs::create_dir_all(&config.paths.output)?;

    let (server, addr) = bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    setup_shutdown_handler(Arc::clone(&server))?;

    let ws_port = if config.serve.watch {
        Some(reload::start(DEFAULT_WS_PORT, Arc::clone(&config))?)
    } else {
        None
    };

    crate::log!("serve"; "http://{addr}");
    run_request_loop(&server, &config, ws_port);
    crate::log!("serve"; "shutting down");
    Ok(())
}

fn run_request_loop(server: &Server, config: &Arc<PipelineConfig>, ws_port: Option<u16>) {
    // Small pool so a slow disk read can't block other requests
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        if is_shutdown() {
            let _ = response::respond_unavailable(request);
            continue;
        }
        let config = Arc::clone(config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config, ws_port) {
                crate::log!("serve"; "request error: {e:#}");
            }
        });
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &PipelineConfig, ws_port: Option<u16>) -> Result<()> {
    match resolve_path(request.url(), &config.paths.output) {
        Some(path) => response::respond_file(request, &path, ws_port),
        None => response::respond_not_found(request, ws_port),
    }
}

/// Map a request URL onto a file below the destination root.
///
/// Directories resolve to their `index.html`; anything containing a
/// `..` component is rejected outright.
fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let rel = path.trim_start_matches('/');
    if rel.split('/').any(|part| part == "..") {
        return None;
    }

    let mut full = root.join(rel);
    if full.is_dir() {
        full = full.join("index.html");
    }
    full.is_file().then_some(full)
}

/// Try binding the HTTP server, retrying on the next ports if in use
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let addr = SocketAddr::new(interface, base_port.saturating_add(offset));
        match Server::http(addr) {
            Ok(server) => return Ok((server, addr)),
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow!(
        "failed to bind HTTP server after {} attempts: {}",
        MAX_PORT_RETRIES,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

fn setup_shutdown_handler(server: Arc<Server>) -> Result<()> {
    ctrlc::set_handler(move || {
        SHUTDOWN.store(true, Ordering::SeqCst);
        server.unblock();
    })
    .context("failed to install Ctrl-C handler")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_path_serves_files_and_indexes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("index.html"), "x").unwrap();
        fs::write(dir.path().join("css/style.css"), "y").unwrap();

        assert_eq!(
            resolve_path("/", dir.path()),
            Some(dir.path().join("index.html"))
        );
        assert_eq!(
            resolve_path("/css/style.css?v=2", dir.path()),
            Some(dir.path().join("css/style.css"))
        );
        assert_eq!(resolve_path("/missing.html", dir.path()), None);
    }

    #[test]
    fn test_resolve_path_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "x").unwrap();
        assert_eq!(resolve_path("/../secret", dir.path()), None);
        assert_eq!(resolve_path("/css/../../etc/passwd", dir.path()), None);
    }
}
