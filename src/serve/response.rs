//! HTTP response handlers.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::utils::mime;

/// Client script injected into served HTML. Reconnects after the dev
/// server restarts; any message means "reload".
const RELOAD_SCRIPT: &str = r#"<script>
(function () {
    function connect() {
        var ws = new WebSocket("ws://" + location.hostname + ":__WS_PORT__/");
        ws.onmessage = function () { location.reload(); };
        ws.onclose = function () { setTimeout(connect, 1000); };
    }
    connect();
})();
</script>"#;

/// Respond with a static file, injecting the reload script into HTML.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = maybe_inject_reload(body, content_type, ws_port);
    send_body(request, 200, content_type, body)
}

/// Respond with a plain 404.
pub fn respond_not_found(request: Request, _ws_port: Option<u16>) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 404, mime::types::PLAIN);
    }
    send_body(request, 404, mime::types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(
        request,
        503,
        mime::types::PLAIN,
        b"503 Service Unavailable".to_vec(),
    )
}

/// Inject the reload script if content is HTML and the channel is up.
fn maybe_inject_reload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    match (content_type.starts_with("text/html"), ws_port) {
        (true, Some(port)) => inject_reload_script(&body, port),
        _ => body,
    }
}

/// Inject the reload script before the `</body>` tag.
fn inject_reload_script(content: &[u8], ws_port: u16) -> Vec<u8> {
    let script = RELOAD_SCRIPT.replace("__WS_PORT__", &ws_port.to_string());
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    // Reverse search for </body> using byte windows
    if let Some(pos) = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        let mut result = Vec::with_capacity(content.len() + script_bytes.len());
        result.extend_from_slice(&content[..pos]);
        result.extend_from_slice(script_bytes);
        result.extend_from_slice(&content[pos..]);
        return result;
    }

    // No </body> found, append to end (browsers handle this gracefully)
    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    result.extend_from_slice(content);
    result.extend_from_slice(script_bytes);
    result
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).expect("static header must be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_body_close() {
        let html = b"<html><body><p>hi</p></body></html>";
        let injected = inject_reload_script(html, 35729);
        let text = String::from_utf8(injected).unwrap();
        assert!(text.contains("35729"));
        assert!(text.find("WebSocket").unwrap() < text.find("</body>").unwrap());
    }

    #[test]
    fn test_inject_appends_without_body_tag() {
        let html = b"<p>fragment</p>";
        let injected = inject_reload_script(html, 35729);
        let text = String::from_utf8(injected).unwrap();
        assert!(text.starts_with("<p>fragment</p>"));
        assert!(text.contains("WebSocket"));
    }

    #[test]
    fn test_no_injection_for_non_html() {
        let css = b"body{margin:0}".to_vec();
        let out = maybe_inject_reload(css.clone(), mime::types::CSS, Some(35729));
        assert_eq!(out, css);
    }

    #[test]
    fn test_no_injection_without_channel() {
        let html = b"<body></body>".to_vec();
        let out = maybe_inject_reload(html.clone(), mime::types::HTML, None);
        assert_eq!(out, html);
    }
}
