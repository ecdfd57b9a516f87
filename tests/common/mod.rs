//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A canned response from a mock backend.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub extra_headers: Vec<(String, String)>,
    pub body: String,
}

impl MockResponse {
    pub fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: Some("text/html; charset=utf-8".to_string()),
            extra_headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn text(content_type: &str, body: &str) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.to_string()),
            extra_headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[allow(dead_code)]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.extra_headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Start a mock backend that routes by method and path. Returning `None`
/// produces a plain 404. HEAD responses carry headers only.
pub async fn start_routed_backend<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn(String, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<MockResponse>> + Send + 'static,
{
    start_head_inspecting_backend(addr, move |head| {
        let mut request_line = head.lines().next().unwrap_or("").split(' ');
        let method = request_line.next().unwrap_or("").to_string();
        let path = request_line.next().unwrap_or("/").to_string();
        f(method, path)
    })
    .await;
}

/// Start a mock backend whose handler sees the raw request head (request
/// line plus headers), for asserting on what the proxy forwards.
pub async fn start_head_inspecting_backend<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<MockResponse>> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut raw = Vec::new();
                        let mut buf = [0u8; 1024];
                        // Read until end of headers; requests here have no body.
                        loop {
                            match socket.read(&mut buf).await {
                                Ok(0) => break,
                                Ok(n) => {
                                    raw.extend_from_slice(&buf[..n]);
                                    if raw.windows(4).any(|w| w == b"\r\n\r\n") {
                                        break;
                                    }
                                }
                                Err(_) => return,
                            }
                        }

                        let head = String::from_utf8_lossy(&raw).into_owned();
                        let method = head
                            .lines()
                            .next()
                            .unwrap_or("")
                            .split(' ')
                            .next()
                            .unwrap_or("")
                            .to_string();

                        let response = f(head).await.unwrap_or(MockResponse {
                            status: 404,
                            content_type: Some("text/plain".to_string()),
                            extra_headers: Vec::new(),
                            body: "not found".to_string(),
                        });

                        let status_text = match response.status {
                            200 => "OK",
                            404 => "Not Found",
                            500 => "Internal Server Error",
                            _ => "OK",
                        };
                        let mut header_lines = response
                            .content_type
                            .map(|ct| format!("Content-Type: {ct}\r\n"))
                            .unwrap_or_default();
                        for (name, value) in &response.extra_headers {
                            header_lines.push_str(&format!("{name}: {value}\r\n"));
                        }
                        let mut wire = format!(
                            "HTTP/1.1 {} {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n",
                            response.status,
                            status_text,
                            header_lines,
                            response.body.len(),
                        );
                        if method != "HEAD" {
                            wire.push_str(&response.body);
                        }

                        let _ = socket.write_all(wire.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// A page shaped like the sites this proxy fronts: head, body with one
/// header/footer, a freshness-marked time element and structured data.
pub const SAMPLE_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Financing Options</title></head>
<body class="landing">
<header><p>build-time placeholder</p></header>
<main>
<h1>Financing</h1>
<p>Reviewed <time data-updated datetime="1999-01-01">a long time ago</time>.</p>
<script type="application/ld+json">{"@context":"https://schema.org","@type":"WebPage","dateModified":"2024-01-01T00:00:00.000Z","name":"Financing"}</script>
</main>
<footer>build-time footer</footer>
</body>
</html>"#;

/// Header partial the mock content store serves.
pub const HEADER_PARTIAL: &str = r#"<a class="logo" href="/">Acme</a><nav><ul>
<li><a href="/">Home</a></li>
<li><a href="/costs">Costs</a></li>
<li><a href="/financing">Financing</a></li>
</ul></nav>"#;

/// Footer partial the mock content store serves.
pub const FOOTER_PARTIAL: &str = r#"<p>store footer</p>"#;

/// Start a content store serving the standard partials and stylesheets.
pub async fn start_full_store(addr: SocketAddr) {
    start_routed_backend(addr, |_method, path| async move {
        match path.as_str() {
            "/partials/header.html" => Some(MockResponse::html(HEADER_PARTIAL)),
            "/partials/footer.html" => Some(MockResponse::html(FOOTER_PARTIAL)),
            "/styles/main.css" => Some(MockResponse::text("text/css", "body{margin:0}")),
            "/styles/force-light.css" => {
                Some(MockResponse::text("text/css", ":root{color-scheme:light}"))
            }
            _ => None,
        }
    })
    .await;
}
