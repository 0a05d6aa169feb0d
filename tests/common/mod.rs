//! In-process HTTP/1.1 server for integration tests.
//!
//! Routes are keyed by `"METHOD /path"`. Each reply body is written as a
//! sequence of separate chunks with a short pause between them, so stream
//! decoding sees realistic chunk boundaries. Unknown routes answer 404.
//! Bodies are close-delimited unless the reply asks for chunked framing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Body ends when the connection closes.
    Close,
    /// `transfer-encoding: chunked`; `complete: false` closes the socket
    /// before the terminating zero-length chunk.
    Chunked { complete: bool },
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub chunks: Vec<Vec<u8>>,
    pub framing: Framing,
}

impl Reply {
    pub fn json(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            chunks: vec![body.to_string().into_bytes()],
            framing: Framing::Close,
        }
    }

    pub fn raw(status: u16, content_type: &'static str, body: &str) -> Self {
        Self {
            status,
            content_type,
            chunks: vec![body.as_bytes().to_vec()],
            framing: Framing::Close,
        }
    }

    pub fn sse<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status: 200,
            content_type: "text/event-stream",
            chunks: lines.into_iter().map(|l| l.into().into_bytes()).collect(),
            framing: Framing::Close,
        }
    }

    /// Same body, sent with chunked transfer encoding and cut off before the
    /// final chunk, so the client sees a body error mid-stream.
    pub fn truncated(self) -> Self {
        Self { framing: Framing::Chunked { complete: false }, ..self }
    }
}

/// `data: {...}\n` carrying one content token.
pub fn token_line(token: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"id": "gen-1", "choices": [{"index": 0, "delta": {"content": token}, "finish_reason": null}]})
    )
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

pub struct MockServer {
    pub base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(routes: Vec<(&str, Reply)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let routes: Arc<HashMap<String, Reply>> =
            Arc::new(routes.into_iter().map(|(k, v)| (k.to_string(), v)).collect());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else { break };
                let routes = Arc::clone(&routes);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let _ = handle(socket, routes, seen).await;
                });
            }
        });

        Self { base: format!("http://{addr}"), requests, task }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle(
    mut socket: TcpStream,
    routes: Arc<HashMap<String, Reply>>,
    seen: Arc<Mutex<Vec<Recorded>>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];

    let (method, path, headers, header_len) = loop {
        let n = socket.read(&mut tmp).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&tmp[..n]);

        let mut raw = [httparse::EMPTY_HEADER; 32];
        let mut req = httparse::Request::new(&mut raw);
        if let Ok(httparse::Status::Complete(len)) = req.parse(&buf) {
            let headers: HashMap<String, String> = req
                .headers
                .iter()
                .map(|h| (h.name.to_ascii_lowercase(), String::from_utf8_lossy(h.value).into_owned()))
                .collect();
            break (
                req.method.unwrap_or("").to_string(),
                req.path.unwrap_or("").to_string(),
                headers,
                len,
            );
        }
    };

    let content_length: usize =
        headers.get("content-length").and_then(|v| v.parse().ok()).unwrap_or(0);
    while buf.len() < header_len + content_length {
        let n = socket.read(&mut tmp).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
    let body = buf[header_len..].to_vec();

    let key = format!("{method} {path}");
    seen.lock().unwrap().push(Recorded { method, path, headers, body });

    let reply = routes
        .get(&key)
        .cloned()
        .unwrap_or_else(|| Reply::raw(404, "text/plain", "not found"));

    let encoding = match reply.framing {
        Framing::Close => "",
        Framing::Chunked { .. } => "transfer-encoding: chunked\r\n",
    };
    let head = format!(
        "HTTP/1.1 {} Mock\r\ncontent-type: {}\r\n{}connection: close\r\n\r\n",
        reply.status, reply.content_type, encoding
    );
    socket.write_all(head.as_bytes()).await?;
    for chunk in &reply.chunks {
        match reply.framing {
            Framing::Close => socket.write_all(chunk).await?,
            Framing::Chunked { .. } => {
                socket.write_all(format!("{:x}\r\n", chunk.len()).as_bytes()).await?;
                socket.write_all(chunk).await?;
                socket.write_all(b"\r\n").await?;
            }
        }
        socket.flush().await?;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    if reply.framing == (Framing::Chunked { complete: true }) {
        socket.write_all(b"0\r\n\r\n").await?;
    }
    socket.shutdown().await?;
    Ok(())
}
