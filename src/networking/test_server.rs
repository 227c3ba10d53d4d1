//! Minimal HTTP/1.1 responder for transfer tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// How the stub answers HEAD requests.
#[derive(Clone, Copy, Debug)]
pub(crate) enum HeadReply {
    /// 200 with the body length in `Content-Length`.
    Length,
    /// 405, so the size stays unknown.
    Reject,
}

pub(crate) struct StubServer {
    addr: SocketAddr,
    posted: Arc<Mutex<Vec<u8>>>,
}

impl StubServer {
    /// Serve `body` for every GET except `/missing`, which is a 404.
    pub(crate) async fn start(body: Vec<u8>, head: HeadReply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let posted = Arc::new(Mutex::new(Vec::new()));
        let body = Arc::new(body);

        let sink = posted.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let body = body.clone();
                let sink = sink.clone();
                tokio::spawn(async move {
                    let _ = respond(stream, &body, head, &sink).await;
                });
            }
        });

        Self { addr, posted }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub(crate) async fn last_post(&self) -> Vec<u8> {
        self.posted.lock().await.clone()
    }
}

/// A local URL nothing is listening on.
pub(crate) async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/versions")
}

async fn respond(
    mut stream: TcpStream,
    body: &[u8],
    head: HeadReply,
    posted: &Mutex<Vec<u8>>,
) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..n]);
        if let Some(pos) = find(&request, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head_text = String::from_utf8_lossy(&request[..header_end]).into_owned();
    let mut request_line = head_text.lines().next().unwrap_or("").split_whitespace();
    let method = request_line.next().unwrap_or("").to_owned();
    let path = request_line.next().unwrap_or("/").to_owned();

    if method == "POST" {
        let length = head_text
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while request.len() < header_end + length {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        *posted.lock().await = request[header_end..].to_vec();
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .await?;
        return stream.shutdown().await;
    }

    if path == "/missing" {
        stream
            .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .await?;
        return stream.shutdown().await;
    }

    if method == "HEAD" {
        let reply = match head {
            HeadReply::Length => format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            ),
            HeadReply::Reject => {
                "HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    .to_owned()
            }
        };
        stream.write_all(reply.as_bytes()).await?;
        return stream.shutdown().await;
    }

    // No Content-Length: the body runs until the connection closes.
    stream
        .write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n")
        .await?;
    stream.write_all(body).await?;
    stream.shutdown().await
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
