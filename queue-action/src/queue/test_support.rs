//! Local HTTP stub standing in for the queue service in tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// Publicly documented development storage account.
pub(crate) const DEV_ACCOUNT: &str = "devstoreaccount1";
pub(crate) const DEV_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT4Am+KbJ8VP8C/AGoaqt+FqE6Ghpm0ejXHMiDgExKbd8UJtMkQ==";

pub(crate) fn http_response(status: &str, extra_headers: &str, body: &str) -> String {
    let entity_headers = if body.is_empty() {
        String::new()
    } else {
        format!("Content-Type: application/xml\r\nContent-Length: {}\r\n", body.len())
    };
    format!("HTTP/1.1 {status}\r\n{entity_headers}Connection: close\r\n{extra_headers}\r\n{body}")
}

/// Accept one connection, answer with `response`, return the raw request.
pub(crate) async fn serve_once(response: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let content_length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + content_length {
                    break;
                }
            }
        }

        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&buf).into_owned()
    });

    (format!("http://{}/{}", addr, DEV_ACCOUNT), handle)
}
