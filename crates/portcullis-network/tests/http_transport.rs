//! Integration tests for HttpTransport
//!
//! These tests run the transport against a minimal HTTP/1.1 server on a local
//! TCP listener. They exercise real network I/O, status handling and timeouts.

use std::time::Duration;

use portcullis_network::{
    Channel, ChannelError, HttpTransport, HttpTransportConfig, Request, Transport,
};
use portcullis_protocol::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Accept one connection, capture the request head, answer with `status` and `body`.
async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (head_tx, head_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let head = read_head(&mut stream).await;
        let _ = head_tx.send(head);

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
    });

    (format!("http://{addr}/access"), head_rx)
}

/// Accept one connection and write `response` verbatim, then keep the
/// connection open until the client goes away.
async fn serve_raw(response: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _ = read_head(&mut stream).await;
        let _ = stream.write_all(response.as_bytes()).await;
        let mut rest = [0u8; 64];
        let _ = stream.read(&mut rest).await;
    });

    format!("http://{addr}/access")
}

async fn read_head(stream: &mut tokio::net::TcpStream) -> String {
    let mut head = Vec::new();
    let mut chunk = [0u8; 512];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        head.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&head).into_owned()
}

fn transport(server_url: String, timeout: Duration) -> HttpTransport {
    HttpTransport::new(HttpTransportConfig {
        server_url,
        timeout,
    })
    .unwrap()
}

/// Query goes on the request line, reader key goes in the cookie header
#[tokio::test]
async fn test_request_line_and_cookie() {
    let (url, head_rx) = serve_once("200 OK", "\"100 OK\"").await;
    let mut transport = transport(url, Duration::from_secs(2));

    let body = transport
        .exchange(Request::new("rid=0x1234567812345678&cid=0xaabbccdd").with_cookie("rkey=0xabcd"))
        .await
        .unwrap();
    assert_eq!(&body[..], b"\"100 OK\"");

    let head = head_rx.await.unwrap();
    let request_line = head.lines().next().unwrap();
    assert_eq!(
        request_line,
        "GET /access?rid=0x1234567812345678&cid=0xaabbccdd HTTP/1.1"
    );
    assert!(
        head.lines()
            .any(|l| l.eq_ignore_ascii_case("cookie: rkey=0xabcd"))
    );
}

/// A non-200 answer is a response status error, not a body
#[tokio::test]
async fn test_non_success_status() {
    let (url, _head_rx) = serve_once("503 Service Unavailable", "down").await;
    let mut transport = transport(url, Duration::from_secs(2));

    let err = transport.exchange(Request::new("rid=0x01")).await.unwrap_err();
    assert!(matches!(err, ChannelError::ResponseStatus { status: 503 }));
}

/// Nothing listening is a transport error
#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut transport = transport(format!("http://{addr}/"), Duration::from_secs(2));
    let err = transport.exchange(Request::new("rid=0x01")).await.unwrap_err();
    assert!(matches!(err, ChannelError::Transport { .. }));
}

/// A server that accepts but never answers hits the request timeout
#[tokio::test]
async fn test_request_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _ = read_head(&mut stream).await;
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let mut transport = transport(format!("http://{addr}/"), Duration::from_millis(200));
    let err = transport.exchange(Request::new("rid=0x01")).await.unwrap_err();
    assert!(err.is_timeout());
}

/// Full exchange through the channel with a quoted status body
#[tokio::test]
async fn test_channel_over_http() {
    let (url, _head_rx) = serve_once("200 OK", "\"403 Access denied\"\n").await;
    let mut channel = Channel::new(transport(url, Duration::from_secs(2)));

    let status = channel.exchange("rid=0x01", None).await.unwrap();
    assert_eq!(status.code, StatusCode::Parsed(403));
    assert_eq!(status.message, "Access denied");
}

/// A declared length above the limit is refused before the body is read
#[tokio::test]
async fn test_declared_length_over_limit() {
    let body = "x".repeat(4096);
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let url = serve_raw(response).await;
    let mut transport = transport(url, Duration::from_secs(2));

    let err = transport
        .exchange(Request::new("rid=0x01").with_max_response(64))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ChannelError::ResponseTooLarge {
            size: 4096,
            capacity: 64
        }
    ));
}

/// A chunked body with no declared length stops once it passes the limit
#[tokio::test]
async fn test_chunked_body_over_limit() {
    let chunk = "y".repeat(100);
    let mut response =
        String::from("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n");
    for _ in 0..20 {
        response.push_str(&format!("{:x}\r\n{chunk}\r\n", chunk.len()));
    }
    response.push_str("0\r\n\r\n");
    let url = serve_raw(response).await;
    let mut transport = transport(url, Duration::from_secs(2));

    let err = transport
        .exchange(Request::new("rid=0x01").with_max_response(256))
        .await
        .unwrap_err();
    match err {
        ChannelError::ResponseTooLarge { size, capacity } => {
            assert_eq!(capacity, 256);
            assert!(size > 256 && size <= 256 + chunk.len());
        }
        other => panic!("expected ResponseTooLarge, got {other:?}"),
    }
}

/// A chunked body within the limit is returned whole
#[tokio::test]
async fn test_chunked_body_within_limit() {
    let response = String::from(
        "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n4\r\n\"100\r\n4\r\n OK\"\r\n0\r\n\r\n",
    );
    let url = serve_raw(response).await;
    let mut transport = transport(url, Duration::from_secs(2));

    let body = transport
        .exchange(Request::new("rid=0x01").with_max_response(8))
        .await
        .unwrap();
    assert_eq!(&body[..], b"\"100 OK\"");
}

/// The channel hands its buffer capacity down to the transport
#[tokio::test]
async fn test_channel_limits_http_body() {
    let (url, _head_rx) = serve_once("200 OK", "\"200 Access granted, enjoy your stay\"").await;
    let mut channel = Channel::with_limits(
        transport(url, Duration::from_secs(2)),
        16,
        Duration::from_secs(2),
    );

    let err = channel.exchange("rid=0x01", None).await.unwrap_err();
    assert!(matches!(err, ChannelError::ResponseTooLarge { capacity: 16, .. }));
}
