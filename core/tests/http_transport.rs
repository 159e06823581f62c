//! HTTP integration tests: the reqwest transport against a local responder.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use toolbridge_core::client::HttpTransport;
use toolbridge_core::{ClientConfig, Error, RemoteToolClient, ToolError};

/// A request as seen by the responder
#[derive(Debug, Clone)]
struct Captured {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Helper: answer every connection with `status`/`body`, recording requests.
async fn start_responder(
    status: u16,
    body: &'static str,
) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));

    let log = captured.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let log = log.clone();
            tokio::spawn(async move {
                if let Some((request, stream)) = read_request(stream).await {
                    log.lock().await.push(request);
                    respond(stream, status, body).await;
                }
            });
        }
    });

    (format!("http://{}", addr), captured)
}

async fn read_request(mut stream: TcpStream) -> Option<(Captured, TcpStream)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next()?.to_string();
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let request_body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some((
        Captured {
            method,
            path,
            headers,
            body: request_body,
        },
        stream,
    ))
}

async fn respond(mut stream: TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    if stream.write_all(response.as_bytes()).await.is_ok() {
        let _ = stream.shutdown().await;
    }
}

/// Helper: an address nothing listens on.
async fn refused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Helper: a client that talks to the responder directly, ignoring proxy env vars.
fn direct_client(config: ClientConfig) -> RemoteToolClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    RemoteToolClient::with_transport(config, Arc::new(HttpTransport::with_client(http))).unwrap()
}

fn fast_config(endpoint: &str) -> ClientConfig {
    ClientConfig::new(endpoint, "test-key")
        .with_timeout(Duration::from_secs(5))
        .with_retry_delay(Duration::from_millis(10))
}

#[tokio::test]
async fn test_health_check_true_on_200() {
    let (endpoint, captured) = start_responder(200, r#"{"status":"ok"}"#).await;
    let client = direct_client(fast_config(&endpoint));

    assert!(client.check_connection().await);

    let requests = captured.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/api/health");
    assert_eq!(requests[0].header("authorization"), Some("Bearer test-key"));
    assert_eq!(requests[0].header("content-type"), Some("application/json"));
}

#[tokio::test]
async fn test_health_check_false_on_non_200() {
    let (endpoint, _) = start_responder(503, r#"{"status":"down"}"#).await;
    let client = direct_client(fast_config(&endpoint));

    assert!(!client.check_connection().await);
}

#[tokio::test]
async fn test_health_check_false_when_refused() {
    let endpoint = refused_endpoint().await;
    let client = direct_client(fast_config(&endpoint));

    assert!(!client.check_connection().await);
}

#[tokio::test]
async fn test_connect_is_lenient_when_server_is_down() {
    let endpoint = refused_endpoint().await;
    assert!(RemoteToolClient::connect(fast_config(&endpoint)).await.is_ok());

    let strict = fast_config(&endpoint).with_require_healthy(true);
    let err = RemoteToolClient::connect(strict).await.unwrap_err();
    assert!(matches!(err, Error::Connection { .. }));
}

#[tokio::test]
async fn test_execute_posts_payload() {
    let (endpoint, captured) = start_responder(200, r#"{"output":"hi\n","exit_code":0}"#).await;
    let endpoint_with_slash = format!("{}/", endpoint);
    let client = direct_client(fast_config(&endpoint_with_slash));

    let result = client
        .execute_bash("echo hi", Some("django.14520"), Some("conv-42"))
        .await
        .unwrap();
    assert_eq!(result, json!({"output": "hi\n", "exit_code": 0}));

    let requests = captured.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/v1/execute");
    assert_eq!(requests[0].header("authorization"), Some("Bearer test-key"));

    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(
        body,
        json!({
            "tool": "execute_bash",
            "parameters": {"command": "echo hi"},
            "conversation_id": "conv-42",
            "instance_id": "django.14520",
        })
    );
}

#[tokio::test]
async fn test_execute_exhausts_retries_on_server_error() {
    let (endpoint, captured) = start_responder(500, r#"{"error":"boom"}"#).await;
    let client = direct_client(fast_config(&endpoint));

    let err = client.execute_bash("ls", None, None).await.unwrap_err();
    match err {
        Error::Tool(ToolError::ExecutionFailed {
            attempts, detail, ..
        }) => {
            assert_eq!(attempts, 3);
            assert_eq!(detail, r#"{"error":"boom"}"#);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert_eq!(captured.lock().await.len(), 3);
}

#[tokio::test]
async fn test_execute_fails_after_refused_connections() {
    let endpoint = refused_endpoint().await;
    let client = direct_client(fast_config(&endpoint).with_max_attempts(2));

    let err = client.execute_bash("ls", None, None).await.unwrap_err();
    assert!(err.is_execution_failure());
    assert!(err.to_string().contains("after 2 attempts"));
}
