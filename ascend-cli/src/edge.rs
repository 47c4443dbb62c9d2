//! HTTP client for the `manual-task-template` edge function.

use anyhow::{Context, Result};
use ascend_core::{SinkError, TaskSink, TaskSubmission, UNKNOWN_ERROR};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use crate::config::{Config, Credentials};

pub const ADMIN_KEY_HEADER: &str = "x-ascend-admin-key";
pub const API_KEY_HEADER: &str = "apikey";

pub struct EdgeClient {
    client: reqwest::Client,
    url: String,
    headers: HeaderMap,
}

impl EdgeClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let creds = cfg.credentials()?;
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("ascend-cli/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = cfg.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("build http client")?;
        Self::with_client(client, &cfg.endpoint.url, &creds)
    }

    pub fn with_client(client: reqwest::Client, url: &str, creds: &Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            ADMIN_KEY_HEADER,
            HeaderValue::from_str(&creds.admin_key).context("admin key is not a valid header value")?,
        );
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&creds.api_key).context("API key is not a valid header value")?,
        );
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", creds.api_key))
            .context("API key is not a valid header value")?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        Ok(Self {
            client,
            url: url.to_string(),
            headers,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Operator message for a non-success response body.
pub fn rejection_message(body: &Value) -> String {
    match body.get("error") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Null) | Some(Value::Bool(false)) | None => UNKNOWN_ERROR.to_string(),
        Some(Value::String(_)) => UNKNOWN_ERROR.to_string(),
        Some(other) => other.to_string(),
    }
}

fn transport_error(e: reqwest::Error) -> SinkError {
    if e.is_timeout() {
        SinkError::Transport(format!("request timed out ({e})"))
    } else {
        SinkError::Transport(e.to_string())
    }
}

#[async_trait]
impl TaskSink for EdgeClient {
    async fn create_task(&self, task: &TaskSubmission) -> Result<(), SinkError> {
        debug!(url = %self.url, title = task.title(), "posting task");

        let resp = self
            .client
            .post(&self.url)
            .headers(self.headers.clone())
            .json(task)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        // The body is parsed whatever the status; an unreadable body is a transport failure.
        let body: Value = resp
            .json()
            .await
            .map_err(transport_error)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), body = %body, "edge function error");
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&body),
            });
        }

        debug!(status = status.as_u16(), "edge function accepted task");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascend_core::{AdminSession, RewardField, GATE_CODE};
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn creds() -> Credentials {
        Credentials {
            admin_key: "admin-secret".to_string(),
            api_key: "anon-key".to_string(),
        }
    }

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    /// Accept one connection, capture the raw request, answer with `status` and `body`.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = header_end(&buf) {
                    let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                    let len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + len {
                        break;
                    }
                }
            }
            let resp = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });
        (format!("http://{addr}/functions/v1/manual-task-template"), handle)
    }

    fn morning_run() -> TaskSubmission {
        let mut session = AdminSession::new();
        session.attempt_unlock(GATE_CODE);
        let form = session.form_mut().unwrap();
        form.set_title("Morning Run");
        form.set_cover_prompt("Sunrise trail");
        form.set_description("Run 3km before 8am");
        form.update_reward(0, RewardField::Column, "fitness");
        form.update_reward(0, RewardField::Xp, "20");
        session.begin_submit().unwrap()
    }

    #[test]
    fn test_rejection_message_fallbacks() {
        assert_eq!(rejection_message(&json!({"error": "duplicate title"})), "duplicate title");
        assert_eq!(rejection_message(&json!({})), "Unknown error");
        assert_eq!(rejection_message(&json!({"error": ""})), "Unknown error");
        assert_eq!(rejection_message(&json!({"error": null})), "Unknown error");
        assert_eq!(rejection_message(&json!([1, 2])), "Unknown error");
        assert_eq!(rejection_message(&json!({"error": 42})), "42");
    }

    #[tokio::test]
    async fn test_posts_headers_and_body() {
        let (url, server) = serve_once("200 OK", r#"{"id":"t_1"}"#).await;
        let client = EdgeClient::with_client(reqwest::Client::new(), &url, &creds()).unwrap();

        client.create_task(&morning_run()).await.unwrap();

        let raw = server.await.unwrap();
        let end = header_end(raw.as_bytes()).unwrap();
        let head = raw[..end].to_lowercase();
        assert!(head.starts_with("post /functions/v1/manual-task-template http/1.1"));
        assert!(head.contains("content-type: application/json"));
        assert!(head.contains("x-ascend-admin-key: admin-secret"));
        assert!(head.contains("apikey: anon-key"));
        assert!(head.contains("authorization: bearer anon-key"));

        let body: Value = serde_json::from_str(&raw[end + 4..]).unwrap();
        assert_eq!(
            body,
            json!({
                "title": "Morning Run",
                "description": "Run 3km before 8am",
                "frequency": "daily",
                "cover_prompt": "Sunrise trail",
                "xp_rewards": [{"column": "fitness", "xp": 20}],
            })
        );
    }

    #[tokio::test]
    async fn test_non_success_is_rejection() {
        let (url, server) = serve_once("400 Bad Request", r#"{"error":"duplicate title"}"#).await;
        let client = EdgeClient::with_client(reqwest::Client::new(), &url, &creds()).unwrap();

        let err = client.create_task(&morning_run()).await.unwrap_err();
        server.await.unwrap();

        assert_eq!(
            err,
            SinkError::Rejected {
                status: 400,
                message: "duplicate title".to_string()
            }
        );
        assert_eq!(err.to_string(), "Error: duplicate title");
    }

    #[tokio::test]
    async fn test_non_success_without_error_field() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"detail":"boom"}"#).await;
        let client = EdgeClient::with_client(reqwest::Client::new(), &url, &creds()).unwrap();

        let err = client.create_task(&morning_run()).await.unwrap_err();
        server.await.unwrap();
        assert_eq!(err.to_string(), "Error: Unknown error");
    }

    #[tokio::test]
    async fn test_unparseable_body_is_transport_failure() {
        let (url, server) = serve_once("200 OK", "created").await;
        let client = EdgeClient::with_client(reqwest::Client::new(), &url, &creds()).unwrap();

        let err = client.create_task(&morning_run()).await.unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, SinkError::Transport(_)));
        assert!(err.to_string().starts_with("Network error: "));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{addr}/functions/v1/manual-task-template");
        let client = EdgeClient::with_client(reqwest::Client::new(), &url, &creds()).unwrap();
        let err = client.create_task(&morning_run()).await.unwrap_err();
        assert!(matches!(err, SinkError::Transport(_)));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept, then hold the socket open without answering.
        let server = tokio::spawn(async move {
            let (sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            drop(sock);
        });

        let mut cfg = Config::default();
        cfg.endpoint.url = format!("http://{addr}/functions/v1/manual-task-template");
        cfg.endpoint.timeout_secs = 1;
        cfg.credentials.admin_key = Some("admin".to_string());
        cfg.credentials.api_key = Some("anon".to_string());
        let client = EdgeClient::from_config(&cfg).unwrap();

        let err = client.create_task(&morning_run()).await.unwrap_err();
        server.abort();
        assert!(matches!(err, SinkError::Transport(_)));
        assert!(err.to_string().starts_with("Network error: request timed out"), "{err}");
    }

    #[test]
    fn test_from_config_requires_credentials() {
        assert!(EdgeClient::from_config(&Config::default()).is_err());

        let mut cfg = Config::default();
        cfg.credentials.admin_key = Some("a".to_string());
        cfg.credentials.api_key = Some("b".to_string());
        let client = EdgeClient::from_config(&cfg).unwrap();
        assert_eq!(client.url(), crate::config::DEFAULT_ENDPOINT);
    }
}
