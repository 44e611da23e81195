// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/client.rs
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::ClusterConfig;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("search response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("search response has no numeric 'took' field")]
    MissingTook,
}

/// The parts of a search response the harness cares about.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    /// Server-side execution time in milliseconds.
    pub took: u64,
    pub body: Value,
}

impl SearchResponse {
    pub fn from_json(body: Value) -> Result<Self, SearchError> {
        let took = body
            .get("took")
            .and_then(Value::as_u64)
            .ok_or(SearchError::MissingTook)?;
        Ok(Self { took, body })
    }
}

/// Anything that can execute a search body against an index.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, body: &Value, index: &str) -> Result<SearchResponse, SearchError>;
}

/// Elasticsearch `_search` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl HttpSearchClient {
    pub fn new(cluster: &ClusterConfig) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(cluster.request_timeout())
            .build()?;

        let credentials = match (&cluster.username, &cluster.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        Ok(Self {
            http,
            base_url: cluster.url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn search_url(&self, index: &str) -> String {
        format!("{}/{}/_search", self.base_url, index)
    }
}

#[async_trait]
impl SearchClient for HttpSearchClient {
    async fn search(&self, body: &Value, index: &str) -> Result<SearchResponse, SearchError> {
        let url = self.search_url(index);
        debug!("POST {}", url);

        let mut request = self.http.post(&url).json(body);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        SearchResponse::from_json(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot HTTP server: captures the request, answers with `status` and `body`.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{}", addr), handle)
    }

    fn client_for(url: String) -> HttpSearchClient {
        HttpSearchClient::new(&ClusterConfig {
            url,
            username: Some("elastic".into()),
            password: Some("changeme".into()),
            request_timeout_secs: Some(5),
        })
        .unwrap()
    }

    #[test]
    fn test_response_requires_took() {
        assert_eq!(SearchResponse::from_json(json!({"took": 12})).unwrap().took, 12);
        assert!(matches!(
            SearchResponse::from_json(json!({"hits": {}})),
            Err(SearchError::MissingTook)
        ));
        assert!(matches!(
            SearchResponse::from_json(json!({"took": "12"})),
            Err(SearchError::MissingTook)
        ));
    }

    #[test]
    fn test_search_url_strips_trailing_slash() {
        let client = client_for("http://localhost:9200/".into());
        assert_eq!(client.search_url("logs-1"), "http://localhost:9200/logs-1/_search");
    }

    #[tokio::test]
    async fn test_http_search_returns_took() {
        let (url, server) = serve_once("200 OK", r#"{"took": 42, "hits": {"hits": []}}"#).await;
        let client = client_for(url);

        let response = client
            .search(&json!({"query": {"match_all": {}}}), "logs-1")
            .await
            .unwrap();
        assert_eq!(response.took, 42);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /logs-1/_search HTTP/1.1"), "{}", request);
        assert!(request.to_ascii_lowercase().contains("authorization: basic"));
        assert!(request.contains(r#""match_all""#));
    }

    #[tokio::test]
    async fn test_http_error_status_surfaces() {
        let (url, server) = serve_once("404 Not Found", r#"{"error": "index_not_found_exception"}"#).await;
        let client = client_for(url);

        let err = client.search(&json!({}), "missing").await.unwrap_err();
        match err {
            SearchError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("index_not_found_exception"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
        server.await.unwrap();
    }
}
