use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
pub use reqwest::StatusCode;

use crate::error::{CommonError, TransportError};
use crate::suggest::SuggestConfig;

/// Status and body of one upstream response, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// One round trip to the autocomplete endpoint.
///
/// Implementations perform exactly one request per call; retries, backoff and
/// response parsing belong to [`crate::suggest::SuggestClient`].
pub trait SuggestTransport {
    fn fetch_raw(
        &self,
        query: &str,
        user_agent: &str,
    ) -> impl Future<Output = Result<RawResponse, TransportError>>;
}

/// reqwest-backed transport. The inner client (and its connection pool) lives as
/// long as the transport.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    language: String,
    country: String,
    accept_language: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &SuggestConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(CommonError::HttpClient)?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            client_id: config.client_id.clone(),
            language: config.language.clone(),
            country: config.country.clone(),
            accept_language: accept_language(&config.language, &config.country),
            timeout: config.timeout,
        })
    }
}

impl SuggestTransport for HttpTransport {
    async fn fetch_raw(
        &self,
        query: &str,
        user_agent: &str,
    ) -> Result<RawResponse, TransportError> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("client", self.client_id.as_str()),
                ("q", query),
                ("hl", self.language.as_str()),
                ("gl", self.country.as_str()),
                ("output", "json"),
            ])
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .header("DNT", "1")
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        // decodes with the charset from Content-Type, falling back to UTF-8
        let body = resp.text().await?;
        Ok(RawResponse { status, body })
    }
}

/// `es` + `es` gives `es-ES,es;q=0.9,en;q=0.8`.
fn accept_language(language: &str, country: &str) -> String {
    format!(
        "{language}-{},{language};q=0.9,en;q=0.8",
        country.to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Accept one connection, answer it with `response`, and hand back the request head.
    async fn serve_once(response: Vec<u8>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            socket.write_all(&response).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&head).into_owned()
        });
        (format!("http://{addr}/complete/search"), handle)
    }

    fn http_response(status_line: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        out.extend_from_slice(body);
        out
    }

    fn transport_for(base_url: String) -> HttpTransport {
        let config = SuggestConfig {
            base_url,
            ..SuggestConfig::default()
        };
        // a proxy from the environment would never reach the local listener
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpTransport {
            http,
            ..HttpTransport::new(&config).unwrap()
        }
    }

    #[tokio::test]
    async fn test_fetch_raw_sends_locale_params_and_headers() {
        let (url, server) = serve_once(http_response(
            "200 OK",
            "application/json; charset=UTF-8",
            br#"["perro salchicha",[]]"#,
        ))
        .await;
        let transport = transport_for(url);

        let resp = transport
            .fetch_raw("perro salchicha", "test-agent/1.0")
            .await
            .unwrap();
        let head = server.await.unwrap();

        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, r#"["perro salchicha",[]]"#);

        let request_line = head.lines().next().unwrap();
        assert_eq!(
            request_line,
            "GET /complete/search?client=firefox&q=perro+salchicha&hl=es&gl=es&output=json HTTP/1.1"
        );
        let lower = head.to_lowercase();
        assert!(lower.contains("\r\nuser-agent: test-agent/1.0\r\n"));
        assert!(lower.contains("\r\naccept: application/json\r\n"));
        assert!(lower.contains("\r\naccept-language: es-es,es;q=0.9,en;q=0.8\r\n"));
        assert!(lower.contains("\r\ndnt: 1\r\n"));
    }

    #[tokio::test]
    async fn test_fetch_raw_decodes_latin1_body() {
        let body = b"[\"ni\xF1o\",[\"ni\xF1o jes\xFAs\"]]";
        let (url, server) = serve_once(http_response(
            "200 OK",
            "text/javascript; charset=ISO-8859-1",
            body,
        ))
        .await;
        let transport = transport_for(url);

        let resp = transport.fetch_raw("niño", "test-agent/1.0").await.unwrap();
        server.await.unwrap();

        assert_eq!(resp.body, r#"["niño",["niño jesús"]]"#);
    }

    #[tokio::test]
    async fn test_fetch_raw_returns_error_statuses() {
        let (url, server) =
            serve_once(http_response("429 Too Many Requests", "text/html", b"slow down")).await;
        let transport = transport_for(url);

        let resp = transport.fetch_raw("perro", "test-agent/1.0").await.unwrap();
        server.await.unwrap();

        assert_eq!(resp.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.body, "slow down");
    }

    #[tokio::test]
    async fn test_fetch_raw_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let transport = transport_for(format!("http://{addr}/complete/search"));

        let err = transport
            .fetch_raw("perro", "test-agent/1.0")
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Request(ref e) if e.is_connect()));
    }

    #[test]
    fn test_accept_language_for_spain() {
        assert_eq!(accept_language("es", "es"), "es-ES,es;q=0.9,en;q=0.8");
    }

    #[test]
    fn test_http_transport_copies_config() {
        let config = SuggestConfig {
            base_url: "http://localhost:9/complete/search".to_string(),
            ..SuggestConfig::default()
        };
        let transport = HttpTransport::new(&config).expect("client builds");
        assert_eq!(transport.base_url, "http://localhost:9/complete/search");
        assert_eq!(transport.client_id, "firefox");
        assert_eq!(transport.timeout, Duration::from_secs(10));
    }
}
