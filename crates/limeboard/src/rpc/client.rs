use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::{Error, Result, truncate_chars};
use crate::rpc::{RpcRequest, RpcResponse};

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_TIMEOUT_SECS: u64 = 25;
/// Characters of a non-200 body kept for diagnostics
const STATUS_EXCERPT_CHARS: usize = 500;
/// Upper bound on a response body; exports of large surveys can be several MB
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// A single JSON-RPC round trip.
///
/// Implementations perform exactly one attempt per call. Retry policy, if
/// any, belongs to the caller.
pub trait Transport {
    fn call(&self, request: &RpcRequest) -> Result<RpcResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    /// Budget for the whole request, including reading the body
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// JSON-RPC over HTTP(S) POST.
///
/// Certificates are always verified.
pub struct HttpTransport {
    agent: ureq::Agent,
    endpoint: String,
    user_agent: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, config: &TransportConfig) -> Result<Self> {
        let endpoint = validate_endpoint(endpoint)?;

        let agent_config = ureq::Agent::config_builder()
            .timeout_connect(Some(config.connect_timeout))
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build();
        let agent: ureq::Agent = agent_config.into();

        let user_agent = format!(
            "limeboard/{} ({})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );

        Ok(Self {
            agent,
            endpoint: endpoint.to_string(),
            user_agent,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn call(&self, request: &RpcRequest) -> Result<RpcResponse> {
        debug!("JSON-RPC {} (id {}) -> {}", request.method, request.id, self.endpoint);

        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .header("User-Agent", &self.user_agent)
            .send_json(request)
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
            .map_err(|e| Error::Transport(format!("Failed to read response body: {}", e)))?;

        debug!(
            "JSON-RPC {} (id {}) <- HTTP {} ({} bytes)",
            request.method,
            request.id,
            status,
            body.len()
        );

        if status != 200 {
            let (excerpt, _) = truncate_chars(&body, STATUS_EXCERPT_CHARS);
            return Err(Error::HttpStatus {
                status,
                excerpt: excerpt.to_string(),
            });
        }

        RpcResponse::from_body(&body)
    }
}

/// Accept only absolute http(s) URLs with a host
pub fn validate_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint.trim())
        .map_err(|e| Error::Configuration(format!("Invalid API URL '{}': {}", endpoint, e)))?;

    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(Error::Configuration(format!(
            "Invalid API URL '{}': expected an absolute http(s) URL",
            endpoint
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::rpc::Method;
    use serde_json::{Value, json};
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    /// Read one HTTP request and return its body
    fn read_request(stream: &TcpStream) -> String {
        let mut reader = BufReader::new(stream);
        let mut content_length = None;
        let mut chunked = false;

        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                let value = value.trim();
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = Some(value.parse::<usize>().unwrap());
                } else if name.eq_ignore_ascii_case("transfer-encoding") {
                    chunked = value.eq_ignore_ascii_case("chunked");
                }
            }
        }

        let mut body = Vec::new();
        if chunked {
            loop {
                let mut size_line = String::new();
                reader.read_line(&mut size_line).unwrap();
                let size = usize::from_str_radix(size_line.trim(), 16).unwrap();
                let mut chunk = vec![0; size + 2];
                reader.read_exact(&mut chunk).unwrap();
                if size == 0 {
                    break;
                }
                body.extend_from_slice(&chunk[..size]);
            }
        } else if let Some(len) = content_length {
            body.resize(len, 0);
            reader.read_exact(&mut body).unwrap();
        }

        String::from_utf8(body).unwrap()
    }

    /// Serve a single canned response; the handle yields the request body
    fn serve_once(status_line: &'static str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.to_string();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request_body = read_request(&stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request_body
        });

        (format!("http://{}/index.php/admin/remotecontrol", addr), handle)
    }

    fn transport(endpoint: &str) -> HttpTransport {
        HttpTransport::new(endpoint, &TransportConfig::default()).unwrap()
    }

    #[test]
    fn test_validate_endpoint() {
        assert!(validate_endpoint("https://survey.example.org/index.php/admin/remotecontrol").is_ok());
        assert!(validate_endpoint("http://127.0.0.1:8080/rc").is_ok());

        for bad in ["", "not a url", "/relative/path", "ftp://example.org/", "mailto:a@b.c"] {
            let err = validate_endpoint(bad).unwrap_err();
            assert!(matches!(err, Error::Configuration(_)), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_new_rejects_invalid_endpoint() {
        let result = HttpTransport::new("survey.example.org", &TransportConfig::default());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_default_timeouts() {
        let config = TransportConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(15));
        assert_eq!(config.timeout, Duration::from_secs(25));
    }

    #[test]
    fn test_call_success_sends_envelope() {
        let (endpoint, server) = serve_once("200 OK", r#"{"id":1,"result":"token-123","error":null}"#);
        let request = RpcRequest::new(Method::GetSessionKey, vec![json!("admin"), json!("pw")]);

        let response = transport(&endpoint).call(&request).unwrap();
        assert_eq!(response.result, Some(json!("token-123")));

        let sent: Value = serde_json::from_str(&server.join().unwrap()).unwrap();
        assert_eq!(sent["jsonrpc"], "2.0");
        assert_eq!(sent["method"], "get_session_key");
        assert_eq!(sent["params"], json!(["admin", "pw"]));
        assert_eq!(sent["id"], json!(request.id));
    }

    #[test]
    fn test_call_non_200_status() {
        let long_body = "e".repeat(2000);
        let (endpoint, server) = serve_once("500 Internal Server Error", &long_body);
        let request = RpcRequest::new(Method::ExportResponses, vec![]);

        let err = transport(&endpoint).call(&request).unwrap_err();
        server.join().unwrap();
        match err {
            Error::HttpStatus { status, excerpt } => {
                assert_eq!(status, 500);
                assert_eq!(excerpt.len(), STATUS_EXCERPT_CHARS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_call_invalid_json_body() {
        let (endpoint, server) = serve_once("200 OK", "<html>login</html>");
        let request = RpcRequest::new(Method::GetSessionKey, vec![]);

        let err = transport(&endpoint).call(&request).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, Error::Decode(DecodeError::ResponseBody(_))));
    }

    #[test]
    fn test_call_api_error() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"id":1,"result":null,"error":{"code":-32600,"message":"Invalid request"}}"#,
        );
        let request = RpcRequest::new(Method::GetSessionKey, vec![]);

        let err = transport(&endpoint).call(&request).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, Error::Api { code: Some(-32600), .. }));
    }

    #[test]
    fn test_call_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = format!("http://{}/rc", addr);
        let request = RpcRequest::new(Method::GetSessionKey, vec![]);
        let err = transport(&endpoint).call(&request).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
