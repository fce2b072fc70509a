//! Assisted Service Client - generateContent over HTTPS
//!
//! Blocking `ureq` agent with a per-call timeout. A timeout is reported as
//! `ServiceError::Timeout` and handled like any other transport failure.

use serde::{Deserialize, Serialize};

use super::types::{AssistedRequest, AssistedService, ServiceError};
use crate::logic::config::EngineConfig;

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct AssistedClient {
    agent: ureq::Agent,
    api_key: String,
    endpoint: String,
}

impl AssistedClient {
    pub fn new(api_key: &str, config: &EngineConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.assisted_timeout)
            .build();

        Self {
            agent,
            api_key: api_key.to_string(),
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.assisted_base_url.trim_end_matches('/'),
                config.assisted_model
            ),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AssistedService for AssistedClient {
    fn complete(&self, request: &AssistedRequest) -> Result<String, ServiceError> {
        let body = build_request_body(&request.prompt)?;

        let response = self.agent.post(&self.endpoint)
            .set("x-goog-api-key", &self.api_key)
            .set("Content-Type", "application/json")
            .send_string(&body);

        match response {
            Ok(resp) => {
                let body = resp.into_string()
                    .map_err(|e| ServiceError::Malformed(e.to_string()))?;
                extract_text(&body)
            }
            Err(ureq::Error::Status(401, _)) | Err(ureq::Error::Status(403, _)) => {
                Err(ServiceError::Unauthorized)
            }
            Err(ureq::Error::Status(code, _)) => Err(ServiceError::Status(code)),
            Err(ureq::Error::Transport(transport)) => Err(transport_error(transport)),
        }
    }
}

// ============================================================================
// WIRE HELPERS
// ============================================================================

/// JSON body for one request. Temperature 0 keeps replies stable.
pub(crate) fn build_request_body(prompt: &str) -> Result<String, ServiceError> {
    let request = GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: Some(prompt.to_string()) }],
        }],
        generation_config: GenerationConfig { temperature: 0.0 },
    };

    serde_json::to_string(&request).map_err(|e| ServiceError::Malformed(e.to_string()))
}

/// Concatenated text of the first candidate
pub(crate) fn extract_text(body: &str) -> Result<String, ServiceError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ServiceError::Malformed(e.to_string()))?;

    let text: String = response.candidates.into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ServiceError::Malformed("empty response".to_string()));
    }

    Ok(text)
}

fn transport_error(transport: ureq::Transport) -> ServiceError {
    let timed_out = std::error::Error::source(&transport)
        .and_then(|source| source.downcast_ref::<std::io::Error>())
        .map(|e| matches!(e.kind(), std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock))
        .unwrap_or(false);

    if timed_out {
        ServiceError::Timeout
    } else {
        ServiceError::Network(transport.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::assisted::RequestKind;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    enum Reply {
        Respond(u16, &'static str),
        Hang(Duration),
    }

    /// Serves exactly one connection, returns the base URL
    fn serve_once(reply: Reply) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_request(&mut stream);

            match reply {
                Reply::Respond(code, body) => {
                    let response = format!(
                        "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        code,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes());
                }
                Reply::Hang(duration) => thread::sleep(duration),
            }
        });

        (format!("http://{}", addr), handle)
    }

    fn read_request(stream: &mut std::net::TcpStream) {
        let mut data = Vec::new();
        let mut buf = [0u8; 1024];

        loop {
            let n = stream.read(&mut buf).unwrap_or(0);
            if n == 0 {
                return;
            }
            data.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    fn client_for(base_url: String, timeout: Duration) -> AssistedClient {
        let config = EngineConfig {
            assisted_base_url: base_url,
            assisted_timeout: timeout,
            ..Default::default()
        };
        AssistedClient::new("key", &config)
    }

    fn route_request() -> AssistedRequest {
        AssistedRequest {
            kind: RequestKind::Route,
            prompt: "YES or NO".to_string(),
        }
    }

    #[test]
    fn test_success_returns_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"YES"}]}}]}"#;
        let (url, handle) = serve_once(Reply::Respond(200, body));

        let result = client_for(url, Duration::from_secs(5)).complete(&route_request());
        handle.join().unwrap();

        assert_eq!(result, Ok("YES".to_string()));
    }

    #[test]
    fn test_401_is_unauthorized() {
        let (url, handle) = serve_once(Reply::Respond(401, r#"{"error":{"code":401}}"#));

        let result = client_for(url, Duration::from_secs(5)).complete(&route_request());
        handle.join().unwrap();

        assert_eq!(result, Err(ServiceError::Unauthorized));
    }

    #[test]
    fn test_500_keeps_status_code() {
        let (url, handle) = serve_once(Reply::Respond(500, r#"{"error":{"code":500}}"#));

        let result = client_for(url, Duration::from_secs(5)).complete(&route_request());
        handle.join().unwrap();

        assert_eq!(result, Err(ServiceError::Status(500)));
    }

    #[test]
    fn test_slow_service_times_out() {
        let (url, handle) = serve_once(Reply::Hang(Duration::from_secs(2)));

        let result = client_for(url, Duration::from_millis(300)).complete(&route_request());
        handle.join().unwrap();

        assert_eq!(result, Err(ServiceError::Timeout));
    }

    #[test]
    fn test_request_body_shape() {
        let body = build_request_body("Answer YES or NO").unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "Answer YES or NO");
        assert_eq!(json["generationConfig"]["temperature"], 0.0);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"2"},{"text":"0"}],"role":"model"}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "20");
    }

    #[test]
    fn test_extract_text_no_candidates() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(matches!(extract_text(body), Err(ServiceError::Malformed(_))));
    }

    #[test]
    fn test_extract_text_not_json() {
        assert!(matches!(extract_text("<html>"), Err(ServiceError::Malformed(_))));
    }

    #[test]
    fn test_endpoint_from_config() {
        let config = EngineConfig {
            assisted_base_url: "http://localhost:9000/v1beta/".to_string(),
            assisted_model: "test-model".to_string(),
            ..Default::default()
        };
        let client = AssistedClient::new("key", &config);
        assert_eq!(client.endpoint(), "http://localhost:9000/v1beta/models/test-model:generateContent");
    }

    #[test]
    fn test_unreachable_host_is_network_error() {
        let config = EngineConfig {
            assisted_base_url: "http://127.0.0.1:9".to_string(),
            assisted_timeout: std::time::Duration::from_millis(500),
            ..Default::default()
        };
        let client = AssistedClient::new("key", &config);
        let request = AssistedRequest {
            kind: RequestKind::Route,
            prompt: "YES or NO".to_string(),
        };

        let result = client.complete(&request);
        assert!(matches!(
            result,
            Err(ServiceError::Network(_)) | Err(ServiceError::Timeout)
        ));
    }
}
