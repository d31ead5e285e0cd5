use chatdock::error::{DecodeSnafu, StatusSnafu, TransportSnafu};
use chatdock::{BackendResult, ChatBackend, ChatReply, ChatRequest};
use futures::future::{FutureExt, LocalBoxFuture};
use snafu::ensure;

/// Posts chat requests over HTTP with reqwest.
pub struct HttpBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpBackend {
    pub fn new(url: impl Into<String>) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("chatdock/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, request: ChatRequest) -> BackendResult<ChatReply> {
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|error| transport("send-chat-request", &error))?;

        let status = response.status();
        ensure!(
            status.is_success(),
            StatusSnafu {
                stage: "check-chat-status",
                status: status.as_u16(),
            }
        );

        let body = response
            .text()
            .await
            .map_err(|error| transport("read-chat-response", &error))?;

        serde_json::from_str(&body).map_err(|error| {
            DecodeSnafu {
                stage: "decode-chat-reply",
                message: error.to_string(),
            }
            .build()
        })
    }
}

impl ChatBackend for HttpBackend {
    fn send(&self, request: ChatRequest) -> LocalBoxFuture<'_, BackendResult<ChatReply>> {
        self.post(request).boxed_local()
    }
}

fn transport(stage: &'static str, error: &reqwest::Error) -> chatdock::BackendError {
    TransportSnafu {
        stage,
        message: error.to_string(),
    }
    .build()
}

#[cfg(test)]
mod tests {
    use chatdock::{BackendError, ChatMessage};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Serves one canned HTTP response and hands back the raw request it saw.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/chat", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buffer = [0u8; 4096];

            loop {
                let read = socket.read(&mut buffer).await.unwrap();
                if read == 0 {
                    break;
                }
                received.extend_from_slice(&buffer[..read]);
                if request_complete(&received) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8(received).unwrap()
        });

        (url, handle)
    }

    fn request_complete(received: &[u8]) -> bool {
        let text = String::from_utf8_lossy(received);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= content_length
    }

    fn hello_request() -> ChatRequest {
        ChatRequest {
            query: "Hello".to_string(),
            thread_id: "session_abc123xyz".to_string(),
            history: vec![ChatMessage::user("Hello")],
        }
    }

    #[tokio::test]
    async fn posts_json_and_decodes_reply() {
        let (url, server) =
            serve_once("200 OK", r#"{"category":"general","response":"Hi there"}"#).await;
        let backend = HttpBackend::new(url).unwrap();

        let reply = backend.send(hello_request()).await.unwrap();
        assert_eq!(reply.response, "Hi there");
        assert_eq!(reply.category.as_deref(), Some("general"));

        let raw_request = server.await.unwrap();
        assert!(raw_request.starts_with("POST /chat HTTP/1.1"));
        assert!(raw_request.contains(r#""thread_id":"session_abc123xyz""#));
        assert!(raw_request.to_ascii_lowercase().contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (url, server) = serve_once(
            "500 Internal Server Error",
            r#"{"detail":"Internal Server Error"}"#,
        )
        .await;
        let backend = HttpBackend::new(url).unwrap();

        let error = backend.send(hello_request()).await.unwrap_err();
        assert!(matches!(error, BackendError::Status { status: 500, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let (url, server) = serve_once("200 OK", "<html>gateway</html>").await;
        let backend = HttpBackend::new(url).unwrap();

        let error = backend.send(hello_request()).await.unwrap_err();
        assert!(matches!(error, BackendError::Decode { .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/chat", listener.local_addr().unwrap());
        drop(listener);

        let backend = HttpBackend::new(url).unwrap();
        let error = backend.send(hello_request()).await.unwrap_err();
        assert!(matches!(error, BackendError::Transport { .. }));
    }
}
