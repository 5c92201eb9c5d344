use std::time::Duration;

use url::Url;

mod dictionary;
mod oxford_api;

pub use dictionary::{
    DictionaryResponse, Entry, Example, HeadwordEntry, LexicalCategory, LexicalEntry, Metadata,
    Pronunciation, Sense, ThesaurusLink,
};

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("malformed response body: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("invalid API base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("credential of length {0} is not a valid header value")]
    InvalidHeader(usize),
}

/// Application id and key sent with every request.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_key: String,
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_key: app_key.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    /// Source language code, e.g. `en-gb`.
    pub language: String,
    pub timeout: Option<Duration>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: oxford_api::OXFORD_API_URL.to_owned(),
            language: "en-gb".to_owned(),
            timeout: None,
        }
    }
}

pub struct Dictionary {
    client: reqwest::Client,
    base_url: Url,
    language: String,
    credentials: Credentials,
}

impl Dictionary {
    pub fn new(credentials: Credentials) -> Result<Self, DictionaryError> {
        Self::with_settings(credentials, ApiSettings::default())
    }

    pub fn with_settings(
        credentials: Credentials,
        settings: ApiSettings,
    ) -> Result<Self, DictionaryError> {
        let base_url = Url::parse(&settings.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(DictionaryError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(DictionaryError::Network)?;
        Ok(Self {
            client,
            base_url,
            language: settings.language,
            credentials,
        })
    }

    /// Issues one GET for `word` and returns the raw body, whatever the status.
    pub async fn fetch(&self, word: &str) -> Result<Vec<u8>, DictionaryError> {
        let url = oxford_api::entries_url(&self.base_url, &self.language, word)?;
        let host = oxford_api::host_header(&self.base_url);
        let headers = oxford_api::request_headers(&self.credentials, host.as_deref())?;
        oxford_api::get_entries(&self.client, url, headers).await
    }

    /// Fetches and decodes `word`. An unknown word is still `Ok`; check
    /// [`DictionaryResponse::is_found`].
    pub async fn lookup(&self, word: &str) -> Result<DictionaryResponse, DictionaryError> {
        let body = self.fetch(word).await?;
        let response = DictionaryResponse::from_slice(&body)?;
        if !response.error.is_empty() {
            tracing::warn!(word, error = %response.error, "dictionary API reported an error");
        }
        tracing::debug!(
            word,
            results = response.results.len(),
            lexical_entries = response.lexical_entries().count(),
            "decoded dictionary response"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Serves one canned HTTP reply and hands back the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api/v2", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let reply = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (base, handle)
    }

    fn dictionary(base_url: String) -> Dictionary {
        let settings = ApiSettings {
            base_url,
            timeout: Some(Duration::from_secs(5)),
            ..ApiSettings::default()
        };
        Dictionary::with_settings(Credentials::new("my-id", "my-key"), settings).unwrap()
    }

    #[tokio::test]
    async fn lookup_sends_credentials_and_escaped_word() {
        let (base, server) = serve_once("200 OK", r#"{"id": "hot dog", "word": "hot dog"}"#).await;
        let response = dictionary(base).lookup("hot dog").await.unwrap();
        assert!(response.is_found());
        assert_eq!(response.word, "hot dog");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /api/v2/entries/en-gb/hot%20dog http/1.1"));
        assert!(request.contains("app_id: my-id"));
        assert!(request.contains("app_key: my-key"));
        assert!(request.contains("accept-encoding: gzip, deflate"));
    }

    #[tokio::test]
    async fn not_found_status_still_returns_the_body() {
        let (base, server) = serve_once("404 Not Found", r#"{"error": "No entry found"}"#).await;
        let body = dictionary(base).fetch("qwxz").await.unwrap();
        assert_eq!(body, br#"{"error": "No entry found"}"#);
        server.await.unwrap();

        let (base, server) = serve_once("404 Not Found", r#"{"error": "No entry found"}"#).await;
        let response = dictionary(base).lookup("qwxz").await.unwrap();
        assert!(!response.is_found());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn html_body_is_malformed() {
        let (base, server) = serve_once("502 Bad Gateway", "<html>bad gateway</html>").await;
        let error = dictionary(base).lookup("hello").await.unwrap_err();
        assert!(matches!(error, DictionaryError::MalformedResponse(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api/v2", listener.local_addr().unwrap());
        drop(listener);
        let error = dictionary(base).fetch("hello").await.unwrap_err();
        assert!(matches!(error, DictionaryError::Network(_)));
    }

    #[test]
    fn rejects_unusable_base_url() {
        let settings = ApiSettings {
            base_url: "mailto:someone@example.org".to_owned(),
            ..ApiSettings::default()
        };
        let error = Dictionary::with_settings(Credentials::new("a", "b"), settings).err().unwrap();
        assert!(matches!(error, DictionaryError::InvalidUrl(_)));
    }
}
