use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::error::{TransportError, GENERIC_FAILURE};
use crate::response::{ErrorBody, UploadResponse};
use crate::selection::{SelectedFile, CSV_MEDIA_TYPE};

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// Client settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute URL of the upload endpoint; `/upload` is resolved by the host.
    pub endpoint: String,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "/upload".to_string(),
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

/// Single-part form body: one part named [`FILE_FIELD`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadRequest {
    pub field: &'static str,
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    pub fn for_file(file: &SelectedFile) -> Self {
        let media_type = file
            .media_type
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| CSV_MEDIA_TYPE.to_string());
        Self {
            field: FILE_FIELD,
            file_name: file.name.clone(),
            media_type,
            bytes: file.bytes.clone(),
        }
    }
}

/// Raw reply: status code and body bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one upload. Futures need not be `Send` (browser fetch is not).
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: &UploadRequest) -> Result<HttpReply, TransportError>;
}

/// Maps a reply onto the success body or the banner message.
pub fn decode_reply(reply: &HttpReply) -> Result<UploadResponse, TransportError> {
    if reply.is_success() {
        return serde_json::from_slice(&reply.body).map_err(|e| {
            warn!(status = reply.status, error = %e, "unparsable success body");
            TransportError::Decode {
                detail: e.to_string(),
            }
        });
    }
    let message = serde_json::from_slice::<ErrorBody>(&reply.body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());
    warn!(status = reply.status, %message, "upload rejected");
    Err(TransportError::Rejected {
        status: reply.status,
        message,
    })
}

/// `reqwest`-backed transport; works natively and on wasm32 (fetch).
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = match &config.user_agent {
            Some(agent) => builder.user_agent(agent.clone()),
            None => builder,
        };
        let client = builder.build().map_err(|e| TransportError::Network {
            detail: e.to_string(),
        })?;
        Ok(Self { client, config })
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn send(&self, request: &UploadRequest) -> Result<HttpReply, TransportError> {
        let network = |e: reqwest::Error| {
            warn!(endpoint = %self.config.endpoint, error = %e, "upload failed in transit");
            TransportError::Network {
                detail: e.to_string(),
            }
        };
        let part = Part::bytes(request.bytes.clone())
            .file_name(request.file_name.clone())
            .mime_str(&request.media_type)
            .map_err(network)?;
        let form = Form::new().part(request.field, part);

        debug!(endpoint = %self.config.endpoint, file = %request.file_name, "POST upload");
        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(network)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(network)?;
        Ok(HttpReply {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, body: &str) -> HttpReply {
        HttpReply {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn server_error_text_is_used_verbatim() {
        let err = decode_reply(&reply(400, r#"{"error": "bad file"}"#)).unwrap_err();
        assert_eq!(err.to_string(), "bad file");
    }

    #[test]
    fn unparsable_failure_falls_back_to_generic() {
        let err = decode_reply(&reply(502, "<html>Bad Gateway</html>")).unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE);
        let err = decode_reply(&reply(500, r#"{"detail": "x"}"#)).unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE);
        let err = decode_reply(&reply(400, r#"{"error": ""}"#)).unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE);
    }

    #[test]
    fn unparsable_success_is_a_decode_error() {
        let err = decode_reply(&reply(200, "not json")).unwrap_err();
        assert!(matches!(err, TransportError::Decode { .. }));
        assert_eq!(err.to_string(), GENERIC_FAILURE);
    }

    #[test]
    fn request_defaults_media_type_to_csv() {
        let file = SelectedFile::new("data.csv", Some(String::new()), vec![1, 2, 3]);
        let request = UploadRequest::for_file(&file);
        assert_eq!(request.field, "file");
        assert_eq!(request.media_type, "text/csv");
        assert_eq!(request.bytes, [1, 2, 3]);
    }
}
