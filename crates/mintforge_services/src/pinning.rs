use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, warn};

const PIN_FILE_ENDPOINT: &str = "/pinning/pinFileToIPFS";
const UPLOAD_TIMEOUT_SECS: u64 = 120;

/// Pinning provider failures.
#[derive(Debug, Error)]
pub enum PinError {
    #[error("no pinning credentials configured")]
    NoCredentials,

    #[error("all {attempts} pinning credentials failed (last status {last_status})")]
    AllCredentialsFailed { attempts: usize, last_status: u16 },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid pinning response: {0}")]
    InvalidResponse(String),
}

/// Client for a Pinata-compatible pinning API.
///
/// Uploads are authenticated with an ordered list of bearer tokens; each
/// upload walks the list until one succeeds. Credentials come from the
/// environment or the encrypted secret store, never from source.
#[derive(Debug, Clone)]
pub struct PinningClient {
    http: reqwest::Client,
    api_url: String,
    gateway_url: String,
    tokens: Vec<String>,
}

impl PinningClient {
    pub fn new(
        api_url: impl Into<String>,
        gateway_url: impl Into<String>,
        tokens: Vec<String>,
    ) -> Result<Self, PinError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            gateway_url: gateway_url.into(),
            tokens,
        })
    }

    /// Whether any credentials are configured.
    pub fn has_credentials(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Gateway preview URL for a CID.
    pub fn gateway_url_for(&self, cid: &str) -> String {
        format!("{}/ipfs/{}", self.gateway_url, cid)
    }

    /// Pin raw file bytes; returns the content identifier.
    pub async fn pin_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
        pin_name: &str,
    ) -> Result<String, PinError> {
        if self.tokens.is_empty() {
            return Err(PinError::NoCredentials);
        }

        let url = format!("{}{}", self.api_url, PIN_FILE_ENDPOINT);
        let mut last_status = 0u16;

        for (index, token) in self.tokens.iter().enumerate() {
            // Multipart forms are consumed on send, so rebuild per attempt.
            let part = Part::bytes(bytes.clone())
                .file_name(file_name.to_string())
                .mime_str(content_type)
                .map_err(|e| PinError::InvalidResponse(format!("bad content type: {e}")))?;
            let metadata = json!({ "name": pin_name }).to_string();
            let form = Form::new().part("file", part).text("pinataMetadata", metadata);

            let response = match self
                .http
                .post(&url)
                .bearer_auth(token)
                .multipart(form)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(attempt = index + 1, error = %e, "pin upload transport failure");
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                let body: Value = response.json().await?;
                let cid = body
                    .get("IpfsHash")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        PinError::InvalidResponse("response carries no IpfsHash".into())
                    })?
                    .to_string();
                info!(pin = pin_name, cid = %cid, attempt = index + 1, "content pinned");
                return Ok(cid);
            }

            last_status = status.as_u16();
            warn!(
                attempt = index + 1,
                status = last_status,
                "pin upload rejected, trying next credential"
            );
        }

        Err(PinError::AllCredentialsFailed {
            attempts: self.tokens.len(),
            last_status,
        })
    }

    /// Pin a JSON document; returns the content identifier.
    pub async fn pin_json(
        &self,
        document: &Value,
        file_name: &str,
        pin_name: &str,
    ) -> Result<String, PinError> {
        let bytes = serde_json::to_vec(document)
            .map_err(|e| PinError::InvalidResponse(e.to_string()))?;
        self.pin_file(bytes, file_name, "application/json", pin_name)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pin_without_credentials_fails_fast() {
        let client =
            PinningClient::new("https://api.example.com", "https://gw.example.com", vec![])
                .unwrap();
        assert!(!client.has_credentials());
        let err = client
            .pin_file(vec![1, 2, 3], "a.png", "image/png", "test")
            .await
            .unwrap_err();
        assert!(matches!(err, PinError::NoCredentials));
    }

    #[tokio::test]
    async fn unreachable_api_exhausts_all_credentials() {
        let client = PinningClient::new(
            "http://127.0.0.1:9",
            "https://gw.example.com",
            vec!["t1".into(), "t2".into()],
        )
        .unwrap();
        let err = client
            .pin_file(vec![0u8; 4], "a.png", "image/png", "test")
            .await
            .unwrap_err();
        match err {
            PinError::AllCredentialsFailed { attempts, .. } => assert_eq!(attempts, 2),
            other => panic!("expected AllCredentialsFailed, got {other:?}"),
        }
    }

    #[test]
    fn gateway_url_formats_cid() {
        let client = PinningClient::new(
            "https://api.pinata.cloud",
            "https://gateway.pinata.cloud",
            vec!["t".into()],
        )
        .unwrap();
        assert_eq!(
            client.gateway_url_for("QmExample"),
            "https://gateway.pinata.cloud/ipfs/QmExample"
        );
    }
}
