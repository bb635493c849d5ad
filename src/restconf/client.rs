//! HTTP transport for the RESTCONF protocol.

use super::{ClientError, SwitchTarget};

use serde::de::DeserializeOwned;
use std::time::Duration;

/// Build the HTTP client shared by every switch in the fleet.
///
/// Switch management endpoints ship self-signed certificates, so TLS
/// verification is disabled. The timeout applies per request and bounds how
/// long one unreachable switch can hold up a poll round.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// A handle for one switch's management API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SwitchClient {
    target: SwitchTarget,
    http: reqwest::Client,
}

impl SwitchClient {
    pub fn new(target: SwitchTarget, http: reqwest::Client) -> Self {
        Self { target, http }
    }

    pub fn address(&self) -> &str {
        &self.target.address
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let sep = if path.starts_with('/') { "" } else { "/" };
        let url = format!("https://{}/restconf/data{}{}", self.target.address, sep, path);
        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.target.username, Some(&self.target.password))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(resp.bytes().await?.to_vec())
    }

    /// GET `path` and deserialize the document found under the
    /// module-qualified `toplevel` key RESTCONF wraps payloads in.
    pub(super) async fn fetch_and_unwrap<T: DeserializeOwned>(
        &self,
        path: &str,
        toplevel: &str,
    ) -> Result<T, ClientError> {
        let body = self.fetch(path).await?;
        unwrap_inner(&body, toplevel)
    }
}

/// Extract and deserialize the document nested under `toplevel`.
fn unwrap_inner<T: DeserializeOwned>(body: &[u8], toplevel: &str) -> Result<T, ClientError> {
    let mut raw: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)?;
    let inner = raw
        .remove(toplevel)
        .ok_or_else(|| ClientError::Protocol(format!("missing {} in response", toplevel)))?;
    Ok(serde_json::from_value(inner)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sys {
        hostname: String,
    }

    #[test]
    fn unwrap_inner_extracts_nested_document() {
        let body = br#"{"dell-system:system": {"hostname": "leaf01"}}"#;
        let sys: Sys = unwrap_inner(body, "dell-system:system").unwrap();
        assert_eq!(sys.hostname, "leaf01");
    }

    #[test]
    fn unwrap_inner_missing_key_is_protocol_error() {
        let body = br#"{"other:thing": {}}"#;
        let err = unwrap_inner::<Sys>(body, "dell-system:system").unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
    }

    #[test]
    fn unwrap_inner_bad_json_is_json_error() {
        let err = unwrap_inner::<Sys>(b"not json", "x").unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }
}
