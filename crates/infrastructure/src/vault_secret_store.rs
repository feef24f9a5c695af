use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::error;

use tripwire_application::SecretStore;
use tripwire_core::{AppError, AppResult};

/// Key read from a secret when the reference names none.
pub const DEFAULT_SECRET_KEY: &str = "value";

/// Secret store reading from a Vault KV version 2 engine.
///
/// References have the form `path` or `path#key`.
#[derive(Clone)]
pub struct VaultSecretStore {
    http_client: reqwest::Client,
    address: Url,
    token: String,
    mount: String,
}

#[derive(Debug, Deserialize)]
struct KvReadResponse {
    data: KvReadData,
}

#[derive(Debug, Deserialize)]
struct KvReadData {
    data: Map<String, Value>,
}

impl VaultSecretStore {
    /// Creates one Vault-backed secret store.
    pub fn new(
        http_client: reqwest::Client,
        address: &str,
        token: impl Into<String>,
        mount: impl Into<String>,
    ) -> AppResult<Self> {
        let address = Url::parse(address).map_err(|error| {
            AppError::Validation(format!("invalid vault address '{address}': {error}"))
        })?;
        if address.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "vault address '{address}' cannot carry a path"
            )));
        }

        let token = token.into();
        if token.trim().is_empty() {
            return Err(AppError::Validation(
                "vault token must not be empty".to_owned(),
            ));
        }

        let mount = mount.into().trim_matches('/').to_owned();
        if mount.is_empty() {
            return Err(AppError::Validation(
                "vault mount must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            http_client,
            address,
            token,
            mount,
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        let mut url = self.address.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::Internal("vault address cannot carry a path".to_owned()))?
            .pop_if_empty()
            .push("v1")
            .extend(self.mount.split('/'))
            .push("data")
            .extend(path.split('/').filter(|segment| !segment.is_empty()));

        Ok(url)
    }
}

fn split_reference(reference: &str) -> (&str, &str) {
    match reference.split_once('#') {
        Some((path, key)) if !key.is_empty() => (path, key),
        Some((path, _)) => (path, DEFAULT_SECRET_KEY),
        None => (reference, DEFAULT_SECRET_KEY),
    }
}

#[async_trait]
impl SecretStore for VaultSecretStore {
    async fn get_secret(&self, reference: &str) -> AppResult<String> {
        let (path, key) = split_reference(reference.trim());
        if path.trim_matches('/').is_empty() {
            return Err(AppError::Validation(
                "secret reference must name a vault path".to_owned(),
            ));
        }

        let response = self
            .http_client
            .get(self.endpoint(path)?)
            .header("X-Vault-Token", self.token.as_str())
            .send()
            .await
            .map_err(|error| AppError::Store(format!("failed to call vault: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), path, "vault secret read rejected");
            return Err(AppError::Store(format!(
                "vault returned status {} for secret '{path}'",
                status.as_u16()
            )));
        }

        let body = response.json::<KvReadResponse>().await.map_err(|error| {
            AppError::Store(format!("failed to parse vault response body: {error}"))
        })?;

        match body.data.data.get(key) {
            Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
            Some(_) => Err(AppError::Store(format!(
                "vault secret '{path}' key '{key}' is not a non-empty string"
            ))),
            None => Err(AppError::Store(format!(
                "vault secret '{path}' has no key '{key}'"
            ))),
        }
    }
}
