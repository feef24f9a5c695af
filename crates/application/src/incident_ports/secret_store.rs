use async_trait::async_trait;
use tripwire_core::AppResult;

/// Port for resolving credentials by reference.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the secret value stored under `reference`.
    async fn get_secret(&self, reference: &str) -> AppResult<String>;
}
