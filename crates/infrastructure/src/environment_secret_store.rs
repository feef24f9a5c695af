use std::collections::HashMap;

use async_trait::async_trait;

use tripwire_application::SecretStore;
use tripwire_core::{AppError, AppResult};

/// Secret store that serves values from process environment variables.
///
/// Variables are captured once at construction. A reference is looked up
/// verbatim first, then normalized to an upper-case variable name, so
/// `jira/api-token` resolves from `JIRA_API_TOKEN`.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSecretStore {
    variables: HashMap<String, String>,
}

impl EnvironmentSecretStore {
    /// Captures the current process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Builds a store from explicit name/value pairs.
    #[must_use]
    pub fn from_vars<I, K, V>(variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            variables: variables
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

fn variable_name(reference: &str) -> String {
    reference
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() {
                character.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl SecretStore for EnvironmentSecretStore {
    async fn get_secret(&self, reference: &str) -> AppResult<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(AppError::Validation(
                "secret reference must not be empty".to_owned(),
            ));
        }

        self.variables
            .get(reference)
            .or_else(|| self.variables.get(variable_name(reference).as_str()))
            .filter(|value| !value.is_empty())
            .cloned()
            .ok_or_else(|| {
                AppError::Store(format!(
                    "secret '{reference}' is not set in the environment"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use tripwire_application::SecretStore;
    use tripwire_core::AppError;

    use super::EnvironmentSecretStore;

    #[tokio::test]
    async fn resolves_verbatim_and_normalized_references() {
        let store = EnvironmentSecretStore::from_vars([
            ("JIRA_API_TOKEN", "user:token"),
            ("exact-name", "exact"),
        ]);

        assert_eq!(
            store.get_secret("jira/api-token").await.unwrap_or_default(),
            "user:token"
        );
        assert_eq!(
            store.get_secret("exact-name").await.unwrap_or_default(),
            "exact"
        );
    }

    #[tokio::test]
    async fn missing_or_empty_secret_is_a_store_error() {
        let store = EnvironmentSecretStore::from_vars([("EMPTY", "")]);

        assert!(matches!(
            store.get_secret("missing").await,
            Err(AppError::Store(_))
        ));
        assert!(matches!(
            store.get_secret("EMPTY").await,
            Err(AppError::Store(_))
        ));
        assert!(matches!(
            store.get_secret("  ").await,
            Err(AppError::Validation(_))
        ));
    }
}
