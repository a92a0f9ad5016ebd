//! Database credential resolution, optionally via AWS Secrets Manager.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::CredentialSource;
use crate::{Error, Result};

/// Secret strings keyed by ARN, kept for the life of the process.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Username and password used to open pooled connections.
#[derive(Clone, Deserialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Resolve credentials from their configured source.
pub async fn resolve_credentials(source: &CredentialSource) -> Result<DatabaseCredentials> {
    match source {
        CredentialSource::Static { username, password } => Ok(DatabaseCredentials {
            username: username.clone(),
            password: password.clone(),
        }),
        CredentialSource::Secret { arn } => {
            info!("Fetching database credentials from Secrets Manager");
            let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let client = SecretsClient::new(&config);
            let secret_string = get_secret(&client, arn).await?;
            parse_credentials(&secret_string)
        }
    }
}

/// Get a secret value from Secrets Manager, consulting the cache first.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    if let Some(value) = get_cache().read().await.get(secret_arn) {
        return Ok(value.clone());
    }

    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    get_cache()
        .write()
        .await
        .insert(secret_arn.to_string(), secret_string.clone());

    Ok(secret_string)
}

fn parse_credentials(secret_string: &str) -> Result<DatabaseCredentials> {
    serde_json::from_str(secret_string)
        .map_err(|e| Error::Aws(format!("Failed to parse database credentials: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials() {
        let json = r#"{"username":"admin","password":"secret123","host":"db.example.com","port":5432}"#;
        let creds = parse_credentials(json).unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "secret123");
    }

    #[test]
    fn test_parse_credentials_missing_password() {
        let err = parse_credentials(r#"{"username":"admin"}"#).unwrap_err();
        assert!(matches!(err, Error::Aws(_)));
    }

    #[tokio::test]
    async fn test_static_credentials_pass_through() {
        let source = CredentialSource::Static {
            username: "events".to_string(),
            password: "p@ss/word".to_string(),
        };
        let creds = resolve_credentials(&source).await.unwrap();
        assert_eq!(creds.username, "events");
        assert_eq!(creds.password, "p@ss/word");
        assert!(!format!("{:?}", creds).contains("p@ss/word"));
    }
}
