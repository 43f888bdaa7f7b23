//! Cohesity Authentication
//!
//! Exchanges cluster username/password/domain for a bearer access token and
//! caches it for the lifetime of the client.

use super::http::CohesityHttpClient;
use super::models::{AccessToken, AccessTokenRequest};
use crate::error::{CohesityError, Result};
use reqwest::Method;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub const ACCESS_TOKENS_PATH: &str = "/irisservices/api/v1/public/accessTokens";

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// The v1 token endpoint does not report an expiry; cluster tokens live for
/// 24 hours, assume half of that
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Cluster credentials with token caching
#[derive(Clone)]
pub struct CohesityCredentials {
    username: String,
    password: String,
    domain: String,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl std::fmt::Debug for CohesityCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CohesityCredentials")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

impl CohesityCredentials {
    pub fn new(username: &str, password: &str, domain: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            domain: domain.to_string(),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls, logging in on first use
    pub async fn get_token(&self, http: &CohesityHttpClient) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, requesting new token");
            }
        }

        if self.username.is_empty() {
            return Err(CohesityError::Config(
                "No cluster username configured".to_string(),
            ));
        }

        tracing::info!("Logging in to {} as {}\\{}", http.base_url(), self.domain, self.username);

        let body = AccessTokenRequest {
            domain: &self.domain,
            username: &self.username,
            password: &self.password,
        };
        let token: Option<AccessToken> = http
            .send(Method::POST, ACCESS_TOKENS_PATH, None, &[], Some(&body))
            .await
            .map_err(|e| match e {
                CohesityError::Api { status, message } => {
                    CohesityError::Auth(format!("{} ({})", message, status))
                }
                other => other,
            })?;

        let token = token
            .map(|t| t.access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CohesityError::Auth("No access token in login response".to_string()))?;

        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;
        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            (DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token)
    }

    /// Clear the cached token so the next call logs in again
    pub async fn invalidate(&self) {
        let mut cache = self.token_cache.write().await;
        *cache = None;
    }
}
