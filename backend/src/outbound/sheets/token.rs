//! OAuth access tokens minted from a service-account key.
//!
//! A signed RS256 assertion is exchanged at the key's token endpoint. The
//! resulting bearer token is cached until shortly before it expires.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use mockable::Clock;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;
use zeroize::Zeroizing;

use super::credentials::ServiceAccountKey;
use super::dto::{AssertionClaims, TokenResponseDto};
use super::errors::{map_token_status_error, map_transport_error};
use crate::domain::ports::SpreadsheetError;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

struct CachedToken {
    value: Zeroizing<String>,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct AuthState {
    key: Option<Arc<ServiceAccountKey>>,
    token: Option<CachedToken>,
}

pub(super) struct TokenSource {
    client: Client,
    clock: Arc<dyn Clock>,
    credentials_path: PathBuf,
    token_uri_override: Option<String>,
    state: Mutex<AuthState>,
}

impl TokenSource {
    pub fn new(
        client: Client,
        clock: Arc<dyn Clock>,
        credentials_path: PathBuf,
        token_uri_override: Option<String>,
    ) -> Self {
        Self {
            client,
            clock,
            credentials_path,
            token_uri_override,
            state: Mutex::new(AuthState::default()),
        }
    }

    /// Re-read the key file and drop any cached token.
    pub async fn reload(&self) -> Result<(), SpreadsheetError> {
        let key = ServiceAccountKey::load(&self.credentials_path)?;
        // Fail fast on a malformed key instead of at the first write.
        EncodingKey::from_rsa_pem(key.private_key_pem().as_bytes())
            .map_err(|err| SpreadsheetError::key(err.to_string()))?;
        let mut state = self.state.lock().await;
        state.key = Some(Arc::new(key));
        state.token = None;
        Ok(())
    }

    /// A bearer token valid for at least the refresh margin.
    pub async fn bearer(&self) -> Result<Zeroizing<String>, SpreadsheetError> {
        let mut state = self.state.lock().await;
        let now = self.clock.utc();
        if let Some(token) = state.token.as_ref() {
            if token.expires_at - TimeDelta::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(token.value.clone());
            }
        }

        let key = match state.key.clone() {
            Some(key) => key,
            None => {
                let loaded = Arc::new(ServiceAccountKey::load(&self.credentials_path)?);
                state.key = Some(Arc::clone(&loaded));
                loaded
            }
        };
        let fresh = self.exchange(&key, now).await?;
        let value = fresh.value.clone();
        state.token = Some(fresh);
        Ok(value)
    }

    async fn exchange(
        &self,
        key: &ServiceAccountKey,
        now: DateTime<Utc>,
    ) -> Result<CachedToken, SpreadsheetError> {
        let token_uri = self
            .token_uri_override
            .as_deref()
            .unwrap_or(key.token_uri());
        let assertion = Zeroizing::new(sign_assertion(key, token_uri, now)?);

        let response = self
            .client
            .post(token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_token_status_error(status, body.as_ref()));
        }

        let decoded: TokenResponseDto = serde_json::from_slice(body.as_ref())
            .map_err(|err| SpreadsheetError::decode(format!("token response: {err}")))?;
        let lifetime = decoded.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        debug!(lifetime, "spreadsheet access token refreshed");
        Ok(CachedToken {
            value: Zeroizing::new(decoded.access_token),
            expires_at: now + TimeDelta::seconds(lifetime),
        })
    }
}

fn sign_assertion(
    key: &ServiceAccountKey,
    audience: &str,
    now: DateTime<Utc>,
) -> Result<String, SpreadsheetError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key_pem().as_bytes())
        .map_err(|err| SpreadsheetError::key(err.to_string()))?;
    let issued_at = now.timestamp();
    let claims = AssertionClaims {
        iss: key.client_email(),
        scope: SHEETS_SCOPE,
        aud: audience,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };
    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|err| SpreadsheetError::key(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_pem_is_a_key_error() {
        let key = ServiceAccountKey::from_json(
            br#"{"client_email":"a@b","private_key":"not a pem"}"#,
        )
        .expect("key should parse");

        let err = sign_assertion(&key, "http://localhost/token", Utc::now())
            .expect_err("signing should fail");
        assert!(matches!(err, SpreadsheetError::Key { .. }));
    }

    #[tokio::test]
    async fn reload_reports_missing_credentials() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = TokenSource::new(
            Client::new(),
            Arc::new(mockable::DefaultClock),
            dir.path().join("credentials.json"),
            None,
        );

        let err = source.reload().await.expect_err("reload should fail");
        assert!(matches!(err, SpreadsheetError::Credentials { .. }));
    }
}
