//! Service account authentication for the Google Calendar API.
//!
//! A signed JWT assertion is exchanged for a short-lived access token
//! (OAuth 2.0 JWT bearer grant).

use super::CalendarError;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// The fields of a downloaded service account key file we need
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: SecretString,
    pub token_uri: String,
}

#[derive(Deserialize)]
struct KeyFile {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, CalendarError> {
        let content = fs::read_to_string(path)
            .map_err(|e| CalendarError::Credentials(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CalendarError> {
        let file: KeyFile =
            serde_json::from_str(content).map_err(|e| CalendarError::Credentials(e.to_string()))?;
        Ok(Self {
            client_email: file.client_email,
            private_key: SecretString::from(file.private_key),
            token_uri: file.token_uri,
        })
    }

    fn assertion(&self, now: i64) -> Result<String, CalendarError> {
        let claims = Claims {
            iss: &self.client_email,
            scope: CALENDAR_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())
            .map_err(|e| CalendarError::Credentials(format!("Invalid private key: {}", e)))?;

        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| CalendarError::Auth(format!("Failed to sign assertion: {}", e)))
    }

    /// Exchange a signed assertion for an access token.
    pub async fn fetch_access_token(&self, client: &Client) -> Result<SecretString, CalendarError> {
        let assertion = self.assertion(Utc::now().timestamp())?;
        debug!("Requesting access token for {}", self.client_email);

        let response = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Auth(format!("HTTP {} - {}", status, body)));
        }

        let token: TokenResponse = response.json().await?;
        Ok(SecretString::from(token.access_token))
    }
}
