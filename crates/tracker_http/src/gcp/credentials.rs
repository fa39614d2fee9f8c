use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use reqwest::{Method, Request, StatusCode};
use ring::signature::RsaKeyPair;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tracker_core::errors::{ErrorKind, Result, ResultExt, TrackerError};
use url::Url;

use crate::client::{
    HttpClient,
    HttpResponse,
    check_response_with,
    read_json_response,
    set_form_body,
};

/// Read only access to spreadsheets.
pub const SPREADSHEETS_READ_ONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/spreadsheets.readonly";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// A service account key as downloaded from the Google Cloud console.
///
/// Only the fields needed for the JWT bearer flow are required.
#[derive(Clone, Deserialize)]
pub struct ServiceAccount {
    #[serde(rename = "type", default)]
    account_type: Option<String>,
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    private_key_id: Option<String>,
    private_key: String,
    client_email: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"***")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: u64,
    iat: u64,
}

#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

impl ServiceAccount {
    pub fn try_from_str(input: &str) -> Result<Self> {
        let account: ServiceAccount = serde_json::from_str(input).context(
            ErrorKind::Config,
            "Failed to deserialize json service account key",
        )?;

        if let Some(typ) = &account.account_type {
            if typ != "service_account" {
                return Err(TrackerError::config(format!(
                    "Expected credentials of type 'service_account', got '{typ}'"
                )));
            }
        }

        Ok(account)
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    fn rsa_key_pair(&self) -> Result<RsaKeyPair> {
        let mut reader = std::io::Cursor::new(self.private_key.as_bytes());
        let key = rustls_pemfile::read_one(&mut reader)
            .context(ErrorKind::Config, "Invalid PEM private key")?;
        match key {
            Some(rustls_pemfile::Item::Pkcs8Key(der)) => RsaKeyPair::from_pkcs8(der.secret_pkcs8_der())
                .map_err(|_| TrackerError::config("Failed to create rsa key pair from pkcs8 key")),
            Some(rustls_pemfile::Item::Pkcs1Key(der)) => RsaKeyPair::from_der(der.secret_pkcs1_der())
                .map_err(|_| TrackerError::config("Failed to create rsa key pair from pkcs1 key")),
            _ => Err(TrackerError::config("Missing private key in service account")),
        }
    }

    /// Create a signed JWT assertion for the token exchange.
    fn signed_assertion(&self, scope: &str) -> Result<String> {
        let now = Utc::now();
        let iat = now.timestamp() as u64;
        let exp = (now + Duration::hours(1)).timestamp() as u64;

        let claims = JwtClaims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat,
            exp,
        };
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
            kid: self.private_key_id.as_deref(),
        };

        let header_b64 = BASE64_URL_SAFE_NO_PAD.encode(
            serde_json::to_string(&header).context(ErrorKind::Config, "Failed to encode jwt header")?,
        );
        let claims_b64 = BASE64_URL_SAFE_NO_PAD.encode(
            serde_json::to_string(&claims).context(ErrorKind::Config, "Failed to encode jwt claims")?,
        );
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let key_pair = self.rsa_key_pair()?;

        // Sign with PKCS#1 v1.5 SHA-256 (RS256)
        let mut signature = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| TrackerError::config("Failed to sign jwt payload"))?;

        let sig_b64 = BASE64_URL_SAFE_NO_PAD.encode(&signature);
        Ok(format!("{}.{}", signing_input, sig_b64))
    }

    /// Fetch an access token using this service account.
    pub async fn fetch_access_token<C>(&self, client: &C, scope: &str) -> Result<AccessToken>
    where
        C: HttpClient,
    {
        let jwt = self.signed_assertion(scope)?;

        // Exchange the JWT for an access token
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", jwt.as_str()),
        ];
        let url = Url::parse(&self.token_uri)
            .context(ErrorKind::Config, "Failed to parse token uri as url")?;
        let mut request = Request::new(Method::POST, url);
        set_form_body(&mut request, &params)?;

        let resp = client.do_request(request).await?;
        let resp = check_response_with(resp, "Token exchange", token_error_kind).await?;
        let tok_resp: AccessToken = read_json_response(resp.into_bytes_stream())
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::Provider => {
                    TrackerError::upstream_auth(format!("Invalid token response: {e}"))
                }
                _ => e,
            })?;

        debug!(client_email = %self.client_email, expires_in = tok_resp.expires_in, "fetched access token");

        Ok(tok_resp)
    }
}

/// The token endpoint answers bad grants with a 400, so every client error
/// from it is an auth failure.
fn token_error_kind(status: StatusCode) -> Option<ErrorKind> {
    if status.is_success() {
        None
    } else if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        Some(ErrorKind::UpstreamAuth)
    } else {
        Some(ErrorKind::UpstreamUnavailable)
    }
}

/// How requests to the provider get authorized.
#[derive(Clone)]
pub enum Credentials {
    /// Exchange a signed JWT for a fresh token on every call.
    ServiceAccount(Arc<ServiceAccount>),
    /// Use a pre-issued access token as is.
    StaticToken(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceAccount(account) => f.debug_tuple("ServiceAccount").field(account).finish(),
            Self::StaticToken(_) => f.debug_tuple("StaticToken").field(&"***").finish(),
        }
    }
}

impl Credentials {
    /// Get an access token for read only spreadsheet access.
    pub async fn access_token<C>(&self, client: &C) -> Result<String>
    where
        C: HttpClient,
    {
        match self {
            Self::ServiceAccount(account) => {
                let token = account
                    .fetch_access_token(client, SPREADSHEETS_READ_ONLY_SCOPE)
                    .await?;
                Ok(token.access_token)
            }
            Self::StaticToken(token) => Ok(token.clone()),
        }
    }
}
