// SPDX-License-Identifier: MIT

//! Google OAuth client.
//!
//! Completes the authorization-code flow: exchanges the callback code for
//! an access token, fetches the userinfo document, and normalizes it into
//! a [`GoogleProfile`] for reconciliation. Any failure along the way maps
//! to `AppError::ExchangeFailed`, which the callback route turns into a
//! redirect to the failure endpoint without creating a session.

use crate::error::AppError;
use serde::Deserialize;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Verified profile normalized from the provider's userinfo response.
#[derive(Debug, Clone)]
pub struct GoogleProfile {
    /// Stable identifier issued by Google, unique per account.
    pub provider_id: String,
    pub display_name: String,
    pub emails: Vec<String>,
    pub avatar_url: Option<String>,
}

/// Google OAuth API client.
#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    token_url: String,
    userinfo_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct Userinfo {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl GoogleClient {
    /// Create a client with OAuth credentials against the real Google
    /// endpoints.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: TOKEN_URL.to_string(),
            userinfo_url: USERINFO_URL.to_string(),
            client_id,
            client_secret,
        }
    }

    /// Create a client pointed at stub endpoints, for integration tests.
    pub fn with_endpoints(
        client_id: String,
        client_secret: String,
        token_url: String,
        userinfo_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url,
            userinfo_url,
            client_id,
            client_secret,
        }
    }

    /// Authorization URL the browser is redirected to when login starts.
    pub fn authorize_url(&self, callback_url: &str, state: &str) -> String {
        format!(
            "https://accounts.google.com/o/oauth2/v2/auth?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}&\
             state={}",
            self.client_id,
            urlencoding::encode(callback_url),
            urlencoding::encode("openid email profile"),
            state
        )
    }

    /// Exchange an authorization code for a verified profile.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<GoogleProfile, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExchangeFailed(format!("Token request failed: {}", e)))?;

        let token: TokenResponse = check_response_json(response).await?;

        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AppError::ExchangeFailed(format!("Userinfo request failed: {}", e)))?;

        let userinfo: Userinfo = check_response_json(response).await?;
        Ok(normalize_profile(userinfo))
    }
}

/// Map the userinfo document onto the profile shape reconciliation expects.
fn normalize_profile(userinfo: Userinfo) -> GoogleProfile {
    GoogleProfile {
        display_name: userinfo
            .name
            .unwrap_or_else(|| userinfo.email.clone().unwrap_or_default()),
        emails: userinfo.email.into_iter().collect(),
        avatar_url: userinfo.picture,
        provider_id: userinfo.id,
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::ExchangeFailed(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::ExchangeFailed(format!("Invalid response body: {}", e)))
}
