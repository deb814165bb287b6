use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::GoogleConfig;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("token exchange rejected: {0}")]
    Exchange(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Google profile subset we consume: `sub` is the stable federated key.
#[derive(Debug, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
}

/// Redirect-based sign-in against Google's OAuth 2.0 endpoints: send the
/// browser to `authorize_url`, then turn the callback code into a profile.
#[derive(Clone)]
pub struct GoogleClient {
    config: GoogleConfig,
    http: reqwest::Client,
}

impl GoogleClient {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    // TODO: carry an anti-forgery state param once there is server-side
    // request state to check it against on the callback.
    pub fn authorize_url(&self) -> String {
        let mut url = Url::parse(AUTHORIZE_URL).expect("static url parses");
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.callback_url)
            .append_pair("response_type", "code")
            .append_pair("scope", "profile");
        url.into()
    }

    /// Exchange the callback code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, GoogleError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            return Err(GoogleError::Exchange(format!("{status}: {body}")));
        }

        Ok(response.json::<TokenResponse>().await?.access_token)
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, GoogleError> {
        let profile = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json::<GoogleProfile>()
            .await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleClient {
        GoogleClient::new(GoogleConfig {
            client_id: "cid".to_string(),
            client_secret: "cs".to_string(),
            callback_url: "http://localhost:3000/auth/google/callback".to_string(),
        })
    }

    #[test]
    fn authorize_url_carries_client_and_callback() {
        let url = Url::parse(&client().authorize_url()).unwrap();
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(pairs["client_id"], "cid");
        assert_eq!(
            pairs["redirect_uri"],
            "http://localhost:3000/auth/google/callback"
        );
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["scope"], "profile");
    }
}
