use crate::errors::AuthError;
use async_trait::async_trait;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{instrument, warn};

pub const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Apple,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Apple => "apple",
        }
    }
}

impl FromStr for OAuthProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(OAuthProvider::Google),
            "apple" => Ok(OAuthProvider::Apple),
            _ => Err(AuthError::InvalidOAuthProvider),
        }
    }
}

/// Identity asserted by a verified provider token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthIdentity {
    pub email: String,
    pub name: String,
    pub subject: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthVerifier: Send + Sync {
    async fn verify(
        &self,
        provider: OAuthProvider,
        id_token: &str,
    ) -> Result<OAuthIdentity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

/// Verifies Google ID tokens against the tokeninfo endpoint. Apple sign-in
/// is not supported and always fails verification.
#[derive(Clone)]
pub struct HttpOAuthVerifier {
    client: reqwest::Client,
    tokeninfo_url: String,
    google_client_id: Option<String>,
}

impl HttpOAuthVerifier {
    pub fn new(google_client_id: Option<String>) -> Result<Self, AuthError> {
        Self::with_tokeninfo_url(google_client_id, GOOGLE_TOKENINFO_URL)
    }

    pub fn with_tokeninfo_url(
        google_client_id: Option<String>,
        tokeninfo_url: &str,
    ) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::InvalidToken(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            tokeninfo_url: tokeninfo_url.to_string(),
            google_client_id,
        })
    }

    async fn verify_google(&self, id_token: &str) -> Result<OAuthIdentity, AuthError> {
        let client_id = self
            .google_client_id
            .as_deref()
            .ok_or(AuthError::InvalidOAuthToken)?;

        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Google tokeninfo request failed");
                AuthError::InvalidOAuthToken
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Google rejected ID token");
            return Err(AuthError::InvalidOAuthToken);
        }

        let info: GoogleTokenInfo = response
            .json()
            .await
            .map_err(|_| AuthError::InvalidOAuthToken)?;

        if info.aud != client_id {
            warn!(audience = %info.aud, "ID token issued for another client");
            return Err(AuthError::InvalidOAuthToken);
        }

        let email = info.email.ok_or(AuthError::InvalidOAuthToken)?;
        Ok(OAuthIdentity {
            email,
            name: info.name.unwrap_or_default(),
            subject: info.sub,
        })
    }
}

#[async_trait]
impl OAuthVerifier for HttpOAuthVerifier {
    #[instrument(skip(self, id_token), fields(provider = provider.as_str()))]
    async fn verify(
        &self,
        provider: OAuthProvider,
        id_token: &str,
    ) -> Result<OAuthIdentity, AuthError> {
        match provider {
            OAuthProvider::Google => self.verify_google(id_token).await,
            OAuthProvider::Apple => Err(AuthError::InvalidOAuthToken),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn verifier(server: &MockServer) -> HttpOAuthVerifier {
        HttpOAuthVerifier::with_tokeninfo_url(
            Some("client-123".to_string()),
            &format!("{}/tokeninfo", server.uri()),
        )
        .unwrap()
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("google".parse::<OAuthProvider>().unwrap(), OAuthProvider::Google);
        assert!(matches!(
            "facebook".parse::<OAuthProvider>(),
            Err(AuthError::InvalidOAuthProvider)
        ));
    }

    #[tokio::test]
    async fn test_google_token_with_matching_audience() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tokeninfo"))
            .and(query_param("id_token", "good-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "aud": "client-123",
                "sub": "google-sub-1",
                "email": "ada@example.com",
                "name": "Ada"
            })))
            .mount(&server)
            .await;

        let identity = verifier(&server)
            .await
            .verify(OAuthProvider::Google, "good-token")
            .await
            .unwrap();
        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(identity.subject, "google-sub-1");
    }

    #[tokio::test]
    async fn test_google_token_for_other_audience_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tokeninfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "aud": "someone-else",
                "sub": "x",
                "email": "ada@example.com"
            })))
            .mount(&server)
            .await;

        let result = verifier(&server)
            .await
            .verify(OAuthProvider::Google, "token")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidOAuthToken)));
    }

    #[tokio::test]
    async fn test_google_error_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let result = verifier(&server)
            .await
            .verify(OAuthProvider::Google, "expired")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidOAuthToken)));
    }

    #[tokio::test]
    async fn test_apple_is_not_supported() {
        let server = MockServer::start().await;
        let result = verifier(&server)
            .await
            .verify(OAuthProvider::Apple, "token")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidOAuthToken)));
    }
}
