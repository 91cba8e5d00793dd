use std::fs;
use std::path::Path;
use chrono::{DateTime, Utc};
use anyhow::Result;
use std::collections::HashSet;
use tracing;

use rspotify::Token;

const SPOTIFY_CLIENT_ID: &str = "492e1e45ea814fa3ac555fe1576aaf5b";
const SPOTIFY_REDIRECT_URI: &str = "http://127.0.0.1:8898/login";
pub const SCOPES: &str =
    "playlist-read-private playlist-read-collaborative playlist-modify-private playlist-modify-public user-library-read user-library-modify";

const RESPONSE: &str = r#"
<!doctype html>
<html>
<head><title>Success</title></head>
<body><h1>Authentication Successful!</h1><script>window.close();</script></body>
</html>
"#;
const CACHE: &str = ".cache";
const REFRESH_TOKEN_FILE: &str = ".cache/refresh_token";
const TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Clone)]
pub struct AuthResult {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthResult {
    fn from_oauth(token: librespot_oauth::OAuthToken) -> Self {
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(TOKEN_LIFETIME_SECS),
        }
    }
}

fn oauth_client(open_in_browser: bool) -> Result<librespot_oauth::OAuthClient> {
    let builder = librespot_oauth::OAuthClientBuilder::new(
        SPOTIFY_CLIENT_ID,
        SPOTIFY_REDIRECT_URI,
        SCOPES.split_whitespace().collect(),
    );
    let builder = if open_in_browser {
        builder.open_in_browser().with_custom_message(RESPONSE)
    } else {
        builder
    };
    Ok(builder.build()?)
}

fn store_refresh_token(refresh_token: &str) {
    if let Err(e) = fs::create_dir_all(Path::new(CACHE))
        .and_then(|_| fs::write(REFRESH_TOKEN_FILE, refresh_token))
    {
        tracing::warn!(error = %e, "Could not save refresh token");
    } else {
        tracing::debug!("Saved refresh token to disk");
    }
}

async fn perform_browser_auth() -> Result<AuthResult> {
    tracing::info!("Starting browser-based OAuth flow");
    let token = oauth_client(true)?.get_access_token_async().await?;

    store_refresh_token(&token.refresh_token);
    tracing::info!("Browser authentication completed successfully");
    Ok(AuthResult::from_oauth(token))
}

/// Exchange a refresh token for a new access token
pub async fn refresh_access_token(refresh_token: &str) -> Result<AuthResult> {
    let token = oauth_client(false)?.refresh_token_async(refresh_token).await?;
    store_refresh_token(&token.refresh_token);
    Ok(AuthResult::from_oauth(token))
}

/// Log in, reusing the cached refresh token when it still works
pub async fn perform_oauth_flow() -> Result<AuthResult> {
    match fs::read_to_string(REFRESH_TOKEN_FILE).ok() {
        Some(refresh_token) => {
            tracing::info!("Found cached refresh token");
            match refresh_access_token(refresh_token.trim()).await {
                Ok(auth) => {
                    tracing::debug!("Token refreshed successfully");
                    Ok(auth)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Cached refresh token failed, re-authenticating");
                    perform_browser_auth().await
                }
            }
        }
        None => {
            tracing::info!("No cached credentials found, starting browser authentication");
            perform_browser_auth().await
        }
    }
}

/// Token in the shape rspotify expects
pub fn rspotify_token(access_token: String, expires_at: DateTime<Utc>) -> Token {
    Token {
        access_token,
        expires_in: chrono::Duration::seconds(TOKEN_LIFETIME_SECS),
        expires_at: Some(expires_at),
        scopes: SCOPES
            .split_whitespace()
            .map(|s| s.to_string())
            .collect::<HashSet<String>>(),
        refresh_token: None,
    }
}
