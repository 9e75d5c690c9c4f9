use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::auth;
use crate::state::ensure_sheetbudget_home;

// Use the oauth2 version re-exported by google-sheets4 so the types line up.
use google_sheets4::oauth2;

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.metadata.readonly",
    "https://www.googleapis.com/auth/drive.file",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleOAuthClient {
    pub client_id: String,
    pub client_secret: String,
    /// Defaults to https://accounts.google.com/o/oauth2/auth
    pub auth_uri: Option<String>,
    /// Defaults to https://oauth2.googleapis.com/token
    pub token_uri: Option<String>,
}

fn oauth_client_path() -> Result<PathBuf> {
    Ok(ensure_sheetbudget_home()?.join("google_oauth.json"))
}

fn token_cache_path() -> Result<PathBuf> {
    Ok(ensure_sheetbudget_home()?.join("google_token_cache.json"))
}

fn load_or_prompt_client() -> Result<GoogleOAuthClient> {
    let p = oauth_client_path()?;
    if p.exists() {
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        return Ok(serde_json::from_str(&s)?);
    }

    println!("Google Sheets login\n");
    println!("Create OAuth credentials once:");
    println!("1) https://console.cloud.google.com/apis/credentials");
    println!("2) Create credentials -> OAuth client ID -> Desktop app");
    println!("3) Enable the Google Sheets and Google Drive APIs\n");

    let client_id = prompt("Paste client_id")?;
    let client_secret = prompt("Paste client_secret")?;
    if !client_id.contains('.') || client_secret.len() < 10 {
        bail!("client_id/client_secret didn't look valid");
    }

    let client = GoogleOAuthClient {
        client_id,
        client_secret,
        auth_uri: None,
        token_uri: None,
    };
    fs::write(&p, serde_json::to_string_pretty(&client)?)
        .with_context(|| format!("write {}", p.display()))?;
    Ok(client)
}

/// Run the installed-app flow and store the resulting access token.
pub async fn login() -> Result<()> {
    let client = load_or_prompt_client()?;
    let secret = oauth2::ApplicationSecret {
        client_id: client.client_id.clone(),
        client_secret: client.client_secret.clone(),
        auth_uri: client
            .auth_uri
            .clone()
            .unwrap_or_else(|| "https://accounts.google.com/o/oauth2/auth".to_string()),
        token_uri: client
            .token_uri
            .clone()
            .unwrap_or_else(|| "https://oauth2.googleapis.com/token".to_string()),
        redirect_uris: vec!["http://localhost".to_string()],
        ..Default::default()
    };

    let authenticator = oauth2::InstalledFlowAuthenticator::builder(
        secret,
        oauth2::InstalledFlowReturnMethod::HTTPRedirect,
    )
    .persist_tokens_to_disk(token_cache_path()?)
    .build()
    .await
    .context("building oauth authenticator")?;

    let token = authenticator
        .token(SCOPES)
        .await
        .context("requesting Google access token")?;
    let Some(access) = token.token() else {
        bail!("Google returned no access token");
    };

    auth::store_token(access)?;
    println!("Signed in. Token cached at {}", token_cache_path()?.display());
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    use std::io::{self, Write};
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}
