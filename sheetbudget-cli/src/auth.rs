use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::state::ensure_sheetbudget_home;

/// Credentials persisted in ~/.sheetbudget/auth.json.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    pub access_token: Option<String>,
    pub saved_at_utc: Option<String>,
}

/// The credential handed to the Sheets client. Built once per command from
/// [`AuthState`]; nothing else holds the token.
#[derive(Clone)]
pub struct Session {
    access_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("access_token", &"<redacted>").finish()
    }
}

fn auth_path() -> Result<PathBuf> {
    Ok(ensure_sheetbudget_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    let p = auth_path()?;
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = auth_path()?;
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn store_token(token: &str) -> Result<()> {
    let auth = AuthState {
        access_token: Some(token.to_string()),
        saved_at_utc: Some(chrono::Utc::now().to_rfc3339()),
    };
    save_auth(&auth)
}

/// Forget the stored token (after sign-out or an expired session).
pub fn clear_token() -> Result<()> {
    let mut auth = load_auth()?;
    if auth.access_token.take().is_some() {
        auth.saved_at_utc = None;
        save_auth(&auth)?;
    }
    Ok(())
}

/// Session from the stored token, or an error telling the user how to log in.
pub fn session() -> Result<Session> {
    match load_auth()?.access_token {
        Some(t) if !t.trim().is_empty() => Ok(Session::new(t.trim())),
        _ => bail!(
            "not signed in to Google.\nRun: sheetbudget auth login   (requires the `oauth` feature)\n  or: sheetbudget auth paste-token"
        ),
    }
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn paste_token() -> Result<()> {
    let token = prompt_secret("Paste Google OAuth access token (starts with ya29.)")?;
    if !token.starts_with("ya29.") {
        bail!("token didn't look like a Google access token (expected prefix ya29.)");
    }
    store_token(&token)?;
    println!("Saved access token to {}", auth_path()?.display());
    Ok(())
}

pub fn status() -> Result<()> {
    let auth = load_auth()?;
    match (auth.access_token, auth.saved_at_utc) {
        (Some(_), Some(at)) => println!("Signed in (token saved {at})"),
        (Some(_), None) => println!("Signed in"),
        (None, _) => println!("Not signed in"),
    }
    Ok(())
}
