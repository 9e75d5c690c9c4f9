use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_sheetbudget_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceSection,
    pub sheets: SheetsSection,
    pub history: HistorySection,
    pub clock: ClockSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Google Sheets over HTTP
    Sheets,
    /// CSV files on disk
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    pub kind: SourceKind,
    /// For kind = "local": defaults to ~/.sheetbudget/transactions.csv
    pub transactions_csv: Option<PathBuf>,
    /// For kind = "local": defaults to ~/.sheetbudget/budgets.csv
    pub budgets_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsSection {
    /// Spreadsheet id of the transactions sheet (from its URL)
    pub transactions_spreadsheet_id: String,
    pub transactions_sheet: String,
    /// Drive file name of the budgets spreadsheet; created on first use
    pub budgets_file_name: String,
    pub budgets_sheet: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    /// Earliest period start included in history reports (YYYY-MM-DD)
    pub horizon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockSection {
    /// IANA zone used to read the wall clock, e.g. "America/New_York"
    pub timezone: String,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            kind: SourceKind::Sheets,
            transactions_csv: None,
            budgets_csv: None,
        }
    }
}

impl Default for SheetsSection {
    fn default() -> Self {
        Self {
            transactions_spreadsheet_id: String::new(),
            transactions_sheet: "Sheet1".to_string(),
            budgets_file_name: "Budgets".to_string(),
            budgets_sheet: "Sheet1".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            horizon: "2024-01-01".to_string(),
        }
    }
}

impl Default for ClockSection {
    fn default() -> Self {
        Self {
            timezone: "America/New_York".to_string(),
        }
    }
}

impl ClockSection {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone in config: {}", self.timezone))
    }

    /// Current wall-clock time in the configured zone, without offset.
    pub fn now_local(&self) -> Result<NaiveDateTime> {
        Ok(Utc::now().with_timezone(&self.tz()?).naive_local())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_sheetbudget_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(p: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    println!("Set sheets.transactions_spreadsheet_id before running `sheetbudget budgets`.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        save_config_to(&p, &Config::default()).unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.source.kind, SourceKind::Sheets);
        assert_eq!(cfg.sheets.budgets_file_name, "Budgets");
        assert_eq!(cfg.history.horizon, "2024-01-01");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[source]
kind = "local"

[sheets]
transactions_spreadsheet_id = "abc123"
"#,
        )
        .unwrap();
        assert_eq!(cfg.source.kind, SourceKind::Local);
        assert_eq!(cfg.sheets.transactions_spreadsheet_id, "abc123");
        assert_eq!(cfg.sheets.transactions_sheet, "Sheet1");
        assert_eq!(cfg.sheets.request_timeout_secs, 30);
        assert_eq!(cfg.clock.timezone, "America/New_York");
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.sheets.budgets_sheet, "Sheet1");
    }

    #[test]
    fn test_bad_timezone() {
        let clock = ClockSection {
            timezone: "Mars/Olympus".to_string(),
        };
        assert!(clock.now_local().is_err());
        assert!(ClockSection::default().now_local().is_ok());
    }
}
