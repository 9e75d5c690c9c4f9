//! The spreadsheet store behind the tracker.
//!
//! `Ledger` is the only way commands touch budgets and transactions. The core
//! never calls it; commands fetch snapshots here and hand them to the core.

use anyhow::{bail, Context, Result};
use sheetbudget_core::{Budget, Transaction};
use sheetbudget_ingest::csv_store;
use sheetbudget_ingest::{
    budget_to_row, category_cell, cell_ref, columns, find_budget_row, parse_budget_rows,
    parse_transaction_rows, SheetKind,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::auth::Session;
use crate::config::{Config, SourceKind};
use crate::sheets::SheetsClient;
use crate::state::ensure_sheetbudget_home;

pub(crate) trait Ledger {
    /// All budget rows, header excluded.
    async fn fetch_budget_definitions(&self) -> Result<Vec<Budget>>;

    /// All transaction rows, header excluded, tagged with their sheet row.
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>>;

    async fn set_transaction_category(&self, row_index: u32, category: &str) -> Result<()>;

    async fn create_budget(&self, budget: &Budget) -> Result<()>;

    /// Rewrite the name and limit of an existing budget.
    async fn update_budget(&self, id: &str, name: &str, limit: f64) -> Result<()>;
}

/// Fetch both snapshots concurrently; both must succeed.
pub(crate) async fn load_snapshot<L: Ledger>(ledger: &L) -> Result<(Vec<Budget>, Vec<Transaction>)> {
    let (budgets, transactions) =
        tokio::try_join!(ledger.fetch_budget_definitions(), ledger.fetch_transactions())?;
    tracing::debug!(budgets = budgets.len(), transactions = transactions.len(), "loaded snapshot");
    Ok((budgets, transactions))
}

/// Ledger selected by `[source] kind`.
pub(crate) enum AnyLedger {
    Sheets(SheetsLedger),
    Local(LocalLedger),
}

impl AnyLedger {
    pub fn from_config(cfg: &Config, session: impl FnOnce() -> Result<Session>) -> Result<Self> {
        match cfg.source.kind {
            SourceKind::Local => Ok(AnyLedger::Local(LocalLedger::from_config(cfg)?)),
            SourceKind::Sheets => Ok(AnyLedger::Sheets(SheetsLedger::from_config(cfg, session()?)?)),
        }
    }
}

impl Ledger for AnyLedger {
    async fn fetch_budget_definitions(&self) -> Result<Vec<Budget>> {
        match self {
            AnyLedger::Sheets(l) => l.fetch_budget_definitions().await,
            AnyLedger::Local(l) => l.fetch_budget_definitions().await,
        }
    }

    async fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
        match self {
            AnyLedger::Sheets(l) => l.fetch_transactions().await,
            AnyLedger::Local(l) => l.fetch_transactions().await,
        }
    }

    async fn set_transaction_category(&self, row_index: u32, category: &str) -> Result<()> {
        match self {
            AnyLedger::Sheets(l) => l.set_transaction_category(row_index, category).await,
            AnyLedger::Local(l) => l.set_transaction_category(row_index, category).await,
        }
    }

    async fn create_budget(&self, budget: &Budget) -> Result<()> {
        match self {
            AnyLedger::Sheets(l) => l.create_budget(budget).await,
            AnyLedger::Local(l) => l.create_budget(budget).await,
        }
    }

    async fn update_budget(&self, id: &str, name: &str, limit: f64) -> Result<()> {
        match self {
            AnyLedger::Sheets(l) => l.update_budget(id, name, limit).await,
            AnyLedger::Local(l) => l.update_budget(id, name, limit).await,
        }
    }
}

/// Google Sheets: a fixed transactions spreadsheet plus a budgets spreadsheet
/// found (or created) by name in Drive.
pub(crate) struct SheetsLedger {
    client: SheetsClient,
    transactions_id: String,
    transactions_sheet: String,
    budgets_file_name: String,
    budgets_sheet: String,
    budgets_id: OnceCell<String>,
}

impl SheetsLedger {
    pub fn from_config(cfg: &Config, session: Session) -> Result<Self> {
        let s = &cfg.sheets;
        if s.transactions_spreadsheet_id.trim().is_empty() {
            bail!("sheets.transactions_spreadsheet_id is not set (run: sheetbudget config init, then edit it)");
        }
        let client = SheetsClient::new(session, Duration::from_secs(s.request_timeout_secs))?;
        Ok(Self {
            client,
            transactions_id: s.transactions_spreadsheet_id.trim().to_string(),
            transactions_sheet: s.transactions_sheet.clone(),
            budgets_file_name: s.budgets_file_name.clone(),
            budgets_sheet: s.budgets_sheet.clone(),
            budgets_id: OnceCell::new(),
        })
    }

    async fn budgets_file(&self) -> Result<&str> {
        let id = self
            .budgets_id
            .get_or_try_init(|| async {
                if let Some(id) = self.client.find_file_by_name(&self.budgets_file_name).await? {
                    return Ok::<_, anyhow::Error>(id);
                }
                tracing::info!(name = %self.budgets_file_name, "budgets spreadsheet not found; creating it");
                self.client
                    .create_spreadsheet(
                        &self.budgets_file_name,
                        &self.budgets_sheet,
                        SheetKind::Budgets.headers(),
                    )
                    .await
            })
            .await?;
        Ok(id.as_str())
    }
}

impl Ledger for SheetsLedger {
    async fn fetch_budget_definitions(&self) -> Result<Vec<Budget>> {
        let file = self.budgets_file().await?;
        let rows = self.client.get_values(file, &self.budgets_sheet).await?;
        Ok(parse_budget_rows(&rows))
    }

    async fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = self
            .client
            .get_values(&self.transactions_id, &self.transactions_sheet)
            .await?;
        Ok(parse_transaction_rows(&rows))
    }

    async fn set_transaction_category(&self, row_index: u32, category: &str) -> Result<()> {
        let range = category_cell(&self.transactions_sheet, row_index);
        self.client
            .update_cell(&self.transactions_id, &range, category)
            .await
            .with_context(|| format!("setting category of row {row_index}"))
    }

    async fn create_budget(&self, budget: &Budget) -> Result<()> {
        let file = self.budgets_file().await?;
        let range = format!("{}!A1", self.budgets_sheet);
        self.client.append_row(file, &range, &budget_to_row(budget)).await
    }

    async fn update_budget(&self, id: &str, name: &str, limit: f64) -> Result<()> {
        let file = self.budgets_file().await?;
        let rows = self.client.get_values(file, &self.budgets_sheet).await?;
        let Some(row) = find_budget_row(&rows, id) else {
            bail!("budget not found: {id}");
        };
        let sheet = &self.budgets_sheet;
        self.client
            .update_cell(file, &cell_ref(sheet, columns::BUDGET_NAME, row), name)
            .await?;
        self.client
            .update_cell(file, &cell_ref(sheet, columns::BUDGET_LIMIT, row), &limit.to_string())
            .await
    }
}

/// CSV files laid out exactly like the two sheets.
#[derive(Debug, Clone)]
pub(crate) struct LocalLedger {
    transactions_csv: PathBuf,
    budgets_csv: PathBuf,
}

impl LocalLedger {
    pub fn new(transactions_csv: impl Into<PathBuf>, budgets_csv: impl Into<PathBuf>) -> Self {
        Self {
            transactions_csv: transactions_csv.into(),
            budgets_csv: budgets_csv.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let home = ensure_sheetbudget_home()?;
        Ok(Self::new(
            cfg.source
                .transactions_csv
                .clone()
                .unwrap_or_else(|| home.join("transactions.csv")),
            cfg.source
                .budgets_csv
                .clone()
                .unwrap_or_else(|| home.join("budgets.csv")),
        ))
    }
}

impl Ledger for LocalLedger {
    async fn fetch_budget_definitions(&self) -> Result<Vec<Budget>> {
        csv_store::ensure_sheet(&self.budgets_csv, SheetKind::Budgets)?;
        Ok(parse_budget_rows(&csv_store::read_rows(&self.budgets_csv)?))
    }

    async fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
        if !self.transactions_csv.exists() {
            bail!(
                "transactions file not found: {} (set source.transactions_csv)",
                self.transactions_csv.display()
            );
        }
        Ok(parse_transaction_rows(&csv_store::read_rows(&self.transactions_csv)?))
    }

    async fn set_transaction_category(&self, row_index: u32, category: &str) -> Result<()> {
        csv_store::update_cell(
            &self.transactions_csv,
            row_index,
            columns::TRANSACTION_CATEGORY,
            category,
        )
    }

    async fn create_budget(&self, budget: &Budget) -> Result<()> {
        csv_store::append_row(&self.budgets_csv, SheetKind::Budgets, budget_to_row(budget))
    }

    async fn update_budget(&self, id: &str, name: &str, limit: f64) -> Result<()> {
        csv_store::ensure_sheet(&self.budgets_csv, SheetKind::Budgets)?;
        let rows = csv_store::read_rows(&self.budgets_csv)?;
        let Some(row) = find_budget_row(&rows, id) else {
            bail!("budget not found: {id}");
        };
        csv_store::update_cell(&self.budgets_csv, row, columns::BUDGET_NAME, name)?;
        csv_store::update_cell(&self.budgets_csv, row, columns::BUDGET_LIMIT, &limit.to_string())
    }
}
