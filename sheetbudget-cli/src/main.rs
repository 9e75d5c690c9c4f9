use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use sheetbudget_core::{
    fill_budgets, historical_series, parse_horizon, uncategorized, Budget, FilledBudget,
    TimeWindow, WeekStart,
};
use sheetbudget_ingest::new_budget_id;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod auth;
mod categorize;
mod config;
#[cfg(feature = "oauth")]
mod google_oauth;
mod ledger;
mod render;
mod sheets;
mod state;

use crate::config::{load_config, Config};
use crate::ledger::{load_snapshot, AnyLedger, Ledger};
use crate::sheets::SheetsError;

#[derive(Parser, Debug)]
#[command(
    name = "sheetbudget",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SHEETBUDGET_BUILD_SHA"), ")"),
    about = "Budgets and spend tracking on top of a Google Sheets ledger"
)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Current-period spend for every budget
    Budgets {
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// One budget with its current-period transactions
    Show { budget_id: String },

    /// Per-period spend from the horizon up to now
    History {
        budget_id: String,

        /// Earliest period start to include (default: config history.horizon).
        /// A period that starts before this date is left out entirely.
        #[arg(long)]
        horizon: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List transactions with no category
    Uncategorized,

    /// Assign categories (interactive unless --row and --category are given)
    Categorize {
        #[arg(long, requires = "category")]
        row: Option<u32>,

        #[arg(long, requires = "row")]
        category: Option<String>,
    },

    /// Create or edit budget definitions
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },

    /// Google sign-in
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Manage ~/.sheetbudget/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WindowArg {
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StartsOnArg {
    Monday,
    Sunday,
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    Create {
        #[arg(long)]
        name: String,

        /// Transaction category this budget tracks (matched case-insensitively)
        #[arg(long)]
        category: String,

        #[arg(long)]
        limit: f64,

        #[arg(long, value_enum, default_value_t = WindowArg::Monthly)]
        window: WindowArg,

        /// First day of a weekly period (default: sunday)
        #[arg(long, value_enum)]
        starts_on: Option<StartsOnArg>,
    },

    /// Change a budget's name and limit
    Update {
        id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        limit: f64,
    },
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Run the Google installed-app OAuth flow (needs the `oauth` feature)
    Login,

    /// Store an access token obtained elsewhere
    PasteToken,

    /// Forget the stored token
    Logout,

    Status,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,

    Show,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli.command).await;
    if let Err(e) = &result {
        if matches!(e.downcast_ref::<SheetsError>(), Some(SheetsError::SessionExpired)) {
            if let Err(clear) = auth::clear_token() {
                tracing::warn!(error = %clear, "could not clear stored token");
            }
        }
    }
    result
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Budgets { json } => {
            let (cfg, ledger) = open_ledger()?;
            let now = cfg.clock.now_local()?;
            let (budgets, transactions) = load_snapshot(&ledger).await?;
            let filled = fill_budgets(&budgets, &transactions, now);

            if json {
                println!("{}", serde_json::to_string_pretty(&filled)?);
            } else {
                print!("{}", render::dashboard(&filled, now));
                let pending = uncategorized(&transactions).len();
                if pending > 0 {
                    println!("\n{pending} uncategorized transactions (sheetbudget categorize)");
                }
            }
        }

        Command::Show { budget_id } => {
            let (cfg, ledger) = open_ledger()?;
            let now = cfg.clock.now_local()?;
            let (budgets, transactions) = load_snapshot(&ledger).await?;
            let filled = fill_budgets(&budgets, &transactions, now);
            let fb = find_filled(&filled, &budget_id)?;
            print!("{}", render::budget_detail(fb, now));
        }

        Command::History {
            budget_id,
            horizon,
            json,
        } => {
            let (cfg, ledger) = open_ledger()?;
            let now = cfg.clock.now_local()?;
            let horizon = parse_horizon(horizon.as_deref().unwrap_or(&cfg.history.horizon))?;
            let (budgets, transactions) = load_snapshot(&ledger).await?;
            let budget = find_budget(&budgets, &budget_id)?;
            let history = historical_series(budget, &transactions, horizon, now);

            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else {
                print!("{}", render::history_table(&budget.name, budget.limit, &history));
            }
        }

        Command::Uncategorized => {
            let (_, ledger) = open_ledger()?;
            let transactions = ledger.fetch_transactions().await?;
            let pending = uncategorized(&transactions);
            if pending.is_empty() {
                println!("No uncategorized transactions.");
            }
            for t in &pending {
                println!("{}", render::transaction_line(t));
            }
        }

        Command::Categorize { row, category } => {
            let (_, ledger) = open_ledger()?;
            let (budgets, mut transactions) = load_snapshot(&ledger).await?;
            match (row, category) {
                (Some(row), Some(category)) => {
                    categorize::apply_category_edit(&ledger, &mut transactions, row, &category)
                        .await?;
                    println!("Row {row} -> {}", category.trim());
                }
                _ => categorize::run_interactive(&ledger, &budgets, &mut transactions).await?,
            }
        }

        Command::Budget { command } => run_budget(command).await?,

        Command::Auth { command } => match command {
            AuthCommand::Login => login().await?,
            AuthCommand::PasteToken => auth::paste_token()?,
            AuthCommand::Logout => {
                auth::clear_token()?;
                println!("Signed out.");
            }
            AuthCommand::Status => auth::status()?,
        },

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

async fn run_budget(command: BudgetCommand) -> Result<()> {
    let (cfg, ledger) = open_ledger()?;
    match command {
        BudgetCommand::Create {
            name,
            category,
            limit,
            window,
            starts_on,
        } => {
            let window = match window {
                WindowArg::Monthly => {
                    if starts_on.is_some() {
                        tracing::warn!("--starts-on only applies to weekly budgets; ignoring");
                    }
                    TimeWindow::Monthly
                }
                WindowArg::Weekly => TimeWindow::weekly(match starts_on {
                    Some(StartsOnArg::Monday) => WeekStart::Monday,
                    Some(StartsOnArg::Sunday) | None => WeekStart::Sunday,
                }),
            };
            let now = cfg.clock.now_local()?;
            let budget = Budget::new(
                new_budget_id(now),
                name.trim(),
                category.trim(),
                limit,
                window,
            );
            budget.validate()?;
            ledger.create_budget(&budget).await?;
            println!("Created budget {} ({})", budget.name, budget.id);
        }

        BudgetCommand::Update { id, name, limit } => {
            if name.trim().is_empty() {
                bail!("budget name must not be empty");
            }
            if !(limit.is_finite() && limit > 0.0) {
                bail!("budget limit must be a positive amount (got {limit})");
            }
            ledger.update_budget(&id, name.trim(), limit).await?;
            println!("Updated budget {id}");
        }
    }
    Ok(())
}

#[cfg(feature = "oauth")]
async fn login() -> Result<()> {
    google_oauth::login().await
}

#[cfg(not(feature = "oauth"))]
async fn login() -> Result<()> {
    bail!(
        "this build has no OAuth support (rebuild with --features oauth).\n\
Or paste a token obtained elsewhere: sheetbudget auth paste-token"
    )
}

fn open_ledger() -> Result<(Config, AnyLedger)> {
    let cfg = load_config()?;
    let ledger = AnyLedger::from_config(&cfg, auth::session)?;
    Ok((cfg, ledger))
}

fn find_budget<'a>(budgets: &'a [Budget], id: &str) -> Result<&'a Budget> {
    budgets
        .iter()
        .find(|b| b.id == id)
        .with_context(|| format!("budget not found: {id}"))
}

fn find_filled<'a>(filled: &'a [FilledBudget], id: &str) -> Result<&'a FilledBudget> {
    filled
        .iter()
        .find(|f| f.budget.id == id)
        .with_context(|| format!("budget not found: {id}"))
}
