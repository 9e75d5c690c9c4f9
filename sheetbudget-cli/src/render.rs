//! Plain-text views of budgets and history.

use chrono::NaiveDateTime;
use sheetbudget_core::{progress_fraction, BudgetHistory, FilledBudget, Transaction};

const BAR_WIDTH: usize = 24;

/// `[#########---------------]`, filled in proportion to `fraction` (clamped to [0, 1]).
pub fn bar(fraction: f64) -> String {
    let f = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (f * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

pub fn budget_card(fb: &FilledBudget, now: NaiveDateTime) -> String {
    let b = &fb.budget;
    let spend = fb.spend_fraction();
    let time = progress_fraction(now, b.window);
    let flag = if fb.is_over_budget() { "  OVER" } else { "" };

    let mut s = String::new();
    s.push_str(&format!("{} ({}, {})  [{}]\n", b.name, b.category, b.window.as_str(), b.id));
    s.push_str(&format!(
        "  spent {} ${:.2} of ${:.2} ({}){}\n",
        bar(spend),
        fb.current_value,
        b.limit,
        percent(spend),
        flag
    ));
    s.push_str(&format!("  time  {} {}\n", bar(time), percent(time)));
    s
}

pub fn dashboard(filled: &[FilledBudget], now: NaiveDateTime) -> String {
    if filled.is_empty() {
        return "No budgets yet. Create one: sheetbudget budget create --help\n".to_string();
    }
    filled
        .iter()
        .map(|fb| budget_card(fb, now))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn transaction_line(t: &Transaction) -> String {
    let category = if t.is_uncategorized() { "-" } else { t.category.trim() };
    format!(
        "  row {:>4}  {:<24}  {:>10}  {:<28}  {}",
        t.row_index,
        truncate(&t.merchant, 24),
        format!("${:.2}", t.amount),
        t.occurred_at,
        category
    )
}

pub fn budget_detail(fb: &FilledBudget, now: NaiveDateTime) -> String {
    let mut s = budget_card(fb, now);
    s.push_str(&format!("\nTransactions (current period): {}\n", fb.transactions.len()));
    if fb.transactions.is_empty() {
        s.push_str("  (none)\n");
    }
    for t in &fb.transactions {
        s.push_str(&transaction_line(t));
        s.push('\n');
    }
    s
}

pub fn history_table(name: &str, limit: f64, history: &BudgetHistory) -> String {
    let mut s = format!("{name}: limit ${limit:.2}\n\n");
    if history.points.is_empty() {
        s.push_str("No periods between the horizon and now.\n");
        return s;
    }

    let peak = history
        .points
        .iter()
        .map(|p| p.spent)
        .fold(limit, f64::max);
    for p in &history.points {
        let fraction = if peak > 0.0 { p.spent / peak } else { 0.0 };
        s.push_str(&format!(
            "  {:<10} {} {:>10}{}\n",
            p.label,
            bar(fraction),
            format!("${:.2}", p.spent),
            if p.over_limit { "  over" } else { "" }
        ));
    }

    let sum = &history.summary;
    s.push_str(&format!(
        "\n  periods: {}  total: ${:.2}  average: ${:.2}  within limit: {} ({} over)\n",
        sum.period_count,
        sum.total_spent,
        sum.average_spent,
        percent(sum.fraction_within_limit),
        sum.periods_over_limit
    ));
    s
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}
