//! Budget periods: mapping an instant to the week or month it falls in.
//!
//! All instants are local-naive. Periods are half-open `[start, end)`.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// First day of a weekly budget period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Monday,
    #[default]
    Sunday,
}

impl WeekStart {
    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekStart::Monday => "monday",
            WeekStart::Sunday => "sunday",
        }
    }

    /// Parse a sheet cell ("monday" / "sunday", any case). Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "mon" => Some(WeekStart::Monday),
            "sunday" | "sun" => Some(WeekStart::Sunday),
            _ => None,
        }
    }
}

/// How a budget slices time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TimeWindow {
    Weekly { starts_on: WeekStart },
    Monthly,
}

impl TimeWindow {
    pub fn weekly(starts_on: WeekStart) -> Self {
        TimeWindow::Weekly { starts_on }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Weekly { .. } => "weekly",
            TimeWindow::Monthly => "monthly",
        }
    }

    pub fn week_start(&self) -> Option<WeekStart> {
        match self {
            TimeWindow::Weekly { starts_on } => Some(*starts_on),
            TimeWindow::Monthly => None,
        }
    }
}

/// A half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Period {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        debug_assert!(start < end, "degenerate period {start} .. {end}");
        Self { start, end }
    }

    /// `start <= t < end`.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t < self.end
    }

    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    /// Short chart label: "Jan 2024" for months, "Jan 8" (week start) for weeks.
    pub fn label(&self, window: TimeWindow) -> String {
        match window {
            TimeWindow::Monthly => self.start.format("%b %Y").to_string(),
            TimeWindow::Weekly { .. } => self.start.format("%b %-d").to_string(),
        }
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month(first: NaiveDate) -> NaiveDate {
    first.checked_add_months(Months::new(1)).unwrap_or(NaiveDate::MAX)
}

fn prev_month(first: NaiveDate) -> NaiveDate {
    first.checked_sub_months(Months::new(1)).unwrap_or(NaiveDate::MIN)
}

/// The period containing `now`.
///
/// Monthly periods run from the 1st at midnight to the 1st of the next month.
/// Weekly periods start at midnight of the most recent `starts_on` day on or
/// before `now` and last exactly seven days.
pub fn current_period(now: NaiveDateTime, window: TimeWindow) -> Period {
    match window {
        TimeWindow::Monthly => {
            let first = first_of_month(now.date());
            Period::new(midnight(first), midnight(next_month(first)))
        }
        TimeWindow::Weekly { starts_on } => {
            let back = days_since(now.weekday(), starts_on.weekday());
            let start = midnight(now.date() - Duration::days(back));
            Period::new(start, start + Duration::days(7))
        }
    }
}

fn days_since(day: Weekday, week_start: Weekday) -> i64 {
    let d = day.num_days_from_monday() as i64;
    let s = week_start.num_days_from_monday() as i64;
    (d - s).rem_euclid(7)
}

/// The period immediately before `period`.
///
/// Weekly periods shift by exactly seven days; monthly periods move to the
/// previous calendar month.
pub fn step_backward(period: Period, window: TimeWindow) -> Period {
    match window {
        TimeWindow::Weekly { .. } => Period::new(
            period.start - Duration::days(7),
            period.end - Duration::days(7),
        ),
        TimeWindow::Monthly => {
            let first = prev_month(first_of_month(period.start.date()));
            Period::new(midnight(first), period.start)
        }
    }
}

/// The period immediately after `period`.
pub fn step_forward(period: Period, window: TimeWindow) -> Period {
    match window {
        TimeWindow::Weekly { .. } => Period::new(
            period.start + Duration::days(7),
            period.end + Duration::days(7),
        ),
        TimeWindow::Monthly => {
            let end = next_month(first_of_month(period.end.date()));
            Period::new(period.end, midnight(end))
        }
    }
}

/// How far `now` has advanced through its current period, in `[0, 1]`.
pub fn progress_fraction(now: NaiveDateTime, window: TimeWindow) -> f64 {
    let period = current_period(now, window);
    let total = period.length().num_milliseconds() as f64;
    let elapsed = (now - period.start).num_milliseconds() as f64;
    if total <= 0.0 {
        return 0.0;
    }
    (elapsed / total).clamp(0.0, 1.0)
}

/// `start <= timestamp < end`.
pub fn in_period(timestamp: NaiveDateTime, period: &Period) -> bool {
    period.contains(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_monthly_period_bounds() {
        let p = current_period(at(2024, 2, 15, 13, 30), TimeWindow::Monthly);
        assert_eq!(p.start, at(2024, 2, 1, 0, 0));
        assert_eq!(p.end, at(2024, 3, 1, 0, 0));
    }

    #[test]
    fn test_december_rolls_into_january() {
        let p = current_period(at(2023, 12, 31, 23, 59), TimeWindow::Monthly);
        assert_eq!(p.end, at(2024, 1, 1, 0, 0));
    }

    #[test]
    fn test_weekly_monday_from_wednesday() {
        // 2024-01-10 is a Wednesday
        let p = current_period(at(2024, 1, 10, 9, 0), TimeWindow::weekly(WeekStart::Monday));
        assert_eq!(p.start, at(2024, 1, 8, 0, 0));
        assert_eq!(p.end, at(2024, 1, 15, 0, 0));
    }

    #[test]
    fn test_weekly_sunday_start() {
        let p = current_period(at(2024, 1, 10, 9, 0), TimeWindow::weekly(WeekStart::Sunday));
        assert_eq!(p.start, at(2024, 1, 7, 0, 0));

        // Sunday itself opens a new Sunday week, but belongs to the previous Monday week.
        let sunday = at(2024, 1, 14, 8, 0);
        let p = current_period(sunday, TimeWindow::weekly(WeekStart::Sunday));
        assert_eq!(p.start, at(2024, 1, 14, 0, 0));
        let p = current_period(sunday, TimeWindow::weekly(WeekStart::Monday));
        assert_eq!(p.start, at(2024, 1, 8, 0, 0));
    }

    #[test]
    fn test_boundary_is_inclusive_at_start() {
        let p = current_period(at(2024, 1, 8, 0, 0), TimeWindow::weekly(WeekStart::Monday));
        assert_eq!(p.start, at(2024, 1, 8, 0, 0));
        assert!(p.contains(p.start));
        assert!(!p.contains(p.end));
    }

    #[test]
    fn test_step_backward_monthly_lands_on_firsts() {
        let mut p = current_period(at(2024, 3, 20, 12, 0), TimeWindow::Monthly);
        for _ in 0..14 {
            p = step_backward(p, TimeWindow::Monthly);
        }
        assert_eq!(p.start, at(2023, 1, 1, 0, 0));
        assert_eq!(p.end, at(2023, 2, 1, 0, 0));
    }

    #[test]
    fn test_step_backward_weekly_is_exactly_seven_days() {
        let w = TimeWindow::weekly(WeekStart::Sunday);
        let p = current_period(at(2024, 1, 3, 12, 0), w);
        let prev = step_backward(p, w);
        assert_eq!(p.start - prev.start, Duration::days(7));
        assert_eq!(p.end - prev.end, Duration::days(7));
        assert_eq!(prev.start, at(2023, 12, 24, 0, 0));
    }

    #[test]
    fn test_step_forward_undoes_step_backward() {
        for w in [TimeWindow::Monthly, TimeWindow::weekly(WeekStart::Monday)] {
            let p = current_period(at(2024, 3, 31, 18, 0), w);
            assert_eq!(step_forward(step_backward(p, w), w), p);
        }
    }

    #[test]
    fn test_progress_fraction() {
        let w = TimeWindow::weekly(WeekStart::Monday);
        assert_eq!(progress_fraction(at(2024, 1, 8, 0, 0), w), 0.0);
        let mid = progress_fraction(at(2024, 1, 11, 12, 0), w);
        assert!((mid - 0.5).abs() < 1e-9);
        let late = progress_fraction(at(2024, 1, 14, 23, 59), w);
        assert!(late > 0.99 && late < 1.0);
    }

    #[test]
    fn test_progress_is_monotonic_within_month() {
        let mut last = 0.0;
        for day in 1..=29 {
            let f = progress_fraction(at(2024, 2, day, 6, 0), TimeWindow::Monthly);
            assert!(f >= last);
            assert!((0.0..=1.0).contains(&f));
            last = f;
        }
    }

    #[test]
    fn test_labels() {
        let p = current_period(at(2024, 1, 10, 9, 0), TimeWindow::Monthly);
        assert_eq!(p.label(TimeWindow::Monthly), "Jan 2024");
        let w = TimeWindow::weekly(WeekStart::Monday);
        let p = current_period(at(2024, 1, 10, 9, 0), w);
        assert_eq!(p.label(w), "Jan 8");
    }

    #[test]
    fn test_week_start_parse() {
        assert_eq!(WeekStart::parse(" Monday "), Some(WeekStart::Monday));
        assert_eq!(WeekStart::parse("sunday"), Some(WeekStart::Sunday));
        assert_eq!(WeekStart::parse(""), None);
    }
}
