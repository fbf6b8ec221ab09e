//! Date eligibility for resolved projects.
//!
//! Data for date `D` is only complete on `D + 1`, so a run for `date` checks
//! the project window against `date - 1 day`.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::resolver::ResolvedConfiguration;

/// Why a project does or does not run on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum Eligibility {
    Eligible,
    /// `skip = true`: excluded on every date.
    Skipped,
    NoStartDate,
    NotStarted { start_date: NaiveDate },
    Ended { end_date: NaiveDate },
}

/// Classify `config` for a run on `date`.
pub fn check(config: &ResolvedConfiguration, date: NaiveDate) -> Eligibility {
    if config.skip() {
        return Eligibility::Skipped;
    }

    let Some(start_date) = config.start_date() else {
        return Eligibility::NoStartDate;
    };

    let Some(prior_date) = date.checked_sub_days(Days::new(1)) else {
        return Eligibility::NotStarted { start_date };
    };

    if start_date > prior_date {
        return Eligibility::NotStarted { start_date };
    }

    match config.end_date() {
        Some(end_date) if end_date < prior_date => Eligibility::Ended { end_date },
        _ => Eligibility::Eligible,
    }
}

/// Whether `config` should run on `date`.
pub fn is_eligible(config: &ResolvedConfiguration, date: NaiveDate) -> bool {
    check(config, date) == Eligibility::Eligible
}
