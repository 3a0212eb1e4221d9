use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use thiserror::Error;

/// Failures of the planning pipeline.
///
/// Every stage returns these by value; nothing is retried internally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(
        "prices for {date} are not available; only today ({today}) and tomorrow ({tomorrow}) are published"
    )]
    DateOutOfRange {
        date: NaiveDate,
        today: NaiveDate,
        tomorrow: NaiveDate,
    },

    #[error("{}", no_data_message(.date, .publication_hour))]
    NoDataAvailable {
        date: NaiveDate,
        /// Set when `date` is tomorrow: the local hour after which next-day
        /// prices are usually published.
        publication_hour: Option<u32>,
    },

    #[error(
        "{}; {}",
        shortfall_message(.required, .available, .gapped),
        advisory_message(.earliest_feasible_deadline, .best_effort)
    )]
    InsufficientHours {
        required: u32,
        available: usize,
        /// Enough hours are eligible, but none of their runs is `required`
        /// consecutive hours long.
        gapped: bool,
        earliest_feasible_deadline: DateTime<Tz>,
        /// The advisory is an estimate, not derived from a feasible window.
        best_effort: bool,
    },

    #[error("failed to fetch prices from upstream: {0}")]
    UpstreamFetchFailure(String),

    #[error("internal error: {0}")]
    Internal(String),
}

fn no_data_message(date: &NaiveDate, publication_hour: &Option<u32>) -> String {
    match publication_hour {
        Some(hour) => format!(
            "prices for tomorrow ({date}) are not yet available; they are usually published after {hour:02}:00 local time"
        ),
        None => format!("no price data available for {date}"),
    }
}

fn shortfall_message(required: &u32, available: &usize, gapped: &bool) -> String {
    if *gapped {
        format!(
            "no uninterrupted window of {required} hours before deadline; the {available} available hours have gaps"
        )
    } else {
        format!(
            "not enough hours available before deadline: need {required}, but only {available} available"
        )
    }
}

fn advisory_message(deadline: &DateTime<Tz>, best_effort: &bool) -> String {
    let suffix = if *best_effort {
        " (best-effort estimate)"
    } else {
        ""
    };
    format!(
        "consider setting the deadline to {} or later{suffix}",
        deadline.to_rfc3339()
    )
}

impl PlanError {
    /// Whether the caller, not the service, is at fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            PlanError::UpstreamFetchFailure(_) | PlanError::Internal(_)
        )
    }
}

impl From<reqwest::Error> for PlanError {
    fn from(error: reqwest::Error) -> Self {
        PlanError::UpstreamFetchFailure(error.to_string())
    }
}
