use std::time::Duration;

use thiserror::Error;

pub mod dev;
pub mod github;
pub mod github_response;
pub mod host;
pub mod training;

/// Failures of the dashboard data sources. These never reach an HTTP response:
/// callers log them and serve fallback numbers instead.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("{message}: {source}")]
    Http {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub answered {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("{message}: {source}")]
    Decode {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Gave up after {0:?}")]
    Timeout(Duration),

    #[error("Invalid header value for {0}")]
    Header(&'static str),
}

pub type StatsResult<T> = Result<T, StatsError>;
