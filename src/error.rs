use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("live feed task for `{category}` failed: {source}")]
    FeedTask {
        category: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
