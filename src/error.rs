use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagdbError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Empty query: {path:?} names no tags")]
    EmptyQuery { path: String },
    #[error("Malformed query: {message} (at byte {position})")]
    MalformedQuery { message: String, position: usize },
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl TagdbError {
    /// Whether the error was caused by the request itself rather than the service.
    pub fn is_query_error(&self) -> bool {
        matches!(self, Self::EmptyQuery { .. } | Self::MalformedQuery { .. })
    }
}

pub type Result<T> = std::result::Result<T, TagdbError>;

// Helper conversions
impl From<rusqlite::Error> for TagdbError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}
impl From<::config::ConfigError> for TagdbError {
    fn from(e: ::config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl<T> From<std::sync::PoisonError<T>> for TagdbError {
    fn from(e: std::sync::PoisonError<T>) -> Self { Self::Lock(e.to_string()) }
}
