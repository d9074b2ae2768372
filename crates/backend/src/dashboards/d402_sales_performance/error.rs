use thiserror::Error;

/// Ошибки конвейера дашборда продаж
#[derive(Debug, Error, PartialEq)]
pub enum DashboardError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Invalid aggregate: {0}")]
    InvalidAggregate(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
