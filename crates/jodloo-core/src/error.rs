//! Error types for Jodloo

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Repayment date must be later than date given")]
    InvalidSchedule,

    #[error("Invalid interest type: {0}")]
    InvalidInterestType(String),

    #[error(
        "Provided installment amount {provided:.2} is incorrect. It should be close to: {computed:.2}"
    )]
    InstallmentMismatch { provided: f64, computed: f64 },

    #[error("Total installments must be greater than zero")]
    DivisionByZero,

    #[error("Insufficient budget in {category}: {available:.2} available, {requested:.2} requested")]
    InsufficientBudget {
        category: String,
        available: f64,
        requested: f64,
    },

    #[error("No active subscription found. Please subscribe to use this feature.")]
    SubscriptionRequired,

    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
