pub mod amortization;
pub mod error;
pub mod form;
pub mod formatting;
pub mod normalizer;
pub mod sensitivity;
pub mod types;

#[cfg(feature = "config")]
pub mod config;

#[cfg(feature = "analytics")]
pub mod analytics;

pub use amortization::{compute_amortization, Amortization, LoanInput, LoanTerms};
pub use error::RepayError;
pub use normalizer::{format_number, parse_number};
pub use types::*;

/// Standard result type for all repay operations
pub type RepayResult<T> = Result<T, RepayError>;
