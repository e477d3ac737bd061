//! Input validation for the trigger
//!
//! The core only ever sees a validated `u64`; everything a user can get
//! wrong is caught here.

use longcalc_foundation::strings::{invalid_number, number_too_large, MSG_NO_INPUT};
use longcalc_task::MAX_INPUT;
use thiserror::Error;

/// User input error; `Display` is the text shown on the display surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{}", MSG_NO_INPUT)]
    Empty,

    #[error("{}", invalid_number(.0))]
    NotANumber(String),

    #[error("{}", number_too_large(MAX_INPUT))]
    TooLarge,
}

/// Parse the trigger input into a non-negative integer
pub fn parse_input(input: &str) -> Result<u64, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }

    let n: u64 = trimmed
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))?;

    if n > MAX_INPUT {
        return Err(InputError::TooLarge);
    }
    Ok(n)
}
