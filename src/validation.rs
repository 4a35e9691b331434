//! Input validation for turn requests.
//!
//! The HTTP layer owns field-shape validation; the engine re-checks only
//! the invariants it owns (plate normalisation and uniqueness, state
//! transitions, numbering).

use crate::error::{Result, TurneroError};
use crate::models::NewTurn;

/// Minimum customer name length after trimming
const MIN_CUSTOMER_NAME_LEN: usize = 2;

/// Phone must be 8 to 15 digits, nothing else
const MIN_PHONE_DIGITS: usize = 8;
const MAX_PHONE_DIGITS: usize = 15;

/// Maximum problem description length
const MAX_PROBLEM_LEN: usize = 255;

/// Validate a turn request and produce the engine payload.
pub fn validate_create_turn(
    customer_name: &str,
    phone: &str,
    vehicle_model: &str,
    plate: &str,
    problem: Option<&str>,
) -> Result<NewTurn> {
    let customer_name = customer_name.trim();
    if customer_name.chars().count() < MIN_CUSTOMER_NAME_LEN {
        return Err(TurneroError::Validation(format!(
            "customer name must be at least {MIN_CUSTOMER_NAME_LEN} characters"
        )));
    }

    if !is_valid_phone(phone) {
        return Err(TurneroError::Validation(format!(
            "phone must be {MIN_PHONE_DIGITS} to {MAX_PHONE_DIGITS} digits"
        )));
    }

    let vehicle_model = vehicle_model.trim();
    if vehicle_model.is_empty() {
        return Err(TurneroError::Validation(
            "vehicle model must not be empty".to_string(),
        ));
    }

    if plate.trim().is_empty() {
        return Err(TurneroError::Validation(
            "plate must not be empty".to_string(),
        ));
    }

    let problem = match problem.map(str::trim) {
        Some(p) if p.chars().count() > MAX_PROBLEM_LEN => {
            return Err(TurneroError::Validation(format!(
                "problem description must not exceed {MAX_PROBLEM_LEN} characters"
            )));
        }
        Some(p) if !p.is_empty() => Some(p.to_string()),
        _ => None,
    };

    Ok(NewTurn {
        customer_name: customer_name.to_string(),
        phone: phone.to_string(),
        vehicle_model: vehicle_model.to_string(),
        plate: plate.to_string(),
        problem,
    })
}

fn is_valid_phone(phone: &str) -> bool {
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&phone.len())
        && phone.chars().all(|c| c.is_ascii_digit())
}
