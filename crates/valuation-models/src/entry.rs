use serde::{Deserialize, Serialize};
use valuation_core::{ValuationError, ValuationResult};

use crate::models::MAX_YEARS;

/// Entry price and return figures for one target value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryAnalysis {
    pub current_price: f64,
    pub target_value: f64,
    pub desired_return: f64,
    pub years: u32,
    /// Where the current price lands after compounding the desired return.
    pub future_value_desired: f64,
    /// Price at which buying today yields exactly the desired return.
    pub entry_price: f64,
    /// Discount from the current price needed to reach the entry price
    /// (negative when a premium is allowed).
    pub discount_needed_pct: f64,
    /// Annualized return from today's price to the target value, percent.
    pub implied_return_pct: f64,
}

/// Invert the time-value-of-money relationship between a target value and
/// the current price.
///
/// Pure and idempotent; called once per model and once for the composite.
pub fn entry_analysis(
    current_price: f64,
    target_value: f64,
    desired_return: f64,
    years: u32,
) -> ValuationResult<EntryAnalysis> {
    if years == 0 || years > MAX_YEARS {
        return Err(ValuationError::InvalidInput(format!(
            "holding period must be between 1 and {MAX_YEARS} years, got {years}"
        )));
    }
    if current_price == 0.0 {
        return Err(ValuationError::DivisionByZero("current_price"));
    }
    if current_price < 0.0 {
        return Err(ValuationError::InvalidInput(format!(
            "current price must be positive, got {current_price}"
        )));
    }
    if target_value <= 0.0 {
        return Err(ValuationError::InvalidInput(format!(
            "target value must be positive, got {target_value}"
        )));
    }
    if desired_return <= -1.0 {
        return Err(ValuationError::InvalidInput(format!(
            "desired return must be greater than -100%, got {desired_return}"
        )));
    }

    let compounding = (1.0 + desired_return).powi(years as i32);
    let entry_price = target_value / compounding;
    let implied_return = (target_value / current_price).powf(1.0 / years as f64) - 1.0;

    Ok(EntryAnalysis {
        current_price,
        target_value,
        desired_return,
        years,
        future_value_desired: current_price * compounding,
        entry_price,
        discount_needed_pct: (current_price - entry_price) / current_price * 100.0,
        implied_return_pct: implied_return * 100.0,
    })
}
