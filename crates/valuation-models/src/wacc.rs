use valuation_core::{ValuationError, ValuationResult, WaccComponents, WaccInputs};

fn wacc_from_weights(
    inputs: &WaccInputs,
    weight_equity: f64,
    weight_debt: f64,
) -> ValuationResult<WaccComponents> {
    if inputs.beta < 0.0 {
        return Err(ValuationError::InvalidInput(format!(
            "beta must be non-negative, got {}",
            inputs.beta
        )));
    }
    if !(0.0..1.0).contains(&inputs.tax_rate) {
        return Err(ValuationError::InvalidInput(format!(
            "tax rate must be a fraction in [0, 1), got {}",
            inputs.tax_rate
        )));
    }

    // CAPM cost of equity, after-tax cost of debt.
    let cost_of_equity = inputs.risk_free_rate + inputs.beta * inputs.equity_risk_premium;
    let after_tax_cost_of_debt = inputs.cost_of_debt * (1.0 - inputs.tax_rate);
    let calculated_wacc = weight_equity * cost_of_equity + weight_debt * after_tax_cost_of_debt;

    Ok(WaccComponents {
        beta: inputs.beta,
        risk_free_rate: inputs.risk_free_rate,
        equity_risk_premium: inputs.equity_risk_premium,
        cost_of_equity,
        cost_of_debt: inputs.cost_of_debt,
        debt_to_equity: inputs.debt_to_equity,
        weight_equity,
        weight_debt,
        tax_rate: inputs.tax_rate,
        calculated_wacc,
    })
}

/// Weighted average cost of capital from a debt-to-equity ratio.
///
/// weight_equity = 1 / (1 + D/E), which is E / (E + D).
pub fn calculate_wacc(inputs: &WaccInputs) -> ValuationResult<WaccComponents> {
    if inputs.debt_to_equity < 0.0 {
        return Err(ValuationError::InvalidInput(format!(
            "debt-to-equity must be non-negative, got {}",
            inputs.debt_to_equity
        )));
    }
    let weight_equity = 1.0 / (1.0 + inputs.debt_to_equity);
    wacc_from_weights(inputs, weight_equity, 1.0 - weight_equity)
}

/// WACC from explicit capital amounts rather than a ratio.
pub fn calculate_wacc_from_capital(
    inputs: &WaccInputs,
    equity_value: f64,
    debt_value: f64,
) -> ValuationResult<WaccComponents> {
    if equity_value < 0.0 || debt_value < 0.0 {
        return Err(ValuationError::InvalidInput(
            "equity and debt values must be non-negative".to_string(),
        ));
    }
    let total_capital = equity_value + debt_value;
    if total_capital == 0.0 {
        return Err(ValuationError::DivisionByZero("total_capital"));
    }
    let weight_equity = equity_value / total_capital;
    let mut components = wacc_from_weights(inputs, weight_equity, debt_value / total_capital)?;
    components.debt_to_equity = if equity_value > 0.0 {
        debt_value / equity_value
    } else {
        f64::INFINITY
    };
    Ok(components)
}
