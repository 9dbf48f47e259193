use valuation_core::{
    ModelKind, ModelValuation, NormalizedMetrics, ValuationAssumptions, ValuationError,
    ValuationResult,
};

use crate::entry::entry_analysis;

/// Upper bound on any compounding horizon.
pub const MAX_YEARS: u32 = 100;

/// Compound a base metric forward: `base * (1 + growth)^years`.
fn project(base: f64, growth: f64, years: u32) -> ValuationResult<f64> {
    if years == 0 || years > MAX_YEARS {
        return Err(ValuationError::InvalidInput(format!(
            "projection horizon must be between 1 and {MAX_YEARS} years, got {years}"
        )));
    }
    if growth <= -1.0 {
        return Err(ValuationError::InvalidInput(format!(
            "growth rate must be greater than -100%, got {growth}"
        )));
    }
    Ok(base * (1.0 + growth).powi(years as i32))
}

/// FCF-yield model: projected FCF/share capitalized at the required yield.
pub fn fcf_intrinsic_value(
    fcf_per_share: f64,
    growth: f64,
    fcf_yield: f64,
    years: u32,
) -> ValuationResult<f64> {
    if fcf_yield == 0.0 {
        return Err(ValuationError::DivisionByZero("fcf_yield"));
    }
    if fcf_yield < 0.0 {
        return Err(ValuationError::InvalidInput(format!(
            "FCF yield must be positive, got {fcf_yield}"
        )));
    }
    Ok(project(fcf_per_share, growth, years)? / fcf_yield)
}

/// EPS-multiple model: projected EPS priced at a P/E multiple.
pub fn eps_intrinsic_value(
    eps: f64,
    growth: f64,
    multiple: f64,
    years: u32,
) -> ValuationResult<f64> {
    if multiple <= 0.0 {
        return Err(ValuationError::InvalidInput(format!(
            "earnings multiple must be positive, got {multiple}"
        )));
    }
    Ok(project(eps, growth, years)? * multiple)
}

/// Growth-dependent EV/EBITDA multiple: 6x base plus one turn per percent
/// of growth, clamped to [5, 20].
pub fn ev_ebitda_multiple(growth: f64) -> f64 {
    (6.0 + growth * 100.0).clamp(5.0, 20.0)
}

/// EV/EBITDA model: projected EBITDA/share at the growth-implied multiple,
/// less net debt per share to convert enterprise to equity value.
pub fn ev_ebitda_intrinsic_value(
    ebitda_per_share: f64,
    growth: f64,
    net_debt_per_share: f64,
    years: u32,
) -> ValuationResult<f64> {
    let projected = project(ebitda_per_share, growth, years)?;
    Ok(projected * ev_ebitda_multiple(growth) - net_debt_per_share)
}

/// Common model contract: one intrinsic value per (base metric, growth,
/// model parameter, horizon) tuple.
///
/// `model_param` is the FCF yield, the earnings multiple, or the net debt
/// per share depending on the model.
pub fn model_value(
    kind: ModelKind,
    base_metric: f64,
    growth: f64,
    model_param: f64,
    years: u32,
) -> ValuationResult<f64> {
    match kind {
        ModelKind::FcfYield => fcf_intrinsic_value(base_metric, growth, model_param, years),
        ModelKind::EpsMultiple => eps_intrinsic_value(base_metric, growth, model_param, years),
        ModelKind::EvEbitda => {
            ev_ebitda_intrinsic_value(base_metric, growth, model_param, years)
        }
    }
}

/// Run one model against normalized metrics and wrap it with the entry-price
/// calculator into a complete `ModelValuation`.
pub fn valuate(
    kind: ModelKind,
    metrics: &NormalizedMetrics,
    assumptions: &ValuationAssumptions,
) -> ValuationResult<ModelValuation> {
    let years = assumptions.years;
    let intrinsic_value = match kind {
        ModelKind::FcfYield => fcf_intrinsic_value(
            metrics.fcf_per_share,
            assumptions.fcf_growth,
            assumptions.fcf_yield,
            years,
        )?,
        ModelKind::EpsMultiple => eps_intrinsic_value(
            metrics.eps,
            assumptions.eps_growth,
            assumptions.eps_multiple,
            years,
        )?,
        ModelKind::EvEbitda => ev_ebitda_intrinsic_value(
            metrics.ebitda_per_share,
            assumptions.ebitda_growth,
            metrics.net_debt_per_share,
            years,
        )?,
    };

    let entry = entry_analysis(
        metrics.current_price,
        intrinsic_value,
        assumptions.desired_return,
        years,
    )?;

    Ok(ModelValuation {
        intrinsic_value,
        entry_price: entry.entry_price,
        implied_return: entry.implied_return_pct,
    })
}
