use tracing::{debug, info};
use valuation_core::{
    MarketSnapshot, ModelKind, NormalizedMetrics, ScenarioBand, ValuationError,
    ValuationReport, ValuationResult, ValuationResults,
};
use valuation_models::{calculate_wacc, combine, normalize, valuate, ActiveModel};

use crate::projections;
use crate::request::ValuationRequest;
use crate::sensitivity;

/// Active model base metrics must be positive before any model runs; a
/// non-positive metric would produce an undefined valuation rather than a
/// typed failure downstream.
fn check_base_metrics(
    metrics: &NormalizedMetrics,
    weights: &[(ModelKind, f64)],
) -> ValuationResult<()> {
    if metrics.current_price == 0.0 {
        return Err(ValuationError::DivisionByZero("current_price"));
    }
    if metrics.current_price < 0.0 {
        return Err(ValuationError::InvalidInput(format!(
            "current price must be positive, got {}",
            metrics.current_price
        )));
    }
    for (kind, _) in weights {
        let (name, value) = match kind {
            ModelKind::FcfYield => ("FCF per share", metrics.fcf_per_share),
            ModelKind::EpsMultiple => ("EPS", metrics.eps),
            ModelKind::EvEbitda => ("EBITDA per share", metrics.ebitda_per_share),
        };
        if value <= 0.0 {
            return Err(ValuationError::InvalidInput(format!(
                "{name} must be positive for the {} model, got {value}",
                kind.as_str()
            )));
        }
    }
    Ok(())
}

/// Run the complete valuation pipeline for one request.
///
/// Validation happens before any model executes; everything after is pure
/// computation over immutable inputs, assembled into a single report.
pub fn run_valuation(
    request: &ValuationRequest,
    snapshot: MarketSnapshot,
) -> ValuationResult<ValuationReport> {
    let assumptions = request.validate()?;
    info!(
        symbol = %snapshot.symbol,
        years = assumptions.years,
        use_ev_ebitda = assumptions.use_ev_ebitda,
        "running valuation"
    );

    let metrics = normalize(&snapshot, assumptions.sbc_impact)?;
    let weights = valuation_models::resolve_weights(&assumptions)?;
    check_base_metrics(&metrics, &weights)?;

    let fcf_valuation = valuate(ModelKind::FcfYield, &metrics, &assumptions)?;
    let eps_valuation = valuate(ModelKind::EpsMultiple, &metrics, &assumptions)?;
    let ev_ebitda_valuation = if assumptions.use_ev_ebitda {
        Some(valuate(ModelKind::EvEbitda, &metrics, &assumptions)?)
    } else {
        None
    };

    let mut active: Vec<ActiveModel> = Vec::with_capacity(weights.len());
    for &(kind, weight) in &weights {
        let valuation = match kind {
            ModelKind::FcfYield => fcf_valuation.clone(),
            ModelKind::EpsMultiple => eps_valuation.clone(),
            ModelKind::EvEbitda => match &ev_ebitda_valuation {
                Some(v) => v.clone(),
                None => {
                    return Err(ValuationError::InvalidInput(
                        "EV/EBITDA weight present while model inactive".to_string(),
                    ))
                }
            },
        };
        active.push(ActiveModel { kind, weight, valuation });
    }
    let weighted_valuation = combine(&active)?;
    debug!(
        weighted_iv = weighted_valuation.intrinsic_value,
        "models aggregated"
    );

    let projections = projections::generate(&metrics, &assumptions, &weights)?;

    let sensitivity_analysis = if assumptions.include_sensitivity {
        Some(sensitivity::analyze(&metrics, &assumptions)?)
    } else {
        None
    };

    let wacc_components = match &assumptions.wacc {
        Some(inputs) => Some(calculate_wacc(inputs)?),
        None => None,
    };

    let scenarios = ScenarioBand {
        worst_case: weighted_valuation.intrinsic_value * 0.7,
        base_case: weighted_valuation.intrinsic_value,
        best_case: weighted_valuation.intrinsic_value * 1.3,
    };

    Ok(ValuationReport {
        market_data: metrics,
        valuation_results: ValuationResults {
            fcf_valuation,
            eps_valuation,
            ev_ebitda_valuation,
            weighted_valuation,
        },
        projections,
        sensitivity_analysis,
        wacc_components,
        scenarios,
    })
}
