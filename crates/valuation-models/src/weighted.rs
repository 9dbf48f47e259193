use tracing::debug;
use valuation_core::{
    ModelKind, ModelValuation, ValuationAssumptions, ValuationError, ValuationResult,
    WeightedValuation,
};

/// Tolerance for the "active weights sum to 1" check, matching the 0.01
/// whole-percent tolerance of the request interface.
pub const WEIGHT_TOLERANCE: f64 = 1e-4;

/// One model admitted to the weighted composite.
#[derive(Debug, Clone)]
pub struct ActiveModel {
    pub kind: ModelKind,
    pub weight: f64,
    pub valuation: ModelValuation,
}

/// Resolve the set of active models and their fraction weights.
///
/// When EV/EBITDA is disabled a non-zero submitted weight is coerced to
/// zero and the remaining weights are re-normalized over the active
/// models. Without such a coercion the weights must already sum to 1
/// within `WEIGHT_TOLERANCE`.
pub fn resolve_weights(
    assumptions: &ValuationAssumptions,
) -> ValuationResult<Vec<(ModelKind, f64)>> {
    let mut weights = vec![
        (ModelKind::FcfYield, assumptions.fcf_weight),
        (ModelKind::EpsMultiple, assumptions.eps_weight),
    ];
    if assumptions.use_ev_ebitda {
        weights.push((ModelKind::EvEbitda, assumptions.ev_ebitda_weight));
    }

    if weights.iter().any(|(_, w)| *w < 0.0) {
        return Err(ValuationError::WeightMismatch(
            "model weights must be non-negative".to_string(),
        ));
    }

    let coerced = !assumptions.use_ev_ebitda && assumptions.ev_ebitda_weight != 0.0;
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    if coerced {
        if total <= 0.0 {
            return Err(ValuationError::WeightMismatch(
                "active model weights sum to zero".to_string(),
            ));
        }
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            debug!(total, "re-normalizing weights over active models");
            for (_, w) in &mut weights {
                *w /= total;
            }
        }
    } else if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(ValuationError::WeightMismatch(format!(
            "active model weights sum to {total}, expected 1"
        )));
    }

    Ok(weights)
}

/// Linear combination of the active model valuations.
///
/// Intrinsic value, entry price and implied return are each combined
/// independently so the composite stays linear in every output metric.
pub fn combine(models: &[ActiveModel]) -> ValuationResult<WeightedValuation> {
    if models.is_empty() {
        return Err(ValuationError::WeightMismatch(
            "no active models to combine".to_string(),
        ));
    }

    let total: f64 = models.iter().map(|m| m.weight).sum();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(ValuationError::WeightMismatch(format!(
            "active model weights sum to {total:.6}, expected 1.0"
        )));
    }

    let mut intrinsic_value = 0.0;
    let mut entry_price = 0.0;
    let mut implied_return = 0.0;
    let mut fcf_weight = 0.0;
    let mut eps_weight = 0.0;
    let mut ev_ebitda_weight = 0.0;

    for m in models {
        intrinsic_value += m.weight * m.valuation.intrinsic_value;
        entry_price += m.weight * m.valuation.entry_price;
        implied_return += m.weight * m.valuation.implied_return;
        match m.kind {
            ModelKind::FcfYield => fcf_weight = m.weight,
            ModelKind::EpsMultiple => eps_weight = m.weight,
            ModelKind::EvEbitda => ev_ebitda_weight = m.weight,
        }
    }

    Ok(WeightedValuation {
        intrinsic_value,
        entry_price,
        implied_return,
        fcf_weight,
        eps_weight,
        ev_ebitda_weight,
    })
}
