use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{debug, info};
use valuation_core::{
    HistoricalPoint, ModelKind, NormalizedMetrics, ValuationAssumptions, ValuationError,
    ValuationHistory, ValuationResult,
};
use valuation_models::{
    eps_intrinsic_value, ev_ebitda_intrinsic_value, fcf_intrinsic_value, normalize,
    resolve_weights,
};

use crate::fundamentals::FundamentalsSeries;

const DAYS_PER_YEAR: f64 = 365.25;

/// One historical price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

fn weighted_intrinsic_value(
    metrics: &NormalizedMetrics,
    a: &ValuationAssumptions,
    weights: &[(ModelKind, f64)],
) -> ValuationResult<f64> {
    let mut value = 0.0;
    for &(kind, weight) in weights {
        let iv = match kind {
            ModelKind::FcfYield => {
                fcf_intrinsic_value(metrics.fcf_per_share, a.fcf_growth, a.fcf_yield, a.years)?
            }
            ModelKind::EpsMultiple => {
                eps_intrinsic_value(metrics.eps, a.eps_growth, a.eps_multiple, a.years)?
            }
            ModelKind::EvEbitda => ev_ebitda_intrinsic_value(
                metrics.ebitda_per_share,
                a.ebitda_growth,
                metrics.net_debt_per_share,
                a.years,
            )?,
        };
        value += weight * iv;
    }
    Ok(value)
}

/// Replay the weighted valuation along a chronological price series.
///
/// Each price date uses the fundamentals in effect on that date; dates that
/// precede every available report are skipped. Calendar gaps between points
/// are fine. The summary statistics always come from the full-resolution
/// series, with the CAGR measured over the actual first-to-last date span.
pub fn run_backtest(
    symbol: &str,
    prices: &[PricePoint],
    fundamentals: &FundamentalsSeries,
    assumptions: &ValuationAssumptions,
) -> ValuationResult<ValuationHistory> {
    if prices
        .windows(2)
        .any(|pair| pair[1].date <= pair[0].date)
    {
        return Err(ValuationError::InvalidInput(
            "price series must be strictly ascending by date".to_string(),
        ));
    }

    let weights = resolve_weights(assumptions)?;

    let mut points = Vec::with_capacity(prices.len());
    for price_point in prices {
        let Some(report) = fundamentals.at(price_point.date) else {
            debug!(date = %price_point.date, "no fundamentals yet, skipping point");
            continue;
        };
        let snapshot = report.snapshot(symbol, price_point.price);
        let metrics = normalize(&snapshot, assumptions.sbc_impact)?;
        let intrinsic_value = weighted_intrinsic_value(&metrics, assumptions, &weights)?;
        if intrinsic_value == 0.0 {
            return Err(ValuationError::DivisionByZero("intrinsic_value"));
        }
        points.push(HistoricalPoint {
            date: price_point.date,
            price: price_point.price,
            intrinsic_value,
        });
    }

    if points.len() < 2 {
        return Err(ValuationError::InvalidInput(format!(
            "backtest needs at least 2 usable points, got {}",
            points.len()
        )));
    }

    let overvaluation: Vec<f64> = points
        .iter()
        .map(|p| (p.price / p.intrinsic_value - 1.0) * 100.0)
        .collect();
    let average_overvaluation_pct = overvaluation.as_slice().mean();
    let current_overvaluation_pct = overvaluation[overvaluation.len() - 1];

    let first = &points[0];
    let last = &points[points.len() - 1];
    if first.intrinsic_value <= 0.0 || last.intrinsic_value <= 0.0 {
        return Err(ValuationError::InvalidInput(
            "intrinsic values must be positive to compute a growth rate".to_string(),
        ));
    }
    let span_years = (last.date - first.date).num_days() as f64 / DAYS_PER_YEAR;
    let iv_cagr_pct = ((last.intrinsic_value / first.intrinsic_value).powf(1.0 / span_years)
        - 1.0)
        * 100.0;

    info!(
        symbol,
        points = points.len(),
        iv_cagr_pct,
        "backtest complete"
    );

    Ok(ValuationHistory {
        points,
        average_overvaluation_pct,
        current_overvaluation_pct,
        iv_cagr_pct,
    })
}
