use rand::Rng;
use rayon::prelude::*;
use statrs::statistics::Statistics;
use valuation_core::{
    MonteCarloSummary, NormalizedMetrics, ValuationError, ValuationResult,
};
use valuation_models::fcf_intrinsic_value;

const GROWTH_RANGE: (f64, f64) = (0.05, 0.30);
const YIELD_RANGE: (f64, f64) = (0.03, 0.06);

fn percentile(sorted: &[f64], p: f64) -> f64 {
    let idx = (p / 100.0 * (sorted.len() as f64 - 1.0)).round() as usize;
    sorted[idx]
}

/// Distribution of FCF-model intrinsic values across randomized
/// (growth, yield) draws.
///
/// Each draw is independent; draws run in parallel.
pub fn run_monte_carlo(
    metrics: &NormalizedMetrics,
    years: u32,
    iterations: usize,
) -> ValuationResult<MonteCarloSummary> {
    if iterations == 0 {
        return Err(ValuationError::InvalidInput(
            "iterations must be at least 1".to_string(),
        ));
    }
    if years == 0 {
        return Err(ValuationError::InvalidInput(
            "years must be at least 1".to_string(),
        ));
    }
    if metrics.fcf_per_share <= 0.0 {
        return Err(ValuationError::InvalidInput(format!(
            "FCF per share must be positive, got {}",
            metrics.fcf_per_share
        )));
    }
    if metrics.current_price == 0.0 {
        return Err(ValuationError::DivisionByZero("current_price"));
    }

    let mut values = (0..iterations)
        .into_par_iter()
        .map(|_| {
            let mut rng = rand::thread_rng();
            let growth = rng.gen_range(GROWTH_RANGE.0..GROWTH_RANGE.1);
            let fcf_yield = rng.gen_range(YIELD_RANGE.0..YIELD_RANGE.1);
            fcf_intrinsic_value(metrics.fcf_per_share, growth, fcf_yield, years)
        })
        .collect::<ValuationResult<Vec<f64>>>()?;

    values.sort_by(|a, b| a.total_cmp(b));

    let mean = values.as_slice().mean();
    let std_dev = if values.len() > 1 {
        values.as_slice().std_dev()
    } else {
        0.0
    };

    Ok(MonteCarloSummary {
        iterations,
        mean,
        median: percentile(&values, 50.0),
        std_dev,
        min: values[0],
        max: values[values.len() - 1],
        percentile_10: percentile(&values, 10.0),
        percentile_25: percentile(&values, 25.0),
        percentile_50: percentile(&values, 50.0),
        percentile_75: percentile(&values, 75.0),
        percentile_90: percentile(&values, 90.0),
        mean_upside_pct: (mean / metrics.current_price - 1.0) * 100.0,
    })
}
