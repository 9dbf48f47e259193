use rayon::prelude::*;
use tracing::debug;
use valuation_core::{
    NormalizedMetrics, SensitivityAnalysis, SensitivityGrid, ValuationAssumptions,
    ValuationResult, WaccInputs,
};
use valuation_models::{
    calculate_wacc, eps_intrinsic_value, ev_ebitda_intrinsic_value, fcf_intrinsic_value,
};

fn fmt_key(value: f64) -> String {
    // Shortest round-trip form: 15.0 -> "15", 3.5 -> "3.5"
    value.to_string()
}

/// Map a pure cell function over the Cartesian product of two candidate
/// axes.
///
/// Both candidate sets are sorted numerically ascending before assembly, so
/// the rectangular invariant (every row spans the identical column-key set)
/// holds by construction. Cells are independent and evaluated in parallel.
pub fn grid<F>(rows: &[f64], cols: &[f64], cell: F) -> ValuationResult<SensitivityGrid>
where
    F: Fn(f64, f64) -> ValuationResult<f64> + Sync,
{
    // A default window can filter down to nothing (deeply negative growth);
    // the grid is then empty, not an error.
    if rows.is_empty() || cols.is_empty() {
        return Ok(SensitivityGrid {
            row_keys: Vec::new(),
            col_keys: Vec::new(),
            values: Vec::new(),
        });
    }

    let mut rows = rows.to_vec();
    let mut cols = cols.to_vec();
    rows.sort_by(|a, b| a.total_cmp(b));
    cols.sort_by(|a, b| a.total_cmp(b));

    let values = rows
        .par_iter()
        .map(|&r| cols.iter().map(|&c| cell(r, c)).collect::<ValuationResult<Vec<f64>>>())
        .collect::<ValuationResult<Vec<Vec<f64>>>>()?;

    Ok(SensitivityGrid {
        row_keys: rows.iter().copied().map(fmt_key).collect(),
        col_keys: cols.iter().copied().map(fmt_key).collect(),
        values,
    })
}

/// Growth sweep window: center ±10 points in steps of 5, negatives dropped.
fn growth_candidates(center_pct: f64) -> Vec<f64> {
    let c = center_pct.round() as i64;
    (c - 10..c + 15)
        .step_by(5)
        .filter(|&g| g >= 0)
        .map(|g| g as f64)
        .collect()
}

/// Yield sweep window: center ±2 points in steps of 1, non-positives dropped.
fn yield_candidates(center_pct: f64) -> Vec<f64> {
    let c = center_pct.round() as i64;
    (c - 2..c + 3)
        .filter(|&y| y > 0)
        .map(|y| y as f64)
        .collect()
}

/// Multiple sweep window: center ±5 turns in steps of 2, non-positives
/// dropped.
fn multiple_candidates(center: f64) -> Vec<f64> {
    let c = center.round() as i64;
    (c - 5..c + 6)
        .step_by(2)
        .filter(|&m| m > 0)
        .map(|m| m as f64)
        .collect()
}

/// Discount-rate sweep window: center ±5 points in steps of 2, non-positives
/// dropped.
fn rate_candidates(center_pct: f64) -> Vec<f64> {
    let c = center_pct.round() as i64;
    (c - 5..c + 6)
        .step_by(2)
        .filter(|&r| r > 0)
        .map(|r| r as f64)
        .collect()
}

/// Beta sweep window: center ±0.4 in steps of 0.2, non-positives dropped.
fn beta_candidates(center: f64) -> Vec<f64> {
    (-2_i64..=2)
        .map(|i| ((center + 0.2 * i as f64) * 100.0).round() / 100.0)
        .filter(|&b| b > 0.0)
        .collect()
}

/// Risk-free-rate sweep window (percent): center ±1 point in steps of 0.5.
fn risk_free_candidates(center_pct: f64) -> Vec<f64> {
    (-2_i64..=2)
        .map(|i| ((center_pct + 0.5 * i as f64) * 100.0).round() / 100.0)
        .filter(|&r| r >= 0.0)
        .collect()
}

/// Build every supported axis-pair grid around the request's assumptions.
pub fn analyze(
    metrics: &NormalizedMetrics,
    a: &ValuationAssumptions,
) -> ValuationResult<SensitivityAnalysis> {
    let years = a.years;
    let growth_pcts = growth_candidates(a.fcf_growth * 100.0);
    let eps_growth_pcts = growth_candidates(a.eps_growth * 100.0);
    let yield_pcts = yield_candidates(a.fcf_yield * 100.0);
    let pe_multiples = multiple_candidates(a.terminal_pe);

    let fcf_growth = grid(&growth_pcts, &yield_pcts, |g, y| {
        fcf_intrinsic_value(metrics.fcf_per_share, g / 100.0, y / 100.0, years)
    })?;

    let eps_growth = grid(&eps_growth_pcts, &pe_multiples, |g, pe| {
        eps_intrinsic_value(metrics.eps, g / 100.0, pe, years)
    })?;

    let fcf_yield = grid(&yield_pcts, &growth_pcts, |y, g| {
        fcf_intrinsic_value(metrics.fcf_per_share, g / 100.0, y / 100.0, years)
    })?;

    let terminal_pe = grid(&pe_multiples, &eps_growth_pcts, |pe, g| {
        eps_intrinsic_value(metrics.eps, g / 100.0, pe, years)
    })?;

    // Discount-rate sweep: the EV/EBITDA value discounted back at the
    // substituted rate, matching the present-value semantics of the sweep.
    let discount_rate = if a.use_ev_ebitda {
        let rate_pcts = rate_candidates(a.desired_return * 100.0);
        let ebitda_growth_pcts = growth_candidates(a.ebitda_growth * 100.0);
        Some(grid(&rate_pcts, &ebitda_growth_pcts, |r, g| {
            let iv = ev_ebitda_intrinsic_value(
                metrics.ebitda_per_share,
                g / 100.0,
                metrics.net_debt_per_share,
                years,
            )?;
            Ok(iv / (1.0 + r / 100.0).powi(years as i32))
        })?)
    } else {
        None
    };

    let wacc = match &a.wacc {
        Some(inputs) => {
            let betas = beta_candidates(inputs.beta);
            let rf_pcts = risk_free_candidates(inputs.risk_free_rate * 100.0);
            Some(grid(&betas, &rf_pcts, |beta, rf| {
                let components = calculate_wacc(&WaccInputs {
                    beta,
                    risk_free_rate: rf / 100.0,
                    ..inputs.clone()
                })?;
                Ok(components.calculated_wacc * 100.0)
            })?)
        }
        None => None,
    };

    debug!(
        rows = fcf_growth.row_keys.len(),
        cols = fcf_growth.col_keys.len(),
        "sensitivity grids assembled"
    );

    Ok(SensitivityAnalysis {
        fcf_growth,
        eps_growth,
        fcf_yield,
        terminal_pe,
        discount_rate,
        wacc,
    })
}
