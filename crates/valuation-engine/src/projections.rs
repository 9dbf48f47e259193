use valuation_core::{
    ModelKind, NormalizedMetrics, ProjectionPoint, Projections, QuarterlyPoint, TwoYearTarget,
    TwoYearTargets, ValuationAssumptions, ValuationResult,
};
use valuation_models::{
    entry_analysis, eps_intrinsic_value, ev_ebitda_intrinsic_value, fcf_intrinsic_value,
};

/// Annual compound series: a base point (no growth computed) followed by
/// `years` compounded points.
pub fn annual_series(base: f64, growth: f64, years: u32) -> Vec<ProjectionPoint> {
    let mut points = Vec::with_capacity(years as usize + 1);
    points.push(ProjectionPoint {
        period: 0,
        value: base,
        growth_pct: None,
    });
    for year in 1..=years {
        points.push(ProjectionPoint {
            period: year,
            value: base * (1.0 + growth).powi(year as i32),
            growth_pct: Some(growth * 100.0),
        });
    }
    points
}

/// Quarterly-compounded rate equivalent to an annual growth rate.
pub fn quarterly_rate(annual_growth: f64) -> f64 {
    (1.0 + annual_growth).powf(0.25) - 1.0
}

fn quarterly_series(metrics: &NormalizedMetrics, a: &ValuationAssumptions) -> Vec<QuarterlyPoint> {
    let quarters = a.projection_years * 4;
    let fcf_q = quarterly_rate(a.fcf_growth);
    let eps_q = quarterly_rate(a.eps_growth);
    let ebitda_q = quarterly_rate(a.ebitda_growth);

    (1..=quarters)
        .map(|q| QuarterlyPoint {
            quarter: q,
            fcf_per_share: metrics.fcf_per_share * (1.0 + fcf_q).powi(q as i32),
            eps: metrics.eps * (1.0 + eps_q).powi(q as i32),
            ebitda_per_share: metrics.ebitda_per_share * (1.0 + ebitda_q).powi(q as i32),
        })
        .collect()
}

fn two_year_target(
    current_price: f64,
    target_price: f64,
    desired_return: f64,
) -> ValuationResult<TwoYearTarget> {
    let entry = entry_analysis(current_price, target_price, desired_return, 2)?;
    Ok(TwoYearTarget {
        target_price,
        entry_price: entry.entry_price,
        implied_return: entry.implied_return_pct,
    })
}

/// 2-year targets from re-invoking the valuation models with years = 2.
fn two_year_targets(
    metrics: &NormalizedMetrics,
    a: &ValuationAssumptions,
    weights: &[(ModelKind, f64)],
) -> ValuationResult<TwoYearTargets> {
    let fcf_price = fcf_intrinsic_value(metrics.fcf_per_share, a.fcf_growth, a.fcf_yield, 2)?;
    let eps_price = eps_intrinsic_value(metrics.eps, a.eps_growth, a.eps_multiple, 2)?;
    let ev_price = if a.use_ev_ebitda {
        Some(ev_ebitda_intrinsic_value(
            metrics.ebitda_per_share,
            a.ebitda_growth,
            metrics.net_debt_per_share,
            2,
        )?)
    } else {
        None
    };

    let weighted_price: f64 = weights
        .iter()
        .map(|(kind, w)| {
            w * match kind {
                ModelKind::FcfYield => fcf_price,
                ModelKind::EpsMultiple => eps_price,
                ModelKind::EvEbitda => ev_price.unwrap_or(0.0),
            }
        })
        .sum();

    Ok(TwoYearTargets {
        fcf: two_year_target(metrics.current_price, fcf_price, a.desired_return)?,
        eps: two_year_target(metrics.current_price, eps_price, a.desired_return)?,
        ev_ebitda: match ev_price {
            Some(p) => Some(two_year_target(metrics.current_price, p, a.desired_return)?),
            None => None,
        },
        weighted: two_year_target(metrics.current_price, weighted_price, a.desired_return)?,
    })
}

/// Build the full forward projection block: annual tables per metric, the
/// quarterly table, and the 2-year targets.
pub fn generate(
    metrics: &NormalizedMetrics,
    a: &ValuationAssumptions,
    weights: &[(ModelKind, f64)],
) -> ValuationResult<Projections> {
    Ok(Projections {
        fcf_projections: annual_series(metrics.fcf_per_share, a.fcf_growth, a.projection_years),
        eps_projections: annual_series(metrics.eps, a.eps_growth, a.projection_years),
        ebitda_projections: annual_series(
            metrics.ebitda_per_share,
            a.ebitda_growth,
            a.projection_years,
        ),
        quarterly_projections: quarterly_series(metrics, a),
        two_year_targets: two_year_targets(metrics, a, weights)?,
    })
}
