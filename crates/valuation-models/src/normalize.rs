use valuation_core::{MarketSnapshot, NormalizedMetrics, ValuationError, ValuationResult};

/// Convert a raw snapshot into per-share metrics with SBC dilution applied.
///
/// FCF and net income are reduced by the SBC fraction before dividing by
/// shares outstanding; EBITDA per share is left undiluted (SBC is a non-cash
/// expense already excluded from EBITDA).
pub fn normalize(snapshot: &MarketSnapshot, sbc_impact: f64) -> ValuationResult<NormalizedMetrics> {
    if snapshot.shares_outstanding <= 0.0 {
        return Err(ValuationError::InvalidInput(format!(
            "shares outstanding must be positive, got {}",
            snapshot.shares_outstanding
        )));
    }
    if !(0.0..1.0).contains(&sbc_impact) {
        return Err(ValuationError::InvalidInput(format!(
            "SBC impact must be a fraction in [0, 1), got {sbc_impact}"
        )));
    }

    let shares = snapshot.shares_outstanding;
    let dilution = 1.0 - sbc_impact;
    let fcf_per_share = snapshot.free_cash_flow * dilution / shares;
    let eps = snapshot.net_income * dilution / shares;
    let ebitda_per_share = snapshot.ebitda / shares;
    let net_debt = snapshot.net_debt();

    let pe_ratio = if eps > 0.0 {
        snapshot.current_price / eps
    } else {
        0.0
    };

    Ok(NormalizedMetrics {
        current_price: snapshot.current_price,
        shares_outstanding: shares,
        fcf_per_share,
        eps,
        ebitda_per_share,
        pe_ratio,
        net_debt,
        net_debt_per_share: net_debt / shares,
    })
}
