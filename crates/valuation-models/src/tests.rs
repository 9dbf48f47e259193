use approx::assert_relative_eq;
use valuation_core::*;

use crate::entry::entry_analysis;
use crate::models::*;
use crate::normalize::normalize;
use crate::wacc::{calculate_wacc, calculate_wacc_from_capital};
use crate::weighted::{combine, resolve_weights, ActiveModel};

fn snapshot() -> MarketSnapshot {
    MarketSnapshot {
        symbol: "AAPL".to_string(),
        current_price: 150.0,
        shares_outstanding: 1000.0,
        free_cash_flow: 5000.0,
        net_income: 300.0,
        ebitda: 600.0,
        total_debt: 400.0,
        cash_and_equivalents: 300.0,
    }
}

fn assumptions() -> ValuationAssumptions {
    ValuationAssumptions {
        fcf_growth: 0.15,
        eps_growth: 0.20,
        ebitda_growth: 0.18,
        fcf_yield: 0.04,
        terminal_pe: 15.0,
        eps_multiple: 20.0,
        desired_return: 0.15,
        years: 5,
        projection_years: 5,
        sbc_impact: 0.0,
        fcf_weight: 0.5,
        eps_weight: 0.5,
        ev_ebitda_weight: 0.0,
        use_ev_ebitda: false,
        include_sensitivity: false,
        wacc: None,
    }
}

#[test]
fn test_normalize_per_share_metrics() {
    let metrics = normalize(&snapshot(), 0.0).unwrap();
    assert_relative_eq!(metrics.fcf_per_share, 5.0);
    assert_relative_eq!(metrics.eps, 0.3);
    assert_relative_eq!(metrics.ebitda_per_share, 0.6);
    assert_relative_eq!(metrics.net_debt, 100.0);
    assert_relative_eq!(metrics.net_debt_per_share, 0.1);
    assert_relative_eq!(metrics.pe_ratio, 500.0);
}

#[test]
fn test_normalize_applies_sbc_dilution() {
    let metrics = normalize(&snapshot(), 0.10).unwrap();
    assert_relative_eq!(metrics.fcf_per_share, 4.5);
    assert_relative_eq!(metrics.eps, 0.27);
    // EBITDA is not SBC-diluted
    assert_relative_eq!(metrics.ebitda_per_share, 0.6);
}

#[test]
fn test_normalize_rejects_non_positive_shares() {
    let mut s = snapshot();
    s.shares_outstanding = 0.0;
    assert!(matches!(
        normalize(&s, 0.0),
        Err(ValuationError::InvalidInput(_))
    ));
}

#[test]
fn test_normalize_zero_pe_for_negative_earnings() {
    let mut s = snapshot();
    s.net_income = -300.0;
    let metrics = normalize(&s, 0.0).unwrap();
    assert_relative_eq!(metrics.pe_ratio, 0.0);
}

#[test]
fn test_fcf_model_reference_value() {
    // 5 * 1.15^5 / 0.04
    let iv = fcf_intrinsic_value(5.0, 0.15, 0.04, 5).unwrap();
    assert_relative_eq!(iv, 251.4196484375, epsilon = 1e-6);
}

#[test]
fn test_fcf_model_zero_yield_is_division_by_zero() {
    assert!(matches!(
        fcf_intrinsic_value(5.0, 0.15, 0.0, 5),
        Err(ValuationError::DivisionByZero("fcf_yield"))
    ));
    assert!(matches!(
        fcf_intrinsic_value(5.0, 0.15, -0.04, 5),
        Err(ValuationError::InvalidInput(_))
    ));
}

#[test]
fn test_eps_model_reference_value() {
    // 0.3 * 1.20^5 * 20
    let iv = eps_intrinsic_value(0.3, 0.20, 20.0, 5).unwrap();
    assert_relative_eq!(iv, 14.92992, epsilon = 1e-6);
}

#[test]
fn test_ev_ebitda_multiple_clamped() {
    assert_relative_eq!(ev_ebitda_multiple(0.0), 6.0);
    assert_relative_eq!(ev_ebitda_multiple(0.10), 16.0);
    assert_relative_eq!(ev_ebitda_multiple(0.18), 20.0); // capped
    assert_relative_eq!(ev_ebitda_multiple(-0.05), 5.0); // floored
}

#[test]
fn test_ev_ebitda_model_subtracts_net_debt() {
    let iv = ev_ebitda_intrinsic_value(0.6, 0.10, 0.1, 5).unwrap();
    let expected = 0.6 * 1.1_f64.powi(5) * 16.0 - 0.1;
    assert_relative_eq!(iv, expected, epsilon = 1e-9);
}

#[test]
fn test_model_contract_rejects_out_of_range_horizons() {
    for kind in [ModelKind::FcfYield, ModelKind::EpsMultiple, ModelKind::EvEbitda] {
        for years in [0, MAX_YEARS + 1, u32::MAX] {
            assert!(matches!(
                model_value(kind, 1.0, 0.1, 10.0, years),
                Err(ValuationError::InvalidInput(_))
            ));
        }
    }
}

#[test]
fn test_entry_price_and_implied_return_are_inverses() {
    let entry = entry_analysis(150.0, 251.4196484375, 0.15, 5).unwrap();
    assert_relative_eq!(
        entry.entry_price * 1.15_f64.powi(5),
        251.4196484375,
        epsilon = 1e-9
    );
    // With growth == desired return the FCF entry price collapses to
    // base / yield.
    assert_relative_eq!(entry.entry_price, 125.0, epsilon = 1e-9);

    let annualized = (251.4196484375_f64 / 150.0).powf(0.2) - 1.0;
    assert_relative_eq!(entry.implied_return_pct, annualized * 100.0, epsilon = 1e-9);
}

#[test]
fn test_entry_rejects_out_of_range_years_and_zero_price() {
    assert!(matches!(
        entry_analysis(150.0, 200.0, 0.15, 0),
        Err(ValuationError::InvalidInput(_))
    ));
    assert!(matches!(
        entry_analysis(150.0, 200.0, 0.15, MAX_YEARS + 1),
        Err(ValuationError::InvalidInput(_))
    ));
    assert!(matches!(
        entry_analysis(0.0, 200.0, 0.15, 5),
        Err(ValuationError::DivisionByZero("current_price"))
    ));
}

#[test]
fn test_entry_discount_needed_sign() {
    // Target well above price: premium allowed, discount negative.
    let cheap = entry_analysis(100.0, 400.0, 0.10, 5).unwrap();
    assert!(cheap.discount_needed_pct < 0.0);
    // Target below price: discount required.
    let rich = entry_analysis(100.0, 90.0, 0.10, 5).unwrap();
    assert!(rich.discount_needed_pct > 0.0);
}

#[test]
fn test_valuate_full_model_valuation() {
    let metrics = normalize(&snapshot(), 0.0).unwrap();
    let a = assumptions();
    let fcf = valuate(ModelKind::FcfYield, &metrics, &a).unwrap();
    assert_relative_eq!(fcf.intrinsic_value, 251.4196484375, epsilon = 1e-6);
    assert_relative_eq!(fcf.entry_price, 125.0, epsilon = 1e-6);

    let eps = valuate(ModelKind::EpsMultiple, &metrics, &a).unwrap();
    assert_relative_eq!(eps.intrinsic_value, 14.92992, epsilon = 1e-6);
}

#[test]
fn test_weighted_combination_is_exact_linear_sum() {
    let metrics = normalize(&snapshot(), 0.0).unwrap();
    let a = assumptions();
    let fcf = valuate(ModelKind::FcfYield, &metrics, &a).unwrap();
    let eps = valuate(ModelKind::EpsMultiple, &metrics, &a).unwrap();

    let expected_iv = 0.5 * fcf.intrinsic_value + 0.5 * eps.intrinsic_value;
    let expected_entry = 0.5 * fcf.entry_price + 0.5 * eps.entry_price;
    let expected_ret = 0.5 * fcf.implied_return + 0.5 * eps.implied_return;

    let weighted = combine(&[
        ActiveModel { kind: ModelKind::FcfYield, weight: 0.5, valuation: fcf },
        ActiveModel { kind: ModelKind::EpsMultiple, weight: 0.5, valuation: eps },
    ])
    .unwrap();

    assert_relative_eq!(weighted.intrinsic_value, expected_iv, epsilon = 1e-9);
    assert_relative_eq!(weighted.intrinsic_value, 133.1747842, epsilon = 1e-3);
    assert_relative_eq!(weighted.entry_price, expected_entry, epsilon = 1e-9);
    assert_relative_eq!(weighted.implied_return, expected_ret, epsilon = 1e-9);
}

#[test]
fn test_combine_rejects_weight_mismatch() {
    let v = ModelValuation {
        intrinsic_value: 100.0,
        entry_price: 50.0,
        implied_return: 10.0,
    };
    let result = combine(&[
        ActiveModel { kind: ModelKind::FcfYield, weight: 0.5, valuation: v.clone() },
        ActiveModel { kind: ModelKind::EpsMultiple, weight: 0.3, valuation: v },
    ]);
    assert!(matches!(result, Err(ValuationError::WeightMismatch(_))));
}

#[test]
fn test_resolve_weights_renormalizes_when_ev_disabled() {
    let mut a = assumptions();
    a.fcf_weight = 0.5;
    a.eps_weight = 0.3;
    a.ev_ebitda_weight = 0.2;
    a.use_ev_ebitda = false;

    let weights = resolve_weights(&a).unwrap();
    assert_eq!(weights.len(), 2);
    assert_relative_eq!(weights[0].1, 0.625, epsilon = 1e-9);
    assert_relative_eq!(weights[1].1, 0.375, epsilon = 1e-9);
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-12);
}

#[test]
fn test_resolve_weights_keeps_ev_when_enabled() {
    let mut a = assumptions();
    a.fcf_weight = 0.5;
    a.eps_weight = 0.3;
    a.ev_ebitda_weight = 0.2;
    a.use_ev_ebitda = true;

    let weights = resolve_weights(&a).unwrap();
    assert_eq!(weights.len(), 3);
    assert_relative_eq!(weights[2].1, 0.2, epsilon = 1e-9);
}

#[test]
fn test_resolve_weights_rejects_off_sum_without_coercion() {
    // Nothing was coerced, so a short sum must not be silently rescaled
    let mut a = assumptions();
    a.fcf_weight = 0.5;
    a.eps_weight = 0.2;
    assert!(matches!(
        resolve_weights(&a),
        Err(ValuationError::WeightMismatch(_))
    ));

    let mut a = assumptions();
    a.use_ev_ebitda = true;
    a.fcf_weight = 0.5;
    a.eps_weight = 0.3;
    a.ev_ebitda_weight = 0.1;
    assert!(matches!(
        resolve_weights(&a),
        Err(ValuationError::WeightMismatch(_))
    ));
}

#[test]
fn test_resolve_weights_rejects_zero_total() {
    let mut a = assumptions();
    a.fcf_weight = 0.0;
    a.eps_weight = 0.0;
    a.ev_ebitda_weight = 1.0;
    a.use_ev_ebitda = false;
    assert!(matches!(
        resolve_weights(&a),
        Err(ValuationError::WeightMismatch(_))
    ));
}

fn wacc_inputs() -> WaccInputs {
    WaccInputs {
        beta: 1.2,
        risk_free_rate: 0.045,
        equity_risk_premium: 0.05,
        cost_of_debt: 0.06,
        debt_to_equity: 0.5,
        tax_rate: 0.25,
    }
}

#[test]
fn test_wacc_capm_breakdown() {
    let c = calculate_wacc(&wacc_inputs()).unwrap();
    assert_relative_eq!(c.cost_of_equity, 0.105, epsilon = 1e-12);
    assert_relative_eq!(c.weight_equity, 2.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(c.weight_debt, 1.0 / 3.0, epsilon = 1e-12);
    // 2/3 * 0.105 + 1/3 * 0.06 * 0.75
    assert_relative_eq!(c.calculated_wacc, 0.085, epsilon = 1e-12);
}

#[test]
fn test_wacc_rejects_negative_debt_to_equity() {
    let mut inputs = wacc_inputs();
    inputs.debt_to_equity = -0.1;
    assert!(matches!(
        calculate_wacc(&inputs),
        Err(ValuationError::InvalidInput(_))
    ));
}

#[test]
fn test_wacc_from_capital_zero_capital_is_division_by_zero() {
    assert!(matches!(
        calculate_wacc_from_capital(&wacc_inputs(), 0.0, 0.0),
        Err(ValuationError::DivisionByZero("total_capital"))
    ));
}

#[test]
fn test_wacc_from_capital_matches_ratio_form() {
    let inputs = wacc_inputs();
    let by_ratio = calculate_wacc(&inputs).unwrap();
    // D/E = 0.5 is 100 debt against 200 equity.
    let by_capital = calculate_wacc_from_capital(&inputs, 200.0, 100.0).unwrap();
    assert_relative_eq!(
        by_capital.calculated_wacc,
        by_ratio.calculated_wacc,
        epsilon = 1e-12
    );
}
