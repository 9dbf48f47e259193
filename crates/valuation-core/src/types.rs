use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trailing-twelve-month market snapshot for a single equity.
///
/// Fetched by the caller (market-data service) and passed by value into the
/// core; never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub current_price: f64,
    pub shares_outstanding: f64,
    pub free_cash_flow: f64,
    pub net_income: f64,
    pub ebitda: f64,
    pub total_debt: f64,
    pub cash_and_equivalents: f64,
}

impl MarketSnapshot {
    pub fn net_debt(&self) -> f64 {
        self.total_debt - self.cash_and_equivalents
    }
}

/// Per-share metrics derived from a snapshot, with SBC dilution applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedMetrics {
    pub current_price: f64,
    pub shares_outstanding: f64,
    pub fcf_per_share: f64,
    pub eps: f64,
    pub ebitda_per_share: f64,
    /// 0.0 when EPS is non-positive, matching the upstream data feed.
    pub pe_ratio: f64,
    pub net_debt: f64,
    pub net_debt_per_share: f64,
}

/// The set of valuation models the core knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    FcfYield,
    EpsMultiple,
    EvEbitda,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::FcfYield => "fcf",
            ModelKind::EpsMultiple => "eps",
            ModelKind::EvEbitda => "ev_ebitda",
        }
    }
}

/// Validated, fraction-domain assumptions for one valuation run.
///
/// Growth rates, yields, returns and weights are decimal fractions here;
/// the whole-percent interface conversion happens exactly once, during
/// request validation. Constructed once per request, never mutated after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationAssumptions {
    pub fcf_growth: f64,
    pub eps_growth: f64,
    pub ebitda_growth: f64,
    pub fcf_yield: f64,
    pub terminal_pe: f64,
    pub eps_multiple: f64,
    pub desired_return: f64,
    /// Holding period used by the models and the entry-price inversion.
    pub years: u32,
    /// Length of the projection tables; independent of `years`.
    pub projection_years: u32,
    pub sbc_impact: f64,
    /// Fraction weights over active models; sum to 1.0 after validation.
    pub fcf_weight: f64,
    pub eps_weight: f64,
    pub ev_ebitda_weight: f64,
    pub use_ev_ebitda: bool,
    pub include_sensitivity: bool,
    pub wacc: Option<WaccInputs>,
}

/// Capital-structure inputs for the WACC calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaccInputs {
    pub beta: f64,
    pub risk_free_rate: f64,
    pub equity_risk_premium: f64,
    pub cost_of_debt: f64,
    pub debt_to_equity: f64,
    pub tax_rate: f64,
}

/// Full cost-of-capital breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaccComponents {
    pub beta: f64,
    pub risk_free_rate: f64,
    pub equity_risk_premium: f64,
    pub cost_of_equity: f64,
    pub cost_of_debt: f64,
    pub debt_to_equity: f64,
    pub weight_equity: f64,
    pub weight_debt: f64,
    pub tax_rate: f64,
    pub calculated_wacc: f64,
}

/// Output of a single valuation model.
///
/// `implied_return` is the annualized return from today's price to the
/// intrinsic value over the holding period, as a whole-number percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelValuation {
    pub intrinsic_value: f64,
    pub entry_price: f64,
    pub implied_return: f64,
}

/// Weighted combination of the active model valuations.
///
/// Each field is combined independently across models (not re-derived from
/// the weighted intrinsic value), preserving per-metric linearity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedValuation {
    pub intrinsic_value: f64,
    pub entry_price: f64,
    pub implied_return: f64,
    pub fcf_weight: f64,
    pub eps_weight: f64,
    pub ev_ebitda_weight: f64,
}

/// One step of an annual or quarterly projection series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Year offset (0 = trailing base) or quarter index (1-based).
    pub period: u32,
    pub value: f64,
    /// Growth versus the prior point, whole-number percent. `None` for the
    /// base point.
    pub growth_pct: Option<f64>,
}

/// One quarter of the combined forward table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarterlyPoint {
    pub quarter: u32,
    pub fcf_per_share: f64,
    pub eps: f64,
    pub ebitda_per_share: f64,
}

/// Horizon-specific target from re-running a model with years = 2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoYearTarget {
    pub target_price: f64,
    pub entry_price: f64,
    pub implied_return: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoYearTargets {
    pub fcf: TwoYearTarget,
    pub eps: TwoYearTarget,
    pub ev_ebitda: Option<TwoYearTarget>,
    pub weighted: TwoYearTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projections {
    pub fcf_projections: Vec<ProjectionPoint>,
    pub eps_projections: Vec<ProjectionPoint>,
    pub ebitda_projections: Vec<ProjectionPoint>,
    pub quarterly_projections: Vec<QuarterlyPoint>,
    pub two_year_targets: TwoYearTargets,
}

/// Rectangular grid of intrinsic values across a 2-D parameter sweep.
///
/// Row and column keys are numeric strings; both key sets are sorted
/// numerically ascending at assembly, and every row spans the identical
/// column-key set by construction (`values[r][c]` pairs with
/// `row_keys[r]` / `col_keys[c]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    pub row_keys: Vec<String>,
    pub col_keys: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl SensitivityGrid {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let r = self.row_keys.iter().position(|k| k == row)?;
        let c = self.col_keys.iter().position(|k| k == col)?;
        self.values.get(r)?.get(c).copied()
    }
}

/// The named sensitivity grids, keyed by axis pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityAnalysis {
    /// fcf_growth x fcf_yield
    pub fcf_growth: SensitivityGrid,
    /// eps_growth x terminal_pe
    pub eps_growth: SensitivityGrid,
    /// fcf_yield x fcf_growth
    pub fcf_yield: SensitivityGrid,
    /// terminal_pe x eps_growth
    pub terminal_pe: SensitivityGrid,
    /// discount_rate x ebitda_growth; present only when EV/EBITDA is active.
    pub discount_rate: Option<SensitivityGrid>,
    /// beta x risk_free_rate; present only when WACC inputs were supplied.
    pub wacc: Option<SensitivityGrid>,
}

/// Best/base/worst band around the weighted intrinsic value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioBand {
    pub worst_case: f64,
    pub base_case: f64,
    pub best_case: f64,
}

/// Distribution summary of randomized FCF-model draws.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub iterations: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentile_10: f64,
    pub percentile_25: f64,
    pub percentile_50: f64,
    pub percentile_75: f64,
    pub percentile_90: f64,
    pub mean_upside_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationResults {
    pub fcf_valuation: ModelValuation,
    pub eps_valuation: ModelValuation,
    pub ev_ebitda_valuation: Option<ModelValuation>,
    pub weighted_valuation: WeightedValuation,
}

/// Complete response of one valuation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationReport {
    pub market_data: NormalizedMetrics,
    pub valuation_results: ValuationResults,
    pub projections: Projections,
    pub sensitivity_analysis: Option<SensitivityAnalysis>,
    pub wacc_components: Option<WaccComponents>,
    pub scenarios: ScenarioBand,
}

/// One observation of the historical backtest series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub intrinsic_value: f64,
}

/// Trailing fair-value series with over/under-valuation summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationHistory {
    pub points: Vec<HistoricalPoint>,
    /// mean((price / intrinsic_value - 1) * 100) over the full series
    pub average_overvaluation_pct: f64,
    /// last point's overvaluation
    pub current_overvaluation_pct: f64,
    /// compound growth of the intrinsic-value series, whole-number percent
    pub iv_cagr_pct: f64,
}
