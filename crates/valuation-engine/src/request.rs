use serde::{Deserialize, Serialize};
use valuation_core::{
    ValuationAssumptions, ValuationError, ValuationResult, WaccInputs,
};
use valuation_models::MAX_YEARS;

/// Tolerance for the whole-percent weight sum check.
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Optional cost-of-capital inputs, whole-number percent where applicable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaccRequest {
    pub beta: f64,
    /// Percent, e.g. 4.5 for 4.5%.
    pub risk_free_rate: f64,
    #[serde(default = "default_equity_risk_premium")]
    pub equity_risk_premium: f64,
    pub cost_of_debt: f64,
    pub debt_to_equity: f64,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
}

fn default_equity_risk_premium() -> f64 {
    5.0
}

fn default_tax_rate() -> f64 {
    25.0
}

/// A single valuation request as submitted by the calling layer.
///
/// All rate-like fields are whole-number percentages (15.0 = 15%); the
/// three weight fields must sum to 100 within 0.01.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationRequest {
    pub symbol: String,
    #[serde(default = "default_fcf_growth")]
    pub fcf_growth: f64,
    #[serde(default = "default_eps_growth")]
    pub eps_growth: f64,
    #[serde(default = "default_ebitda_growth")]
    pub ebitda_growth: f64,
    #[serde(default = "default_fcf_yield")]
    pub fcf_yield: f64,
    #[serde(default = "default_terminal_pe")]
    pub terminal_pe: f64,
    #[serde(default = "default_eps_multiple")]
    pub eps_multiple: f64,
    #[serde(default = "default_desired_return")]
    pub desired_return: f64,
    #[serde(default = "default_years")]
    pub years: u32,
    #[serde(default = "default_years")]
    pub projection_years: u32,
    #[serde(default)]
    pub sbc_impact: f64,
    #[serde(default = "default_fcf_weight")]
    pub fcf_weight: f64,
    #[serde(default = "default_eps_weight")]
    pub eps_weight: f64,
    #[serde(default = "default_ev_ebitda_weight")]
    pub ev_ebitda_weight: f64,
    #[serde(default = "default_true")]
    pub use_ev_ebitda: bool,
    #[serde(default)]
    pub sensitivity: bool,
    #[serde(default)]
    pub wacc: Option<WaccRequest>,
}

fn default_fcf_growth() -> f64 {
    15.0
}
fn default_eps_growth() -> f64 {
    20.0
}
fn default_ebitda_growth() -> f64 {
    18.0
}
fn default_fcf_yield() -> f64 {
    4.0
}
fn default_terminal_pe() -> f64 {
    15.0
}
fn default_eps_multiple() -> f64 {
    20.0
}
fn default_desired_return() -> f64 {
    15.0
}
fn default_years() -> u32 {
    5
}
fn default_fcf_weight() -> f64 {
    50.0
}
fn default_eps_weight() -> f64 {
    30.0
}
fn default_ev_ebitda_weight() -> f64 {
    20.0
}
fn default_true() -> bool {
    true
}

impl ValuationRequest {
    /// Validate the request and convert it into fraction-domain assumptions.
    ///
    /// Runs before any model executes: the weight sum is checked against
    /// the submitted values, then the EV/EBITDA weight is coerced to zero
    /// when the model is disabled and the remaining weights re-normalized
    /// over the active models.
    pub fn validate(&self) -> ValuationResult<ValuationAssumptions> {
        if self.years == 0 || self.years > MAX_YEARS {
            return Err(ValuationError::InvalidInput(format!(
                "years must be between 1 and {MAX_YEARS}, got {}",
                self.years
            )));
        }
        if !matches!(self.projection_years, 2 | 5 | 10) {
            return Err(ValuationError::InvalidInput(format!(
                "projection_years must be 2, 5 or 10, got {}",
                self.projection_years
            )));
        }
        if !(0.0..100.0).contains(&self.sbc_impact) {
            return Err(ValuationError::InvalidInput(format!(
                "sbc_impact must be a percentage in [0, 100), got {}",
                self.sbc_impact
            )));
        }
        if self.fcf_yield == 0.0 {
            return Err(ValuationError::DivisionByZero("fcf_yield"));
        }
        if self.fcf_yield < 0.0 {
            return Err(ValuationError::InvalidInput(format!(
                "fcf_yield must be positive, got {}",
                self.fcf_yield
            )));
        }
        if self.terminal_pe <= 0.0 || self.eps_multiple <= 0.0 {
            return Err(ValuationError::InvalidInput(
                "terminal_pe and eps_multiple must be positive".to_string(),
            ));
        }
        for (name, pct) in [
            ("fcf_growth", self.fcf_growth),
            ("eps_growth", self.eps_growth),
            ("ebitda_growth", self.ebitda_growth),
            ("desired_return", self.desired_return),
        ] {
            if pct <= -100.0 {
                return Err(ValuationError::InvalidInput(format!(
                    "{name} must be greater than -100%, got {pct}"
                )));
            }
        }
        if self.fcf_weight < 0.0 || self.eps_weight < 0.0 || self.ev_ebitda_weight < 0.0 {
            return Err(ValuationError::WeightMismatch(
                "weights must be non-negative".to_string(),
            ));
        }

        let weight_sum = self.fcf_weight + self.eps_weight + self.ev_ebitda_weight;
        if (weight_sum - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValuationError::WeightMismatch(format!(
                "weights sum to {weight_sum}, expected 100"
            )));
        }

        // Coerce the disabled model's weight to zero and re-normalize the
        // active weights to fractions summing to 1.
        let (fcf_weight, eps_weight, ev_ebitda_weight) = if self.use_ev_ebitda {
            (
                self.fcf_weight / weight_sum,
                self.eps_weight / weight_sum,
                self.ev_ebitda_weight / weight_sum,
            )
        } else {
            let active = self.fcf_weight + self.eps_weight;
            if active <= 0.0 {
                return Err(ValuationError::WeightMismatch(
                    "active model weights sum to zero".to_string(),
                ));
            }
            (self.fcf_weight / active, self.eps_weight / active, 0.0)
        };

        let wacc = match &self.wacc {
            Some(w) => {
                if w.debt_to_equity < 0.0 {
                    return Err(ValuationError::InvalidInput(format!(
                        "debt_to_equity must be non-negative, got {}",
                        w.debt_to_equity
                    )));
                }
                Some(WaccInputs {
                    beta: w.beta,
                    risk_free_rate: w.risk_free_rate / 100.0,
                    equity_risk_premium: w.equity_risk_premium / 100.0,
                    cost_of_debt: w.cost_of_debt / 100.0,
                    debt_to_equity: w.debt_to_equity,
                    tax_rate: w.tax_rate / 100.0,
                })
            }
            None => None,
        };

        Ok(ValuationAssumptions {
            fcf_growth: self.fcf_growth / 100.0,
            eps_growth: self.eps_growth / 100.0,
            ebitda_growth: self.ebitda_growth / 100.0,
            fcf_yield: self.fcf_yield / 100.0,
            terminal_pe: self.terminal_pe,
            eps_multiple: self.eps_multiple,
            desired_return: self.desired_return / 100.0,
            years: self.years,
            projection_years: self.projection_years,
            sbc_impact: self.sbc_impact / 100.0,
            fcf_weight,
            eps_weight,
            ev_ebitda_weight,
            use_ev_ebitda: self.use_ev_ebitda,
            include_sensitivity: self.sensitivity,
            wacc,
        })
    }
}
