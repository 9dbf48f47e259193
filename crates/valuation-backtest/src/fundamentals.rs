use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use valuation_core::MarketSnapshot;

/// Trailing fundamentals effective from a report date onwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub date: NaiveDate,
    pub shares_outstanding: f64,
    pub free_cash_flow: f64,
    pub net_income: f64,
    pub ebitda: f64,
    pub total_debt: f64,
    pub cash_and_equivalents: f64,
}

impl Fundamentals {
    /// Pair these fundamentals with a price observation to form the snapshot
    /// the models consume.
    pub fn snapshot(&self, symbol: &str, price: f64) -> MarketSnapshot {
        MarketSnapshot {
            symbol: symbol.to_string(),
            current_price: price,
            shares_outstanding: self.shares_outstanding,
            free_cash_flow: self.free_cash_flow,
            net_income: self.net_income,
            ebitda: self.ebitda,
            total_debt: self.total_debt,
            cash_and_equivalents: self.cash_and_equivalents,
        }
    }
}

/// Fundamentals available to a backtest run.
///
/// `Fixed` holds one set constant across the whole window; `Rolling` gives
/// each price date the most recent report at or before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FundamentalsSeries {
    Fixed(Fundamentals),
    Rolling(Vec<Fundamentals>),
}

impl FundamentalsSeries {
    /// The fundamentals in effect on `date`, or `None` when the date
    /// precedes every available report.
    pub fn at(&self, date: NaiveDate) -> Option<&Fundamentals> {
        match self {
            Self::Fixed(f) => Some(f),
            Self::Rolling(reports) => reports
                .iter()
                .filter(|f| f.date <= date)
                .max_by_key(|f| f.date),
        }
    }
}
