//! Historical backtest of the valuation models: replay a price series,
//! recompute the weighted fair value at every point, and summarize how far
//! price traded from it.

pub mod fundamentals;
pub mod history;
pub mod weekly;

pub use fundamentals::{Fundamentals, FundamentalsSeries};
pub use history::{run_backtest, PricePoint};
pub use weekly::aggregate_weekly;
