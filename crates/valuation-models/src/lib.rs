pub mod entry;
pub mod models;
pub mod normalize;
pub mod wacc;
pub mod weighted;

pub use entry::{entry_analysis, EntryAnalysis};
pub use models::{
    eps_intrinsic_value, ev_ebitda_intrinsic_value, ev_ebitda_multiple, fcf_intrinsic_value,
    model_value, valuate, MAX_YEARS,
};
pub use normalize::normalize;
pub use wacc::{calculate_wacc, calculate_wacc_from_capital};
pub use weighted::{combine, resolve_weights, ActiveModel};

#[cfg(test)]
mod tests;
