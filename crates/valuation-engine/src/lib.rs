pub mod engine;
pub mod monte_carlo;
pub mod projections;
pub mod request;
pub mod sensitivity;

pub use engine::run_valuation;
pub use monte_carlo::run_monte_carlo;
pub use request::{ValuationRequest, WaccRequest};
pub use sensitivity::grid;
