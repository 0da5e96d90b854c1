pub mod matcher;
pub mod pool;

pub use matcher::{compute_hifo_gains, validate_quantities, GainsReport, MatchError};
pub use pool::{Lot, LotPool};
