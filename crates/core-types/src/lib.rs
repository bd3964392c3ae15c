pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{PositionState, SpreadDirection};
pub use error::CoreError;
pub use structs::{AlignedPrices, AnalysisRequest, PairTrade, PricePoint, PriceSeries};
