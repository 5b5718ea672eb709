pub mod error;
pub mod fundamentals;
pub mod market;
pub mod ticker;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use fundamentals::{FcfHistory, FundamentalsSnapshot, LineItem};
pub use market::{PriceBar, PriceSeries};
pub use ticker::format_ticker;
