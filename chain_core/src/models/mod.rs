//! Data model shared by every pipeline stage.

pub mod interval;
pub mod snapshot;

pub use interval::{Interval, ParseIntervalError};
pub use snapshot::{ChainSnapshot, Greeks, OptionSideQuote, Strike};
