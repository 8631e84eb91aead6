pub mod series;

pub use series::{PriceSample, PriceSeries};
