mod types;

pub use types::{FeaturesConfig, OperatorConfig};
