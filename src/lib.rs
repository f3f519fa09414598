pub mod config;
pub mod error;
pub mod graph;
pub mod identity;

pub use config::Config;
pub use error::{RelgraphError, Result};
pub use graph::{Dataset, MetricOptions, RelationGraph};
pub use identity::{Comparator, Equality, IdentityIndex, JsonComparator};
