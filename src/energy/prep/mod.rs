pub mod accumulate;
pub mod assemble;
pub mod chart_meta;
pub mod derive;
pub mod error;
pub mod extract;
pub mod io;
pub mod model;
pub mod overlay;
pub mod profile;
pub mod prune;
pub mod shard;
pub mod taxonomy;
pub mod units;
pub mod validate;
pub mod workflow;

pub use error::{PrepError, Result};
