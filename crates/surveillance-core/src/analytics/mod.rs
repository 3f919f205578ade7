//! Derived views over animal and disease-case records.
//!
//! Nothing here is persisted: every view is recomputed from the records the
//! store returns for the caller's scope.

mod classify;
mod dashboard;
mod geo;
mod national;
mod rollup;
mod trend;

pub use classify::*;
pub use dashboard::*;
pub use geo::*;
pub use national::*;
pub use rollup::*;
pub use trend::*;
