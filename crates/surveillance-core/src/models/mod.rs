//! Domain models for the surveillance system.

mod animal;
mod caller;
mod case;
mod location;

pub use animal::*;
pub use caller::*;
pub use case::*;
pub use location::*;
