pub mod calculations;
pub mod engine;
pub mod error;
pub mod models;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use engine::TaxEngine;
pub use error::TaxError;
pub use models::*;
pub use registry::{RegistryBuilder, ScheduleRegistry, SharedRegistry};
