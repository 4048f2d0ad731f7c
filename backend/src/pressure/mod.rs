//! Pressure Exposure Engine
//!
//! Converts active front pressure and committed postures into a
//! non-negative exposure score per settlement.

pub mod exposure;

pub use exposure::{exposure_by_entity, ExposureStats};
