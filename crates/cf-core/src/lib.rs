//! cf-core: stable foundation for cellflow.
//!
//! Contains:
//! - units (uom SI types + constructors for the configuration boundary)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)
//!
//! Everything inside the residual hot path works on raw `f64`; the uom
//! wrappers exist so configuration and reporting code states its units.

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
