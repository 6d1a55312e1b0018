//! # diskedit core
//!
//! Shared foundations for the diskedit partition editor:
//! - **Error taxonomy**: every validation, reconciliation, and I/O failure
//!   as a typed kind
//! - **Part**: a named, half-open sector range with a dirty bit
//! - **DiskBackend**: disk geometry plus raw control-table access
//! - **SectorEvaluator**: operator sector-expression resolution
//!
//! The editing state machine lives in `diskedit-layout`; the control-table
//! reconciliation engine lives in `diskedit-ctl`.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use error::{Error, Result};
pub use traits::{DiskBackend, SectorEvaluator};
pub use types::{validate_name, DiskGeometry, Part, MAX_NAME_LEN};
