//! # diskedit ctl
//!
//! The control-table side of the partition editor: parsing the live table's
//! partition records, the minimal-destruction reconciliation engine, and the
//! [`DiskBackend`](diskedit_core::DiskBackend) implementations.
//!
//! Reconciliation is a single read-diff-apply cycle with no state carried
//! between calls. The table is an external shared resource; the window
//! between this crate's read and its writes is an accepted race, not
//! something guarded with locks.
//!
//! ## Example
//!
//! ```
//! use diskedit_core::{DiskGeometry, Part};
//! use diskedit_ctl::{preview, MemoryDisk};
//! use diskedit_layout::PartitionSet;
//!
//! let mut disk = MemoryDisk::new(DiskGeometry::new("disk", 10000))
//!     .with_record("data", 0, 10000);
//!
//! let mut set = PartitionSet::new();
//! set.add(Part::new("data", 0, 5000)).unwrap();
//! set.add(Part::new("swap", 5000, 10000)).unwrap();
//!
//! let instructions = preview(&mut disk, &set).unwrap();
//! let lines: Vec<String> = instructions.iter().map(|i| i.to_string()).collect();
//! assert_eq!(
//!     lines,
//!     ["delpart data", "part data 0 5000", "part swap 5000 10000"]
//! );
//! ```

pub mod backend;
pub mod engine;
pub mod record;

// Re-export commonly used items
pub use backend::{CtlFile, MemoryDisk};
pub use engine::{apply, persist, preview, read_layout, CtlInstruction};
pub use record::MAX_CTL_PARTS;
