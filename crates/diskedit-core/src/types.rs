//! Core types for partition editing

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted partition name, in bytes
pub const MAX_NAME_LEN: usize = 64;

/// One partition in the editor's working set
///
/// Sector offsets are disk-local and half-open: `start` is the first sector
/// of the partition, `end` the first sector past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Name of the partition within the editor
    pub name: String,

    /// Name used on the control table; empty means this entry has no
    /// control-table counterpart (a free-space marker, for example)
    pub ctl_name: String,

    /// First sector, disk-local
    pub start: i64,

    /// First sector past the partition, disk-local
    pub end: i64,

    /// True if this partition still needs to be persisted
    pub changed: bool,
}

impl Part {
    /// Create a new partition, dirty by default
    ///
    /// The control-table name starts out equal to the editor name; use
    /// [`Part::with_ctl_name`] to override it.
    pub fn new(name: impl Into<String>, start: i64, end: i64) -> Self {
        let name = name.into();
        Self {
            ctl_name: name.clone(),
            name,
            start,
            end,
            changed: true,
        }
    }

    /// Create a partition that does not need persisting
    pub fn unchanged(name: impl Into<String>, start: i64, end: i64) -> Self {
        let mut part = Self::new(name, start, end);
        part.changed = false;
        part
    }

    /// Set the control-table name
    pub fn with_ctl_name(mut self, ctl_name: impl Into<String>) -> Self {
        self.ctl_name = ctl_name.into();
        self
    }

    /// Number of sectors covered
    pub fn sectors(&self) -> i64 {
        self.end - self.start
    }

    /// True if this partition's range intersects `[start, end)`
    pub fn overlaps(&self, start: i64, end: i64) -> bool {
        start < self.end && self.start < end
    }

    /// True if `[start, end)` lies entirely within this partition
    pub fn contains_range(&self, start: i64, end: i64) -> bool {
        self.start <= start && end <= self.end
    }

    /// True if `sector` lies inside this partition
    pub fn contains_sector(&self, sector: i64) -> bool {
        self.start <= sector && sector < self.end
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}..{})", self.name, self.start, self.end)
    }
}

/// Geometry of the disk partition being edited
///
/// `offset` is the absolute sector where the edited region begins; control
/// table records carry absolute sectors, everything else in the editor is
/// disk-local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskGeometry {
    /// Number of sectors in the edited region
    pub sectors: i64,

    /// Absolute sector offset of the edited region
    pub offset: i64,

    /// Control-table name of the partition being edited; its own record is
    /// ignored during reconciliation
    pub partition: String,

    /// True if the device refuses writes
    pub read_only: bool,
}

impl DiskGeometry {
    /// Create a writable geometry with no base offset
    pub fn new(partition: impl Into<String>, sectors: i64) -> Self {
        Self {
            sectors,
            offset: 0,
            partition: partition.into(),
            read_only: false,
        }
    }

    /// Set the absolute sector offset
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Mark the device read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Check a partition name for shape alone; uniqueness is the set's job
pub fn validate_name(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(crate::Error::invalid_name("partition has no name"));
    }
    if name.len() >= MAX_NAME_LEN {
        return Err(crate::Error::invalid_name(format!(
            "name too long: \"{name}\""
        )));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(crate::Error::invalid_name(format!(
            "name contains whitespace: \"{name}\""
        )));
    }
    Ok(())
}
