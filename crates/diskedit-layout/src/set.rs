//! The editor's working partition set
//!
//! A `PartitionSet` owns the partitions the operator has laid out so far.
//! Members are kept sorted ascending by start sector and pairwise disjoint;
//! every mutation either upholds both invariants or fails without touching
//! the set.

use diskedit_core::{validate_name, Error, Part, Result};
use serde::Serialize;

/// Ordered, overlap-free collection of partitions with a cursor and a
/// dirty flag
///
/// # Example
///
/// ```
/// use diskedit_core::Part;
/// use diskedit_layout::PartitionSet;
///
/// let mut set = PartitionSet::new();
/// set.add(Part::new("boot", 0, 2048)).unwrap();
/// set.add(Part::new("data", 2048, 10000)).unwrap();
/// assert!(set.find("boot").is_some());
/// assert!(set.changed());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PartitionSet {
    parts: Vec<Part>,
    dot: i64,
    changed: bool,
    capacity: Option<usize>,
}

/// One row of the whole-disk summary: either a partition or the free gap
/// between partitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extent<'a> {
    /// The partition covering this range, or `None` for free space
    pub part: Option<&'a Part>,
    /// First sector of the range
    pub start: i64,
    /// First sector past the range
    pub end: i64,
}

impl PartitionSet {
    /// Create an unbounded set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set refusing to grow past `capacity` members
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Members, sorted ascending by start sector
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// True if the set has no members
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The cursor sector (dot)
    pub fn dot(&self) -> i64 {
        self.dot
    }

    /// Move the cursor
    pub fn set_dot(&mut self, dot: i64) {
        self.dot = dot;
    }

    /// True if anything needs persisting: a dirty member or a topology
    /// mutation since the last successful persist
    pub fn changed(&self) -> bool {
        self.changed || self.parts.iter().any(|p| p.changed)
    }

    /// Clear every member's dirty bit and the set's own flag together;
    /// called once a persist has fully succeeded
    pub fn mark_clean(&mut self) {
        for part in &mut self.parts {
            part.changed = false;
        }
        self.changed = false;
    }

    /// Find a member by name
    pub fn find(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Insert a partition, preserving sort order
    ///
    /// Fails with `InvalidName`, `DuplicateName`, `Overlap` (naming the
    /// conflicting member), or `CapacityExceeded`. Failure leaves the set
    /// untouched.
    pub fn add(&mut self, part: Part) -> Result<()> {
        validate_name(&part.name)?;

        if self.find(&part.name).is_some() {
            return Err(Error::DuplicateName(part.name));
        }

        if let Some(other) = self.parts.iter().find(|q| q.overlaps(part.start, part.end)) {
            return Err(Error::Overlap {
                name: part.name,
                other: other.name.clone(),
            });
        }

        if let Some(capacity) = self.capacity {
            if self.parts.len() >= capacity {
                return Err(Error::CapacityExceeded);
            }
        }

        if part.changed {
            self.changed = true;
        }
        let at = self.parts.partition_point(|q| q.start < part.start);
        self.parts.insert(at, part);
        Ok(())
    }

    /// Remove a member by name and return it
    ///
    /// A missing name is a caller bug, reported as `NotFound` rather than a
    /// panic. Removal always dirties the set: the topology changed even if
    /// the removed partition itself was clean.
    pub fn remove(&mut self, name: &str) -> Result<Part> {
        let at = self
            .parts
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| Error::not_found(name))?;

        let part = self.parts.remove(at);
        self.changed = true;
        Ok(part)
    }

    /// Walk the whole disk `[0, sectors)` as alternating free and partition
    /// ranges; every uncovered gap is reported explicitly
    pub fn summary(&self, sectors: i64) -> Vec<Extent<'_>> {
        let mut rows = Vec::new();
        let mut last_end = 0;

        for part in &self.parts {
            if last_end < part.start {
                rows.push(Extent {
                    part: None,
                    start: last_end,
                    end: part.start,
                });
            }
            rows.push(Extent {
                part: Some(part),
                start: part.start,
                end: part.end,
            });
            last_end = part.end;
        }

        if last_end < sectors {
            rows.push(Extent {
                part: None,
                start: last_end,
                end: sectors,
            });
        }

        rows
    }
}
