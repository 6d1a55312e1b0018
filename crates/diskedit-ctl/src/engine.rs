//! Control-table reconciliation
//!
//! One call is a fresh read-diff-apply cycle: read the live control table,
//! work out the smallest set of `delpart`/`part` instructions that aligns
//! it with the editor's partition set, and apply them. An entry is deleted
//! only if its own boundaries actually changed; entries nested inside an
//! unchanged container are protected, so container-style entries with their
//! own sub-tables survive a persist untouched.

use std::fmt;

use diskedit_core::{DiskBackend, Error, Part, Result};
use diskedit_layout::PartitionSet;

use crate::record::{parse_control_table, ControlPartition, MAX_CTL_PARTS};

/// One mutation instruction for the control table; sectors are absolute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CtlInstruction {
    /// Remove the named entry
    Delete {
        /// Control-table name
        ctl_name: String,
    },
    /// Create or confirm an entry; redefining identical data is a no-op
    Define {
        /// Control-table name
        ctl_name: String,
        /// First sector, absolute
        start: i64,
        /// First sector past the entry, absolute
        end: i64,
    },
}

impl fmt::Display for CtlInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CtlInstruction::Delete { ctl_name } => write!(f, "delpart {ctl_name}"),
            CtlInstruction::Define {
                ctl_name,
                start,
                end,
            } => write!(f, "part {ctl_name} {start} {end}"),
        }
    }
}

fn are_equivalent(part: &Part, record: &ControlPartition) -> bool {
    part.ctl_name == record.ctl_name && part.start == record.start && part.end == record.end
}

/// Clear the working flag on every record contained in `[start, end)`
fn unchange(records: &mut [ControlPartition], start: i64, end: i64) {
    for record in records.iter_mut() {
        if start <= record.start && record.end <= end {
            record.changed = false;
        }
    }
}

fn diff(mut records: Vec<ControlPartition>, set: &PartitionSet, offset: i64) -> Result<Vec<CtlInstruction>> {
    // assume every record needs rewriting until a match proves otherwise
    for record in records.iter_mut() {
        record.changed = true;
    }

    // an exact match needs no rewrite, and neither does anything nested
    // inside its range
    for i in 0..records.len() {
        if !set.parts().iter().any(|p| are_equivalent(p, &records[i])) {
            continue;
        }
        let (start, end) = (records[i].start, records[i].end);
        unchange(&mut records, start, end);
        if records[i].changed {
            return Err(Error::internal_consistency(format!(
                "matched entry \"{}\" still marked changed",
                records[i].ctl_name
            )));
        }
    }

    let mut instructions = Vec::new();

    // delete the changed records; anything still wanted is redefined below
    for record in &records {
        if record.changed {
            instructions.push(CtlInstruction::Delete {
                ctl_name: record.ctl_name.clone(),
            });
        }
    }

    // define everything in the set; an identical redefinition is a no-op
    // on the control table
    for part in set.parts() {
        if part.ctl_name.is_empty() {
            continue;
        }
        instructions.push(CtlInstruction::Define {
            ctl_name: part.ctl_name.clone(),
            start: offset + part.start,
            end: offset + part.end,
        });
    }

    Ok(instructions)
}

/// Read the control table's view of the edited window as clean `Part`s
///
/// Useful for seeding an editing session from the live table. The records
/// come back in table order, unvalidated; nested or overlapping entries are
/// the caller's problem.
pub fn read_layout<B: DiskBackend + ?Sized>(backend: &mut B) -> Result<Vec<Part>> {
    let text = backend.read_control_table()?;
    let records = parse_control_table(
        &text,
        backend.partition_offset(),
        backend.sector_count(),
        backend.partition_name(),
        MAX_CTL_PARTS,
    )?;
    Ok(records
        .into_iter()
        .map(|r| Part::unchanged(r.ctl_name, r.start, r.end))
        .collect())
}

/// Compute the instructions a persist would emit, without writing any
pub fn preview<B: DiskBackend + ?Sized>(
    backend: &mut B,
    set: &PartitionSet,
) -> Result<Vec<CtlInstruction>> {
    let text = backend.read_control_table()?;
    let records = parse_control_table(
        &text,
        backend.partition_offset(),
        backend.sector_count(),
        backend.partition_name(),
        MAX_CTL_PARTS,
    )?;
    diff(records, set, backend.partition_offset())
}

/// Reconcile the control table with the set
///
/// Every instruction is attempted even after one fails; a failure is
/// reported only once the full sequence has been tried, so the table is
/// never left silently half-synchronized.
pub fn apply<B: DiskBackend + ?Sized>(backend: &mut B, set: &PartitionSet) -> Result<()> {
    let instructions = preview(backend, set)?;
    let attempted = instructions.len();
    let mut failed = 0;

    for instruction in &instructions {
        if let Err(e) = backend.write_control_instruction(&instruction.to_string()) {
            tracing::warn!("control instruction \"{}\" failed: {}", instruction, e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(Error::WriteFailure { failed, attempted });
    }
    Ok(())
}

/// Persist the set: refuse read-only devices, reconcile, then clear every
/// dirty flag
///
/// On any failure the dirty state is left untouched, so a later quit or
/// retry still sees unwritten changes.
pub fn persist<B: DiskBackend + ?Sized>(backend: &mut B, set: &mut PartitionSet) -> Result<()> {
    if backend.read_only() {
        return Err(Error::ReadOnlyDevice);
    }
    apply(backend, set)?;
    set.mark_clean();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryDisk;
    use diskedit_core::DiskGeometry;

    fn geometry(sectors: i64) -> DiskGeometry {
        DiskGeometry::new("disk", sectors)
    }

    fn set_with(parts: &[(&str, i64, i64)]) -> PartitionSet {
        let mut set = PartitionSet::new();
        for &(name, start, end) in parts {
            set.add(Part::new(name, start, end)).unwrap();
        }
        set
    }

    #[test]
    fn test_split_partition_deletes_once_and_redefines() {
        // one big "data" entry on the table, split into data + swap in the
        // editor: delete the stale entry, then define both halves
        let mut disk = MemoryDisk::new(geometry(10000)).with_record("data", 0, 10000);
        let set = set_with(&[("data", 0, 5000), ("swap", 5000, 10000)]);

        apply(&mut disk, &set).unwrap();

        assert_eq!(
            disk.written(),
            ["delpart data", "part data 0 5000", "part swap 5000 10000"]
        );
    }

    #[test]
    fn test_matching_entry_is_not_deleted() {
        let mut disk = MemoryDisk::new(geometry(10000)).with_record("data", 0, 5000);
        let set = set_with(&[("data", 0, 5000)]);

        let instructions = preview(&mut disk, &set).unwrap();
        assert_eq!(
            instructions,
            [CtlInstruction::Define {
                ctl_name: "data".into(),
                start: 0,
                end: 5000
            }]
        );
    }

    #[test]
    fn test_nested_entries_are_protected() {
        // "b" nests inside "a"; "a" matches the set exactly, so neither is
        // deleted even though the set knows nothing about "b"
        let mut disk = MemoryDisk::new(geometry(10000))
            .with_record("a", 0, 1000)
            .with_record("b", 100, 200);
        let set = set_with(&[("a", 0, 1000)]);

        let instructions = preview(&mut disk, &set).unwrap();
        assert!(!instructions
            .iter()
            .any(|i| matches!(i, CtlInstruction::Delete { .. })));
    }

    #[test]
    fn test_nested_entry_dies_with_changed_container() {
        // the container moved, so both it and its orphaned child go
        let mut disk = MemoryDisk::new(geometry(10000))
            .with_record("a", 0, 1000)
            .with_record("b", 100, 200);
        let set = set_with(&[("a", 0, 2000)]);

        let instructions = preview(&mut disk, &set).unwrap();
        let deletes: Vec<_> = instructions
            .iter()
            .filter(|i| matches!(i, CtlInstruction::Delete { .. }))
            .map(|i| i.to_string())
            .collect();
        assert_eq!(deletes, ["delpart a", "delpart b"]);
    }

    #[test]
    fn test_descriptive_parts_emit_no_define() {
        let mut disk = MemoryDisk::new(geometry(10000));
        let mut set = PartitionSet::new();
        set.add(Part::new("reserved", 0, 100).with_ctl_name("")).unwrap();
        set.add(Part::new("data", 100, 5000)).unwrap();

        apply(&mut disk, &set).unwrap();
        assert_eq!(disk.written(), ["part data 100 5000"]);
    }

    #[test]
    fn test_offset_translation() {
        // window starts at absolute 1000; table coordinates are absolute,
        // the set's are disk-local
        let geometry = DiskGeometry::new("disk", 10000).with_offset(1000);
        let mut disk = MemoryDisk::new(geometry).with_record("data", 1000, 6000);
        let set = set_with(&[("data", 0, 5000), ("swap", 5000, 10000)]);

        apply(&mut disk, &set).unwrap();
        // "data" matched after translation, only "swap" is new
        assert_eq!(disk.written(), ["part data 1000 6000", "part swap 6000 11000"]);
    }

    #[test]
    fn test_reconciliation_is_idempotent() {
        let mut disk = MemoryDisk::new(geometry(10000)).with_record("data", 0, 10000);
        let set = set_with(&[("data", 0, 5000), ("swap", 5000, 10000)]);

        apply(&mut disk, &set).unwrap();

        // second pass over the now-aligned table: no deletes, only
        // matching defines
        let second = preview(&mut disk, &set).unwrap();
        assert!(!second
            .iter()
            .any(|i| matches!(i, CtlInstruction::Delete { .. })));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_write_failure_attempts_everything() {
        let mut disk = MemoryDisk::new(geometry(10000))
            .with_record("stale", 0, 1000)
            .fail_next_writes(1);
        let set = set_with(&[("data", 0, 5000), ("swap", 5000, 10000)]);

        let err = apply(&mut disk, &set).unwrap_err();
        match err {
            Error::WriteFailure { failed, attempted } => {
                assert_eq!(failed, 1);
                assert_eq!(attempted, 3);
            }
            other => panic!("expected WriteFailure, got {other:?}"),
        }
        // the delete was the failed write; both defines still landed
        assert_eq!(disk.written(), ["part data 0 5000", "part swap 5000 10000"]);
    }

    #[test]
    fn test_preview_writes_nothing() {
        let mut disk = MemoryDisk::new(geometry(10000)).with_record("stale", 0, 1000);
        let set = set_with(&[("data", 0, 5000)]);

        preview(&mut disk, &set).unwrap();
        assert!(disk.written().is_empty());
    }

    #[test]
    fn test_corrupt_table_aborts_before_any_write() {
        let mut disk = MemoryDisk::new(geometry(100000));
        for i in 0..(MAX_CTL_PARTS as i64 + 1) {
            disk = disk.with_record(format!("p{i}"), i * 10, i * 10 + 5);
        }
        let set = set_with(&[("data", 0, 5000)]);

        let err = apply(&mut disk, &set).unwrap_err();
        assert!(matches!(err, Error::ControlTableCorrupt(_)));
        assert!(err.is_fatal());
        assert!(disk.written().is_empty());
    }

    #[test]
    fn test_persist_clears_dirty_state() {
        let mut disk = MemoryDisk::new(geometry(10000));
        let mut set = set_with(&[("data", 0, 5000)]);
        assert!(set.changed());

        persist(&mut disk, &mut set).unwrap();
        assert!(!set.changed());
    }

    #[test]
    fn test_failed_persist_preserves_dirty_state() {
        let mut disk = MemoryDisk::new(geometry(10000)).fail_next_writes(1);
        let mut set = set_with(&[("data", 0, 5000)]);

        assert!(persist(&mut disk, &mut set).is_err());
        assert!(set.changed());
    }

    #[test]
    fn test_read_layout_returns_clean_parts() {
        let mut disk = MemoryDisk::new(geometry(10000))
            .with_line("inquiry Maxtor 6Y080L0")
            .with_record("data", 0, 5000);

        let parts = read_layout(&mut disk).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name, "data");
        assert_eq!(parts[0].ctl_name, "data");
        assert_eq!((parts[0].start, parts[0].end), (0, 5000));
        assert!(!parts[0].changed);
    }

    #[test]
    fn test_persist_refuses_read_only_device() {
        let mut disk = MemoryDisk::new(DiskGeometry::new("disk", 10000).read_only());
        let mut set = set_with(&[("data", 0, 5000)]);

        let err = persist(&mut disk, &mut set).unwrap_err();
        assert!(matches!(err, Error::ReadOnlyDevice));
        assert!(set.changed());
        assert!(disk.written().is_empty());
    }
}
