//! Core traits for partition editing

use crate::error::Result;

/// Access to the disk being edited and its live control table
///
/// The control table is line-oriented text owned by an external system (a
/// running kernel's view of the disk). Reads return the whole table;
/// instruction writes apply immediately, one line at a time.
pub trait DiskBackend {
    /// Number of sectors in the edited region
    fn sector_count(&self) -> i64;

    /// Absolute sector offset of the edited region; control-table records
    /// use absolute sectors
    fn partition_offset(&self) -> i64;

    /// Control-table name of the partition being edited; its own record
    /// does not take part in reconciliation
    fn partition_name(&self) -> &str;

    /// True if the device refuses writes
    fn read_only(&self) -> bool;

    /// Read the current control table text
    fn read_control_table(&mut self) -> Result<String>;

    /// Apply one control instruction line
    fn write_control_instruction(&mut self, line: &str) -> Result<()>;
}

/// Resolves operator-supplied sector expressions
///
/// `cursor` is the remembered position (dot), `relative_bound` the value the
/// end-of-region token resolves to, and `absolute_bound` the largest sector
/// value the result may take.
pub trait SectorEvaluator {
    /// Evaluate `text` to a sector value in `[0, absolute_bound]`
    fn evaluate(
        &self,
        text: &str,
        cursor: i64,
        relative_bound: i64,
        absolute_bound: i64,
    ) -> Result<i64>;
}
