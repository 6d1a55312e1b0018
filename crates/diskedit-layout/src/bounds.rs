//! Bounds resolution for interactive partition creation
//!
//! The operator supplies the start and end of a new partition as sector
//! expressions. The start must land in free space; the end is boxed by the
//! nearest existing partition to the right (`max_end`), not by the disk end,
//! so a new partition can never swallow a neighbor.

use crate::PartitionSet;
use diskedit_core::{Error, Result, SectorEvaluator};

/// Resolve a start expression against the cursor and disk bounds
///
/// The result must lie in `[0, sectors)` and outside every existing
/// partition; a collision reports `StartInUse` with the occupying
/// partition's name.
pub fn resolve_start(
    set: &PartitionSet,
    evaluator: &dyn SectorEvaluator,
    text: &str,
    sectors: i64,
) -> Result<i64> {
    let start = evaluator.evaluate(text, set.dot(), sectors, sectors)?;

    if start < 0 || start >= sectors {
        return Err(Error::out_of_range(format!("start sector {start}")));
    }

    if let Some(part) = set.parts().iter().find(|p| p.contains_sector(start)) {
        return Err(Error::StartInUse(part.name.clone()));
    }

    Ok(start)
}

/// Largest permitted end for a partition starting at `start`: the disk end,
/// or the start of the nearest partition to the right of `start`
pub fn max_end(set: &PartitionSet, start: i64, sectors: i64) -> i64 {
    set.parts()
        .iter()
        .map(|p| p.start)
        .filter(|&s| s > start)
        .fold(sectors, i64::min)
}

/// Resolve an end expression for a partition starting at `start`
///
/// The expression resolves with `max_end` as the relative bound, so `$`
/// names the top of the available gap. `end == start` is a zero-size
/// partition; `end` past `max_end` (or below `start`) is out of range.
/// `end == max_end` is allowed: the gap's upper boundary is inclusive.
pub fn resolve_end(
    set: &PartitionSet,
    evaluator: &dyn SectorEvaluator,
    text: &str,
    start: i64,
    max_end: i64,
    sectors: i64,
) -> Result<i64> {
    let end = evaluator.evaluate(text, set.dot(), max_end, sectors)?;

    if start == end {
        return Err(Error::ZeroSizePartition);
    }

    if end < start || end > max_end {
        return Err(Error::out_of_range(format!("end sector {end}")));
    }

    Ok(end)
}
