//! Disk backends
//!
//! `CtlFile` talks to a real control-table file; `MemoryDisk` models one in
//! memory for tests and embedding, interpreting the instructions it receives
//! the way the live table does.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use diskedit_core::{DiskBackend, DiskGeometry, Error, Result};

/// A control table backed by a file on disk
///
/// Reads return the whole file; each instruction is appended as one line
/// and flushed immediately, mirroring how the live table consumes writes.
///
/// # Example
///
/// ```rust,no_run
/// use diskedit_core::{DiskBackend, DiskGeometry};
/// use diskedit_ctl::CtlFile;
///
/// let geometry = DiskGeometry::new("disk", 160_086_528);
/// let mut backend = CtlFile::open("/dev/sdC0/ctl", geometry).unwrap();
/// let table = backend.read_control_table().unwrap();
/// ```
pub struct CtlFile {
    path: PathBuf,
    geometry: DiskGeometry,
}

impl CtlFile {
    /// Open a control-table file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened for reading
    pub fn open(path: impl Into<PathBuf>, geometry: DiskGeometry) -> Result<Self> {
        let path = path.into();
        File::open(&path)?;
        Ok(Self { path, geometry })
    }

    /// Path of the control-table file
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl DiskBackend for CtlFile {
    fn sector_count(&self) -> i64 {
        self.geometry.sectors
    }

    fn partition_offset(&self) -> i64 {
        self.geometry.offset
    }

    fn partition_name(&self) -> &str {
        &self.geometry.partition
    }

    fn read_only(&self) -> bool {
        self.geometry.read_only
    }

    fn read_control_table(&mut self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.path)?)
    }

    fn write_control_instruction(&mut self, line: &str) -> Result<()> {
        if self.geometry.read_only {
            return Err(Error::ReadOnlyDevice);
        }
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{line}")?;
        file.flush()?;
        Ok(())
    }
}

/// An in-memory control table
///
/// Written instructions are interpreted the way the live table interprets
/// them: `delpart` removes an entry, `part` creates one, and redefining an
/// entry with identical data is a no-op. Every successfully applied
/// instruction is also kept in an ordered log for inspection, and write
/// failures can be injected to exercise error paths.
#[derive(Debug, Clone)]
pub struct MemoryDisk {
    geometry: DiskGeometry,
    /// Lines the kernel reports that are not partition records
    preamble: Vec<String>,
    /// Partition records, absolute sectors
    records: Vec<(String, i64, i64)>,
    written: Vec<String>,
    fail_next: usize,
}

impl MemoryDisk {
    /// Create an empty in-memory table
    pub fn new(geometry: DiskGeometry) -> Self {
        Self {
            geometry,
            preamble: Vec::new(),
            records: Vec::new(),
            written: Vec::new(),
            fail_next: 0,
        }
    }

    /// Seed a partition record (absolute sectors)
    pub fn with_record(mut self, ctl_name: impl Into<String>, start: i64, end: i64) -> Self {
        self.records.push((ctl_name.into(), start, end));
        self
    }

    /// Seed a non-partition line preceding the records
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.preamble.push(line.into());
        self
    }

    /// Make the next `n` instruction writes fail
    pub fn fail_next_writes(mut self, n: usize) -> Self {
        self.fail_next = n;
        self
    }

    /// Instructions applied so far, in order
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// Current partition records (absolute sectors)
    pub fn records(&self) -> &[(String, i64, i64)] {
        &self.records
    }

    fn interpret(&mut self, line: &str) -> Result<()> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["delpart", name] => {
                self.records.retain(|(n, _, _)| n != name);
                Ok(())
            }
            ["part", name, start, end] => {
                let start: i64 = start
                    .parse()
                    .map_err(|_| Error::Io(std::io::Error::other("bad part instruction")))?;
                let end: i64 = end
                    .parse()
                    .map_err(|_| Error::Io(std::io::Error::other("bad part instruction")))?;
                match self.records.iter_mut().find(|(n, _, _)| n == name) {
                    Some(record) => {
                        // identical redefinition is a no-op
                        record.1 = start;
                        record.2 = end;
                    }
                    None => self.records.push((name.to_string(), start, end)),
                }
                Ok(())
            }
            _ => Err(Error::Io(std::io::Error::other(format!(
                "unrecognized control instruction: {line}"
            )))),
        }
    }
}

impl DiskBackend for MemoryDisk {
    fn sector_count(&self) -> i64 {
        self.geometry.sectors
    }

    fn partition_offset(&self) -> i64 {
        self.geometry.offset
    }

    fn partition_name(&self) -> &str {
        &self.geometry.partition
    }

    fn read_only(&self) -> bool {
        self.geometry.read_only
    }

    fn read_control_table(&mut self) -> Result<String> {
        let mut text = String::new();
        for line in &self.preamble {
            text.push_str(line);
            text.push('\n');
        }
        for (name, start, end) in &self.records {
            text.push_str(&format!("part {name} {start} {end}\n"));
        }
        Ok(text)
    }

    fn write_control_instruction(&mut self, line: &str) -> Result<()> {
        if self.geometry.read_only {
            return Err(Error::ReadOnlyDevice);
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(Error::Io(std::io::Error::other(
                "injected control write failure",
            )));
        }
        self.interpret(line)?;
        self.written.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn geometry() -> DiskGeometry {
        DiskGeometry::new("disk", 10000)
    }

    #[test]
    fn test_ctl_file_round_trip() {
        let mut tmpfile = NamedTempFile::new().unwrap();
        writeln!(tmpfile, "part data 0 5000").unwrap();
        tmpfile.flush().unwrap();

        let mut backend = CtlFile::open(tmpfile.path(), geometry()).unwrap();
        assert_eq!(backend.read_control_table().unwrap(), "part data 0 5000\n");

        backend.write_control_instruction("delpart data").unwrap();
        backend.write_control_instruction("part swap 5000 10000").unwrap();

        assert_eq!(
            backend.read_control_table().unwrap(),
            "part data 0 5000\ndelpart data\npart swap 5000 10000\n"
        );
    }

    #[test]
    fn test_ctl_file_open_missing() {
        assert!(CtlFile::open("/nonexistent/ctl", geometry()).is_err());
    }

    #[test]
    fn test_ctl_file_read_only_refuses_writes() {
        let tmpfile = NamedTempFile::new().unwrap();
        let mut backend =
            CtlFile::open(tmpfile.path(), DiskGeometry::new("disk", 10000).read_only()).unwrap();

        let err = backend.write_control_instruction("delpart data").unwrap_err();
        assert!(matches!(err, Error::ReadOnlyDevice));
    }

    #[test]
    fn test_memory_disk_interprets_instructions() {
        let mut disk = MemoryDisk::new(geometry()).with_record("data", 0, 10000);

        disk.write_control_instruction("delpart data").unwrap();
        disk.write_control_instruction("part data 0 5000").unwrap();
        disk.write_control_instruction("part swap 5000 10000").unwrap();

        assert_eq!(
            disk.read_control_table().unwrap(),
            "part data 0 5000\npart swap 5000 10000\n"
        );
    }

    #[test]
    fn test_memory_disk_identical_redefine_is_noop() {
        let mut disk = MemoryDisk::new(geometry()).with_record("data", 0, 5000);
        disk.write_control_instruction("part data 0 5000").unwrap();
        assert_eq!(disk.records(), [("data".to_string(), 0, 5000)]);
    }

    #[test]
    fn test_memory_disk_preamble_survives() {
        let mut disk = MemoryDisk::new(geometry())
            .with_line("inquiry Maxtor 6Y080L0")
            .with_record("data", 0, 5000);
        assert_eq!(
            disk.read_control_table().unwrap(),
            "inquiry Maxtor 6Y080L0\npart data 0 5000\n"
        );
    }

    #[test]
    fn test_memory_disk_injected_failures_expire() {
        let mut disk = MemoryDisk::new(geometry()).fail_next_writes(1);
        assert!(disk.write_control_instruction("part a 0 10").is_err());
        assert!(disk.write_control_instruction("part a 0 10").is_ok());
        assert_eq!(disk.written().len(), 1);
    }
}
