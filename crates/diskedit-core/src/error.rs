//! Editor error types

use thiserror::Error;

/// The main error type for partition editing operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error talking to the control table or device
    #[error("Control I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Partition name is empty or too long
    #[error("Invalid partition name: {0}")]
    InvalidName(String),

    /// Partition name already present in the set
    #[error("Already have partition with name \"{0}\"")]
    DuplicateName(String),

    /// Candidate range intersects an existing partition
    #[error("\"{name}\" overlaps with \"{other}\"")]
    Overlap {
        /// Name of the partition being added
        name: String,
        /// Name of the existing partition it collides with
        other: String,
    },

    /// The set's configured partition limit is reached
    #[error("Too many partitions")]
    CapacityExceeded,

    /// Sector value outside the allowed window
    #[error("Sector value out of range: {0}")]
    OutOfRange(String),

    /// Partition start and end are equal
    #[error("Size zero partition")]
    ZeroSizePartition,

    /// Candidate start sector falls inside an existing partition
    #[error("Start sector in partition \"{0}\"")]
    StartInUse(String),

    /// No partition with the requested name
    #[error("No such partition: {0}")]
    NotFound(String),

    /// Mutation attempted on a read-only device
    #[error("Read only device")]
    ReadOnlyDevice,

    /// The control table cannot be trusted (fatal for the operation)
    #[error("Control table corrupt: {0}")]
    ControlTableCorrupt(String),

    /// A reconciliation self-check failed (fatal for the operation)
    #[error("Internal consistency violation: {0}")]
    InternalConsistency(String),

    /// One or more control instructions failed to apply
    #[error("Failed to write {failed} of {attempted} control instructions")]
    WriteFailure {
        /// Instructions that could not be written
        failed: usize,
        /// Instructions attempted in total
        attempted: usize,
    },

    /// Sector expression could not be parsed
    #[error("Bad expression: {0}")]
    InvalidExpression(String),
}

/// Result type alias for partition editing operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid name error
    pub fn invalid_name(msg: impl Into<String>) -> Self {
        Error::InvalidName(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create an out of range error
    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Error::OutOfRange(msg.into())
    }

    /// Create a control table corrupt error
    pub fn control_table_corrupt(msg: impl Into<String>) -> Self {
        Error::ControlTableCorrupt(msg.into())
    }

    /// Create an internal consistency error
    pub fn internal_consistency(msg: impl Into<String>) -> Self {
        Error::InternalConsistency(msg.into())
    }

    /// Create a bad expression error
    pub fn invalid_expression(msg: impl Into<String>) -> Self {
        Error::InvalidExpression(msg.into())
    }

    /// True for error kinds that must abort the current operation
    /// rather than be retried or ignored
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ControlTableCorrupt(_) | Error::InternalConsistency(_)
        )
    }
}
