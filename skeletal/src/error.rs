use crate::joint::JointIndex;

/// Errors reported by skeleton mutation and file I/O.
///
/// Lookups that simply miss (an unknown joint name, a mask request for a name
/// that is not in the hierarchy) are not errors; they return `None` or an
/// all-zero mask.
#[derive(Debug, thiserror::Error)]
pub enum SkeletonError {
    #[error("invalid parent index {parent} (joint count {count})")]
    InvalidParentIndex { parent: JointIndex, count: u32 },

    #[error("joint index {index} out of range (joint count {count})")]
    JointIndexOutOfRange { index: JointIndex, count: u32 },

    #[error("unsupported skeleton file version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("joint {index} references parent {parent}, which is not an earlier joint")]
    MalformedHierarchy { index: u32, parent: i32 },

    #[error("joint name {0:?} cannot be stored (too long or contains NUL)")]
    InvalidName(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}
