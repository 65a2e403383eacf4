//! A skeletal hierarchy for character animation: named joints with rest-pose
//! transforms, parent/child relations and cached local/world matrices that
//! stay consistent under edits, plus a binary file format and debug
//! visualization mesh building.

mod binary;
mod error;
mod joint;
mod mask;
mod mesh;
mod skeleton;

pub use binary::{FILE_VERSION, MAX_JOINT_NAME_LEN};
pub use error::SkeletonError;
pub use joint::{JOINT_SENTINEL, Joint, JointIndex};
pub use mask::BoneMask;
pub use mesh::{DebugMeshes, Mesh, Vertex, build_bone_mesh, build_joint_mesh};
pub use skeleton::Skeleton;
