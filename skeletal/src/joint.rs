use glam::Mat4;

pub type JointIndex = u32;

/// Parent index of a root joint. Serialized as `-1`.
pub const JOINT_SENTINEL: JointIndex = JointIndex::MAX;

/// A single node of the skeletal hierarchy.
///
/// Joints are value types owned by a [`Skeleton`](crate::Skeleton) and
/// addressed by their array index, which never changes once assigned.
#[derive(Clone, Debug)]
pub struct Joint {
    pub(crate) name: String,
    pub(crate) parent: JointIndex,
    pub(crate) children: Vec<JointIndex>,

    /// Inverse of the rest-pose world transform. Fixed at construction.
    pub(crate) model_to_bone: Mat4,
    /// Current world transform. Cached; kept in sync by the owning skeleton.
    pub(crate) bone_to_model: Mat4,
    /// Transform relative to the parent's world transform. Equal to
    /// `bone_to_model` for roots.
    pub(crate) local_bone_to_model: Mat4,
}

impl Joint {
    pub(crate) fn new(
        name: String,
        parent: JointIndex,
        model_to_bone: Mat4,
        bone_to_model: Mat4,
    ) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            model_to_bone,
            bone_to_model,
            // The local transform depends on the parent chain, so the owning
            // skeleton fills it in.
            local_bone_to_model: Mat4::IDENTITY,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the parent joint, or [`JOINT_SENTINEL`] for a root.
    pub fn parent_index(&self) -> JointIndex {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent == JOINT_SENTINEL
    }

    /// Child indices in insertion order.
    pub fn children(&self) -> &[JointIndex] {
        &self.children
    }

    /// Inverse of the rest-pose world transform.
    pub fn model_to_bone(&self) -> Mat4 {
        self.model_to_bone
    }

    /// Cached current world transform.
    pub fn bone_to_model(&self) -> Mat4 {
        self.bone_to_model
    }

    /// Current transform relative to the parent's world transform.
    pub fn local_bone_to_model(&self) -> Mat4 {
        self.local_bone_to_model
    }
}
