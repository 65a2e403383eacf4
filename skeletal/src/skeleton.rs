use glam::Mat4;

use crate::{
    error::SkeletonError,
    joint::{JOINT_SENTINEL, Joint, JointIndex},
    mask::BoneMask,
};

/// A skeletal hierarchy: an ordered arena of [`Joint`]s addressed by index.
///
/// Joints are only ever appended; indices are stable handles for the lifetime
/// of the skeleton. After every mutation the cached world transform of each
/// joint agrees with the derivation in [`Skeleton::world_bone_to_model`]:
///
/// `world(joint) == world(parent) * local(joint)`
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    pub(crate) joints: Vec<Joint>,
}

impl Skeleton {
    pub fn joint_count(&self) -> u32 {
        self.joints.len() as u32
    }

    pub fn joint(&self, index: JointIndex) -> Option<&Joint> {
        self.joints.get(index as usize)
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Index of the most recently added joint, or `None` for an empty
    /// skeleton.
    pub fn last_added_joint_index(&self) -> Option<JointIndex> {
        (self.joint_count() > 0).then(|| self.joint_count() - 1)
    }

    /// Appends a joint with the given world (bone-to-model) rest transform.
    ///
    /// `parent` must be [`JOINT_SENTINEL`] for a root or the index of a joint
    /// that was already added. The new joint's local transform is derived
    /// relative to the parent and the caches of the whole (trivial) subtree
    /// are normalized through the same propagation path used by the mutators.
    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        parent: JointIndex,
        bone_to_model: Mat4,
    ) -> Result<(), SkeletonError> {
        if parent != JOINT_SENTINEL && parent >= self.joint_count() {
            return Err(SkeletonError::InvalidParentIndex {
                parent,
                count: self.joint_count(),
            });
        }

        let index = self.joint_count();
        let mut joint = Joint::new(name.into(), parent, bone_to_model.inverse(), bone_to_model);

        if parent == JOINT_SENTINEL {
            joint.local_bone_to_model = bone_to_model;
        } else {
            let parent_joint = &mut self.joints[parent as usize];
            parent_joint.children.push(index);
            // Provisional: relative to the parent's rest pose. The
            // set_world_bone_to_model call below re-derives it against the
            // parent's current world transform.
            joint.local_bone_to_model = parent_joint.model_to_bone * bone_to_model;
        }

        self.joints.push(joint);
        self.set_world_bone_to_model(bone_to_model, index)
    }

    /// Linear scan for the first joint with the given name. Names are not
    /// required to be unique.
    pub fn find_joint_index(&self, name: &str) -> Option<JointIndex> {
        self.joints
            .iter()
            .position(|joint| joint.name == name)
            .map(|i| i as JointIndex)
    }

    /// Current world transform derived from the local transform chain.
    ///
    /// This is the single source of truth; the cached `bone_to_model` of each
    /// joint is kept equal to it by the mutators. An out-of-range index
    /// yields the identity transform rather than an error, so a missing
    /// parent naturally contributes nothing to the chain.
    pub fn world_bone_to_model(&self, index: JointIndex) -> Mat4 {
        let Some(joint) = self.joints.get(index as usize) else {
            return Mat4::IDENTITY;
        };
        if joint.parent == JOINT_SENTINEL {
            joint.local_bone_to_model
        } else {
            self.world_bone_to_model(joint.parent) * joint.local_bone_to_model
        }
    }

    /// Moves a joint to a new world transform, re-deriving its local
    /// transform and the cached world transform of every descendant.
    /// Descendants keep their local transforms, so the whole subtree follows.
    pub fn set_world_bone_to_model(
        &mut self,
        bone_to_model: Mat4,
        index: JointIndex,
    ) -> Result<(), SkeletonError> {
        let Some(joint) = self.joints.get(index as usize) else {
            return Err(SkeletonError::JointIndexOutOfRange {
                index,
                count: self.joint_count(),
            });
        };

        let local = if joint.parent == JOINT_SENTINEL {
            bone_to_model
        } else {
            self.world_bone_to_model(joint.parent).inverse() * bone_to_model
        };

        let joint = &mut self.joints[index as usize];
        joint.bone_to_model = bone_to_model;
        joint.local_bone_to_model = local;

        self.refresh_descendant_worlds(index);
        Ok(())
    }

    /// Replaces a joint's local transform and re-derives the cached world
    /// transform of the joint and every descendant.
    pub fn set_local_bone_to_model(
        &mut self,
        local_bone_to_model: Mat4,
        index: JointIndex,
    ) -> Result<(), SkeletonError> {
        if index >= self.joint_count() {
            return Err(SkeletonError::JointIndexOutOfRange {
                index,
                count: self.joint_count(),
            });
        }

        self.joints[index as usize].local_bone_to_model = local_bone_to_model;
        self.joints[index as usize].bone_to_model = self.world_bone_to_model(index);

        self.refresh_descendant_worlds(index);
        Ok(())
    }

    /// Re-derives the cached world transform of every transitive descendant
    /// of `index` from its unchanged local transform.
    ///
    /// Explicit worklist rather than recursion, so depth is bounded by heap
    /// only. Every descendant is visited exactly once; order is irrelevant
    /// because each world transform is derived through the ancestor chain
    /// independently.
    fn refresh_descendant_worlds(&mut self, index: JointIndex) {
        let mut worklist = self.joints[index as usize].children.clone();
        let mut cursor = 0;
        while cursor < worklist.len() {
            let current = worklist[cursor];
            cursor += 1;

            self.joints[current as usize].bone_to_model = self.world_bone_to_model(current);

            let children = self.joints[current as usize].children.clone();
            worklist.extend(children);
        }
    }

    /// Mask covering the named joint and its whole subtree with `weight`;
    /// every other joint is 0.0. An unmatched name yields an all-zero mask.
    pub fn bone_mask_for_joint_name(&self, name: &str, weight: f32) -> BoneMask {
        let mut mask = BoneMask::new(self.joints.len());
        if let Some(index) = self.find_joint_index(name) {
            self.mask_subtree(&mut mask, index, weight);
        }
        mask
    }

    /// Multi-name variant of [`Skeleton::bone_mask_for_joint_name`]: each
    /// requested name is resolved independently and its subtree masked into
    /// the same result.
    pub fn bone_mask_for_joint_names(&self, names: &[&str], weight: f32) -> BoneMask {
        let mut mask = BoneMask::new(self.joints.len());
        for name in names {
            if let Some(index) = self.find_joint_index(name) {
                self.mask_subtree(&mut mask, index, weight);
            }
        }
        mask
    }

    fn mask_subtree(&self, mask: &mut BoneMask, index: JointIndex, weight: f32) {
        mask.set(index, weight);

        // Same worklist shape as the transform propagation walk.
        let mut worklist = self.joints[index as usize].children.clone();
        let mut cursor = 0;
        while cursor < worklist.len() {
            let current = worklist[cursor];
            cursor += 1;

            mask.set(current, weight);
            let children = self.joints[current as usize].children.clone();
            worklist.extend(children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    const EPSILON: f32 = 1e-5;

    fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, y, z))
    }

    /// root -> spine -> arm chain with distinct world translations.
    fn chain() -> Skeleton {
        let mut skeleton = Skeleton::default();
        skeleton
            .add_joint("root", JOINT_SENTINEL, translation(1.0, 0.0, 0.0))
            .unwrap();
        skeleton.add_joint("spine", 0, translation(1.0, 2.0, 0.0)).unwrap();
        skeleton.add_joint("arm", 1, translation(1.0, 2.0, 3.0)).unwrap();
        skeleton
    }

    /// chain() plus a sibling subtree under the root.
    fn chain_with_sibling() -> Skeleton {
        let mut skeleton = chain();
        skeleton.add_joint("tail", 0, translation(1.0, -1.0, 0.0)).unwrap();
        skeleton.add_joint("tail_tip", 3, translation(1.0, -2.0, 0.0)).unwrap();
        skeleton
    }

    fn assert_invariant(skeleton: &Skeleton) {
        for (i, joint) in skeleton.joints().iter().enumerate() {
            let index = i as JointIndex;
            let derived = skeleton.world_bone_to_model(index);
            assert!(
                joint.bone_to_model().abs_diff_eq(derived, EPSILON),
                "joint {i}: cached world transform diverged from derivation"
            );

            let expected = if joint.is_root() {
                joint.local_bone_to_model()
            } else {
                skeleton.world_bone_to_model(joint.parent_index()) * joint.local_bone_to_model()
            };
            assert!(
                derived.abs_diff_eq(expected, EPSILON),
                "joint {i}: world != world(parent) * local"
            );
        }
    }

    #[test]
    fn add_joint_builds_hierarchy() {
        let skeleton = chain();

        assert_eq!(skeleton.joint_count(), 3);
        assert_eq!(skeleton.last_added_joint_index(), Some(2));

        assert_eq!(skeleton.joint(2).unwrap().parent_index(), 1);
        assert_eq!(skeleton.joint(0).unwrap().children(), &[1]);
        assert_eq!(skeleton.joint(1).unwrap().children(), &[2]);
        assert!(skeleton.joint(0).unwrap().is_root());

        assert_invariant(&skeleton);
    }

    #[test]
    fn add_joint_derives_local_from_parent() {
        let skeleton = chain();

        let spine = skeleton.joint(1).unwrap();
        assert!(spine
            .local_bone_to_model()
            .abs_diff_eq(translation(0.0, 2.0, 0.0), EPSILON));

        let arm = skeleton.joint(2).unwrap();
        assert!(arm
            .local_bone_to_model()
            .abs_diff_eq(translation(0.0, 0.0, 3.0), EPSILON));
    }

    #[test]
    fn add_joint_rejects_invalid_parent() {
        let mut skeleton = Skeleton::default();
        let result = skeleton.add_joint("root", 0, Mat4::IDENTITY);
        assert!(matches!(
            result,
            Err(SkeletonError::InvalidParentIndex { parent: 0, count: 0 })
        ));
        assert_eq!(skeleton.joint_count(), 0);
    }

    #[test]
    fn invariant_holds_with_rotations() {
        let root = Mat4::from_rotation_translation(
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::new(1.0, 0.0, 0.0),
        );
        let spine = Mat4::from_rotation_translation(
            Quat::from_rotation_x(0.3),
            Vec3::new(1.0, 2.0, 0.0),
        );
        let arm = Mat4::from_rotation_translation(
            Quat::from_rotation_y(-1.1),
            Vec3::new(0.0, 2.0, 3.0),
        );

        let mut skeleton = Skeleton::default();
        skeleton.add_joint("root", JOINT_SENTINEL, root).unwrap();
        skeleton.add_joint("spine", 0, spine).unwrap();
        skeleton.add_joint("arm", 1, arm).unwrap();

        assert_invariant(&skeleton);
        assert!(skeleton.world_bone_to_model(2).abs_diff_eq(arm, EPSILON));
    }

    #[test]
    fn set_world_is_idempotent_on_read_back() {
        let mut skeleton = chain();
        let target = translation(5.0, 6.0, 7.0);

        skeleton.set_world_bone_to_model(target, 1).unwrap();

        assert!(skeleton.world_bone_to_model(1).abs_diff_eq(target, EPSILON));
        assert!(skeleton
            .joint(1)
            .unwrap()
            .bone_to_model()
            .abs_diff_eq(target, EPSILON));
        assert_invariant(&skeleton);
    }

    #[test]
    fn set_world_moves_descendants_and_spares_the_rest() {
        let mut skeleton = chain_with_sibling();
        let root_before = skeleton.world_bone_to_model(0);
        let tail_before = skeleton.world_bone_to_model(3);
        let tail_tip_before = skeleton.world_bone_to_model(4);

        // Move the spine (+4 on x); the arm keeps its local transform.
        skeleton
            .set_world_bone_to_model(translation(5.0, 2.0, 0.0), 1)
            .unwrap();

        assert!(skeleton
            .world_bone_to_model(2)
            .abs_diff_eq(translation(5.0, 2.0, 3.0), EPSILON));

        // Ancestor and the sibling subtree are untouched.
        assert!(skeleton.world_bone_to_model(0).abs_diff_eq(root_before, EPSILON));
        assert!(skeleton.world_bone_to_model(3).abs_diff_eq(tail_before, EPSILON));
        assert!(skeleton
            .world_bone_to_model(4)
            .abs_diff_eq(tail_tip_before, EPSILON));

        assert_invariant(&skeleton);
    }

    #[test]
    fn set_local_updates_world_of_subtree() {
        let mut skeleton = chain();

        skeleton
            .set_local_bone_to_model(translation(0.0, 10.0, 0.0), 1)
            .unwrap();

        assert!(skeleton
            .world_bone_to_model(1)
            .abs_diff_eq(translation(1.0, 10.0, 0.0), EPSILON));
        assert!(skeleton
            .world_bone_to_model(2)
            .abs_diff_eq(translation(1.0, 10.0, 3.0), EPSILON));
        assert_invariant(&skeleton);
    }

    #[test]
    fn set_local_on_root_equals_world() {
        let mut skeleton = chain();
        let target = translation(-3.0, 0.5, 2.0);

        skeleton.set_local_bone_to_model(target, 0).unwrap();

        assert!(skeleton.world_bone_to_model(0).abs_diff_eq(target, EPSILON));
        assert_invariant(&skeleton);
    }

    #[test]
    fn mutators_reject_out_of_range_indices() {
        let mut skeleton = chain();

        assert!(matches!(
            skeleton.set_world_bone_to_model(Mat4::IDENTITY, 3),
            Err(SkeletonError::JointIndexOutOfRange { index: 3, count: 3 })
        ));
        assert!(matches!(
            skeleton.set_local_bone_to_model(Mat4::IDENTITY, JOINT_SENTINEL),
            Err(SkeletonError::JointIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn world_transform_of_invalid_index_is_identity() {
        let skeleton = chain();

        assert_eq!(skeleton.world_bone_to_model(3), Mat4::IDENTITY);
        assert_eq!(skeleton.world_bone_to_model(JOINT_SENTINEL), Mat4::IDENTITY);
        assert_eq!(Skeleton::default().world_bone_to_model(0), Mat4::IDENTITY);
    }

    #[test]
    fn find_joint_index_first_match_or_none() {
        let skeleton = chain();

        assert_eq!(skeleton.find_joint_index("spine"), Some(1));
        assert_eq!(skeleton.find_joint_index("missing"), None);
    }

    #[test]
    fn mask_covers_named_subtree_only() {
        let skeleton = chain_with_sibling();

        let mask = skeleton.bone_mask_for_joint_name("spine", 1.0);
        assert_eq!(mask.weights(), &[0.0, 1.0, 1.0, 0.0, 0.0]);

        let mask = skeleton.bone_mask_for_joint_name("root", 0.5);
        assert_eq!(mask.weights(), &[0.5, 0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn mask_for_unmatched_name_is_all_zero() {
        let skeleton = chain();

        let mask = skeleton.bone_mask_for_joint_name("missing", 1.0);
        assert_eq!(mask.len(), 3);
        assert!(mask.weights().iter().all(|w| *w == 0.0));
    }

    #[test]
    fn mask_for_names_resolves_each_independently() {
        let skeleton = chain_with_sibling();

        // Order of the requested names is unrelated to joint order.
        let mask = skeleton.bone_mask_for_joint_names(&["tail", "arm"], 1.0);
        assert_eq!(mask.weights(), &[0.0, 0.0, 1.0, 1.0, 1.0]);

        let mask = skeleton.bone_mask_for_joint_names(&["missing"], 1.0);
        assert!(mask.weights().iter().all(|w| *w == 0.0));
    }
}
