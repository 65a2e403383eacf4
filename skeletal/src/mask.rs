use crate::joint::JointIndex;

/// Per-joint scalar weights used to scope an operation (e.g. animation
/// blending) to a subtree of the hierarchy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoneMask {
    weights: Vec<f32>,
}

impl BoneMask {
    /// An all-zero mask with one weight per joint.
    pub fn new(joint_count: usize) -> Self {
        Self {
            weights: vec![0.0; joint_count],
        }
    }

    pub fn set_all(&mut self, weight: f32) {
        self.weights.fill(weight);
    }

    pub fn set(&mut self, index: JointIndex, weight: f32) {
        if let Some(w) = self.weights.get_mut(index as usize) {
            *w = weight;
        }
    }

    /// Weight for a joint. Out-of-range indices read as unmasked (0.0).
    pub fn weight(&self, index: JointIndex) -> f32 {
        self.weights.get(index as usize).copied().unwrap_or(0.0)
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
