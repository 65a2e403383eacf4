//! CPU-side debug visualization meshes for a skeleton.
//!
//! The core only produces vertex/index data; uploading it to a GPU and
//! choosing a pipeline is the renderer's business.

use glam::Vec3;

use crate::skeleton::Skeleton;

#[derive(Clone, Copy, Debug, bytemuck::NoUninit)]
#[repr(C)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Vertex {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            normal: Vec3::ZERO,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Lazily built joint/bone meshes for one skeleton.
///
/// Each mesh is built on first request and then cached. Mutating the skeleton
/// afterwards leaves the cache stale; call [`DebugMeshes::invalidate`] to
/// force a rebuild on the next request.
#[derive(Clone, Debug, Default)]
pub struct DebugMeshes {
    joints: Option<Mesh>,
    bones: Option<Mesh>,
}

impl DebugMeshes {
    /// Triangle mesh with one unit icosahedron per joint, centered on the
    /// joint's world translation.
    pub fn joints(&mut self, skeleton: &Skeleton) -> &Mesh {
        self.joints.get_or_insert_with(|| build_joint_mesh(skeleton))
    }

    /// Line-list mesh with one segment from each parented joint to its
    /// parent. Index pairs address line endpoints.
    pub fn bones(&mut self, skeleton: &Skeleton) -> &Mesh {
        self.bones.get_or_insert_with(|| build_bone_mesh(skeleton))
    }

    pub fn invalidate(&mut self) {
        self.joints = None;
        self.bones = None;
    }
}

pub fn build_joint_mesh(skeleton: &Skeleton) -> Mesh {
    let mut mesh = Mesh::default();
    for i in 0..skeleton.joint_count() {
        let center = skeleton.world_bone_to_model(i).w_axis.truncate();
        append_icosahedron(&mut mesh, 1.0, center);
    }
    mesh
}

pub fn build_bone_mesh(skeleton: &Skeleton) -> Mesh {
    let mut mesh = Mesh::default();
    for (i, joint) in skeleton.joints().iter().enumerate() {
        if joint.is_root() {
            continue;
        }
        let start = skeleton.world_bone_to_model(i as u32).w_axis.truncate();
        let end = skeleton
            .world_bone_to_model(joint.parent_index())
            .w_axis
            .truncate();

        let base = mesh.vertices.len() as u32;
        mesh.vertices.push(Vertex::from_position(start));
        mesh.vertices.push(Vertex::from_position(end));
        mesh.indices.extend([base, base + 1]);
    }
    mesh
}

// Icosahedron corner layout: (0, ±1, ±t), (±1, ±t, 0), (±t, 0, ±1) with
// t = (1 + sqrt 5) / 2, normalized onto the sphere.
const CORNERS: [[f32; 3]; 12] = {
    const T: f32 = 1.618_034;
    [
        [-1.0, T, 0.0],
        [1.0, T, 0.0],
        [-1.0, -T, 0.0],
        [1.0, -T, 0.0],
        [0.0, -1.0, T],
        [0.0, 1.0, T],
        [0.0, -1.0, -T],
        [0.0, 1.0, -T],
        [T, 0.0, -1.0],
        [T, 0.0, 1.0],
        [-T, 0.0, -1.0],
        [-T, 0.0, 1.0],
    ]
};

const FACES: [[u32; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn append_icosahedron(mesh: &mut Mesh, radius: f32, center: Vec3) {
    let base = mesh.vertices.len() as u32;
    for corner in CORNERS {
        let normal = Vec3::from_array(corner).normalize();
        mesh.vertices.push(Vertex {
            position: center + normal * radius,
            normal,
        });
    }
    for face in FACES {
        mesh.indices.extend(face.map(|i| base + i));
    }
}
