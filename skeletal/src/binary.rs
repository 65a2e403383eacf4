//! Binary skeleton file format.
//!
//! Little-endian, fixed field order:
//!
//! ```text
//! u32              file version (= 1)
//! u32              joint count
//! count x          NUL-terminated joint name
//! count x i32      parent index (-1 for roots)
//! count x 16 f32   bone-to-model matrix, column-major
//! ```
//!
//! Only the name, parent index and world transform of each joint are stored.
//! The child lists, the rest-pose inverses and the local transforms are all
//! re-derived on load.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use glam::Mat4;
use tracing::info;

use crate::{
    error::SkeletonError,
    joint::{JOINT_SENTINEL, JointIndex},
    skeleton::Skeleton,
};

pub const FILE_VERSION: u32 = 1;

/// Maximum stored length of a joint name in bytes, excluding the terminator.
pub const MAX_JOINT_NAME_LEN: usize = 64;

fn write_name(w: &mut impl Write, name: &str) -> Result<(), SkeletonError> {
    if name.len() > MAX_JOINT_NAME_LEN || name.bytes().any(|b| b == 0) {
        return Err(SkeletonError::InvalidName(name.to_string()));
    }
    w.write_all(name.as_bytes())?;
    w.write_u8(0)?;
    Ok(())
}

fn read_name(r: &mut impl Read) -> Result<String, SkeletonError> {
    let mut bytes = Vec::new();
    loop {
        let ch = r.read_u8()?;
        if ch == 0 {
            break;
        }
        if bytes.len() == MAX_JOINT_NAME_LEN {
            bytes.truncate(16); // enough to identify the culprit
            return Err(SkeletonError::InvalidName(
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }
        bytes.push(ch);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl Skeleton {
    pub fn write_to(&self, w: &mut impl Write) -> Result<(), SkeletonError> {
        w.write_u32::<LE>(FILE_VERSION)?;
        w.write_u32::<LE>(self.joint_count())?;

        for joint in &self.joints {
            write_name(w, &joint.name)?;
        }
        for joint in &self.joints {
            let parent = if joint.parent == JOINT_SENTINEL {
                -1
            } else {
                joint.parent as i32
            };
            w.write_i32::<LE>(parent)?;
        }
        for joint in &self.joints {
            for value in joint.bone_to_model.to_cols_array() {
                w.write_f32::<LE>(value)?;
            }
        }

        Ok(())
    }

    /// Reads a skeleton from a stream into a fresh instance.
    ///
    /// A version mismatch or malformed hierarchy fails the whole read; no
    /// partially populated skeleton is ever returned. Parent indices must
    /// refer to earlier joints, which also rules out cycles.
    pub fn read_from(r: &mut impl Read) -> Result<Self, SkeletonError> {
        let version = r.read_u32::<LE>()?;
        if version != FILE_VERSION {
            return Err(SkeletonError::UnsupportedVersion {
                found: version,
                expected: FILE_VERSION,
            });
        }

        let count = r.read_u32::<LE>()?;

        let mut names = Vec::with_capacity(count as usize);
        for _ in 0..count {
            names.push(read_name(r)?);
        }

        let mut parents = Vec::with_capacity(count as usize);
        for _ in 0..count {
            parents.push(r.read_i32::<LE>()?);
        }

        let mut skeleton = Skeleton::default();
        for (index, (name, raw_parent)) in names.into_iter().zip(parents).enumerate() {
            let mut values = [0.0f32; 16];
            for value in values.iter_mut() {
                *value = r.read_f32::<LE>()?;
            }
            let bone_to_model = Mat4::from_cols_array(&values);

            let parent = match raw_parent {
                -1 => JOINT_SENTINEL,
                p if p >= 0 && (p as usize) < index => p as JointIndex,
                p => {
                    return Err(SkeletonError::MalformedHierarchy {
                        index: index as u32,
                        parent: p,
                    });
                }
            };

            skeleton.add_joint(name, parent, bone_to_model)?;
        }

        Ok(skeleton)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SkeletonError> {
        let mut w = BufWriter::new(File::create(path.as_ref())?);
        self.write_to(&mut w)?;
        w.flush()?;
        info!(
            "Saved skeleton ({} joints) to {}",
            self.joint_count(),
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, SkeletonError> {
        let mut r = BufReader::new(File::open(path.as_ref())?);
        let skeleton = Self::read_from(&mut r)?;
        info!(
            "Loaded skeleton ({} joints) from {}",
            skeleton.joint_count(),
            path.as_ref().display()
        );
        Ok(skeleton)
    }
}
