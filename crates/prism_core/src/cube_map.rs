//! Environment cube map sampled by rays that leave the scene.
//!
//! Face selection and the face-local UV mapping come from one fixed table
//! keyed by the dominant axis of the direction and its sign.

use std::sync::Arc;

use prism_math::{Vec2, Vec3};

use crate::texture::TextureMap;

/// One of the six faces, named by the direction a ray travels to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    /// Face hit by a direction: largest |component| wins, ties go x, y, z.
    /// Zero components count as positive.
    pub fn select(direction: Vec3) -> CubeFace {
        let abs = direction.abs();
        let major = abs.max_element();

        if abs.x == major {
            if direction.x >= 0.0 {
                CubeFace::PosX
            } else {
                CubeFace::NegX
            }
        } else if abs.y == major {
            if direction.y >= 0.0 {
                CubeFace::PosY
            } else {
                CubeFace::NegY
            }
        } else if direction.z >= 0.0 {
            CubeFace::PosZ
        } else {
            CubeFace::NegZ
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Table entry for this face.
    pub fn mapping(self) -> FaceMapping {
        FACE_MAPPINGS[self.index()]
    }
}

/// Which direction component feeds a texture axis, and its sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSource {
    /// 0 = x, 1 = y, 2 = z
    pub component: usize,
    pub negate: bool,
}

impl AxisSource {
    const fn new(component: usize, negate: bool) -> Self {
        Self { component, negate }
    }

    fn read(self, direction: Vec3) -> f32 {
        let value = direction[self.component];
        if self.negate {
            -value
        } else {
            value
        }
    }
}

/// Face-local UV mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceMapping {
    pub u: AxisSource,
    pub v: AxisSource,
}

/// Indexed by `CubeFace as usize`.
const FACE_MAPPINGS: [FaceMapping; 6] = [
    // +X
    FaceMapping {
        u: AxisSource::new(2, false),
        v: AxisSource::new(1, false),
    },
    // -X
    FaceMapping {
        u: AxisSource::new(2, true),
        v: AxisSource::new(1, false),
    },
    // +Y
    FaceMapping {
        u: AxisSource::new(0, false),
        v: AxisSource::new(2, false),
    },
    // -Y
    FaceMapping {
        u: AxisSource::new(0, false),
        v: AxisSource::new(2, true),
    },
    // +Z
    FaceMapping {
        u: AxisSource::new(0, true),
        v: AxisSource::new(1, false),
    },
    // -Z
    FaceMapping {
        u: AxisSource::new(0, false),
        v: AxisSource::new(1, false),
    },
];

/// Face and face-local UV for a direction, or `None` for a zero direction.
pub fn face_uv(direction: Vec3) -> Option<(CubeFace, Vec2)> {
    let major = direction.abs().max_element();
    if !(major > 0.0) {
        return None;
    }

    let face = CubeFace::select(direction);
    let mapping = face.mapping();
    let u = (mapping.u.read(direction) / major + 1.0) / 2.0;
    let v = (mapping.v.read(direction) / major + 1.0) / 2.0;
    Some((face, Vec2::new(u, v)))
}

/// Six independently owned texture maps, one per face.
#[derive(Clone, Debug)]
pub struct CubeMap {
    faces: [Arc<TextureMap>; 6],
}

impl CubeMap {
    /// Build from faces in `CubeFace::ALL` order (+x, -x, +y, -y, +z, -z).
    pub fn new(faces: [Arc<TextureMap>; 6]) -> Self {
        Self { faces }
    }

    pub fn face(&self, face: CubeFace) -> &TextureMap {
        &self.faces[face.index()]
    }

    /// Environment color seen along `direction`.
    pub fn sample(&self, direction: Vec3) -> Option<Vec3> {
        let (face, uv) = face_uv(direction)?;
        Some(self.face(face).sample(uv))
    }
}
