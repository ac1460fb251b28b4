//! Single-triangle geometry awaiting clustering

use crate::foundation::math::{Vec2, Vec3};

/// One triangle's vertex positions and UV coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceFragment {
    verts: [Vec3; 3],
    uvs: [Vec2; 3],
}

impl FaceFragment {
    /// Create a fragment; `uvs[i]` belongs to `verts[i]`
    pub fn new(verts: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        Self { verts, uvs }
    }

    /// Vertex positions in winding order
    pub fn verts(&self) -> &[Vec3; 3] {
        &self.verts
    }

    /// UV coordinates matching [`verts`](Self::verts)
    pub fn uvs(&self) -> &[Vec2; 3] {
        &self.uvs
    }

    /// Centroid of the three vertices
    pub fn vertex_center(&self) -> Vec3 {
        (self.verts[0] + self.verts[1] + self.verts[2]) / 3.0
    }

    /// Centroid of the three UV coordinates
    pub fn uv_center(&self) -> Vec2 {
        (self.uvs[0] + self.uvs[1] + self.uvs[2]) / 3.0
    }
}
