//! Merging triangle fragments into shared buffers
//!
//! A [`FaceCluster`] collects [`FaceFragment`]s, merges them once into flat
//! vertex/UV/index buffers, and then offers in-place UV and world transforms
//! for laying the cluster out in a texture atlas.
//!
//! # Usage
//!
//! ```rust
//! use uniprep::foundation::math::{Vec2, Vec3};
//! use uniprep::mesh::{FaceCluster, FaceFragment};
//!
//! let fragment = FaceFragment::new(
//!     [Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
//!     [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
//! );
//!
//! let mut cluster = FaceCluster::new();
//! cluster.add_fragments([fragment, fragment]).unwrap();
//! cluster.execute(true);
//! assert_eq!(cluster.triangles(), &[0, 1, 2, 0, 1, 2]);
//!
//! // Squeeze the cluster into the left half of the atlas
//! cluster.set_uv_width(0.5).unwrap();
//! cluster.reposition_uv_center(Vec2::new(0.25, 0.5)).unwrap();
//! ```

use std::cell::OnceCell;
use std::fmt;

use crate::config::ClusterConfig;
use crate::foundation::math::{self, Vec2, Vec3};

use super::bounds::{UvBounds, WorldBounds};
use super::fragment::FaceFragment;

/// Errors returned by cluster operations
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterError {
    /// Transforms need merged buffers
    #[error("cluster has not been executed yet")]
    NotClustered,
    /// Fragments can only be added before clustering
    #[error("cluster has already been executed")]
    AlreadyClustered,
    /// Clustering produced no geometry to transform
    #[error("cluster contains no geometry")]
    Empty,
}

/// Triangle fragments merged into shared vertex, UV and index buffers
pub struct FaceCluster {
    merge_epsilon: f32,
    world_padding: f32,
    clustered: bool,

    verts: Vec<Vec3>,
    uvs: Vec<Vec2>,
    triangles: Vec<u32>,

    fragments: Vec<FaceFragment>,
    rebuilt_fragments: OnceCell<Vec<FaceFragment>>,

    uv_bounds: Option<UvBounds>,
    world_bounds: Option<WorldBounds>,
}

impl Default for FaceCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceCluster {
    /// Create an empty cluster with default tolerances
    pub fn new() -> Self {
        Self::with_config(&ClusterConfig::default())
    }

    /// Create an empty cluster with explicit tolerances
    pub fn with_config(config: &ClusterConfig) -> Self {
        Self {
            merge_epsilon: config.merge_epsilon,
            world_padding: config.world_bounds_padding,
            clustered: false,
            verts: Vec::new(),
            uvs: Vec::new(),
            triangles: Vec::new(),
            fragments: Vec::new(),
            rebuilt_fragments: OnceCell::new(),
            uv_bounds: None,
            world_bounds: None,
        }
    }

    // ================================================
    // ACCESSORS
    // ================================================

    /// Merged vertex positions
    pub fn verts(&self) -> &[Vec3] {
        &self.verts
    }

    /// Merged UV coordinates, parallel to [`verts`](Self::verts)
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Triangle index buffer, three indices per triangle
    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    /// UV bounds, available once clustered
    pub fn uv_bounds(&self) -> Option<UvBounds> {
        self.uv_bounds
    }

    /// World bounds, available once clustered
    pub fn world_bounds(&self) -> Option<WorldBounds> {
        self.world_bounds
    }

    /// Whether [`execute`](Self::execute) has run
    pub fn is_clustered(&self) -> bool {
        self.clustered
    }

    // ================================================
    // FRAGMENTS
    // ================================================

    /// Queue a fragment for clustering
    pub fn add_fragment(&mut self, fragment: FaceFragment) -> Result<(), ClusterError> {
        if self.clustered {
            return Err(ClusterError::AlreadyClustered);
        }
        self.fragments.push(fragment);
        Ok(())
    }

    /// Queue several fragments for clustering
    pub fn add_fragments(&mut self, fragments: impl IntoIterator<Item = FaceFragment>) -> Result<(), ClusterError> {
        if self.clustered {
            return Err(ClusterError::AlreadyClustered);
        }
        self.fragments.extend(fragments);
        Ok(())
    }

    /// Queue every fragment of another cluster
    pub fn add_cluster(&mut self, other: &Self) -> Result<(), ClusterError> {
        self.add_fragments(other.fragments().iter().copied())
    }

    /// Fragments making up the cluster
    ///
    /// Before clustering these are the queued fragments. Afterwards they are
    /// rebuilt from the merged buffers on first request and cached until the
    /// next transform.
    pub fn fragments(&self) -> &[FaceFragment] {
        if !self.clustered {
            return &self.fragments;
        }
        self.rebuilt_fragments.get_or_init(|| {
            self.triangles
                .chunks_exact(3)
                .map(|tri| {
                    let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
                    FaceFragment::new(
                        [self.verts[a], self.verts[b], self.verts[c]],
                        [self.uvs[a], self.uvs[b], self.uvs[c]],
                    )
                })
                .collect()
        })
    }

    // ================================================
    // CLUSTERING
    // ================================================

    /// Merge the queued fragments into shared buffers
    ///
    /// With `remove_duplicates`, vertex/UV pairs that match an already merged
    /// pair within the merge epsilon share its index. Clustering happens once;
    /// later calls are ignored and return `false`.
    pub fn execute(&mut self, remove_duplicates: bool) -> bool {
        if self.clustered {
            log::debug!("Cluster already executed, ignoring");
            return false;
        }

        let fragments = std::mem::take(&mut self.fragments);
        let vert_union = fragments.iter().flat_map(|fragment| fragment.verts().iter().copied());
        let uv_union = fragments.iter().flat_map(|fragment| fragment.uvs().iter().copied());

        if remove_duplicates {
            self.merge_duplicates(vert_union.zip(uv_union));
        } else {
            self.verts = vert_union.collect();
            self.uvs = uv_union.collect();
            self.triangles = (0..self.verts.len()).map(buffer_index).collect();
        }

        self.recalculate_uv_bounds();
        self.recalculate_world_bounds();
        self.clustered = true;

        log::debug!(
            "Clustered {} fragments into {} vertices",
            fragments.len(),
            self.verts.len()
        );
        true
    }

    fn merge_duplicates(&mut self, pairs: impl Iterator<Item = (Vec3, Vec2)>) {
        let epsilon = self.merge_epsilon;
        for (vert, uv) in pairs {
            let existing = self.verts.iter().zip(&self.uvs).position(|(merged_vert, merged_uv)| {
                math::approx_eq_vec2(&uv, merged_uv, epsilon) && math::approx_eq_vec3(&vert, merged_vert, epsilon)
            });
            let index = existing.unwrap_or_else(|| {
                self.verts.push(vert);
                self.uvs.push(uv);
                self.verts.len() - 1
            });
            self.triangles.push(buffer_index(index));
        }
    }

    // ================================================
    // UV MANIPULATIONS
    // ================================================

    /// Mirror the UVs across the vertical line through their center
    pub fn flip_uvs_horizontally(&mut self) -> Result<(), ClusterError> {
        let center = self.require_uv_bounds()?.center();
        for uv in &mut self.uvs {
            uv.x = 2.0f32.mul_add(center.x, -uv.x);
        }
        self.uvs_changed();
        Ok(())
    }

    /// Mirror the UVs across the horizontal line through their center
    pub fn flip_uvs_vertically(&mut self) -> Result<(), ClusterError> {
        let center = self.require_uv_bounds()?.center();
        for uv in &mut self.uvs {
            uv.y = 2.0f32.mul_add(center.y, -uv.y);
        }
        self.uvs_changed();
        Ok(())
    }

    /// Turn the UVs clockwise by `times` quarter turns
    pub fn turn_uvs_cw(&mut self, times: i32) -> Result<(), ClusterError> {
        self.rotate_uvs(-90.0 * times as f32)
    }

    /// Turn the UVs counter-clockwise by `times` quarter turns
    pub fn turn_uvs_ccw(&mut self, times: i32) -> Result<(), ClusterError> {
        self.rotate_uvs(90.0 * times as f32)
    }

    /// Rotate the UVs counter-clockwise by `degrees` around their center
    pub fn rotate_uvs(&mut self, degrees: f32) -> Result<(), ClusterError> {
        let center = self.require_uv_bounds()?.center();
        for uv in &mut self.uvs {
            *uv = math::rotate_point_2d(*uv, center, degrees);
        }
        self.uvs_changed();
        Ok(())
    }

    /// Shift the UVs along U
    pub fn translate_uvs_x(&mut self, amount: f32) -> Result<(), ClusterError> {
        self.translate_uvs(Vec2::new(amount, 0.0))
    }

    /// Shift the UVs along V
    pub fn translate_uvs_y(&mut self, amount: f32) -> Result<(), ClusterError> {
        self.translate_uvs(Vec2::new(0.0, amount))
    }

    /// Move the UVs so their bounds are centered on `center`
    pub fn reposition_uv_center(&mut self, center: Vec2) -> Result<(), ClusterError> {
        let offset = center - self.require_uv_bounds()?.center();
        self.translate_uvs(offset)
    }

    /// Shift every UV by `offset`
    pub fn translate_uvs(&mut self, offset: Vec2) -> Result<(), ClusterError> {
        self.require_uv_bounds()?;
        for uv in &mut self.uvs {
            *uv += offset;
        }
        self.uvs_changed();
        Ok(())
    }

    /// Scale the UVs around their center so the bounds measure `size`
    ///
    /// An axis with zero extent cannot be scaled and is left untouched.
    pub fn set_uv_size(&mut self, size: Vec2) -> Result<(), ClusterError> {
        let bounds = self.require_uv_bounds()?;
        let factor = Vec2::new(
            axis_factor(size.x, bounds.width(), "UVs along U"),
            axis_factor(size.y, bounds.height(), "UVs along V"),
        );
        let center = bounds.center();
        for uv in &mut self.uvs {
            *uv = center + (*uv - center).component_mul(&factor);
        }
        self.uvs_changed();
        Ok(())
    }

    /// Scale along U so the bounds are `width` wide
    pub fn set_uv_width(&mut self, width: f32) -> Result<(), ClusterError> {
        let height = self.require_uv_bounds()?.height();
        self.set_uv_size(Vec2::new(width, height))
    }

    /// Scale along V so the bounds are `height` tall
    pub fn set_uv_height(&mut self, height: f32) -> Result<(), ClusterError> {
        let width = self.require_uv_bounds()?.width();
        self.set_uv_size(Vec2::new(width, height))
    }

    /// Scale the UVs by a per-axis factor around their center
    pub fn scale_uvs_relative(&mut self, factor: Vec2) -> Result<(), ClusterError> {
        let size = self.require_uv_bounds()?.size();
        self.set_uv_size(size.component_mul(&factor))
    }

    // ================================================
    // WORLD MANIPULATIONS
    // ================================================

    /// Scale the vertices around their center so the padded world scale is `size`
    ///
    /// An axis with zero scale (flat geometry without padding) is left untouched.
    pub fn set_world_size(&mut self, size: Vec3) -> Result<(), ClusterError> {
        let bounds = self.require_world_bounds()?;
        let scale = bounds.scale();
        let factor = Vec3::new(
            axis_factor(size.x, scale.x, "vertices along X"),
            axis_factor(size.y, scale.y, "vertices along Y"),
            axis_factor(size.z, scale.z, "vertices along Z"),
        );
        let center = bounds.center();
        for vert in &mut self.verts {
            *vert = center + (*vert - center).component_mul(&factor);
        }
        self.verts_changed();
        Ok(())
    }

    /// Scale along X only
    pub fn set_world_x(&mut self, x: f32) -> Result<(), ClusterError> {
        let scale = self.require_world_bounds()?.scale();
        self.set_world_size(Vec3::new(x, scale.y, scale.z))
    }

    /// Scale along Y only
    pub fn set_world_y(&mut self, y: f32) -> Result<(), ClusterError> {
        let scale = self.require_world_bounds()?.scale();
        self.set_world_size(Vec3::new(scale.x, y, scale.z))
    }

    /// Scale along Z only
    pub fn set_world_z(&mut self, z: f32) -> Result<(), ClusterError> {
        let scale = self.require_world_bounds()?.scale();
        self.set_world_size(Vec3::new(scale.x, scale.y, z))
    }

    /// Scale the vertices by a per-axis factor around their center
    pub fn scale_world_relative(&mut self, factor: Vec3) -> Result<(), ClusterError> {
        let scale = self.require_world_bounds()?.scale();
        self.set_world_size(scale.component_mul(&factor))
    }

    /// Rotate around the local X axis through the world center
    pub fn rotate_local_x(&mut self, degrees: f32) -> Result<(), ClusterError> {
        self.rotate(Vec3::new(degrees, 0.0, 0.0))
    }

    /// Rotate around the local Y axis through the world center
    pub fn rotate_local_y(&mut self, degrees: f32) -> Result<(), ClusterError> {
        self.rotate(Vec3::new(0.0, degrees, 0.0))
    }

    /// Rotate around the local Z axis through the world center
    pub fn rotate_local_z(&mut self, degrees: f32) -> Result<(), ClusterError> {
        self.rotate(Vec3::new(0.0, 0.0, degrees))
    }

    /// Rotate by Euler angles in degrees (Z, then X, then Y) around the world center
    pub fn rotate(&mut self, angles: Vec3) -> Result<(), ClusterError> {
        let pivot = self.require_world_bounds()?.center();
        let rotation = math::euler_degrees(angles);
        for vert in &mut self.verts {
            *vert = rotation * (*vert - pivot) + pivot;
        }
        self.verts_changed();
        Ok(())
    }

    /// Shift the vertices along X
    pub fn translate_world_x(&mut self, amount: f32) -> Result<(), ClusterError> {
        self.translate_world(Vec3::new(amount, 0.0, 0.0))
    }

    /// Shift the vertices along Y
    pub fn translate_world_y(&mut self, amount: f32) -> Result<(), ClusterError> {
        self.translate_world(Vec3::new(0.0, amount, 0.0))
    }

    /// Shift the vertices along Z
    pub fn translate_world_z(&mut self, amount: f32) -> Result<(), ClusterError> {
        self.translate_world(Vec3::new(0.0, 0.0, amount))
    }

    /// Move the vertices so their bounds are centered on `center`
    pub fn reposition_world_center(&mut self, center: Vec3) -> Result<(), ClusterError> {
        let offset = center - self.require_world_bounds()?.center();
        self.translate_world(offset)
    }

    /// Shift every vertex by `offset`
    pub fn translate_world(&mut self, offset: Vec3) -> Result<(), ClusterError> {
        self.require_world_bounds()?;
        for vert in &mut self.verts {
            *vert += offset;
        }
        self.verts_changed();
        Ok(())
    }

    // ================================================
    // INTERNAL
    // ================================================

    fn require_uv_bounds(&self) -> Result<UvBounds, ClusterError> {
        if !self.clustered {
            return Err(ClusterError::NotClustered);
        }
        self.uv_bounds.ok_or(ClusterError::Empty)
    }

    fn require_world_bounds(&self) -> Result<WorldBounds, ClusterError> {
        if !self.clustered {
            return Err(ClusterError::NotClustered);
        }
        self.world_bounds.ok_or(ClusterError::Empty)
    }

    fn uvs_changed(&mut self) {
        self.recalculate_uv_bounds();
        self.rebuilt_fragments.take();
    }

    fn verts_changed(&mut self) {
        self.recalculate_world_bounds();
        self.rebuilt_fragments.take();
    }

    fn recalculate_uv_bounds(&mut self) {
        self.uv_bounds = UvBounds::from_points(&self.uvs);
    }

    fn recalculate_world_bounds(&mut self) {
        self.world_bounds = WorldBounds::from_points(&self.verts, self.world_padding);
    }
}

/// Position of a merged vertex as a 32-bit index buffer entry
#[allow(clippy::cast_possible_truncation)]
fn buffer_index(index: usize) -> u32 {
    // Index buffers are 32-bit, so clusters hold at most u32::MAX vertices
    debug_assert!(u32::try_from(index).is_ok(), "vertex index {index} exceeds the index buffer range");
    index as u32
}

/// Factor scaling `current` to `target`, or 1 for a degenerate axis
fn axis_factor(target: f32, current: f32, axis: &str) -> f32 {
    if current.abs() <= f32::EPSILON {
        log::warn!("Cannot scale {} with zero extent", axis);
        1.0
    } else {
        target / current
    }
}

impl fmt::Display for FaceCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Verts : ")?;
        for vert in &self.verts {
            write!(f, "({}, {}, {})", vert.x, vert.y, vert.z)?;
        }
        write!(f, "\nUVs : ")?;
        for uv in &self.uvs {
            write!(f, "({}, {})", uv.x, uv.y)?;
        }
        write!(f, "\nTriangles : ")?;
        let indices: Vec<String> = self.triangles.iter().map(u32::to_string).collect();
        write!(f, "{}", indices.join(" "))
    }
}

impl fmt::Debug for FaceCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaceCluster")
            .field("clustered", &self.clustered)
            .field("verts", &self.verts.len())
            .field("triangles", &(self.triangles.len() / 3))
            .field("pending_fragments", &self.fragments.len())
            .finish_non_exhaustive()
    }
}
