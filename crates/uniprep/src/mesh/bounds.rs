//! Axis-aligned bounds of cluster buffers

use crate::foundation::math::{Vec2, Vec3};

/// Axis-aligned bounds in UV space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvBounds {
    /// Smallest coordinate on each axis
    pub min: Vec2,
    /// Largest coordinate on each axis
    pub max: Vec2,
}

impl UvBounds {
    /// Bounds enclosing `points`, or `None` when there are none
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self { min: first, max: first }, |bounds, point| Self {
            min: bounds.min.inf(point),
            max: bounds.max.sup(point),
        }))
    }

    /// Extent along U
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Extent along V
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Extent on both axes
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Midpoint of the bounds
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }
}

/// Axis-aligned bounds in world space
///
/// Scales include a small padding so that flat geometry (zero extent on an
/// axis) can still be resized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    /// Smallest coordinate on each axis
    pub min: Vec3,
    /// Largest coordinate on each axis
    pub max: Vec3,
    padding: f32,
}

impl WorldBounds {
    /// Bounds enclosing `points` with `padding` added to every scale
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>, padding: f32) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), point| (min.inf(point), max.sup(point)));
        Some(Self { min, max, padding })
    }

    /// Padded extent along X
    pub fn scale_x(&self) -> f32 {
        self.max.x - self.min.x + self.padding
    }

    /// Padded extent along Y
    pub fn scale_y(&self) -> f32 {
        self.max.y - self.min.y + self.padding
    }

    /// Padded extent along Z
    pub fn scale_z(&self) -> f32 {
        self.max.z - self.min.z + self.padding
    }

    /// Padded extent on all axes
    pub fn scale(&self) -> Vec3 {
        Vec3::new(self.scale_x(), self.scale_y(), self.scale_z())
    }

    /// Unpadded extent on all axes
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Midpoint of the bounds
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }
}
