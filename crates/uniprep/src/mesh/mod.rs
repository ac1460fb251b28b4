//! Mesh preparation for texture atlases
//!
//! Triangles are collected as [`FaceFragment`]s, merged into a [`FaceCluster`]
//! with optional removal of duplicate vertices, and then laid out with UV and
//! world-space transforms. Every transform works around the current bounds
//! center and refreshes the bounds afterwards.

mod bounds;
mod cluster;
mod fragment;

pub use bounds::{UvBounds, WorldBounds};
pub use cluster::{ClusterError, FaceCluster};
pub use fragment::FaceFragment;
