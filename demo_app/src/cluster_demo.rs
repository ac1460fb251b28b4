//! Packs a two-triangle quad into the left half of a UV atlas

use uniprep::config::ClusterConfig;
use uniprep::foundation::math::{Vec2, Vec3};
use uniprep::mesh::{ClusterError, FaceCluster, FaceFragment};

pub fn run(config: &ClusterConfig) -> Result<(), ClusterError> {
    let corners = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    let uvs = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];

    let mut cluster = FaceCluster::with_config(config);
    cluster.add_fragments([
        FaceFragment::new([corners[0], corners[1], corners[3]], [uvs[0], uvs[1], uvs[3]]),
        FaceFragment::new([corners[1], corners[2], corners[3]], [uvs[1], uvs[2], uvs[3]]),
    ])?;
    cluster.execute(true);

    cluster.turn_uvs_cw(1)?;
    cluster.set_uv_width(0.5)?;
    cluster.reposition_uv_center(Vec2::new(0.25, 0.5))?;
    cluster.rotate_local_x(-90.0)?;
    cluster.reposition_world_center(Vec3::zeros())?;

    log::info!("Packed quad:\n{}", cluster);
    Ok(())
}
