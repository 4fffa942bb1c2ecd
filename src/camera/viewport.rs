/// Per-frame camera state as the traversal sees it
/// The camera position is split into integer and fractional parts so distance
/// tests stay exact far from the world origin, where f32 world coordinates
/// have already lost sub-unit precision
use super::{Camera, Frustum};
use crate::section::world_to_section_coord;
use glam::{DVec3, IVec3, Vec3};

/// Camera position split at the unit boundary: `int + frac` reconstructs the
/// original double-precision position, with `frac` in [0, 1)
#[derive(Debug, Clone, Copy)]
pub struct CameraTransform {
    pub int_x: i32,
    pub int_y: i32,
    pub int_z: i32,
    pub frac_x: f32,
    pub frac_y: f32,
    pub frac_z: f32,
}

impl CameraTransform {
    pub fn new(position: DVec3) -> CameraTransform {
        let floor = position.floor();
        CameraTransform {
            int_x: floor.x as i32,
            int_y: floor.y as i32,
            int_z: floor.z as i32,
            frac_x: (position.x - floor.x) as f32,
            frac_y: (position.y - floor.y) as f32,
            frac_z: (position.z - floor.z) as f32,
        }
    }
}

/// Frozen camera state for one traversal: frustum, split transform, and the
/// section the camera stands in
pub struct Viewport {
    frustum: Frustum,
    transform: CameraTransform,
    section_coord: IVec3,
}

impl Viewport {
    pub fn new(frustum: Frustum, camera_position: DVec3) -> Viewport {
        Viewport {
            frustum,
            transform: CameraTransform::new(camera_position),
            section_coord: world_to_section_coord(camera_position),
        }
    }

    pub fn from_camera(camera: &Camera) -> Viewport {
        Viewport::new(camera.extract_frustum(), camera.position.as_dvec3())
    }

    /// Section coordinate the camera position falls in
    #[inline]
    pub fn section_coord(&self) -> IVec3 {
        self.section_coord
    }

    #[inline]
    pub fn transform(&self) -> &CameraTransform {
        &self.transform
    }

    /// Frustum test on a cube described by center and half extent
    #[inline]
    pub fn is_box_visible(&self, center: Vec3, half_extent: f32) -> bool {
        let half = Vec3::splat(half_extent);
        self.frustum.intersects_aabb(center - half, center + half)
    }
}
