/// Camera model and view frustum extraction
/// The traversal consumes cameras only through the Viewport abstraction
use glam::{Mat4, Quat, Vec3, Vec4};

pub mod viewport;

pub use viewport::{CameraTransform, Viewport};

pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,   // Rotation around Y axis (radians)
    pub pitch: f32, // Rotation around X axis (radians)
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect_ratio: f32,
}

impl Camera {
    pub fn new(position: Vec3, aspect_ratio: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov: 70.0f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            aspect_ratio,
        }
    }

    /// Update camera orientation to look at a specific target point.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let view_matrix = Mat4::look_at_rh(self.position, target, up);
        let rotation_quat = Quat::from_mat4(&view_matrix.inverse());
        // EulerRot::YXZ yields angles in sequence order: Y (yaw) first, X (pitch) second
        let (yaw, pitch, _roll) = rotation_quat.to_euler(glam::EulerRot::YXZ);
        self.yaw = yaw;
        self.pitch = pitch;
    }

    /// Get view matrix
    pub fn view_matrix(&self) -> Mat4 {
        let rotation = self.rotation_quat();
        let forward = rotation * Vec3::NEG_Z;
        let target = self.position + forward;
        let up = rotation * Vec3::Y;

        Mat4::look_at_rh(self.position, target, up)
    }

    /// Get projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get forward direction vector
    pub fn forward(&self) -> Vec3 {
        self.rotation_quat() * Vec3::NEG_Z
    }

    /// Get rotation quaternion
    fn rotation_quat(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    /// Extract frustum planes from the view-projection matrix
    /// Returns a Frustum for AABB culling
    pub fn extract_frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection_matrix())
    }
}

/// View frustum represented as 6 planes for AABB culling
/// Planes are stored in Hessian normal form: ax + by + cz + d = 0
/// where (a,b,c) is the outward-facing normal
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// 6 planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix
    /// Using Gribb-Hartmann method (fast extraction from MVP)
    pub fn from_view_projection(vp: &Mat4) -> Self {
        // Extract rows from the matrix. In glam's column-major Mat4,
        // rows still correspond to the plane extraction used by the
        // standard Gribb-Hartmann method.
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        // Extract and normalize planes
        let mut planes = [Vec4::ZERO; 6];

        // Left plane: row3 + row0
        planes[0] = Self::normalize_plane(row3 + row0);
        // Right plane: row3 - row0
        planes[1] = Self::normalize_plane(row3 - row0);
        // Bottom plane: row3 + row1
        planes[2] = Self::normalize_plane(row3 + row1);
        // Top plane: row3 - row1
        planes[3] = Self::normalize_plane(row3 - row1);
        // Near plane: row3 + row2
        planes[4] = Self::normalize_plane(row3 + row2);
        // Far plane: row3 - row2
        planes[5] = Self::normalize_plane(row3 - row2);

        Self { planes }
    }

    /// A frustum that accepts every box. Stands in for real projection when
    /// frustum culling is disabled or under test.
    pub fn accept_all() -> Self {
        Self {
            planes: [Vec4::ZERO; 6],
        }
    }

    /// Normalize a plane equation
    #[inline]
    fn normalize_plane(plane: Vec4) -> Vec4 {
        let normal_length = plane.truncate().length();
        if normal_length > 0.0001 {
            plane / normal_length
        } else {
            plane
        }
    }

    /// Test if an AABB intersects the frustum
    /// Returns true if the box is at least partially inside
    pub fn intersects_aabb(&self, min: Vec3, max: Vec3) -> bool {
        // For each plane, check if the AABB is completely outside
        for plane in &self.planes {
            // Get the "positive vertex" - the corner furthest along the plane normal
            let p_vertex = Vec3::new(
                if plane.x > 0.0 { max.x } else { min.x },
                if plane.y > 0.0 { max.y } else { min.y },
                if plane.z > 0.0 { max.z } else { min.z },
            );

            // If the positive vertex is outside this plane, the whole box is outside
            if plane.x * p_vertex.x + plane.y * p_vertex.y + plane.z * p_vertex.z + plane.w < 0.0
            {
                return false;
            }
        }

        // Box is at least partially inside all planes
        true
    }
}
