//! Perspective camera looking at the particle cloud.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

/// Fixed perspective camera on the +Z axis looking at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Width over height of the output surface.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Camera world position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
}

impl Camera {
    /// Create the default scene camera for a surface of the given aspect ratio.
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_y: 75.0,
            aspect,
            near: 1.0,
            far: 2000.0,
            position: Vec3::new(0.0, 0.0, 300.0),
            target: Vec3::ZERO,
        }
    }

    /// Recompute the aspect ratio after a resize. Zero-sized surfaces are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map a point in normalized device coordinates back into world space,
    /// onto the plane `z = plane_z`.
    ///
    /// The NDC point is unprojected at the near and far planes to form a ray
    /// from the camera. Returns `None` when that ray never meets the plane.
    pub fn unproject(&self, ndc: Vec2, plane_z: f32) -> Option<Vec3> {
        let inverse = self.view_proj().inverse();
        let near = inverse * ndc.extend(0.0).extend(1.0);
        let far = inverse * ndc.extend(1.0).extend(1.0);
        let near = near.xyz() / near.w;
        let far = far.xyz() / far.w;

        let dir = far - near;
        if dir.z.abs() < f32::EPSILON {
            return None;
        }
        let t = (plane_z - near.z) / dir.z;
        if t < 0.0 {
            return None;
        }
        Some(near + dir * t)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_unprojects_to_origin() {
        let camera = Camera::new(1.5);
        let p = camera.unproject(Vec2::ZERO, 0.0).unwrap();
        assert!(p.length() < 0.05, "{p:?}");
    }

    #[test]
    fn test_unproject_round_trips_projection() {
        let camera = Camera::new(4.0 / 3.0);
        let world = Vec3::new(40.0, -25.0, 0.0);
        let clip = camera.view_proj() * world.extend(1.0);
        let ndc = clip.xy() / clip.w;

        let back = camera.unproject(ndc, 0.0).unwrap();
        assert!((back - world).length() < 0.1, "{back:?}");
    }

    #[test]
    fn test_screen_edge_reaches_frustum_edge() {
        // At distance 300 with a 75 degree vertical fov the top of the view
        // sits at 300 * tan(37.5 deg).
        let camera = Camera::new(1.0);
        let top = camera.unproject(Vec2::new(0.0, 1.0), 0.0).unwrap();
        let expected = 300.0 * 37.5f32.to_radians().tan();
        assert!((top.y - expected).abs() < 0.2, "{top:?}");
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = Camera::new(1.0);
        camera.resize(1920, 1080);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
        camera.resize(0, 1080);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}
