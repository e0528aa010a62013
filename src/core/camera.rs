//! Turntable camera orbiting the domain cube
//!
//! Z is up. Azimuth spins around Z, elevation tilts above the XY plane.
//! Projection is done on the CPU so the scene can be drawn with a plain
//! 2D painter.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::config::CAMERA_DISTANCE_FACTOR;

const MAX_ELEVATION_DEG: f32 = 89.0;

/// A projected world point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    /// Position in viewport pixels, origin top-left
    pub pos: Vec2,
    /// Distance along the view axis; larger is farther
    pub depth: f32,
}

#[derive(Clone, Debug)]
pub struct TurntableCamera {
    /// Point the camera orbits around
    pub target: Vec3,
    /// Distance from target to eye
    pub distance: f32,
    /// Rotation around +Z (degrees)
    pub azimuth_deg: f32,
    /// Angle above the XY plane (degrees)
    pub elevation_deg: f32,
    /// Vertical field of view (degrees)
    pub fov_deg: f32,
}

impl Default for TurntableCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 3500.0,
            azimuth_deg: 30.0,
            elevation_deg: 25.0,
            fov_deg: 50.0,
        }
    }
}

impl TurntableCamera {
    /// Center on the cube `[0, L]^3` and back off proportionally to L.
    pub fn frame_domain(&mut self, domain_size: f32) {
        self.target = Vec3::splat(domain_size * 0.5);
        self.distance = domain_size * CAMERA_DISTANCE_FACTOR;
    }

    pub fn rotate(&mut self, d_azimuth_deg: f32, d_elevation_deg: f32) {
        self.azimuth_deg = (self.azimuth_deg + d_azimuth_deg).rem_euclid(360.0);
        self.elevation_deg = (self.elevation_deg + d_elevation_deg)
            .clamp(-MAX_ELEVATION_DEG, MAX_ELEVATION_DEG);
    }

    /// Multiply the orbit distance; factors below 1 move closer
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).max(f32::EPSILON);
        }
    }

    /// Eye position in world space
    pub fn eye(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth_deg.to_radians().sin_cos();
        let (sin_el, cos_el) = self.elevation_deg.to_radians().sin_cos();
        let offset = Vec3::new(cos_el * sin_az, -cos_el * cos_az, sin_el) * self.distance;
        self.target + offset
    }

    fn near(&self) -> f32 {
        (self.distance * 0.01).max(1e-4)
    }

    fn far(&self) -> f32 {
        self.distance * 100.0
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Z);
        let proj = Mat4::perspective_rh_gl(
            self.fov_deg.to_radians(),
            aspect.max(1e-3),
            self.near(),
            self.far(),
        );
        proj * view
    }

    /// Project a world point into a viewport of `size` pixels using a matrix
    /// from [`Self::view_proj`].
    ///
    /// Returns `None` for points at or behind the near plane.
    pub fn project_with(&self, view_proj: &Mat4, point: Vec3, size: Vec2) -> Option<Projected> {
        let clip: Vec4 = *view_proj * point.extend(1.0);
        if clip.w <= self.near() {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Projected {
            pos: Vec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y),
            depth: clip.w,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-2
    }

    fn project(cam: &TurntableCamera, point: Vec3, size: Vec2) -> Option<Projected> {
        cam.project_with(&cam.view_proj(size.x / size.y), point, size)
    }

    #[test]
    fn test_target_projects_to_center() {
        let mut cam = TurntableCamera::default();
        cam.frame_domain(100.0);
        let size = Vec2::new(800.0, 600.0);
        let p = project(&cam, Vec3::splat(50.0), size).unwrap();
        assert!(approx(p.pos.x, 400.0), "x = {}", p.pos.x);
        assert!(approx(p.pos.y, 300.0), "y = {}", p.pos.y);
        assert!(approx(p.depth, 175.0), "depth = {}", p.depth);
    }

    #[test]
    fn test_frame_domain_distance() {
        let mut cam = TurntableCamera::default();
        cam.frame_domain(2000.0);
        assert_eq!(cam.distance, 3500.0);
        assert_eq!(cam.target, Vec3::splat(1000.0));
        assert!(approx((cam.eye() - cam.target).length(), 3500.0));
    }

    #[test]
    fn test_point_behind_eye_is_culled() {
        let mut cam = TurntableCamera::default();
        cam.frame_domain(10.0);
        let behind = cam.eye() + (cam.eye() - cam.target);
        assert!(project(&cam, behind, Vec2::new(100.0, 100.0)).is_none());
    }

    #[test]
    fn test_up_is_up_on_screen() {
        let mut cam = TurntableCamera::default();
        cam.frame_domain(10.0);
        let size = Vec2::new(100.0, 100.0);
        let low = project(&cam, Vec3::new(5.0, 5.0, 0.0), size).unwrap();
        let high = project(&cam, Vec3::new(5.0, 5.0, 10.0), size).unwrap();
        assert!(high.pos.y < low.pos.y);
    }

    #[test]
    fn test_rotate_clamps_elevation() {
        let mut cam = TurntableCamera::default();
        cam.rotate(350.0, 200.0);
        assert_eq!(cam.elevation_deg, MAX_ELEVATION_DEG);
        assert!(approx(cam.azimuth_deg, 20.0));
        cam.rotate(0.0, -500.0);
        assert_eq!(cam.elevation_deg, -MAX_ELEVATION_DEG);
    }

    #[test]
    fn test_zoom_ignores_bad_factors() {
        let mut cam = TurntableCamera::default();
        cam.zoom(0.5);
        assert_eq!(cam.distance, 1750.0);
        cam.zoom(0.0);
        cam.zoom(f32::NAN);
        assert_eq!(cam.distance, 1750.0);
    }
}
