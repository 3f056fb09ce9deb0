//! Perspective camera with cached view and projection matrices.
//!
//! The two matrices are recomputed on different schedules: the view
//! matrix through [`Camera::update`] once per tick, the projection
//! matrix only when the surface aspect ratio changes. On resize the
//! protocol is `Renderer::set_size` → [`Camera::set_aspect_ratio`] →
//! [`Camera::update_projection_matrix`], in that order.

use glam::{Mat4, Vec3};

pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector of the camera.
    pub up: Vec3,
    /// Field of view in radians.
    fovy: f32,
    /// Aspect ratio of the render target.
    aspect: f32,
    znear: f32,
    zfar: f32,
    view: Mat4,
    proj: Mat4,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, aspect: f32) -> Self {
        let mut camera = Self {
            position,
            target,
            up: Vec3::Y,
            fovy: 45.0f32.to_radians(),
            aspect,
            znear: 0.1,
            zfar: 100.0,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
        };
        camera.update();
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the cached view matrix from position/target/up.
    /// Called once per tick unconditionally so interactive camera
    /// movement only has to mutate the fields.
    pub fn update(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.target, self.up);
    }

    /// Store a new aspect ratio. Takes effect on the next
    /// [`Camera::update_projection_matrix`] call.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Recompute the cached projection matrix.
    pub fn update_projection_matrix(&mut self) {
        self.proj = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.proj
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_round_trips_through_projection() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 800.0 / 600.0);
        camera.set_aspect_ratio(1600.0 / 900.0);
        camera.update_projection_matrix();
        // perspective_rh: m00 = f / aspect, m11 = f.
        let proj = camera.projection();
        let derived = proj.y_axis.y / proj.x_axis.x;
        assert!((derived - 1600.0 / 900.0).abs() < 1e-5);
    }

    #[test]
    fn projection_is_recomputed_only_on_request() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1.0);
        let before = camera.projection();
        camera.set_aspect_ratio(2.0);
        assert_eq!(before, camera.projection());
        camera.update_projection_matrix();
        assert_ne!(before, camera.projection());
    }

    #[test]
    fn view_observes_movement_after_update() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1.0);
        let before = camera.view();
        camera.position = Vec3::new(3.0, 1.0, 5.0);
        assert_eq!(before, camera.view());
        camera.update();
        assert_ne!(before, camera.view());
    }

    #[test]
    fn view_looks_down_negative_z_by_default() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1.0);
        // A point in front of the camera lands in front of the view
        // origin (negative z in view space for right-handed look-at).
        let p = camera.view().transform_point3(Vec3::ZERO);
        assert!(p.z < 0.0);
    }
}
