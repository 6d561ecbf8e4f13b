//! Free-roaming camera driven by two spherical angles

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};

/// Near clipping plane distance
pub const NEAR_PLANE: f32 = 0.1;
/// Far clipping plane distance
pub const FAR_PLANE: f32 = 10000.0;

/// Maps OpenGL clip-space depth (-1..1) to the 0..1 range wgpu expects
#[rustfmt::skip]
pub fn opengl_to_wgpu_matrix() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Direction of a discrete camera translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Left,
    Right,
    Up,
    Down,
    Forward,
    Backward,
}

/// Camera with position, derived orthonormal basis and spherical angles.
///
/// `forward`, `right` and `up` are always recomputed from `phi` (azimuth)
/// and `theta` (polar angle), both in degrees.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub forward: Vector3<f32>,
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub movement_speed: f32,
    pub look_around_speed: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            forward: -Vector3::z(),
            right: Vector3::x(),
            up: Vector3::y(),
            fov: 60.0,
            movement_speed: 1.5,
            look_around_speed: 1.0,
            phi: 270.0,
            theta: 90.0,
        }
    }
}

impl Camera {
    /// Create a camera in its reset state
    pub fn new() -> Self {
        Self::default()
    }

    /// Return to the origin looking down -Z. Field of view and speeds are kept.
    pub fn reset(&mut self) {
        self.position = Point3::origin();
        self.forward = -Vector3::z();
        self.right = Vector3::x();
        self.up = Vector3::y();
        self.phi = 270.0;
        self.theta = 90.0;
    }

    /// Translate by `movement_speed * dt`. Up and down follow the world Y axis.
    pub fn move_by(&mut self, direction: CameraMovement, dt: f32) {
        let distance = self.movement_speed * dt;
        let offset = match direction {
            CameraMovement::Left => -self.right,
            CameraMovement::Right => self.right,
            CameraMovement::Up => Vector3::y(),
            CameraMovement::Down => -Vector3::y(),
            CameraMovement::Forward => self.forward,
            CameraMovement::Backward => -self.forward,
        };
        self.position += offset * distance;
    }

    /// Rotate by angle deltas in degrees, scaled by `look_around_speed`
    pub fn look_around(&mut self, d_phi: f32, d_theta: f32) {
        self.phi += self.look_around_speed * d_phi;
        // Single-step wrap: a delta larger than a full turn is not reduced
        if self.phi < 0.0 {
            self.phi = 360.0;
        } else if self.phi > 360.0 {
            self.phi = 0.0;
        }
        self.theta = (self.theta + self.look_around_speed * d_theta).clamp(1.0, 180.0);

        let (sin_phi, cos_phi) = self.phi.to_radians().sin_cos();
        let (sin_theta, cos_theta) = self.theta.to_radians().sin_cos();
        self.forward = Vector3::new(cos_phi * sin_theta, cos_theta, sin_phi * sin_theta);

        // Looking straight down leaves forward parallel to world up
        if let Some(right) = self.forward.cross(&Vector3::y()).try_normalize(0.0) {
            self.right = right;
        }
        self.up = self.right.cross(&self.forward).normalize();
    }

    /// Right-handed look-at matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let target = self.position + self.forward;
        Matrix4::look_at_rh(&self.position, &target, &self.up)
    }

    /// Perspective projection for a `width` x `height` viewport.
    ///
    /// Zero dimensions are clamped to one pixel.
    pub fn projection_matrix(&self, width: u32, height: u32) -> Matrix4<f32> {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let perspective = Perspective3::new(aspect, self.fov.to_radians(), NEAR_PLANE, FAR_PLANE);
        opengl_to_wgpu_matrix() * perspective.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_orthonormal(camera: &Camera) {
        let eps = 1e-4;
        assert_relative_eq!(camera.forward.norm(), 1.0, epsilon = eps);
        assert_relative_eq!(camera.right.norm(), 1.0, epsilon = eps);
        assert_relative_eq!(camera.up.norm(), 1.0, epsilon = eps);
        assert!(camera.forward.dot(&camera.right).abs() < eps);
        assert!(camera.forward.dot(&camera.up).abs() < eps);
        assert!(camera.right.dot(&camera.up).abs() < eps);
    }

    #[test]
    fn test_reset_view_is_identity() {
        let mut camera = Camera::new();
        camera.look_around(30.0, -20.0);
        camera.move_by(CameraMovement::Forward, 2.0);
        camera.reset();

        let expected = Matrix4::look_at_rh(
            &Point3::origin(),
            &Point3::new(0.0, 0.0, -1.0),
            &Vector3::y(),
        );
        assert_relative_eq!(camera.view_matrix(), expected, epsilon = 1e-6);
        assert_relative_eq!(camera.view_matrix(), Matrix4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn test_basis_stays_orthonormal() {
        let deltas = [
            (10.0, 5.0),
            (-400.0, 0.0),
            (90.0, -200.0),
            (0.0, 500.0),
            (123.4, -56.7),
            (-1.0, -1.0),
            (359.0, 89.0),
        ];
        for start_phi in [0.0, 45.0, 180.0, 270.0, 360.0] {
            for start_theta in [1.0, 60.0, 90.0, 179.0, 180.0] {
                let mut camera = Camera::new();
                camera.phi = start_phi;
                camera.theta = start_theta;
                for (d_phi, d_theta) in deltas {
                    camera.look_around(d_phi, d_theta);
                    assert_orthonormal(&camera);
                }
            }
        }
    }

    #[test]
    fn test_theta_is_clamped() {
        let mut camera = Camera::new();
        camera.look_around(0.0, 1000.0);
        assert_eq!(camera.theta, 180.0);
        camera.look_around(0.0, -5000.0);
        assert_eq!(camera.theta, 1.0);
    }

    #[test]
    fn test_phi_wraps_in_a_single_step() {
        let mut camera = Camera::new();
        camera.look_around(100.0, 0.0);
        assert_eq!(camera.phi, 0.0);

        camera.look_around(-10.0, 0.0);
        assert_eq!(camera.phi, 360.0);

        // Large deltas are not reduced modulo 360
        camera.phi = 10.0;
        camera.look_around(-800.0, 0.0);
        assert_eq!(camera.phi, 360.0);
    }

    #[test]
    fn test_look_around_scales_by_speed() {
        let mut camera = Camera::new();
        camera.look_around_speed = 0.5;
        camera.look_around(20.0, 10.0);
        assert_relative_eq!(camera.phi, 280.0);
        assert_relative_eq!(camera.theta, 95.0);
    }

    #[test]
    fn test_vertical_movement_uses_world_up() {
        let mut camera = Camera::new();
        camera.look_around(0.0, -60.0);
        camera.move_by(CameraMovement::Up, 2.0);
        assert_relative_eq!(camera.position, Point3::new(0.0, 3.0, 0.0), epsilon = 1e-6);

        camera.reset();
        camera.move_by(CameraMovement::Forward, 1.0);
        camera.move_by(CameraMovement::Right, 2.0);
        assert_relative_eq!(camera.position, Point3::new(3.0, 0.0, -1.5), epsilon = 1e-6);
    }

    #[test]
    fn test_projection_handles_zero_viewport() {
        let camera = Camera::new();
        let projection = camera.projection_matrix(0, 0);
        assert!(projection.iter().all(|v| v.is_finite()));
        assert_relative_eq!(projection, camera.projection_matrix(1, 1));
    }

    #[test]
    fn test_projection_depth_range() {
        let camera = Camera::new();
        let projection = camera.projection_matrix(1600, 900);

        let near = projection * nalgebra::Vector4::new(0.0, 0.0, -NEAR_PLANE, 1.0);
        let far = projection * nalgebra::Vector4::new(0.0, 0.0, -FAR_PLANE, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-4);
    }
}
