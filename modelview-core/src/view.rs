//! Camera matrix block and the state that keeps it current

use bytemuck::{Pod, Zeroable};
use nalgebra::Matrix4;

use crate::camera::{Camera, CameraMovement};

/// View and projection matrices as uploaded to the camera uniform buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraBlock {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl CameraBlock {
    /// Size of the block in bytes
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;
}

/// Camera plus viewport size, with the derived [`CameraBlock`].
///
/// Mutators recompute only the half of the block their input affects and
/// return `true` when the block changed. The caller uploads the whole block.
#[derive(Debug, Clone)]
pub struct ViewState {
    camera: Camera,
    width: u32,
    height: u32,
    block: CameraBlock,
}

impl ViewState {
    pub fn new(width: u32, height: u32) -> Self {
        let camera = Camera::new();
        let block = CameraBlock {
            view: camera.view_matrix().into(),
            projection: camera.projection_matrix(width, height).into(),
        };
        Self {
            camera,
            width,
            height,
            block,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn block(&self) -> &CameraBlock {
        &self.block
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) -> bool {
        self.width = width;
        self.height = height;
        self.update_projection()
    }

    /// Field of view in degrees
    pub fn set_fov(&mut self, fov: f32) -> bool {
        self.camera.fov = fov;
        self.update_projection()
    }

    pub fn move_camera(&mut self, direction: CameraMovement, dt: f32) -> bool {
        self.camera.move_by(direction, dt);
        self.update_view()
    }

    pub fn look_around(&mut self, d_phi: f32, d_theta: f32) -> bool {
        self.camera.look_around(d_phi, d_theta);
        self.update_view()
    }

    pub fn reset_camera(&mut self) -> bool {
        self.camera.reset();
        self.update_view()
    }

    pub fn set_movement_speed(&mut self, speed: f32) {
        self.camera.movement_speed = speed;
    }

    pub fn set_look_around_speed(&mut self, speed: f32) {
        self.camera.look_around_speed = speed;
    }

    fn update_view(&mut self) -> bool {
        Self::replace(&mut self.block.view, self.camera.view_matrix())
    }

    fn update_projection(&mut self) -> bool {
        Self::replace(
            &mut self.block.projection,
            self.camera.projection_matrix(self.width, self.height),
        )
    }

    fn replace(slot: &mut [[f32; 4]; 4], matrix: Matrix4<f32>) -> bool {
        let next: [[f32; 4]; 4] = matrix.into();
        let changed = *slot != next;
        *slot = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_is_two_matrices() {
        assert_eq!(CameraBlock::SIZE, 128);
    }

    #[test]
    fn test_resolution_changes_only_projection() {
        let mut state = ViewState::new(1600, 900);
        let before = *state.block();

        assert!(state.set_resolution(800, 800));
        assert_eq!(state.block().view, before.view);
        assert_ne!(state.block().projection, before.projection);
        assert_eq!(state.resolution(), (800, 800));

        let before = *state.block();
        assert!(state.set_fov(45.0));
        assert_eq!(state.block().view, before.view);
        assert_ne!(state.block().projection, before.projection);
    }

    #[test]
    fn test_camera_motion_changes_only_view() {
        let mut state = ViewState::new(1600, 900);
        let before = *state.block();

        assert!(state.move_camera(CameraMovement::Forward, 0.5));
        assert_eq!(state.block().projection, before.projection);
        assert_ne!(state.block().view, before.view);

        let before = *state.block();
        assert!(state.look_around(15.0, 5.0));
        assert_eq!(state.block().projection, before.projection);
        assert_ne!(state.block().view, before.view);
    }

    #[test]
    fn test_reset_refreshes_view() {
        let mut state = ViewState::new(1600, 900);
        let initial = *state.block();

        state.look_around(40.0, 20.0);
        state.move_camera(CameraMovement::Left, 1.0);
        assert!(state.reset_camera());
        assert_eq!(*state.block(), initial);

        assert!(!state.reset_camera());
    }

    #[test]
    fn test_speed_setters_leave_block_alone() {
        let mut state = ViewState::new(640, 480);
        let before = *state.block();
        state.set_movement_speed(7.0);
        state.set_look_around_speed(0.25);
        assert_eq!(*state.block(), before);
        assert_eq!(state.camera().movement_speed, 7.0);
        assert_eq!(state.camera().look_around_speed, 0.25);
    }
}
