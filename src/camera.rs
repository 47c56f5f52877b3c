use std::collections::HashSet;

use glam::{Mat3, Vec2, Vec3};

use crate::core::{Event, EventQueue, Key};

pub const CAMERA_SPEED: f32 = 20.0;
pub const DEFAULT_FOCAL_LENGTH: f32 = 0.1;
pub const MIN_FOCAL_LENGTH: f32 = 0.01;
pub const DEFAULT_SAMPLES: u32 = 5;
/// Change of the depth-of-field sample count per R key edge
pub const SAMPLE_STEP: u32 = 45;

/// Orthonormal frame with columns (right, up, forward)
///
/// `up` only resolves the roll around `forward`; the returned up column is
/// generally not `up.normalize()`. A `forward` parallel to `up` yields NaN.
pub fn look_at(forward: Vec3, up: Vec3) -> Mat3 {
    let z = forward.normalize();
    let x = forward.cross(up).normalize();
    let y = x.cross(forward).normalize();
    Mat3::from_cols(x, y, z)
}

/// Unit view direction for the given yaw and pitch, in radians
pub fn direction_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(
        yaw.cos() * pitch.cos(),
        pitch.sin(),
        yaw.sin() * pitch.cos(),
    )
    .normalize()
}

/// Signed key accumulators, one per axis
///
/// Opposite keys of an axis cancel: holding W and S leaves `forward` at 0.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MovementState {
    pub forward: i32,
    pub strafe: i32,
    pub vertical: i32,
    pub focal_rate: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DragState {
    pub dragging: bool,
    pub last_cursor: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub origin: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub forward: Vec3,
    pub world_up: Vec3,
    pub movement: MovementState,
    pub focal_length: f32,
    pub drag: DragState,
    /// Look basis recomputed at the end of every integration step
    pub basis: Mat3,
}

impl CameraState {
    pub fn new(origin: Vec3, focal_length: f32) -> Self {
        let forward = direction_from_angles(0.0, 0.0);
        Self {
            origin,
            yaw: 0.0,
            pitch: 0.0,
            forward,
            world_up: Vec3::Y,
            movement: MovementState::default(),
            focal_length: focal_length.max(MIN_FOCAL_LENGTH),
            drag: DragState::default(),
            basis: look_at(forward, Vec3::Y),
        }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(Vec3::ZERO, DEFAULT_FOCAL_LENGTH)
    }
}

/// Free-fly camera driven by queued input events
///
/// Bindings: W/S forward axis, D/A strafe axis, Space/Shift vertical axis,
/// E/Q focal length rate, R sample count.
#[derive(Debug, Clone)]
pub struct CameraController {
    state: CameraState,
    speed: f32,
    samples: u32,
    held: HashSet<Key>,
    ready: Vec<Event>,
}

impl CameraController {
    pub fn new(state: CameraState, speed: f32, samples: u32) -> Self {
        Self {
            state,
            speed,
            samples: samples.max(1),
            held: HashSet::new(),
            ready: Vec::new(),
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Depth-of-field sample count, at least 1
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Drain the queue, apply the batch, then integrate `delta` seconds
    pub fn update(&mut self, queue: &EventQueue, delta: f32) {
        let mut events = std::mem::take(&mut self.ready);
        queue.drain_into(&mut events);
        self.process_events(&events);
        self.ready = events;

        self.integrate(delta);
    }

    pub fn process_events<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) {
        for event in events {
            self.process_event(event);
        }
    }

    pub fn process_event(&mut self, event: &Event) {
        match *event {
            // Only real transitions count, a second press of a held key is autorepeat
            Event::KeyDown { key, .. } => {
                if self.held.insert(key) {
                    self.apply_key(key, 1);
                }
            }
            Event::KeyUp { key, .. } => {
                if self.held.remove(&key) {
                    self.apply_key(key, -1);
                }
            }
            Event::MouseButtonDown { x, y, .. } => {
                self.state.drag = DragState {
                    dragging: true,
                    last_cursor: Vec2::new(x, y),
                };
            }
            Event::MouseButtonUp { .. } => self.state.drag.dragging = false,
            Event::MouseMove { x, y } if self.state.drag.dragging => {
                let cursor = Vec2::new(x, y);
                let last = self.state.drag.last_cursor;
                self.state.yaw -= last.x - cursor.x;
                self.state.pitch -= last.y - cursor.y;
                self.state.drag.last_cursor = cursor;
                self.state.forward = direction_from_angles(self.state.yaw, self.state.pitch);
            }
            _ => {}
        }
    }

    fn apply_key(&mut self, key: Key, sign: i32) {
        let movement = &mut self.state.movement;
        match key {
            Key::W => movement.forward += sign,
            Key::S => movement.forward -= sign,
            Key::D => movement.strafe += sign,
            Key::A => movement.strafe -= sign,
            Key::Space => movement.vertical += sign,
            Key::Shift => movement.vertical -= sign,
            Key::E => movement.focal_rate += sign as f32,
            Key::Q => movement.focal_rate -= sign as f32,
            Key::R if sign > 0 => self.samples = self.samples.saturating_add(SAMPLE_STEP),
            Key::R => self.samples = self.samples.saturating_sub(SAMPLE_STEP).max(1),
            _ => {}
        }
    }

    /// Advance the camera by `delta` seconds using the current accumulators
    pub fn integrate(&mut self, delta: f32) {
        let state = &mut self.state;
        let movement = state.movement;
        let step = self.speed * delta;

        state.forward = direction_from_angles(state.yaw, state.pitch);

        if movement.forward != 0 {
            state.origin += state.forward.normalize() * step * movement.forward as f32;
        }
        if movement.vertical != 0 {
            state.origin += state.world_up * step * movement.vertical as f32;
        }
        if movement.strafe != 0 {
            state.origin +=
                state.forward.cross(state.world_up).normalize() * step * movement.strafe as f32;
        }

        state.focal_length += movement.focal_rate * delta * self.speed / 2.0;
        state.focal_length = state.focal_length.max(MIN_FOCAL_LENGTH);

        state.basis = look_at(state.forward, state.world_up);
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraState::default(), CAMERA_SPEED, DEFAULT_SAMPLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MouseButton;

    const EPS: f32 = 1e-6;

    fn assert_vec_eq(a: Vec3, b: Vec3, eps: f32) {
        assert!((a - b).abs().max_element() < eps, "{a:?} != {b:?}");
    }

    #[test]
    fn look_at_identity_frame() {
        let basis = look_at(Vec3::X, Vec3::Y);

        assert_vec_eq(basis.z_axis, Vec3::X, EPS);
        assert_vec_eq(basis.x_axis, Vec3::Z, EPS);
        assert_vec_eq(basis.y_axis, Vec3::Y, EPS);
    }

    #[test]
    fn look_at_up_is_not_the_hint() {
        let hint = Vec3::new(0.3, 1.0, 0.0);
        let basis = look_at(Vec3::new(1.0, 0.2, 0.0), hint);

        assert!(basis.y_axis.dot(hint.normalize()) < 1.0 - EPS);
        assert!(basis.y_axis.dot(basis.z_axis).abs() < EPS);
    }

    #[test]
    fn look_at_parallel_is_nan() {
        let basis = look_at(Vec3::Y, Vec3::Y);
        assert!(basis.x_axis.is_nan());
    }

    #[test]
    fn default_state_looks_down_x() {
        let state = CameraState::default();
        assert_vec_eq(state.forward, Vec3::X, EPS);
        assert_eq!(state.origin, Vec3::ZERO);
        assert_eq!(state.focal_length, DEFAULT_FOCAL_LENGTH);
    }

    #[test]
    fn key_bindings_map_to_axes() {
        let mut controller = CameraController::default();
        controller.process_events(&[
            Event::key_down(Key::W),
            Event::key_down(Key::A),
            Event::key_down(Key::Space),
            Event::key_down(Key::E),
        ]);

        let movement = controller.state().movement;
        assert_eq!(movement.forward, 1);
        assert_eq!(movement.strafe, -1);
        assert_eq!(movement.vertical, 1);
        assert_eq!(movement.focal_rate, 1.0);
    }

    #[test]
    fn press_release_is_net_zero() {
        let mut controller = CameraController::default();
        controller.process_events(&[Event::key_down(Key::W), Event::key_up(Key::W)]);
        assert_eq!(controller.state().movement, MovementState::default());
    }

    #[test]
    fn repeated_press_counts_once() {
        let mut controller = CameraController::default();
        controller.process_events(&[
            Event::key_down(Key::D),
            Event::key_down(Key::D),
            Event::key_down(Key::D),
        ]);
        assert_eq!(controller.state().movement.strafe, 1);

        controller.process_event(&Event::key_up(Key::D));
        assert_eq!(controller.state().movement.strafe, 0);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut controller = CameraController::default();
        controller.process_event(&Event::key_up(Key::Shift));
        assert_eq!(controller.state().movement.vertical, 0);
    }

    #[test]
    fn sample_count_steps() {
        let mut controller = CameraController::default();
        assert_eq!(controller.samples(), DEFAULT_SAMPLES);

        controller.process_event(&Event::key_down(Key::R));
        assert_eq!(controller.samples(), DEFAULT_SAMPLES + SAMPLE_STEP);

        controller.process_event(&Event::key_up(Key::R));
        assert_eq!(controller.samples(), DEFAULT_SAMPLES);
    }

    #[test]
    fn sample_count_never_below_one() {
        let mut controller = CameraController::new(CameraState::default(), CAMERA_SPEED, 0);
        assert_eq!(controller.samples(), 1);

        controller.process_events(&[Event::key_down(Key::R), Event::key_up(Key::R)]);
        assert_eq!(controller.samples(), 1);
    }

    #[test]
    fn unknown_events_are_ignored() {
        let mut controller = CameraController::default();
        let before = *controller.state();
        controller.process_events(&[
            Event::None,
            Event::key_down(Key::Other(90)),
            Event::key_down(Key::Escape),
            Event::mouse_move(0.5, 0.5),
        ]);
        assert_eq!(*controller.state(), before);
    }

    #[test]
    fn drag_rotates_by_cursor_delta() {
        let mut controller = CameraController::default();
        controller.process_events(&[
            Event::button_down(MouseButton::Left, 0.0, 0.0),
            Event::mouse_move(0.2, 0.1),
        ]);

        let state = controller.state();
        assert!((state.yaw - 0.2).abs() < EPS);
        assert!((state.pitch - 0.1).abs() < EPS);
        assert_eq!(state.drag.last_cursor, Vec2::new(0.2, 0.1));
    }

    #[test]
    fn button_down_does_not_rotate() {
        let mut controller = CameraController::default();
        controller.process_event(&Event::button_down(MouseButton::Left, 0.7, -0.4));

        let state = controller.state();
        assert!(state.drag.dragging);
        assert_eq!(state.yaw, 0.0);
        assert_eq!(state.pitch, 0.0);
    }

    #[test]
    fn move_after_release_is_ignored() {
        let mut controller = CameraController::default();
        controller.process_events(&[
            Event::button_down(MouseButton::Left, 0.0, 0.0),
            Event::button_up(MouseButton::Left, 0.0, 0.0),
            Event::mouse_move(0.9, 0.9),
        ]);

        assert_eq!(controller.state().yaw, 0.0);
        assert!(!controller.state().drag.dragging);
    }

    #[test]
    fn focal_length_clamps() {
        let mut controller = CameraController::default();
        controller.process_event(&Event::key_down(Key::Q));
        controller.integrate(1.0);

        assert_eq!(controller.state().focal_length, MIN_FOCAL_LENGTH);
    }

    #[test]
    fn focal_length_grows_at_half_speed() {
        let mut controller = CameraController::default();
        controller.process_event(&Event::key_down(Key::E));
        controller.integrate(0.1);

        // 0.1 + 1 * 0.1 * 20 / 2
        assert!((controller.state().focal_length - 1.1).abs() < 1e-5);
    }

    #[test]
    fn strafe_moves_along_right() {
        let mut controller = CameraController::default();
        controller.process_event(&Event::key_down(Key::D));
        controller.integrate(0.5);

        // forward X cross up Y is +Z
        assert_vec_eq(controller.state().origin, Vec3::new(0.0, 0.0, 10.0), 1e-4);
    }

    #[test]
    fn vertical_moves_along_world_up() {
        let mut controller = CameraController::default();
        controller.process_event(&Event::key_down(Key::Shift));
        controller.integrate(0.25);

        assert_vec_eq(controller.state().origin, Vec3::new(0.0, -5.0, 0.0), 1e-4);
    }

    #[test]
    fn update_drains_queue() {
        let queue = EventQueue::new();
        let mut controller = CameraController::default();

        queue.push(Event::key_down(Key::W));
        controller.update(&queue, 0.5);

        assert!(queue.is_empty());
        assert!((controller.state().origin.x - 10.0).abs() < 1e-4);

        // Empty drain keeps integrating the held key
        controller.update(&queue, 0.5);
        assert!((controller.state().origin.x - 20.0).abs() < 1e-4);
    }
}
