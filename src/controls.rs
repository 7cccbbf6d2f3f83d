//! Orbit controls: drag to rotate around a fixed target, scroll to zoom.
//!
//! Input events only accumulate pending deltas. Nothing touches the camera
//! until [`OrbitControls::update`], which runs once per frame right before
//! rendering. With damping enabled, each update applies a fraction of the
//! pending rotation and decays the rest, so the camera keeps gliding after
//! the pointer is released until the remainder drops below [`EPS`].

use std::f32::consts::PI;

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::{camera::PerspectiveCamera, config::OrbitConfig};

/// Residual rotation (radians) below which damping stops.
pub const EPS: f32 = 1e-6;

/// Closest the camera may get to its target, whatever `min_distance` says.
pub const MIN_RADIUS: f32 = 1e-4;

/// Per-frame camera driver invoked before every render.
pub trait CameraControl {
    /// Apply pending input to `camera`. Returns whether the camera moved.
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool;

    /// Viewport dimensions in physical pixels, used to scale pointer deltas.
    fn set_viewport(&mut self, _width: u32, _height: u32) {}

    /// Feed a window event. Returns whether the event was consumed.
    fn handle_window_event(&mut self, _event: &WindowEvent) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragState {
    Idle,
    Rotating { last: PhysicalPosition<f64> },
}

/// Pending azimuth (`theta`, around +Y) and polar (`phi`, from +Y) rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SphericalDelta {
    pub theta: f32,
    pub phi: f32,
}

impl SphericalDelta {
    fn is_settled(&self) -> bool {
        self.theta.abs() < EPS && self.phi.abs() < EPS
    }
}

#[derive(Debug)]
pub struct OrbitControls {
    pub config: OrbitConfig,
    pub target: Point3<f32>,
    state: DragState,
    cursor: PhysicalPosition<f64>,
    viewport_height: f32,
    delta: SphericalDelta,
    scale: f32,
}

impl OrbitControls {
    pub fn new(config: OrbitConfig, target: Point3<f32>, viewport_height: u32) -> Self {
        Self {
            config,
            target,
            state: DragState::Idle,
            cursor: PhysicalPosition::new(0.0, 0.0),
            viewport_height: viewport_height.max(1) as f32,
            delta: SphericalDelta::default(),
            scale: 1.0,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn pending(&self) -> SphericalDelta {
        self.delta
    }

    pub fn pointer_down(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = position;
        self.state = DragState::Rotating { last: position };
    }

    pub fn pointer_move(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = position;
        if let DragState::Rotating { last } = self.state {
            let dx = (position.x - last.x) as f32 * self.config.rotate_speed;
            let dy = (position.y - last.y) as f32 * self.config.rotate_speed;
            self.rotate_left(2.0 * PI * dx / self.viewport_height);
            self.rotate_up(2.0 * PI * dy / self.viewport_height);
            self.state = DragState::Rotating { last: position };
        }
    }

    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }

    /// Positive `steps` zoom in, negative zoom out.
    pub fn wheel(&mut self, steps: f32) {
        if steps == 0.0 {
            return;
        }
        let zoom_scale = 0.95f32.powf(self.config.zoom_speed);
        if steps > 0.0 {
            self.scale *= zoom_scale;
        } else {
            self.scale /= zoom_scale;
        }
    }

    fn rotate_left(&mut self, angle: f32) {
        self.delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.delta.phi -= angle;
    }
}

impl CameraControl for OrbitControls {
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let before = camera.position;
        let offset = camera.position - self.target;
        let radius = offset.magnitude();
        if radius <= EPS {
            // No orbit is defined with the camera sitting on the target
            self.delta = SphericalDelta::default();
            return false;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let factor = if self.config.enable_damping {
            self.config.damping_factor
        } else {
            1.0
        };
        theta += self.delta.theta * factor;
        phi += self.delta.phi * factor;
        phi = phi.clamp(EPS, PI - EPS);

        let radius = (radius * self.scale)
            .clamp(self.config.min_distance, self.config.max_distance)
            .max(MIN_RADIUS);
        self.scale = 1.0;

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = Point3::from_vec(self.target.to_vec() + offset);
        camera.target = self.target;

        if self.config.enable_damping {
            self.delta.theta *= 1.0 - self.config.damping_factor;
            self.delta.phi *= 1.0 - self.config.damping_factor;
            if self.delta.is_settled() {
                self.delta = SphericalDelta::default();
            }
        } else {
            self.delta = SphericalDelta::default();
        }

        (camera.position - before).magnitude2() > EPS
    }

    fn set_viewport(&mut self, _width: u32, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                match state {
                    ElementState::Pressed => self.pointer_down(self.cursor),
                    ElementState::Released => self.pointer_up(),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_move(*position);
                matches!(self.state, DragState::Rotating { .. })
            }
            // The release may happen outside the window where we never see it
            WindowEvent::CursorLeft { .. } => {
                let was_rotating = matches!(self.state, DragState::Rotating { .. });
                self.pointer_up();
                was_rotating
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                self.wheel(steps);
                true
            }
            _ => false,
        }
    }
}
