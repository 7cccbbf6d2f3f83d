use cgmath::{MetricSpace, Point3};
use sphere_shell::{
    config::OrbitConfig,
    controls::{CameraControl, DragState, OrbitControls},
};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceId, WindowEvent},
};

use crate::common::test_utils::default_camera;

mod common;

fn controls(config: OrbitConfig) -> OrbitControls {
    OrbitControls::new(config, Point3::new(0.0, 0.0, 0.0), 600)
}

fn drag(controls: &mut OrbitControls, dx: f64, dy: f64) {
    controls.pointer_down(PhysicalPosition::new(400.0, 300.0));
    controls.pointer_move(PhysicalPosition::new(400.0 + dx, 300.0 + dy));
    controls.pointer_up();
}

#[test]
fn should_leave_camera_alone_without_input() {
    let mut camera = default_camera(800, 600);
    let before = camera.position;
    let mut controls = controls(OrbitConfig::default());

    assert!(!controls.update(&mut camera));
    assert!(camera.position.distance(before) < 1e-4);
}

#[test]
fn should_ignore_pointer_motion_without_button() {
    let mut controls = controls(OrbitConfig::default());

    controls.pointer_move(PhysicalPosition::new(10.0, 10.0));

    assert_eq!(controls.state(), DragState::Idle);
    assert_eq!(controls.pending().theta, 0.0);
    assert_eq!(controls.pending().phi, 0.0);
}

#[test]
fn should_keep_orbiting_after_release_until_settled() {
    let mut camera = default_camera(800, 600);
    let mut controls = controls(OrbitConfig::default());
    drag(&mut controls, 60.0, 0.0);
    assert_eq!(controls.state(), DragState::Idle);

    // Pointer is already up; motion still comes from the damped remainder
    assert!(controls.update(&mut camera));
    let mut frames = 1;
    while controls.pending().theta != 0.0 && frames < 1000 {
        controls.update(&mut camera);
        frames += 1;
    }

    assert!(frames > 1 && frames < 1000, "settled after {} frames", frames);
    let settled = camera.position;
    assert!(!controls.update(&mut camera));
    assert!(camera.position.distance(settled) < 1e-4);
}

#[test]
fn should_apply_whole_rotation_at_once_without_damping() {
    let mut camera = default_camera(800, 600);
    let mut controls = controls(OrbitConfig {
        enable_damping: false,
        ..Default::default()
    });
    drag(&mut controls, 60.0, 0.0);

    assert!(controls.update(&mut camera));
    assert_eq!(controls.pending().theta, 0.0);
    assert!(!controls.update(&mut camera));
}

#[test]
fn should_keep_distance_while_rotating() {
    let mut camera = default_camera(800, 600);
    let mut controls = controls(OrbitConfig::default());
    drag(&mut controls, 120.0, -80.0);

    for _ in 0..100 {
        controls.update(&mut camera);
        approx::assert_relative_eq!(
            camera.position.distance(Point3::new(0.0, 0.0, 0.0)),
            25.0,
            max_relative = 1e-4
        );
        assert_eq!(camera.target, Point3::new(0.0, 0.0, 0.0));
    }
}

#[test]
fn should_not_flip_over_the_pole() {
    let mut camera = default_camera(800, 600);
    let mut controls = controls(OrbitConfig {
        enable_damping: false,
        ..Default::default()
    });
    // Far more than half a turn upwards
    drag(&mut controls, 0.0, 2000.0);
    controls.update(&mut camera);

    // Stopped just short of straight above the target, still on the near side
    approx::assert_relative_eq!(camera.position.y, 25.0, max_relative = 1e-4);
    assert!(camera.position.z >= 0.0, "z {}", camera.position.z);
    assert!(camera.position.x.is_finite() && camera.position.z.is_finite());
}

#[test]
fn should_zoom_in_and_out() {
    let mut camera = default_camera(800, 600);
    let mut controls = controls(OrbitConfig::default());

    controls.wheel(1.0);
    controls.update(&mut camera);
    let zoomed_in = camera.position.distance(Point3::new(0.0, 0.0, 0.0));
    approx::assert_relative_eq!(zoomed_in, 25.0 * 0.95, max_relative = 1e-4);

    controls.wheel(-1.0);
    controls.update(&mut camera);
    let restored = camera.position.distance(Point3::new(0.0, 0.0, 0.0));
    approx::assert_relative_eq!(restored, 25.0, max_relative = 1e-4);
}

#[test]
fn should_clamp_zoom_to_distance_limits() {
    let mut camera = default_camera(800, 600);
    let mut controls = controls(OrbitConfig {
        min_distance: 20.0,
        max_distance: 30.0,
        ..Default::default()
    });

    for _ in 0..50 {
        controls.wheel(1.0);
        controls.update(&mut camera);
    }
    approx::assert_relative_eq!(
        camera.position.distance(Point3::new(0.0, 0.0, 0.0)),
        20.0,
        max_relative = 1e-4
    );

    for _ in 0..50 {
        controls.wheel(-1.0);
        controls.update(&mut camera);
    }
    approx::assert_relative_eq!(
        camera.position.distance(Point3::new(0.0, 0.0, 0.0)),
        30.0,
        max_relative = 1e-4
    );
}

#[test]
fn should_recover_from_zooming_all_the_way_in() {
    let mut camera = default_camera(800, 600);
    let mut controls = controls(OrbitConfig::default());

    for _ in 0..400 {
        controls.wheel(1.0);
        controls.update(&mut camera);
    }
    let closest = camera.position.distance(Point3::new(0.0, 0.0, 0.0));
    assert!(closest > 0.0, "camera collapsed onto its target");

    for _ in 0..200 {
        controls.wheel(-1.0);
        controls.update(&mut camera);
    }
    let distance = camera.position.distance(Point3::new(0.0, 0.0, 0.0));
    assert!(distance > 100.0 * closest, "distance {} after zooming out", distance);
    assert!(distance > 0.1, "distance {} after zooming out", distance);
}

#[test]
fn should_end_drag_when_cursor_leaves_window() {
    let mut controls = controls(OrbitConfig::default());
    controls.pointer_down(PhysicalPosition::new(400.0, 300.0));

    // SAFETY: the id is only compared, never dereferenced
    let device_id = unsafe { DeviceId::dummy() };
    let consumed = controls.handle_window_event(&WindowEvent::CursorLeft { device_id });

    assert!(consumed);
    assert_eq!(controls.state(), DragState::Idle);
    controls.pointer_move(PhysicalPosition::new(450.0, 300.0));
    assert_eq!(controls.pending().theta, 0.0);
}

#[test]
fn should_leave_unrelated_events_to_the_window() {
    let mut controls = controls(OrbitConfig::default());

    assert!(!controls.handle_window_event(&WindowEvent::CloseRequested));
    assert!(!controls.handle_window_event(&WindowEvent::RedrawRequested));
}
