use std::{cell::RefCell, rc::Rc};

use sphere_shell::{
    camera::PerspectiveCamera,
    config::SceneConfig,
    controls::CameraControl,
    data_structures::instance::TransformGenerator,
    flow::{FrameOutcome, RenderSurface},
    scene::{Scene, build_scene},
};

/// Shared, ordered record of calls made on the test doubles.
pub(crate) type CallLog = Rc<RefCell<Vec<&'static str>>>;

pub(crate) fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// A render surface that only remembers what it was asked to do.
pub(crate) struct RecordingSurface {
    pub(crate) log: CallLog,
    pub(crate) size: (u32, u32),
    pub(crate) rendered_aspects: Vec<f32>,
    /// Errors handed out by upcoming `render` calls, front first.
    pub(crate) pending_errors: Vec<wgpu::SurfaceError>,
    /// Upcoming `render` calls that report the surface as not ready.
    pub(crate) frames_to_skip: usize,
}

impl RecordingSurface {
    pub(crate) fn new(log: CallLog, width: u32, height: u32) -> Self {
        Self {
            log,
            size: (width, height),
            rendered_aspects: Vec::new(),
            pending_errors: Vec::new(),
            frames_to_skip: 0,
        }
    }
}

impl RenderSurface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.log.borrow_mut().push("resize");
        self.size = (width, height);
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn render(
        &mut self,
        _: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<FrameOutcome, wgpu::SurfaceError> {
        self.log.borrow_mut().push("render");
        self.rendered_aspects.push(camera.aspect);
        if !self.pending_errors.is_empty() {
            return Err(self.pending_errors.remove(0));
        }
        if self.frames_to_skip > 0 {
            self.frames_to_skip -= 1;
            return Ok(FrameOutcome::Skipped);
        }
        Ok(FrameOutcome::Presented)
    }
}

/// Camera control that never moves the camera.
pub(crate) struct RecordingControls {
    pub(crate) log: CallLog,
    pub(crate) viewport: (u32, u32),
}

impl RecordingControls {
    pub(crate) fn new(log: CallLog) -> Self {
        Self {
            log,
            viewport: (0, 0),
        }
    }
}

impl CameraControl for RecordingControls {
    fn update(&mut self, _: &mut PerspectiveCamera) -> bool {
        self.log.borrow_mut().push("update");
        false
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }
}

pub(crate) fn seeded_scene(config: &SceneConfig, seed: u64) -> Scene {
    let mut generator =
        TransformGenerator::seeded(seed, config.shell_radius.clone(), config.scale.clone());
    build_scene(config, &mut generator)
}

pub(crate) fn default_camera(width: u32, height: u32) -> PerspectiveCamera {
    PerspectiveCamera::from_config(&SceneConfig::default().camera, width, height)
}
