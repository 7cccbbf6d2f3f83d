//! Frame flow: the application context and the redraw loop.
//!
//! All long-lived state (scene, camera, render surface, orbit controls) is
//! bundled into one [`AppContext`]. Every frame runs [`AppContext::frame`],
//! which advances the controls and then renders, in that order, so the
//! rendered camera is never a frame behind the input.
//!
//! [`FrameScheduler`] is the redraw loop itself. It runs the frame callback
//! once per signal from an injected [`Refresh`] source, which lets the loop be
//! driven by a channel in tests and headless runs. On a display the winit
//! event loop plays the same role (see [`crate::app`]): every
//! `RedrawRequested` runs one frame and requests the next.

use std::sync::mpsc;

use crate::{camera::PerspectiveCamera, controls::CameraControl, scene::Scene};

/// What a successful [`RenderSurface::render`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// The surface was not ready to draw into (e.g. not configured yet).
    Skipped,
}

/// Where frames are drawn.
pub trait RenderSurface {
    /// Retarget the output buffers to `width` x `height` physical pixels.
    fn resize(&mut self, width: u32, height: u32);

    /// Current output size in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Draw `scene` from `camera`'s point of view.
    fn render(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<FrameOutcome, wgpu::SurfaceError>;
}

/// Single owner of all per-application state.
pub struct AppContext<S, C> {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub surface: S,
    pub controls: C,
    frames: u64,
}

impl<S: RenderSurface, C: CameraControl> AppContext<S, C> {
    pub fn new(scene: Scene, mut camera: PerspectiveCamera, surface: S, mut controls: C) -> Self {
        let (width, height) = surface.size();
        camera.resize(width, height);
        controls.set_viewport(width, height);
        Self {
            scene,
            camera,
            surface,
            controls,
            frames: 0,
        }
    }

    /// Apply a viewport change to the camera and the surface together.
    ///
    /// Zero-sized viewports (a minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.resize(width, height);
        self.controls.set_viewport(width, height);
        self.surface.resize(width, height);
    }

    /// Run one frame: advance the controls, then render.
    pub fn frame(&mut self) {
        self.controls.update(&mut self.camera);
        match self.surface.render(&self.scene, &self.camera) {
            Ok(FrameOutcome::Presented) => self.frames += 1,
            Ok(FrameOutcome::Skipped) => log::trace!("surface not ready, frame skipped"),
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = self.surface.size();
                log::warn!("surface lost or outdated, reconfiguring at {}x{}", width, height);
                self.surface.resize(width, height);
            }
            Err(wgpu::SurfaceError::Timeout) => log::warn!("surface timed out, skipping frame"),
            Err(e) => log::error!("Unable to render {}", e),
        }
    }

    /// Frames rendered successfully so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Drive this context from `scheduler` until its refresh source ends.
    pub fn run<R: Refresh>(&mut self, scheduler: &mut FrameScheduler<R>) -> u64 {
        scheduler.start(|| self.frame())
    }
}

/// Blocks until the next display refresh.
pub trait Refresh {
    /// Returns `false` once the host has gone away and no more frames follow.
    fn wait_for_refresh(&mut self) -> bool;
}

impl Refresh for mpsc::Receiver<()> {
    fn wait_for_refresh(&mut self) -> bool {
        self.recv().is_ok()
    }
}

pub struct FrameScheduler<R> {
    refresh: R,
}

impl<R: Refresh> FrameScheduler<R> {
    pub fn new(refresh: R) -> Self {
        Self { refresh }
    }

    /// Run `callback` once per refresh until the refresh source ends.
    /// Returns the number of frames run.
    pub fn start<F: FnMut()>(&mut self, mut callback: F) -> u64 {
        let mut frames = 0;
        while self.refresh.wait_for_refresh() {
            callback();
            frames += 1;
        }
        log::debug!("frame scheduler stopped after {} frames", frames);
        frames
    }
}
