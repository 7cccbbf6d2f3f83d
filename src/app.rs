//! Windowed application shell.
//!
//! [`run`] opens a window, builds the [`AppContext`] for it and hands control
//! to the winit event loop. Input goes to the orbit controls as it arrives,
//! resizes are applied on the spot, and every `RedrawRequested` renders one
//! frame and asks for the next, which keeps redraws paced by the display's
//! vsync.
//!
//! GPU setup is async. Natively it is driven to completion on a tokio
//! runtime; on the web it runs on the browser's executor and the finished
//! context is delivered back to the event loop as an [`AppEvent`].

use std::{fmt::Debug, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    camera::PerspectiveCamera,
    config::SceneConfig,
    context::Context,
    controls::{CameraControl, OrbitControls},
    data_structures::instance::TransformGenerator,
    flow::{AppContext, RenderSurface},
    scene::build_scene,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub type WindowedApp = AppContext<Context, OrbitControls>;

const FRAME_REPORT_INTERVAL: Duration = Duration::from_secs(5);

pub(crate) enum AppEvent {
    #[allow(dead_code)]
    Initialized(Box<WindowedApp>),
    #[allow(dead_code)]
    Failed(anyhow::Error),
}

impl Debug for AppEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized(AppContext)"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

/// Build every long-lived object for `window`, in startup order.
pub async fn build_app_context(
    window: Arc<Window>,
    config: SceneConfig,
) -> anyhow::Result<WindowedApp> {
    let size = window.inner_size();
    let camera = PerspectiveCamera::from_config(&config.camera, size.width, size.height);
    let mut generator =
        TransformGenerator::from_entropy(config.shell_radius.clone(), config.scale.clone());
    let scene = build_scene(&config, &mut generator);
    let surface = Context::new(window, &config, &camera, &scene.lights).await?;
    let controls = OrbitControls::new(config.orbit.clone(), camera.target, size.height);
    Ok(AppContext::new(scene, camera, surface, controls))
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: EventLoopProxy<AppEvent>,
    config: SceneConfig,
    state: Option<WindowedApp>,
    error: Option<anyhow::Error>,
    last_report: Instant,
    frames_at_report: u64,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            config,
            state: None,
            error: None,
            last_report: Instant::now(),
            frames_at_report: 0,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("App initialization failed: {:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Arc<Window>> {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("sphere-shell");

        #[cfg(target_arch = "wasm32")]
        {
            use anyhow::Context as _;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = web_sys::window().context("no browser window")?;
            let document = window.document().context("no document")?;
            let canvas = document
                .get_element_by_id(CANVAS_ID)
                .context("no canvas element with id \"canvas\"")?;
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        Ok(Arc::new(event_loop.create_window(window_attributes)?))
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = match self.create_window(event_loop) {
            Ok(window) => window,
            Err(e) => return self.fail(event_loop, e),
        };
        let init_future = build_app_context(window, self.config.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(app) => {
                    log::info!("initialized at {:?}", app.surface.size());
                    app.surface.window().request_redraw();
                    self.state = Some(app);
                }
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok(app) => AppEvent::Initialized(Box::new(app)),
                    Err(e) => AppEvent::Failed(e),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("event loop closed before initialization finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Initialized(app) => {
                // This is the message from our wasm `spawn_local`
                let mut app = *app;
                // The canvas may have been laid out while the GPU was set up
                let size = app.surface.window().inner_size();
                app.resize(size.width, size.height);
                app.surface.window().request_redraw();
                self.state = Some(app);
            }
            AppEvent::Failed(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let app = match &mut self.state {
            Some(app) => app,
            None => return,
        };

        if app.controls.handle_window_event(&event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => app.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                app.frame();
                report_frame_rate(&mut self.last_report, &mut self.frames_at_report, app.frames());
                // invoke main render loop
                app.surface.window().request_redraw();
            }
            _ => {}
        }
    }
}

fn report_frame_rate(last_report: &mut Instant, frames_at_report: &mut u64, frames: u64) {
    let elapsed = last_report.elapsed();
    if elapsed < FRAME_REPORT_INTERVAL {
        return;
    }
    let rendered = frames - *frames_at_report;
    log::debug!("{:.1} fps", rendered as f64 / elapsed.as_secs_f64());
    *last_report = Instant::now();
    *frames_at_report = frames;
}

/// Open a window and render the scene described by `config` until the window
/// is closed.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            eprintln!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)?;
    }

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run(SceneConfig::default()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
