//! GPU context and render surface.
//!
//! [`Renderer`] owns the device, queue, pipeline and every GPU resource the
//! scene needs, and knows how to draw a [`Scene`] into any texture view.
//! [`Context`] adds the window surface on top: it is the render surface the
//! frame loop presents to, with its pixel ratio, sRGB output format and
//! tone-mapping policy.

use std::{iter, sync::Arc};

use anyhow::Context as _;
use instant::Duration;
use winit::window::Window;

use crate::{
    camera::{CameraResources, PerspectiveCamera},
    config::SceneConfig,
    data_structures::{
        instanced_mesh::GpuInstancedMesh,
        material,
        model::DrawModel,
        texture::Texture,
    },
    flow::{FrameOutcome, RenderSurface},
    light::{LightResources, LightSet},
    pipelines::physical::{ToneMapping, mk_physical_pipeline},
    render::{Instanced, Render},
    scene::Scene,
};

/// Request an adapter and a device, optionally compatible with `surface`.
pub async fn request_device(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
) -> anyhow::Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .context("no suitable GPU adapter found")?;
    log::info!("using adapter {:?}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            // WebGL doesn't support all of wgpu's features, so if
            // we're building for the web we'll have to disable some.
            required_limits: if cfg!(target_arch = "wasm32") {
                wgpu::Limits::downlevel_webgl2_defaults()
            } else {
                wgpu::Limits::default()
            },
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
        })
        .await
        .context("failed to create the GPU device")?;
    Ok((adapter, device, queue))
}

/// Highest supported sample count not above `requested`.
fn supported_sample_count(
    adapter: &wgpu::Adapter,
    format: wgpu::TextureFormat,
    requested: u32,
) -> u32 {
    let flags = adapter.get_texture_format_features(format).flags;
    let depth_flags = adapter.get_texture_format_features(Texture::DEPTH_FORMAT).flags;
    let count = [requested, 4, 2]
        .into_iter()
        .filter(|count| *count <= requested && *count > 1)
        .find(|count| {
            flags.sample_count_supported(*count) && depth_flags.sample_count_supported(*count)
        })
        .unwrap_or(1);
    if count != requested {
        log::warn!("{}x MSAA is not supported, falling back to {}x", requested, count);
    }
    count
}

/// Everything needed to draw a scene, independent of where the pixels go.
pub struct Renderer {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub format: wgpu::TextureFormat,
    pub sample_count: u32,
    pub tone_mapping: ToneMapping,
    pub clear_colour: wgpu::Color,
    pub camera: CameraResources,
    pub light: LightResources,
    size: [u32; 2],
    depth_texture: Texture,
    msaa_texture: Option<Texture>,
    pipeline: wgpu::RenderPipeline,
    material_layout: wgpu::BindGroupLayout,
    meshes: Vec<GpuInstancedMesh>,
}

impl Renderer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        format: wgpu::TextureFormat,
        size: [u32; 2],
        sample_count: u32,
        config: &SceneConfig,
        camera: &PerspectiveCamera,
        lights: &LightSet,
    ) -> Self {
        let camera = CameraResources::new(&device, camera);
        let light = LightResources::new(&device, lights);
        let material_layout = material::mk_bind_group_layout(&device);
        let pipeline = mk_physical_pipeline(
            &device,
            format,
            sample_count,
            config.tone_mapping,
            &material_layout,
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );
        let depth_texture =
            Texture::create_depth_texture(&device, size, sample_count, "depth_texture");
        let msaa_texture = (sample_count > 1)
            .then(|| Texture::create_msaa_texture(&device, size, sample_count, format));

        Self {
            device,
            queue,
            format,
            sample_count,
            tone_mapping: config.tone_mapping,
            clear_colour: config.clear_colour,
            camera,
            light,
            size,
            depth_texture,
            msaa_texture,
            pipeline,
            material_layout,
            meshes: Vec::new(),
        }
    }

    /// A renderer without any window, drawing into offscreen textures only.
    pub async fn headless(
        size: [u32; 2],
        config: &SceneConfig,
        camera: &PerspectiveCamera,
        lights: &LightSet,
    ) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let (adapter, device, queue) = request_device(&instance, None).await?;
        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let sample_count = supported_sample_count(&adapter, format, config.msaa_samples);
        Ok(Self::new(
            device,
            queue,
            format,
            size,
            sample_count,
            config,
            camera,
            lights,
        ))
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    /// Recreate the size-dependent render targets.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = [width, height];
        self.depth_texture =
            Texture::create_depth_texture(&self.device, self.size, self.sample_count, "depth_texture");
        self.msaa_texture = (self.sample_count > 1).then(|| {
            Texture::create_msaa_texture(&self.device, self.size, self.sample_count, self.format)
        });
    }

    /// Bring GPU buffers in line with `scene` and `camera`.
    fn prepare(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        for (index, source) in scene.meshes().iter().enumerate() {
            match self.meshes.get_mut(index) {
                Some(gpu) => gpu.write_to_buffer(&self.queue, source),
                None => self.meshes.push(GpuInstancedMesh::new(
                    &self.device,
                    &self.material_layout,
                    source,
                )),
            }
        }
        self.meshes.truncate(scene.meshes().len());
        self.camera.write_to_buffer(&self.queue, camera);
        self.light.write_to_buffer(&self.queue, &scene.lights);
    }

    /// Draw `scene` as seen by `camera` into `target` and submit the work.
    ///
    /// `target` must have this renderer's format and size.
    pub fn draw(&mut self, target: &wgpu::TextureView, scene: &Scene, camera: &PerspectiveCamera) {
        self.prepare(scene, camera);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let (view, resolve_target, store) = match &self.msaa_texture {
                Some(msaa) => (&msaa.view, Some(target), wgpu::StoreOp::Discard),
                None => (target, None, wgpu::StoreOp::Store),
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut basics: Vec<Instanced> = Vec::new();
            Render::from(self.meshes.as_slice()).collect(&mut basics);

            render_pass.set_pipeline(&self.pipeline);
            for instanced in basics {
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_mesh_instanced(
                    instanced.mesh,
                    0..instanced.amount as u32,
                    instanced.material,
                    &self.camera.bind_group,
                    &self.light.bind_group,
                );
            }
        }
        self.queue.submit(iter::once(encoder.finish()));
    }

    /// Render one frame offscreen and read it back.
    pub async fn render_to_image(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> anyhow::Result<image::RgbaImage> {
        let [width, height] = self.size;
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Readback Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        self.draw(
            &texture.create_view(&wgpu::TextureViewDescriptor::default()),
            scene,
            camera,
        );

        // Rows copied out of a texture must be aligned to 256 bytes
        let unpadded_bytes_per_row = 4 * width;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;
        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            extent,
        );
        self.queue.submit(iter::once(encoder.finish()));

        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
        self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })?;
        rx.receive()
            .await
            .context("readback buffer was dropped before mapping")??;

        let data = buffer_slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
        for row in data.chunks(padded_bytes_per_row as usize) {
            pixels.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
        }
        drop(data);
        output_buffer.unmap();

        if matches!(
            self.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            pixels.chunks_exact_mut(4).for_each(|pixel| pixel.swap(0, 2));
        }
        image::RgbaImage::from_raw(width, height, pixels)
            .context("readback size does not match the render target")
    }
}

/// The on-screen render surface.
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    pub pixel_ratio: f64,
    pub renderer: Renderer,
    is_surface_configured: bool,
}

impl Context {
    pub async fn new(
        window: Arc<Window>,
        scene_config: &SceneConfig,
        camera: &PerspectiveCamera,
        lights: &LightSet,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::debug!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create a surface for the window")?;
        let (adapter, device, queue) = request_device(&instance, Some(&surface)).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colour and relies on an sRGB target to encode it
        let surface_format = match surface_caps.formats.iter().copied().find(|f| f.is_srgb()) {
            Some(format) => format,
            None => {
                let format = *surface_caps
                    .formats
                    .first()
                    .context("the surface reports no supported formats")?;
                log::warn!("no sRGB surface format available, colours will look dark ({:?})", format);
                format
            }
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        let sample_count =
            supported_sample_count(&adapter, surface_format, scene_config.msaa_samples);

        let renderer = Renderer::new(
            device,
            queue,
            surface_format,
            [size.width, size.height],
            sample_count,
            scene_config,
            camera,
            lights,
        );

        let mut ctx = Self {
            pixel_ratio: window.scale_factor(),
            window,
            surface,
            config,
            renderer,
            is_surface_configured: false,
        };
        ctx.resize(size.width, size.height);
        Ok(ctx)
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl RenderSurface for Context {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.pixel_ratio = self.window.scale_factor();
            self.surface.configure(&self.renderer.device, &self.config);
            self.renderer.resize(width, height);
            self.is_surface_configured = true;
            log::debug!(
                "surface resized to {}x{} (pixel ratio {})",
                width,
                height,
                self.pixel_ratio
            );
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn render(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<FrameOutcome, wgpu::SurfaceError> {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(FrameOutcome::Skipped);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer.draw(&view, scene, camera);
        output.present();
        Ok(FrameOutcome::Presented)
    }
}
