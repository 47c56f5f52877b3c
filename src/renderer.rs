use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::window::Window;

use crate::overlay::{HudStats, Overlay};
use crate::types::SampleUniform;

const SAMPLE_SIZE: u64 = std::mem::size_of::<SampleUniform>() as u64;
/// Quad drawn per sample, two triangles generated in the vertex shader
const QUAD_VERTICES: u32 = 6;

/// Draws the SDF scene once per depth-of-field sample and blends the results
pub struct SdfRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sample_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Byte distance between consecutive samples in `sample_buffer`
    sample_stride: u64,
    sample_capacity: usize,
    staging: Vec<u8>,
    overlay: Option<Overlay>,
}

impl SdfRenderer {
    pub async fn new(window: Arc<Window>, show_overlay: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        log::info!("Using adapter: {}", adapter.get_info().name);
        let (device, queue) = Self::request_device(&adapter).await?;

        let config = Self::create_surface_config(&surface, &adapter, size);
        surface.configure(&device, &config);

        let sample_stride = stride_for(device.limits().min_uniform_buffer_offset_alignment);
        let bind_group_layout = Self::create_bind_group_layout(&device);
        let pipeline = Self::create_pipeline(&device, &bind_group_layout, config.format);

        let sample_capacity = 1;
        let sample_buffer = Self::create_sample_buffer(&device, sample_stride, sample_capacity);
        let bind_group = Self::create_bind_group(&device, &bind_group_layout, &sample_buffer);

        let overlay = show_overlay.then(|| Overlay::new(&window, &device, config.format));

        log::info!(
            "Renderer initialized: {}x{}, sample stride {} bytes",
            config.width,
            config.height,
            sample_stride
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            pipeline,
            bind_group_layout,
            sample_buffer,
            bind_group,
            sample_stride,
            sample_capacity,
            staging: Vec::new(),
            overlay,
        })
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("failed to find appropriate adapter: {e}"))
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("SDF Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("failed to create device")
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or_else(|| {
                log::warn!("No sRGB surface format, colors will look washed out");
                surface_caps.formats[0]
            });

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sample_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(SAMPLE_SIZE),
                },
                count: None,
            }],
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("SDF Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sdf.wgsl").into()),
        });
        log::info!("SDF shader module created");

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("SDF Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("SDF Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_sample_buffer(device: &wgpu::Device, stride: u64, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sample Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sample_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: NonZeroU64::new(SAMPLE_SIZE),
                }),
            }],
        })
    }

    /// Grow the sample buffer to hold at least `count` samples
    fn ensure_capacity(&mut self, count: usize) {
        if count <= self.sample_capacity {
            return;
        }

        let capacity = count.next_power_of_two();
        log::debug!("Growing sample buffer: {} -> {} samples", self.sample_capacity, capacity);
        self.sample_buffer = Self::create_sample_buffer(&self.device, self.sample_stride, capacity);
        self.bind_group =
            Self::create_bind_group(&self.device, &self.bind_group_layout, &self.sample_buffer);
        self.sample_capacity = capacity;
    }

    pub fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Reconfigure with the current size after the surface was lost
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Draw one frame: one full-screen draw per sample, then the overlay
    pub fn render(
        &mut self,
        window: &Window,
        samples: &[SampleUniform],
        stats: &HudStats,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        self.ensure_capacity(samples.len());

        pack_samples(&mut self.staging, samples, self.sample_stride as usize);
        if !self.staging.is_empty() {
            self.queue.write_buffer(&self.sample_buffer, 0, &self.staging);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("SDF Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.4,
                            a: 0.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);

            for index in 0..samples.len() {
                let offset = (index as u64 * self.sample_stride) as u32;
                render_pass.set_bind_group(0, &self.bind_group, &[offset]);
                render_pass.draw(0..QUAD_VERTICES, 0..1);
            }
        }

        if let Some(overlay) = &mut self.overlay {
            overlay.draw(
                &self.device,
                &self.queue,
                &mut encoder,
                &view,
                window,
                [self.config.width, self.config.height],
                stats,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Returns true when the overlay consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        match &mut self.overlay {
            Some(overlay) => overlay.handle_event(window, event),
            None => false,
        }
    }
}

/// Smallest multiple of the device's dynamic offset alignment that fits one sample
pub fn stride_for(alignment: u32) -> u64 {
    let alignment = alignment.max(1) as u64;
    SAMPLE_SIZE.div_ceil(alignment) * alignment
}

/// Lay out samples `stride` bytes apart, zero-filling the gaps
pub fn pack_samples(staging: &mut Vec<u8>, samples: &[SampleUniform], stride: usize) {
    staging.clear();
    staging.resize(samples.len() * stride, 0);
    for (chunk, sample) in staging.chunks_exact_mut(stride).zip(samples) {
        chunk[..SAMPLE_SIZE as usize].copy_from_slice(bytemuck::bytes_of(sample));
    }
}
