// Display context - GPU device, swap chain and the atlas texture
//
// Created once from the presentation window and kept until shutdown. Setup
// chooses a surface, disables vsync throttling unless asked for it, builds
// a nearest-filtered power-of-two texture from the blank atlas, and bakes
// the scaled quad into a vertex buffer. Presenting re-uploads only the live
// rectangle, draws the quad and swaps.

use super::atlas::AtlasBuffer;
use super::geometry::{
    ortho_projection, tex_coord_quad, DisplayGeometry, GeometryError, QUAD_INDICES,
};
use crate::emulator::{PresentOutcome, Presenter, VideoConfig};
use bytemuck::{Pod, Zeroable};
use std::sync::Arc;
use thiserror::Error;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Fatal display failures
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("no display surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create rendering context: {0}")]
    NoDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface offers no usable texture format")]
    NoSurfaceFormat,

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("surface failure: {0}")]
    Surface(wgpu::SurfaceError),
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct QuadVertex {
    position: [f32; 2],
    tex_coord: [f32; 2],
}

impl QuadVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Projection {
    matrix: [[f32; 4]; 4],
}

/// Pair the destination corners with the atlas texture corners
pub(crate) fn quad_vertices(geometry: &DisplayGeometry, extent: (f32, f32)) -> [QuadVertex; 4] {
    let positions = geometry.quad_vertices();
    let tex_coords = tex_coord_quad(extent);

    std::array::from_fn(|i| QuadVertex {
        position: [positions[i][0] as f32, positions[i][1] as f32],
        tex_coord: tex_coords[i],
    })
}

/// Atlas texture format matching the surface's encoding
///
/// An sRGB surface re-encodes what an sRGB texture linearizes; a linear
/// surface needs a linear texture so the bytes pass through unchanged.
pub(crate) fn atlas_texture_format(surface_format: wgpu::TextureFormat) -> wgpu::TextureFormat {
    if surface_format.is_srgb() {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    }
}

/// Source layout and extent of the per-frame partial upload
pub(crate) fn upload_layout(atlas: &AtlasBuffer) -> (wgpu::TexelCopyBufferLayout, wgpu::Extent3d) {
    let layout = wgpu::TexelCopyBufferLayout {
        offset: 0,
        bytes_per_row: Some(atlas.bytes_per_row() as u32),
        rows_per_image: Some(atlas.logical_height() as u32),
    };
    let extent = wgpu::Extent3d {
        width: atlas.logical_width() as u32,
        height: atlas.logical_height() as u32,
        depth_or_array_layers: 1,
    };
    (layout, extent)
}

/// What to do after a failed frame acquire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Recovery {
    /// Skip this frame and try again next iteration
    Skip,
    /// Reconfigure the surface, then skip this frame
    Reconfigure,
}

/// Tracks surface failures between successful presents
///
/// One failed acquire is retried on the next frame. A second failure in a
/// row, or any failure other than timeout/outdated/lost, is fatal.
#[derive(Debug, Default)]
pub(crate) struct SurfaceRecovery {
    retrying: bool,
}

impl SurfaceRecovery {
    pub(crate) fn on_error(&mut self, err: wgpu::SurfaceError) -> Result<Recovery, DisplayError> {
        let recovery = match err {
            wgpu::SurfaceError::Timeout => Recovery::Skip,
            wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost => Recovery::Reconfigure,
            err => return Err(DisplayError::Surface(err)),
        };

        if self.retrying {
            return Err(DisplayError::Surface(err));
        }
        self.retrying = true;
        Ok(recovery)
    }

    pub(crate) fn on_success(&mut self) {
        self.retrying = false;
    }
}

/// Owns the GPU side of presentation
pub struct DisplayContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    texture: wgpu::Texture,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    geometry: DisplayGeometry,
    recovery: SurfaceRecovery,
    window: Arc<Window>,
}

impl DisplayContext {
    /// Set up presentation into `window` for frames shaped like `atlas`
    ///
    /// `screen` is the physical size being presented to. It sizes the
    /// swap chain and fixes the geometry for the lifetime of the context.
    pub fn initialize(
        window: Arc<Window>,
        screen: PhysicalSize<u32>,
        atlas: &AtlasBuffer,
        video: &VideoConfig,
    ) -> Result<Self, DisplayError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(Arc::clone(&window))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))?;
        let info = adapter.get_info();
        log::info!("Using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("gb_present_device"),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                .using_resolution(adapter.limits()),
            ..Default::default()
        }))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(DisplayError::NoSurfaceFormat)?;

        // Pacing comes from the frame divisor and the blocking swap, not from
        // a swap interval.
        let present_mode = if video.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: screen.width.max(1),
            height: screen.height.max(1),
            present_mode,
            desired_maximum_frame_latency: 2,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);

        let geometry = DisplayGeometry::compute(
            surface_config.width,
            surface_config.height,
            atlas.logical_width() as u32,
            atlas.logical_height() as u32,
            video.undersized_screen,
        )?;
        log::info!(
            "Screen {}x{}, zoom {}x, destination {}x{} at ({}, {}), {:?}",
            geometry.screen_width,
            geometry.screen_height,
            geometry.zoom,
            geometry.width,
            geometry.height,
            geometry.offset_x,
            geometry.offset_y,
            present_mode
        );

        let texture_format = atlas_texture_format(format);
        let texture = device.create_texture_with_data(
            &queue,
            &wgpu::TextureDescriptor {
                label: Some("gb_present_atlas"),
                size: wgpu::Extent3d {
                    width: atlas.width() as u32,
                    height: atlas.height() as u32,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: texture_format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            atlas.as_bytes(),
        );
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("gb_present_atlas_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let projection = Projection {
            matrix: ortho_projection(surface_config.width, surface_config.height),
        };
        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gb_present_projection"),
            contents: bytemuck::bytes_of(&projection),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let vertices = quad_vertices(&geometry, atlas.tex_coord_extent());
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gb_present_quad_vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gb_present_quad_indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gb_present_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<Projection>() as u64
                        ),
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gb_present_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: projection_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::include_wgsl!("shaders/atlas_quad.wgsl"));

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gb_present_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gb_present_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[QuadVertex::layout()],
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            texture,
            pipeline,
            bind_group,
            vertex_buffer,
            index_buffer,
            geometry,
            recovery: SurfaceRecovery::default(),
            window,
        })
    }

    /// Placement computed at startup
    pub fn geometry(&self) -> &DisplayGeometry {
        &self.geometry
    }

    /// Partial update of the live W×H rectangle
    fn upload(&self, atlas: &AtlasBuffer) {
        let (layout, extent) = upload_layout(atlas);
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            atlas.used_rows(),
            layout,
            extent,
        );
    }
}

impl Presenter for DisplayContext {
    type Error = DisplayError;

    fn present(&mut self, atlas: &AtlasBuffer) -> Result<PresentOutcome, DisplayError> {
        self.upload(atlas);

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                match self.recovery.on_error(err)? {
                    Recovery::Skip => log::warn!("Surface timed out, frame skipped"),
                    Recovery::Reconfigure => {
                        log::warn!("Surface outdated or lost, reconfiguring");
                        self.surface.configure(&self.device, &self.surface_config);
                    }
                }
                return Ok(PresentOutcome::Skipped);
            }
        };
        self.recovery.on_success();

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gb_present_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gb_present_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
        }

        self.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        frame.present();

        Ok(PresentOutcome::Presented)
    }
}
