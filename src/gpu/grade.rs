// ============================================================================
// GPU GRADE PIPELINE — uploads, dispatches, and reads back one full grade
// ============================================================================

use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use wgpu::util::DeviceExt;

use super::context::GpuContext;
use crate::filters::params::FilterParams;

/// Uniform block matching `GradeUniforms` in the WGSL source. One float per
/// grading knob plus the grain seed and the target resolution (derived from
/// the source buffer, not part of FilterParams).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GradeUniforms {
    strength: f32,
    exposure: f32,
    contrast: f32,
    saturation: f32,
    temp: f32,
    tint: f32,
    fade: f32,
    vignette: f32,
    grain: f32,
    seed: f32,
    width: f32,
    height: f32,
}

impl GradeUniforms {
    fn new(params: &FilterParams, seed: u32, width: u32, height: u32) -> Self {
        Self {
            strength: params.strength,
            exposure: params.exposure,
            contrast: params.contrast,
            saturation: params.saturation,
            temp: params.temp,
            tint: params.tint,
            fade: params.fade,
            vignette: params.vignette,
            grain: params.grain,
            // The WGSL hash consumes the seed as a coordinate offset; the
            // low bits are plenty of variation and stay exactly
            // representable as f32.
            seed: (seed % 65_536) as f32,
            width: width as f32,
            height: height as f32,
        }
    }
}

/// The compiled grade pipeline. Built once per context, reused per render.
pub struct GpuGrader {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl GpuGrader {
    pub fn new(ctx: &GpuContext) -> Self {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("grade_shader"),
            source: wgpu::ShaderSource::Wgsl(super::shaders::GRADE_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grade_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grade_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("grade_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "cs_grade",
            compilation_options: Default::default(),
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    /// Grade a full buffer on the GPU. Pure with respect to `source`; the
    /// result is a fresh buffer of identical dimensions.
    pub fn render(
        &self,
        ctx: &GpuContext,
        source: &RgbaImage,
        params: &FilterParams,
        seed: u32,
    ) -> Result<RgbaImage, String> {
        let (w, h) = source.dimensions();
        if w == 0 || h == 0 {
            return Ok(RgbaImage::new(w, h));
        }
        if !ctx.supports_size(w, h) {
            return Err(format!(
                "image {}×{} exceeds the device texture limit of {}",
                w, h, ctx.max_texture_dim
            ));
        }

        let device = &ctx.device;
        let queue = &ctx.queue;

        let src_tex = upload_rgba(device, queue, source.as_raw(), w, h, "grade_src");
        let dst_tex = create_output_texture(device, w, h, "grade_dst");

        let uniforms = GradeUniforms::new(params, seed, w, h);
        let params_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grade_params"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let src_view = src_tex.create_view(&wgpu::TextureViewDescriptor::default());
        let dst_view = dst_tex.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grade_bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&src_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&dst_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buf.as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("grade_encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("grade_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(w.div_ceil(16), h.div_ceil(16), 1);
        }
        queue.submit(std::iter::once(encoder.finish()));

        let raw = readback_texture(ctx, &dst_tex, w, h)?;
        RgbaImage::from_raw(w, h, raw).ok_or_else(|| "readback returned short buffer".to_string())
    }
}

fn create_output_texture(device: &wgpu::Device, w: u32, h: u32, label: &str) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    data: &[u8],
    w: u32,
    h: u32,
    label: &str,
) -> wgpu::Texture {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &tex,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * w),
            rows_per_image: Some(h),
        },
        wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
    );
    tex
}

/// Copy a texture into a mapped staging buffer and strip the 256-byte row
/// padding WGPU requires.
fn readback_texture(
    ctx: &GpuContext,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    let device = &ctx.device;
    let queue = &ctx.queue;

    let bytes_per_row = (width * 4).div_ceil(super::COPY_BYTES_PER_ROW_ALIGNMENT)
        * super::COPY_BYTES_PER_ROW_ALIGNMENT;
    let buffer_size = (bytes_per_row * height) as u64;

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("grade_readback"),
        size: buffer_size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback_encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &staging,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::Maintain::Wait);
    match rx.recv() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(format!("readback map error: {:?}", e)),
        Err(e) => return Err(format!("readback channel error: {:?}", e)),
    }

    let mapped = slice.get_mapped_range();
    let actual_row = (width * 4) as usize;
    let mut result = Vec::with_capacity(actual_row * height as usize);
    for y in 0..height as usize {
        let start = y * bytes_per_row as usize;
        result.extend_from_slice(&mapped[start..start + actual_row]);
    }
    drop(mapped);
    staging.unmap();

    Ok(result)
}
