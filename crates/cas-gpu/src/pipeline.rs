//! The sharpen-and-resize compute pipeline.

use bytemuck::{Pod, Zeroable};
use cas_core::{ImageBuffer, Precision};
use tracing::{debug, warn};
use wgpu::util::DeviceExt;

use crate::context::GpuContext;
use crate::setup::{AREA_LIMIT, derive_constants, scale_supported};
use crate::shaders::{self, dispatch_extent};
use crate::{GpuError, GpuResult};

/// Color-space variant of the kernel pair, fixed at pipeline creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelColorSpace {
    /// Kernels linearize display-encoded taps and re-encode on store.
    Display,
    /// Kernels filter the stored values directly.
    Linear,
}

impl KernelColorSpace {
    /// Selects the kernel pair from the request flags.
    ///
    /// Extended-precision conversion already moves pixels into linear
    /// light, so it forces the linear pair regardless of the linear flag.
    pub fn select(precision: Precision, linear: bool) -> Self {
        if linear || precision == Precision::Extended {
            Self::Linear
        } else {
            Self::Display
        }
    }
}

/// Scaling variant, chosen per dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingVariant {
    /// General resize+sharpen kernel.
    General,
    /// Specialization used when destination size equals source size.
    FixedRatio,
}

impl ScalingVariant {
    /// `FixedRatio` iff both dimensions are unchanged.
    pub fn select(src_size: (u32, u32), dst_size: (u32, u32)) -> Self {
        if src_size == dst_size {
            Self::FixedRatio
        } else {
            Self::General
        }
    }
}

/// Kernel parameters written into the reusable uniform buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct ParamsUniform {
    const0: [f32; 4],
    const1: [f32; 4],
    src_size: [u32; 2],
    dst_size: [u32; 2],
}

/// GPU sharpen-and-resize pipeline.
///
/// Owns the device, the queue, the two kernel variants compiled for the
/// selected color space, and one parameter buffer that is overwritten
/// (never reallocated) before every dispatch. Overwriting is safe because
/// dispatches are strictly sequential: each one is submitted and waited on
/// before the next begins.
pub struct SharpenPipeline {
    context: GpuContext,
    general: wgpu::ComputePipeline,
    fixed_ratio: wgpu::ComputePipeline,
    params: wgpu::Buffer,
    color: KernelColorSpace,
}

impl SharpenPipeline {
    /// Creates a device and compiles the kernel pair for `color`.
    pub fn new(color: KernelColorSpace) -> GpuResult<Self> {
        Self::with_context(GpuContext::new()?, color)
    }

    /// Builds the pipeline on an existing context.
    pub fn with_context(context: GpuContext, color: KernelColorSpace) -> GpuResult<Self> {
        let general = Self::create_pipeline(&context, color, ScalingVariant::General);
        let fixed_ratio = Self::create_pipeline(&context, color, ScalingVariant::FixedRatio);

        let params = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sharpen_params"),
            size: std::mem::size_of::<ParamsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        debug!(
            device = context.device_name(),
            ?color,
            "sharpen pipeline ready"
        );
        Ok(Self {
            context,
            general,
            fixed_ratio,
            params,
            color,
        })
    }

    fn create_pipeline(
        context: &GpuContext,
        color: KernelColorSpace,
        scaling: ScalingVariant,
    ) -> wgpu::ComputePipeline {
        let label = match scaling {
            ScalingVariant::General => "sharpen_general",
            ScalingVariant::FixedRatio => "sharpen_fixed_ratio",
        };
        let source = shaders::source(color, scaling);
        let module = context
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        context
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: None, // Auto layout
                module: &module,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                cache: None,
            })
    }

    /// Color-space variant this pipeline was compiled for.
    pub fn color_space(&self) -> KernelColorSpace {
        self.color
    }

    /// Resizes `src` to `dst_w` x `dst_h` with sharpening.
    ///
    /// Source and destination storage, the bind group, and the staging
    /// buffer live only for this call; the parameter buffer is reused.
    /// The returned buffer keeps the source's pixel format.
    pub fn sharpen(
        &self,
        src: &ImageBuffer,
        dst_w: u32,
        dst_h: u32,
        sharpness: f32,
    ) -> GpuResult<ImageBuffer> {
        let (src_w, src_h) = (src.width(), src.height());

        if !scale_supported(src_w, src_h, dst_w, dst_h) {
            warn!(
                src_w,
                src_h,
                dst_w,
                dst_h,
                "scaling factor is greater than supported {}",
                AREA_LIMIT
            );
        }

        let (const0, const1) = derive_constants(sharpness, src_w, src_h, dst_w, dst_h);
        let uniform = ParamsUniform {
            const0,
            const1,
            src_size: [src_w, src_h],
            dst_size: [dst_w, dst_h],
        };
        self.context
            .queue
            .write_buffer(&self.params, 0, bytemuck::bytes_of(&uniform));

        let variant = ScalingVariant::select((src_w, src_h), (dst_w, dst_h));
        let pipeline = match variant {
            ScalingVariant::General => &self.general,
            ScalingVariant::FixedRatio => &self.fixed_ratio,
        };
        debug!(?variant, src_w, src_h, dst_w, dst_h, "dispatching");

        let device = &self.context.device;
        let pixels = src.to_f32_rgba();
        let src_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sharpen_src"),
            contents: bytemuck::cast_slice(&pixels),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let dst_size_bytes = dst_w as u64 * dst_h as u64 * 4 * 4;
        let dst_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sharpen_dst"),
            size: dst_size_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let layout = pipeline.get_bind_group_layout(0);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sharpen_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: src_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: dst_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.params.as_entire_binding(),
                },
            ],
        });

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sharpen_staging"),
            size: dst_size_bytes,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("sharpen_encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("sharpen_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            let (x, y, z) = dispatch_extent(dst_w, dst_h);
            pass.dispatch_workgroups(x, y, z);
        }
        encoder.copy_buffer_to_buffer(&dst_buffer, 0, &staging, 0, dst_size_bytes);
        self.context.submit_and_wait(encoder);

        // Map and read
        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        self.context.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| GpuError::OperationFailed("map channel closed".into()))?
            .map_err(|e| GpuError::OperationFailed(format!("map failed: {e}")))?;

        let data = slice.get_mapped_range();
        let result: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();

        Ok(ImageBuffer::from_f32_rgba(
            &result,
            dst_w,
            dst_h,
            src.format(),
        )?)
    }
}
