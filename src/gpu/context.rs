// ============================================================================
// GPU CONTEXT — wgpu Device, Queue, and adapter initialization
// ============================================================================

use std::sync::Arc;

/// Holds the core wgpu resources for the GPU grading backend.
/// Created once at startup. Creation failure is a capability error the
/// caller must surface — choosing the CPU backend instead is an explicit,
/// separate decision, never a silent mid-operation downgrade.
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub adapter_name: String,
    /// Maximum texture dimension supported by this device.
    pub max_texture_dim: u32,
}

impl GpuContext {
    /// Attempt to create a GPU context. Tries a hardware adapter first,
    /// then a software rasterizer (`force_fallback_adapter`) — both are
    /// still the GPU backend, just different adapters.
    ///
    /// `pollster::block_on` because adapter/device acquisition is async and
    /// this runs once during startup.
    pub fn new() -> Result<Self, String> {
        if let Some(ctx) = pollster::block_on(Self::new_async(false)) {
            return Ok(ctx);
        }
        crate::log_warn!("hardware adapter unavailable — trying software fallback");
        pollster::block_on(Self::new_async(true))
            .ok_or_else(|| "no compatible GPU adapter (hardware or software)".to_string())
    }

    async fn new_async(force_fallback: bool) -> Option<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None, // headless — compute + readback only
                force_fallback_adapter: force_fallback,
            })
            .await?;

        let adapter_name = adapter.get_info().name.clone();
        let limits = adapter.limits();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("FilterFE GPU"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits {
                        max_texture_dimension_2d: limits.max_texture_dimension_2d,
                        max_storage_buffer_binding_size: limits.max_storage_buffer_binding_size,
                        max_compute_workgroup_size_x: limits.max_compute_workgroup_size_x,
                        max_compute_workgroup_size_y: limits.max_compute_workgroup_size_y,
                        max_compute_workgroup_size_z: limits.max_compute_workgroup_size_z,
                        max_compute_workgroups_per_dimension: limits
                            .max_compute_workgroups_per_dimension,
                        ..wgpu::Limits::downlevel_defaults()
                    },
                },
                None,
            )
            .await
            .ok()?;

        Some(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_name,
            max_texture_dim: limits.max_texture_dimension_2d,
        })
    }

    /// Check if a texture of the given dimensions can be created.
    pub fn supports_size(&self, width: u32, height: u32) -> bool {
        width <= self.max_texture_dim && height <= self.max_texture_dim
    }
}
