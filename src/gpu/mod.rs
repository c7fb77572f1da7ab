// ============================================================================
// GPU MODULE — the wgpu grading backend
// ============================================================================
//
// Architecture:
//   context.rs — wgpu Device, Queue, adapter init (capability-checked)
//   shaders.rs — WGSL shader source (inline string)
//   grade.rs   — compute pipeline for the 9-stage grade + readback
// ============================================================================

pub mod context;
pub mod grade;
pub mod shaders;

pub use context::GpuContext;
pub use grade::GpuGrader;

/// WGPU requires `bytes_per_row` to be a multiple of 256 for buffer copies.
pub const COPY_BYTES_PER_ROW_ALIGNMENT: u32 = 256;
