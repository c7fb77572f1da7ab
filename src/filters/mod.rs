// ============================================================================
// FILTERS MODULE — the color-grading core (CPU side)
// ============================================================================
//
// Architecture:
//   color.rs    — pure scalar color math (clamp, lerp, HSL, curves, noise)
//   params.rs   — FilterParams, the nine grading knobs
//   presets.rs  — the read-only named-look catalog
//   pipeline.rs — the 9-stage per-pixel executor + full-buffer render
// ============================================================================

pub mod color;
pub mod params;
pub mod pipeline;
pub mod presets;

pub use params::FilterParams;
pub use presets::{PRESETS, Preset};
