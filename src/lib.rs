// ============================================================================
// FilterFE — Instagram-style color grading for still images
// ============================================================================
//
// Library crate backing the FilterFE binary. Everything lives here so the
// grading core is usable (and testable) without a window:
//
//   filters/    — the 9-stage grade: params, color math, presets, CPU render
//   gpu/        — wgpu compute backend for the same grade
//   scheduler   — coalescing one-in-flight render worker for the editor
//   thumbs      — incremental preset thumbnail batches
//   io          — image load/save with format + JPEG quality handling
//   cli         — headless batch grading entry point
//   app         — the eframe/egui editor shell
// ============================================================================

#![allow(dead_code)] // API surface kept for the CLI, GUI, and GPU paths alike
#![allow(clippy::too_many_arguments)]

pub mod app;
pub mod cli;
pub mod filters;
pub mod gpu;
pub mod io;
pub mod logger;
pub mod scheduler;
pub mod thumbs;
