// ============================================================================
// FilterFE APP — the interactive editor shell around the grading core
// ============================================================================
//
// The UI is a thin collaborator: sliders and the preset picker produce
// FilterParams snapshots, the backend turns them into pixels, and this
// module only moves data between the two. Pipeline math never lives here.
//
// Backend selection happens once at startup. The GPU path grades
// synchronously inside the repaint (a dirty flag collapses multiple
// parameter changes within one frame into a single grade); the CPU path
// goes through the coalescing RenderScheduler and is polled every frame.
// Thumbnails always grade on the CPU, one preset per frame.
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use eframe::egui;
use egui::load::SizedTexture;
use egui::{ColorImage, TextureHandle, TextureOptions};
use image::RgbaImage;

use crate::filters::params::FilterParams;
use crate::filters::presets::PRESETS;
use crate::gpu::{GpuContext, GpuGrader};
use crate::io::{self, SaveFormat};
use crate::scheduler::{RenderScheduler, draw_seed};
use crate::thumbs::{THUMB_SIZE, ThumbnailGenerator};
use crate::{log_err, log_info, log_warn};

/// Which execution engine grades the full-resolution image. Chosen once at
/// startup; never switched mid-operation.
enum Backend {
    Gpu {
        ctx: GpuContext,
        grader: GpuGrader,
        /// True when the last snapshot has not been graded yet ("a repaint
        /// is already pending" is the GPU path's Busy state).
        dirty: bool,
    },
    Cpu {
        scheduler: RenderScheduler,
    },
}

pub struct FilterFEApp {
    backend: Backend,

    params: FilterParams,
    /// Catalog name the sliders currently match, if any. Cleared as soon
    /// as a slider is moved off a preset's values.
    active_preset: Option<&'static str>,

    source: Option<Arc<RgbaImage>>,
    source_path: Option<PathBuf>,
    /// Last completed full-resolution grade (what Export writes).
    graded: Option<RgbaImage>,
    display: Option<TextureHandle>,

    thumbs: ThumbnailGenerator,
    thumb_textures: Vec<(&'static str, FilterParams, TextureHandle)>,
    thumbs_seen: u64,

    render_started: Option<Instant>,
    last_render_ms: f64,
    status: String,
}

impl FilterFEApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        // Backend choice is explicit and logged; GPU init failure is a
        // capability error, and picking the CPU worker instead is its own
        // decision — never an implicit mid-render switch.
        let backend = match GpuContext::new() {
            Ok(ctx) => {
                log_info!("GPU backend ready: {}", ctx.adapter_name);
                let grader = GpuGrader::new(&ctx);
                Backend::Gpu {
                    ctx,
                    grader,
                    dirty: false,
                }
            }
            Err(e) => {
                log_warn!("GPU unavailable ({}); using the CPU worker backend", e);
                Backend::Cpu {
                    scheduler: RenderScheduler::new(),
                }
            }
        };

        Self {
            backend,
            params: FilterParams::default(),
            active_preset: Some("Normal"),
            source: None,
            source_path: None,
            graded: None,
            display: None,
            thumbs: ThumbnailGenerator::new(),
            thumb_textures: Vec::new(),
            thumbs_seen: 0,
            render_started: None,
            last_render_ms: 0.0,
            status: "Open an image to start grading".to_string(),
        }
    }

    fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Gpu { .. } => "GPU",
            Backend::Cpu { .. } => "CPU worker",
        }
    }

    /// A parameter snapshot changed — schedule a grade.
    fn request_render(&mut self) {
        if self.source.is_none() {
            return;
        }
        self.render_started = Some(Instant::now());
        match &mut self.backend {
            Backend::Gpu { dirty, .. } => *dirty = true,
            Backend::Cpu { scheduler } => scheduler.request(self.params),
        }
    }

    /// GPU path: grade synchronously once per frame when dirty.
    fn drive_gpu(&mut self, ctx: &egui::Context) {
        let Backend::Gpu {
            ctx: gpu,
            grader,
            dirty,
        } = &mut self.backend
        else {
            return;
        };
        if !*dirty {
            return;
        }
        *dirty = false;
        let Some(source) = &self.source else { return };

        let started = Instant::now();
        match grader.render(gpu, source, &self.params, draw_seed()) {
            Ok(image) => {
                self.last_render_ms = started.elapsed().as_secs_f64() * 1000.0;
                self.display = Some(upload_texture(ctx, "display", &image));
                self.graded = Some(image);
            }
            Err(e) => {
                log_err!("GPU render failed: {}", e);
                self.status = format!("GPU render failed: {}", e);
            }
        }
    }

    /// CPU path: collect finished worker results.
    fn drive_cpu(&mut self, ctx: &egui::Context) {
        let Backend::Cpu { scheduler } = &mut self.backend else {
            return;
        };
        let mut done = None;
        while let Some(result) = scheduler.poll() {
            match result {
                Ok(image) => done = Some(image),
                Err(e) => {
                    log_err!("render worker failed: {}", e);
                    self.status = format!("Render failed: {}", e);
                }
            }
        }
        if let Some(image) = done {
            if let Some(started) = self.render_started.take() {
                self.last_render_ms = started.elapsed().as_secs_f64() * 1000.0;
            }
            self.display = Some(upload_texture(ctx, "display", &image));
            self.graded = Some(image);
        }
        if scheduler.is_busy() {
            // Completion arrives over a channel; keep the frame clock alive
            ctx.request_repaint();
        }
    }

    fn open_image(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter(
                "Images",
                &["png", "jpg", "jpeg", "webp", "bmp", "gif", "tga", "tiff"],
            )
            .pick_file()
        else {
            return;
        };

        match io::load_image(&path) {
            Ok(image) => {
                let (w, h) = image.dimensions();
                log_info!("loaded {} ({}×{})", path.display(), w, h);
                let image = Arc::new(image);
                if let Backend::Cpu { scheduler } = &mut self.backend {
                    scheduler.set_source(image.clone());
                }
                // One seed per batch so all thumbnails are comparable
                self.thumbs.set_image(&image, draw_seed());
                self.source = Some(image);
                self.source_path = Some(path);
                self.graded = None;
                self.status = format!("{}×{}", w, h);
                self.request_render();
            }
            Err(e) => {
                log_err!("open failed: {}", e);
                self.status = e;
            }
        }
    }

    fn export_image(&mut self) {
        let Some(graded) = &self.graded else {
            self.status = "Nothing to export yet".to_string();
            return;
        };
        let stem = self
            .source_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&format!("{}_graded.png", stem))
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"])
            .add_filter("WebP", &["webp"])
            .add_filter("BMP", &["bmp"])
            .save_file()
        else {
            return;
        };

        let format = SaveFormat::from_path(&path).unwrap_or(SaveFormat::Png);
        match io::save_image(graded, &path, format, 90) {
            Ok(()) => {
                log_info!("exported {}", path.display());
                self.status = format!("Exported {}", path.display());
            }
            Err(e) => {
                log_err!("export failed: {}", e);
                self.status = e;
            }
        }
    }

    fn apply_preset(&mut self, name: &'static str, params: FilterParams) {
        self.active_preset = Some(name);
        self.params = params;
        self.request_render();
    }

    // ------------------------------------------------------------------
    // UI sections
    // ------------------------------------------------------------------

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open…").clicked() {
                    ui.close_menu();
                    self.open_image();
                }
                if ui.button("Export…").clicked() {
                    ui.close_menu();
                    self.export_image();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
        });
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Grade");
        ui.add_space(4.0);

        let selected = self.active_preset.unwrap_or("Custom");
        let mut picked: Option<(&'static str, FilterParams)> = None;
        egui::ComboBox::from_label("Preset")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for preset in PRESETS {
                    if ui
                        .selectable_label(self.active_preset == Some(preset.name), preset.name)
                        .clicked()
                    {
                        picked = Some((preset.name, preset.params));
                    }
                }
            });
        if let Some((name, params)) = picked {
            self.apply_preset(name, params);
        }

        ui.add_space(8.0);

        let mut changed = false;
        let p = &mut self.params;
        changed |= ui
            .add(egui::Slider::new(&mut p.strength, 0.0..=1.0).text("Strength"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut p.exposure, -0.5..=0.5).text("Exposure"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut p.contrast, 0.0..=2.0).text("Contrast"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut p.saturation, 0.0..=2.0).text("Saturation"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut p.temp, -0.3..=0.3).text("Temperature"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut p.tint, -0.3..=0.3).text("Tint"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut p.fade, 0.0..=0.5).text("Fade"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut p.vignette, 0.0..=1.0).text("Vignette"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut p.grain, 0.0..=1.0).text("Grain"))
            .changed();

        if changed {
            // Hand-tuned values are no longer any preset
            self.active_preset = None;
            self.request_render();
        }

        ui.add_space(8.0);
        if ui.button("Reset").clicked() {
            self.apply_preset("Normal", FilterParams::default());
        }

        ui.add_space(12.0);
        ui.separator();
        ui.label(format!(
            "Render: {:.0} ms ({})",
            self.last_render_ms,
            self.backend_name()
        ));
        ui.label(&self.status);
    }

    fn thumbnail_strip(&mut self, ui: &mut egui::Ui) {
        if self.thumb_textures.is_empty() {
            ui.label("Thumbnails appear here after an image is opened.");
            return;
        }
        let mut picked: Option<(&'static str, FilterParams)> = None;
        egui::ScrollArea::horizontal().show(ui, |ui| {
            ui.horizontal(|ui| {
                for (name, params, texture) in &self.thumb_textures {
                    ui.vertical(|ui| {
                        let sized = SizedTexture::new(texture.id(), egui::vec2(72.0, 72.0));
                        let response = ui.add(egui::ImageButton::new(egui::Image::from_texture(sized)));
                        if response.clicked() {
                            picked = Some((*name, *params));
                        }
                        ui.set_max_width(76.0);
                        ui.small(*name);
                    });
                }
            });
        });
        if let Some((name, params)) = picked {
            self.apply_preset(name, params);
        }
    }

    fn central_image(&mut self, ui: &mut egui::Ui) {
        let Some(texture) = &self.display else {
            ui.centered_and_justified(|ui| {
                ui.label("No image loaded — File ▸ Open…");
            });
            return;
        };
        let tex_size = texture.size_vec2();
        let avail = ui.available_size();
        // Fit without upscaling past 1:1
        let scale = (avail.x / tex_size.x)
            .min(avail.y / tex_size.y)
            .min(1.0)
            .max(0.01);
        let shown = tex_size * scale;
        ui.centered_and_justified(|ui| {
            ui.add(egui::Image::from_texture(SizedTexture::new(
                texture.id(),
                shown,
            )));
        });
    }

    /// Re-upload thumbnail textures when the generator published a new set.
    fn sync_thumbnails(&mut self, ctx: &egui::Context) {
        if self.thumbs.published() == self.thumbs_seen {
            return;
        }
        self.thumbs_seen = self.thumbs.published();
        self.thumb_textures = self
            .thumbs
            .thumbnails()
            .iter()
            .map(|t| {
                let texture = upload_texture(ctx, &format!("thumb:{}", t.name), &t.image);
                (t.name, t.params, texture)
            })
            .collect();
    }
}

impl eframe::App for FilterFEApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // One thumbnail per frame keeps the UI thread responsive
        if self.thumbs.is_running() {
            self.thumbs.tick();
            ctx.request_repaint();
        }
        self.sync_thumbnails(ctx);

        self.drive_cpu(ctx);
        self.drive_gpu(ctx);

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            self.menu_bar(ui);
        });
        egui::SidePanel::right("controls")
            .min_width(240.0)
            .show(ctx, |ui| {
                self.controls(ui);
            });
        egui::TopBottomPanel::bottom("thumbnails")
            .min_height(THUMB_SIZE as f32 + 12.0)
            .show(ctx, |ui| {
                self.thumbnail_strip(ui);
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.central_image(ui);
        });
    }
}

fn upload_texture(ctx: &egui::Context, name: &str, image: &RgbaImage) -> TextureHandle {
    let size = [image.width() as usize, image.height() as usize];
    let color_image = ColorImage::from_rgba_unmultiplied(size, image.as_raw());
    ctx.load_texture(name, color_image, TextureOptions::LINEAR)
}
