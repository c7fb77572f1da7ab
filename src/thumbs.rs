// ============================================================================
// THUMBNAIL BATCH GENERATOR — one preset per tick, epoch-guarded
// ============================================================================
//
// Rendering all 25 preset thumbnails in one go would stall the UI thread
// for hundreds of milliseconds, so the batch is paced: each call to
// `tick()` (one per frame) grades exactly one preset against a small fixed
// sample and yields. A monotonically increasing generation epoch tags each
// batch; loading a new image bumps the epoch, and a stale batch silently
// stops producing output the next time it is ticked — no error, no partial
// commit. The visible set is only replaced atomically when a batch
// finishes every preset, so the strip never flickers through half states.
//
// Thumbnails always use the CPU executor: the sample is tiny, so even the
// GPU-backed editor grades its strip on the CPU.
// ============================================================================

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::filters::params::FilterParams;
use crate::filters::pipeline;
use crate::filters::presets::PRESETS;

/// Edge length of the square sample every thumbnail is graded from.
pub const THUMB_SIZE: u32 = 96;

/// One finished thumbnail, in catalog order.
pub struct Thumbnail {
    pub name: &'static str,
    pub params: FilterParams,
    pub image: RgbaImage,
}

struct Batch {
    epoch: u64,
    sample: RgbaImage,
    seed: u32,
    next_preset: usize,
    staged: Vec<Thumbnail>,
}

pub struct ThumbnailGenerator {
    epoch: u64,
    batch: Option<Batch>,
    visible: Vec<Thumbnail>,
    /// Bumped each time `visible` is replaced, so the UI knows to re-upload
    /// its textures.
    published: u64,
}

impl ThumbnailGenerator {
    pub fn new() -> Self {
        Self {
            epoch: 0,
            batch: None,
            visible: Vec::new(),
            published: 0,
        }
    }

    /// Start a fresh batch for a newly loaded image. The previous batch, if
    /// any, is superseded (its epoch no longer matches). The visible set is
    /// left untouched until the new batch completes.
    pub fn set_image(&mut self, source: &RgbaImage, seed: u32) {
        self.epoch += 1;
        self.batch = Some(Batch {
            epoch: self.epoch,
            sample: make_sample(source),
            seed,
            next_preset: 0,
            staged: Vec::with_capacity(PRESETS.len()),
        });
    }

    /// Invalidate any in-progress batch without starting a new one (image
    /// closed). Ticks after this do nothing.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.visible.clear();
        self.published += 1;
    }

    /// Current generation epoch (monotonic).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// True while a current-epoch batch still has presets left to grade.
    pub fn is_running(&self) -> bool {
        self.batch
            .as_ref()
            .is_some_and(|b| b.epoch == self.epoch && b.next_preset < PRESETS.len())
    }

    /// Grade exactly one preset, or drop a superseded batch. Returns `true`
    /// if work was done (the caller should schedule another tick).
    pub fn tick(&mut self) -> bool {
        let Some(batch) = self.batch.as_mut() else {
            return false;
        };

        // Epoch check before any work: a batch started for a previous image
        // is abandoned here, with nothing committed.
        if batch.epoch != self.epoch {
            self.batch = None;
            return false;
        }

        let preset = &PRESETS[batch.next_preset];
        let image = pipeline::render(&batch.sample, &preset.params, batch.seed);
        batch.staged.push(Thumbnail {
            name: preset.name,
            params: preset.params,
            image,
        });
        batch.next_preset += 1;

        if batch.next_preset == PRESETS.len() {
            // Whole batch done — publish atomically
            let batch = self.batch.take().expect("batch present");
            self.visible = batch.staged;
            self.published += 1;
        }
        true
    }

    /// The last fully published set, in catalog order. Empty until the
    /// first batch completes.
    pub fn thumbnails(&self) -> &[Thumbnail] {
        &self.visible
    }

    /// Publication counter for cheap change detection.
    pub fn published(&self) -> u64 {
        self.published
    }
}

impl Default for ThumbnailGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Centered square crop of the longer dimension (never stretched), scaled
/// down to `THUMB_SIZE`². Built once per image load.
fn make_sample(source: &RgbaImage) -> RgbaImage {
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 {
        return RgbaImage::new(THUMB_SIZE, THUMB_SIZE);
    }
    let side = w.min(h);
    let x = (w - side) / 2;
    let y = (h - side) / 2;
    let square = imageops::crop_imm(source, x, y, side, side).to_image();
    imageops::resize(&square, THUMB_SIZE, THUMB_SIZE, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, fill: u8) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([fill, fill, fill, 255]))
    }

    fn run_to_completion(g: &mut ThumbnailGenerator) {
        // One preset per tick: exactly PRESETS.len() productive ticks
        let mut ticks = 0;
        while g.is_running() {
            assert!(g.tick());
            ticks += 1;
            assert!(ticks <= PRESETS.len(), "batch never completed");
        }
    }

    #[test]
    fn batch_produces_one_thumbnail_per_preset_in_order() {
        let mut g = ThumbnailGenerator::new();
        g.set_image(&solid(200, 100, 128), 7);

        assert!(g.thumbnails().is_empty(), "nothing published mid-batch");
        run_to_completion(&mut g);

        let thumbs = g.thumbnails();
        assert_eq!(thumbs.len(), PRESETS.len());
        for (t, p) in thumbs.iter().zip(PRESETS.iter()) {
            assert_eq!(t.name, p.name);
            assert_eq!(t.image.dimensions(), (THUMB_SIZE, THUMB_SIZE));
        }
    }

    #[test]
    fn publication_is_atomic() {
        let mut g = ThumbnailGenerator::new();
        g.set_image(&solid(64, 64, 50), 1);
        let before = g.published();
        // Partial progress publishes nothing
        for _ in 0..5 {
            g.tick();
        }
        assert!(g.thumbnails().is_empty());
        assert_eq!(g.published(), before);
        run_to_completion(&mut g);
        assert_eq!(g.published(), before + 1);
    }

    #[test]
    fn superseded_batch_commits_nothing() {
        let mut g = ThumbnailGenerator::new();

        // Image A: tick partway through
        g.set_image(&solid(64, 64, 10), 1);
        for _ in 0..4 {
            assert!(g.tick());
        }

        // Image B arrives mid-batch
        g.set_image(&solid(64, 64, 240), 2);
        run_to_completion(&mut g);

        // Only B's results are visible: the Normal thumbnail must show B's
        // bright pixels, and there are no leftovers from A
        let thumbs = g.thumbnails();
        assert_eq!(thumbs.len(), PRESETS.len());
        assert_eq!(thumbs[0].name, "Normal");
        assert_eq!(thumbs[0].image.get_pixel(10, 10).0[0], 240);
    }

    #[test]
    fn invalidate_abandons_batch_silently() {
        let mut g = ThumbnailGenerator::new();
        g.set_image(&solid(64, 64, 10), 1);
        g.tick();
        let epoch_before = g.epoch();
        g.invalidate();
        assert!(g.epoch() > epoch_before);
        // The stale batch is dropped on the next tick, with no output
        assert!(!g.tick());
        assert!(!g.is_running());
        assert!(g.thumbnails().is_empty());
    }

    #[test]
    fn sample_crops_the_longer_dimension() {
        // Landscape image: left/right edges differ from the center band
        let mut img = solid(300, 100, 0);
        for y in 0..100 {
            for x in 100..200 {
                img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        let sample = make_sample(&img);
        assert_eq!(sample.dimensions(), (THUMB_SIZE, THUMB_SIZE));
        // Center crop keeps only the white band
        assert_eq!(sample.get_pixel(THUMB_SIZE / 2, THUMB_SIZE / 2).0[0], 255);
        assert_eq!(sample.get_pixel(2, 2).0[0], 255);
    }

    #[test]
    fn thumbnails_share_one_seed_per_batch() {
        // Two runs over the same image with the same seed must be identical
        let img = solid(80, 80, 128);
        let mut a = ThumbnailGenerator::new();
        let mut b = ThumbnailGenerator::new();
        a.set_image(&img, 99);
        b.set_image(&img, 99);
        run_to_completion(&mut a);
        run_to_completion(&mut b);
        for (ta, tb) in a.thumbnails().iter().zip(b.thumbnails()) {
            assert_eq!(ta.image.as_raw(), tb.image.as_raw());
        }
    }
}
