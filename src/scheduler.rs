// ============================================================================
// RENDER SCHEDULER — coalescing full-resolution renders onto one worker
// ============================================================================
//
// Rapid slider movement can produce dozens of parameter snapshots per
// second; grading a full-resolution image takes far longer than that. The
// policy is: at most one job in flight, and while one is running only the
// *newest* snapshot is remembered. Intermediate values are silently
// dropped, so completed results always land in user-intent order.
//
// The policy itself is a tiny synchronous state machine (`RenderCoalescer`)
// with no threads in it, so it is testable in isolation. `RenderWorker`
// supplies the actual execution: one rayon job per dispatch, completion
// delivered over an mpsc channel that the UI thread polls each frame.
// `RenderScheduler` ties the two together and filters out results from a
// superseded source buffer.
// ============================================================================

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::RgbaImage;

use crate::filters::params::FilterParams;
use crate::filters::pipeline;

// ============================================================================
// Coalescing policy (Idle / Busy + pending flag)
// ============================================================================

/// The one-in-flight-plus-pending-flag state machine. Generic over the
/// snapshot type so tests can drive it with plain markers.
#[derive(Debug)]
pub struct RenderCoalescer<P> {
    busy: bool,
    pending: bool,
    latest: Option<P>,
}

impl<P: Clone> RenderCoalescer<P> {
    pub fn new() -> Self {
        Self {
            busy: false,
            pending: false,
            latest: None,
        }
    }

    /// Record a new snapshot. Returns `Some(snapshot)` when the caller
    /// should dispatch a job right now (we were Idle); returns `None` when
    /// a job is already in flight — the snapshot is remembered and the
    /// pending flag set, replacing any previously remembered snapshot.
    pub fn request(&mut self, snapshot: P) -> Option<P> {
        self.latest = Some(snapshot.clone());
        if self.busy {
            self.pending = true;
            None
        } else {
            self.busy = true;
            Some(snapshot)
        }
    }

    /// Mark the in-flight job finished. If the pending flag was set,
    /// returns the *latest* snapshot (not the one that set the flag) and
    /// stays Busy — the caller must dispatch it immediately. Otherwise
    /// transitions back to Idle and returns `None`.
    pub fn complete(&mut self) -> Option<P> {
        if self.pending {
            self.pending = false;
            self.latest.clone()
        } else {
            self.busy = false;
            None
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Forget all in-flight state (new source image loaded). Any job still
    /// running will finish against its old buffer; its result is filtered
    /// out by buffer identity, not by this reset.
    pub fn reset(&mut self) {
        self.busy = false;
        self.pending = false;
        self.latest = None;
    }
}

impl<P: Clone> Default for RenderCoalescer<P> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Worker execution (rayon job + mpsc completion)
// ============================================================================

/// One render job. The source is shared via `Arc` — the worker never
/// mutates it and the freshly allocated output transfers back with the
/// completion message. `job_id` is unique per dispatch; `source_id`
/// identifies the buffer the job graded.
pub struct RenderJob {
    pub source: Arc<RgbaImage>,
    pub params: FilterParams,
    pub seed: u32,
    pub source_id: u64,
    pub job_id: u64,
}

/// Completion message from the worker. `Failed` is distinct from a
/// successful empty result so the scheduler can clear its Busy state
/// instead of wedging forever.
pub enum RenderOutcome {
    Done {
        image: RgbaImage,
        source_id: u64,
        job_id: u64,
    },
    Failed {
        source_id: u64,
        job_id: u64,
        message: String,
    },
}

impl RenderOutcome {
    fn job_id(&self) -> u64 {
        match self {
            Self::Done { job_id, .. } | Self::Failed { job_id, .. } => *job_id,
        }
    }
}

/// Background executor for the CPU path. Jobs run on the rayon pool; the
/// UI thread polls `try_recv` from its update loop.
pub struct RenderWorker {
    sender: mpsc::Sender<RenderOutcome>,
    receiver: mpsc::Receiver<RenderOutcome>,
}

impl RenderWorker {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    pub fn dispatch(&self, job: RenderJob) {
        let sender = self.sender.clone();
        rayon::spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(|| {
                pipeline::render(&job.source, &job.params, job.seed)
            }));
            let outcome = match result {
                Ok(image) => RenderOutcome::Done {
                    image,
                    source_id: job.source_id,
                    job_id: job.job_id,
                },
                Err(payload) => {
                    let message = if let Some(s) = payload.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = payload.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "unknown panic payload".to_string()
                    };
                    RenderOutcome::Failed {
                        source_id: job.source_id,
                        job_id: job.job_id,
                        message,
                    }
                }
            };
            // Receiver gone means the app is shutting down — nothing to do
            let _ = sender.send(outcome);
        });
    }

    pub fn try_recv(&self) -> Option<RenderOutcome> {
        self.receiver.try_recv().ok()
    }
}

impl Default for RenderWorker {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Full scheduler (policy + worker + buffer identity)
// ============================================================================

/// Drives full-resolution CPU renders for the interactive editor.
pub struct RenderScheduler {
    coalescer: RenderCoalescer<FilterParams>,
    worker: RenderWorker,
    source: Option<Arc<RgbaImage>>,
    source_id: u64,
    /// Id of the most recent dispatch. The coalescer's Busy slot belongs to
    /// this job and no other; completions carrying an older id must not
    /// touch the coalescer.
    next_job_id: u64,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self {
            coalescer: RenderCoalescer::new(),
            worker: RenderWorker::new(),
            source: None,
            source_id: 0,
            next_job_id: 0,
        }
    }

    /// Install a new source buffer. Bumps the buffer identity so results
    /// from jobs still running against the previous buffer are discarded
    /// on arrival, and resets the coalescer to Idle.
    pub fn set_source(&mut self, image: Arc<RgbaImage>) {
        self.source_id += 1;
        self.source = Some(image);
        self.coalescer.reset();
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn source(&self) -> Option<&Arc<RgbaImage>> {
        self.source.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.coalescer.is_busy()
    }

    /// Ask for a render with the given snapshot. Either dispatches now or
    /// remembers the snapshot for redispatch on completion.
    pub fn request(&mut self, params: FilterParams) {
        let Some(source) = self.source.clone() else {
            return;
        };
        if let Some(params) = self.coalescer.request(params) {
            self.dispatch_job(params, source);
        }
    }

    fn dispatch_job(&mut self, params: FilterParams, source: Arc<RgbaImage>) {
        self.next_job_id += 1;
        self.worker.dispatch(RenderJob {
            source,
            params,
            seed: draw_seed(),
            source_id: self.source_id,
            job_id: self.next_job_id,
        });
    }

    /// Poll for a finished render. Handles coalesced redispatch, drops
    /// stale results silently, and reports worker failures as `Err` after
    /// clearing the Busy state.
    ///
    /// Only the completion of the *latest* dispatch frees the job slot: a
    /// job launched before a source swap may finish after a newer job went
    /// out, and its completion must not mark the newer job done.
    pub fn poll(&mut self) -> Option<Result<RgbaImage, String>> {
        while let Some(outcome) = self.worker.try_recv() {
            if outcome.job_id() != self.next_job_id {
                // A superseded dispatch finished; the slot belongs to a
                // newer job now, so this outcome is dropped whole.
                continue;
            }

            // The in-flight job is done (successfully or not); a pending
            // snapshot goes out immediately with the *current* source.
            if let Some(next) = self.coalescer.complete() {
                if let Some(source) = self.source.clone() {
                    self.dispatch_job(next, source);
                }
            }

            return match outcome {
                RenderOutcome::Done {
                    image, source_id, ..
                } => {
                    if source_id == self.source_id {
                        Some(Ok(image))
                    } else {
                        // Graded a replaced buffer — expected flow control
                        None
                    }
                }
                RenderOutcome::Failed {
                    source_id, message, ..
                } => {
                    if source_id == self.source_id {
                        Some(Err(message))
                    } else {
                        None
                    }
                }
            };
        }
        None
    }
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-render grain seed. Grain should differ render to render (so it
/// animates under slider movement) without needing an RNG dependency; the
/// sub-second clock bits hashed through the grain mixer are plenty.
pub fn draw_seed() -> u32 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    nanos.wrapping_mul(2_654_435_761)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::time::{Duration, Instant};

    #[test]
    fn coalescer_collapses_rapid_requests() {
        let mut c: RenderCoalescer<u32> = RenderCoalescer::new();

        // P1 dispatches immediately
        assert_eq!(c.request(1), Some(1));
        // P2 and P3 arrive while busy — remembered, not dispatched
        assert_eq!(c.request(2), None);
        assert_eq!(c.request(3), None);
        // Completion redispatches the *latest* snapshot only
        assert_eq!(c.complete(), Some(3));
        // Second completion returns to Idle: exactly two jobs ran, never P2
        assert_eq!(c.complete(), None);
        assert!(!c.is_busy());
    }

    #[test]
    fn coalescer_idle_requests_pass_straight_through() {
        let mut c: RenderCoalescer<&str> = RenderCoalescer::new();
        assert_eq!(c.request("a"), Some("a"));
        assert_eq!(c.complete(), None);
        assert_eq!(c.request("b"), Some("b"));
        assert_eq!(c.complete(), None);
    }

    #[test]
    fn coalescer_reset_clears_pending() {
        let mut c: RenderCoalescer<u32> = RenderCoalescer::new();
        c.request(1);
        c.request(2);
        c.reset();
        assert!(!c.is_busy());
        // After reset the next request dispatches immediately
        assert_eq!(c.request(3), Some(3));
    }

    fn tiny_image(fill: u8) -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_pixel(8, 8, Rgba([fill, fill, fill, 255])))
    }

    /// Poll a scheduler until it yields a result or the deadline passes.
    fn poll_until(s: &mut RenderScheduler, timeout: Duration) -> Option<Result<RgbaImage, String>> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(r) = s.poll() {
                return Some(r);
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        None
    }

    #[test]
    fn scheduler_round_trip() {
        let mut s = RenderScheduler::new();
        s.set_source(tiny_image(100));
        s.request(FilterParams::default());
        let result = poll_until(&mut s, Duration::from_secs(10))
            .expect("render completed")
            .expect("render succeeded");
        assert_eq!(result.dimensions(), (8, 8));
        assert_eq!(result.get_pixel(0, 0).0, [100, 100, 100, 255]);
    }

    #[test]
    fn stale_results_are_dropped_after_source_swap() {
        let mut s = RenderScheduler::new();
        s.set_source(tiny_image(10));
        s.request(FilterParams::default());
        // Replace the source while the first job may still be in flight
        s.set_source(tiny_image(200));
        s.request(FilterParams::default());

        // Every result that surfaces must come from the new buffer
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut saw_result = false;
        while Instant::now() < deadline {
            if let Some(Ok(img)) = s.poll() {
                assert_eq!(img.get_pixel(0, 0).0[0], 200);
                saw_result = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(saw_result, "render for the new source never arrived");
    }

    #[test]
    fn failed_outcome_clears_busy_and_reports_error() {
        let mut s = RenderScheduler::new();
        s.set_source(tiny_image(50));
        // Occupy the job slot without dispatching real work, then deliver
        // a failure the way the worker thread would
        assert!(s.coalescer.request(FilterParams::default()).is_some());
        s.next_job_id += 1;
        s.worker
            .sender
            .send(RenderOutcome::Failed {
                source_id: s.source_id,
                job_id: s.next_job_id,
                message: "boom".to_string(),
            })
            .unwrap();

        let result = s.poll().expect("failure surfaced");
        assert_eq!(result.unwrap_err(), "boom");
        assert!(!s.is_busy(), "failure must free the job slot");
    }

    #[test]
    fn late_completion_from_old_source_leaves_new_job_in_flight() {
        let mut s = RenderScheduler::new();

        // A job for the first image occupies the slot (no real work needed)
        s.set_source(tiny_image(10));
        assert!(s.coalescer.request(FilterParams::default()).is_some());
        s.next_job_id += 1;
        let old_job = s.next_job_id;
        let old_source = s.source_id;

        // A new image arrives and its own job goes out
        s.set_source(tiny_image(200));
        assert!(s.coalescer.request(FilterParams::default()).is_some());
        s.next_job_id += 1;
        let new_job = s.next_job_id;

        // The first image's job finishes late; it must neither surface nor
        // free the slot that now belongs to the new job
        s.worker
            .sender
            .send(RenderOutcome::Done {
                image: RgbaImage::from_pixel(8, 8, Rgba([10, 10, 10, 255])),
                source_id: old_source,
                job_id: old_job,
            })
            .unwrap();
        assert!(s.poll().is_none());
        assert!(s.is_busy(), "the new job is still in flight");

        // The new job's completion lands normally afterwards
        s.worker
            .sender
            .send(RenderOutcome::Done {
                image: RgbaImage::from_pixel(8, 8, Rgba([200, 200, 200, 255])),
                source_id: s.source_id,
                job_id: new_job,
            })
            .unwrap();
        let img = s.poll().expect("current result").expect("render succeeded");
        assert_eq!(img.get_pixel(0, 0).0[0], 200);
        assert!(!s.is_busy());
    }

    #[test]
    fn request_without_source_is_ignored() {
        let mut s = RenderScheduler::new();
        s.request(FilterParams::default());
        assert!(!s.is_busy());
        assert!(s.poll().is_none());
    }
}
