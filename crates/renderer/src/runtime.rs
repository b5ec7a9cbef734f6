use std::time::{Duration, Instant};

/// High-level behaviour requested by the caller.
///
/// The render policy decides whether `millis` follows the wall clock and how
/// often frames are drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// Redraw continuously with the clock running.
    Animate {
        /// Minimum spacing between frames; `None` draws every vblank.
        frame_interval: Option<Duration>,
    },
    /// Hold `millis` at a fixed value and redraw only when input or layout
    /// changes.
    Still {
        /// Value reported as `millis` on every frame.
        millis: f32,
    },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate {
            frame_interval: None,
        }
    }
}

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed wall-clock or fixed time in milliseconds.
    pub millis: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(millis: f32, frame_index: u64) -> Self {
        Self {
            millis,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
pub trait TimeSource: Send {
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    frame: u64,
}

impl SystemTimeSource {
    /// Starts counting from `Instant::now()`.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(origin: Instant) -> Self {
        Self { origin, frame: 0 }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn sample(&mut self) -> TimeSample {
        let elapsed = self.origin.elapsed();
        let sample = TimeSample::new((elapsed.as_secs_f64() * 1000.0) as f32, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    millis: f32,
    frame: u64,
}

impl FixedTimeSource {
    pub fn new(millis: f32) -> Self {
        Self { millis, frame: 0 }
    }
}

impl TimeSource for FixedTimeSource {
    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.millis, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Builds a time source suited to the requested render policy.
///
/// `origin` is when the sketch started; a running clock counts from there.
pub fn time_source_for_policy(policy: &RenderPolicy, origin: Instant) -> BoxedTimeSource {
    match policy {
        RenderPolicy::Animate { .. } => Box::new(SystemTimeSource::starting_at(origin)),
        RenderPolicy::Still { millis } => Box::new(FixedTimeSource::new(*millis)),
    }
}

/// Decides when the event loop should request the next redraw.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    policy: RenderPolicy,
    last_frame: Option<Instant>,
    dirty: bool,
}

impl FrameScheduler {
    pub fn new(policy: RenderPolicy) -> Self {
        Self {
            policy,
            last_frame: None,
            dirty: true,
        }
    }

    /// Something visible changed; still policies redraw once more.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match &self.policy {
            RenderPolicy::Animate { frame_interval } => match (frame_interval, self.last_frame) {
                (Some(interval), Some(last)) => now >= last + *interval,
                _ => true,
            },
            RenderPolicy::Still { .. } => self.dirty,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.policy {
            RenderPolicy::Animate {
                frame_interval: Some(interval),
            } => self.last_frame.map(|last| last + *interval),
            _ => None,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
        self.dirty = false;
    }
}
