use std::time::{Duration, Instant};

/// Per-frame timing snapshot passed to application callbacks.
#[derive(Debug, Clone, Copy)]
pub struct FrameState {
    /// Seconds since the driver started.
    pub time: f32,
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Number of frames presented so far.
    pub frame_count: u64,
}

/// Timer for tracking frame timing and elapsed time.
pub struct Timer {
    start_time: Instant,
    last_update: Instant,
    /// Time since last tick
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Creates a new timer starting from now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advances the timer by one frame (called by the frame driver).
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_update;
        self.elapsed = now - self.start_time;
        self.last_update = now;
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Snapshot of the current frame's timing.
    #[must_use]
    pub fn frame_state(&self) -> FrameState {
        FrameState {
            time: self.elapsed_seconds(),
            dt: self.dt_seconds(),
            frame_count: self.frame_count,
        }
    }
}

/// Rolling frame-rate counter.
///
/// Accumulates frames and reports the average once per second via the
/// return value of [`update`](Self::update).
pub struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
    accumulated: Duration,
    /// Most recently computed average
    pub current_fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
            accumulated: Duration::ZERO,
            current_fps: 0.0,
        }
    }

    /// Counts one frame. Returns `Some(fps)` when a new one-second average
    /// is available.
    pub fn update(&mut self) -> Option<f32> {
        self.frame_count += 1;
        let now = Instant::now();
        self.accumulated += now - self.last_update;
        self.last_update = now;

        if self.accumulated.as_secs_f32() >= 1.0 {
            self.current_fps = self.frame_count as f32 / self.accumulated.as_secs_f32();
            self.accumulated = Duration::ZERO;
            self.frame_count = 0;
            return Some(self.current_fps);
        }

        None
    }
}
